use cost_sync::{CallLimit, PageCursor};
use reqwest::Url;
use reqwest::header::HeaderMap;

pub const LINK_HEADER: &str = "Link";
pub const CALL_LIMIT_HEADER: &str = "X-Shopify-Shop-Api-Call-Limit";

/// Extracts the `page_info` token of the `rel="next"` entry of a `Link`
/// header.
///
/// Shopify link URLs may contain commas inside their query strings, so
/// entries are split on `<` rather than on `,`.
pub fn next_page_cursor(link_header: &str) -> Option<PageCursor> {
    link_header.split('<').skip(1).find_map(|segment| {
        let (target, params) = segment.split_once('>')?;

        let is_next = params
            .split(';')
            .map(str::trim)
            .any(|param| param == r#"rel="next""# || param == "rel=next");
        if !is_next {
            return None;
        }

        let url = Url::parse(target.trim()).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page_info")
            .map(|(_, value)| PageCursor::new(value.into_owned()))
    })
}

/// Reads the continuation cursor from response headers, if any.
pub fn cursor_from_headers(headers: &HeaderMap) -> Option<PageCursor> {
    headers
        .get(LINK_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(next_page_cursor)
}

/// Reads the leaky-bucket state reported with every Admin API response.
pub fn call_limit_from_headers(headers: &HeaderMap) -> Option<CallLimit> {
    headers
        .get(CALL_LIMIT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    const BASE: &str = "https://acme.myshopify.com/admin/api/2024-04/products.json";

    #[test]
    fn extracts_next_cursor() {
        let header = format!(r#"<{BASE}?limit=250&page_info=abc123>; rel="next""#);
        assert_eq!(next_page_cursor(&header), Some(PageCursor::new("abc123")));
    }

    #[test]
    fn ignores_previous_link() {
        let header = format!(r#"<{BASE}?limit=250&page_info=prev1>; rel="previous""#);
        assert_eq!(next_page_cursor(&header), None);
    }

    #[test]
    fn picks_next_when_both_links_present() {
        let header = format!(
            r#"<{BASE}?limit=250&page_info=prev1>; rel="previous", <{BASE}?limit=250&page_info=next2>; rel="next""#
        );
        assert_eq!(next_page_cursor(&header), Some(PageCursor::new("next2")));
    }

    #[test]
    fn tolerates_commas_inside_urls() {
        let header = format!(
            r#"<{BASE}?fields=id,title,variants&limit=2&page_info=c2>; rel="next""#
        );
        assert_eq!(next_page_cursor(&header), Some(PageCursor::new("c2")));
    }

    #[test]
    fn cursor_is_passed_through_opaquely() {
        let header = format!(r#"<{BASE}?page_info=eyJsYXN0X2lkIjo0fQ%3D%3D>; rel="next""#);
        assert_eq!(
            next_page_cursor(&header),
            Some(PageCursor::new("eyJsYXN0X2lkIjo0fQ=="))
        );
    }

    #[test]
    fn malformed_header_yields_none() {
        assert_eq!(next_page_cursor(""), None);
        assert_eq!(next_page_cursor("garbage"), None);
        assert_eq!(next_page_cursor(r#"<not a url>; rel="next""#), None);
    }

    #[test]
    fn reads_call_limit_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CALL_LIMIT_HEADER, HeaderValue::from_static("39/40"));
        assert_eq!(
            call_limit_from_headers(&headers),
            Some(CallLimit { used: 39, max: 40 })
        );
    }

    #[test]
    fn missing_headers_yield_none() {
        let headers = HeaderMap::new();
        assert_eq!(cursor_from_headers(&headers), None);
        assert_eq!(call_limit_from_headers(&headers), None);
    }
}
