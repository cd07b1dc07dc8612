use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogPage;

/// Minimum gap between page requests when the caller picks no pacing.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// Decides how long to wait before requesting the page after `page`.
pub trait PagePacing: Send + Sync {
    fn delay_after(&self, page: &CatalogPage) -> Duration;
}

impl<T: PagePacing + ?Sized> PagePacing for Arc<T> {
    fn delay_after(&self, page: &CatalogPage) -> Duration {
        (**self).delay_after(page)
    }
}

/// Always waits the same minimum delay between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_PAGE_DELAY)
    }
}

impl PagePacing for FixedDelay {
    fn delay_after(&self, _page: &CatalogPage) -> Duration {
        self.0
    }
}

/// Waits at least `min_delay`, and longer when the reported call bucket is
/// close to full.
///
/// The bucket is assumed to drain one call per `leak_interval`. Once the
/// number of used calls passes `headroom` below the maximum, the delay
/// grows to let the excess drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallLimitPacing {
    pub min_delay: Duration,
    pub leak_interval: Duration,
    pub headroom: u32,
}

impl CallLimitPacing {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            leak_interval: Duration::from_millis(500),
            headroom: 10,
        }
    }
}

impl PagePacing for CallLimitPacing {
    fn delay_after(&self, page: &CatalogPage) -> Duration {
        let Some(limit) = page.call_limit else {
            return self.min_delay;
        };

        let threshold = limit.max.saturating_sub(self.headroom);
        let excess = limit.used.saturating_sub(threshold);

        self.min_delay.max(self.leak_interval * excess)
    }
}

/// Serializable selection of a pacing strategy, used by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PacingMode {
    #[default]
    Fixed,
    Adaptive,
}

impl PacingMode {
    pub fn build(self, min_delay: Duration) -> Arc<dyn PagePacing> {
        match self {
            Self::Fixed => Arc::new(FixedDelay(min_delay)),
            Self::Adaptive => Arc::new(CallLimitPacing::new(min_delay)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CallLimit;

    fn page_with_limit(used: u32, max: u32) -> CatalogPage {
        CatalogPage {
            call_limit: Some(CallLimit { used, max }),
            ..CatalogPage::default()
        }
    }

    #[test]
    fn fixed_delay_ignores_page() {
        let pacing = FixedDelay(Duration::from_millis(250));
        assert_eq!(
            pacing.delay_after(&page_with_limit(40, 40)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn adaptive_uses_minimum_without_header() {
        let pacing = CallLimitPacing::new(Duration::from_millis(100));
        assert_eq!(
            pacing.delay_after(&CatalogPage::default()),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn adaptive_uses_minimum_with_headroom_left() {
        let pacing = CallLimitPacing::new(Duration::from_millis(100));
        assert_eq!(
            pacing.delay_after(&page_with_limit(5, 40)),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn adaptive_backs_off_near_the_limit() {
        let pacing = CallLimitPacing::new(Duration::from_millis(100));
        // threshold is 30, so 4 calls over => 4 * 500ms
        assert_eq!(
            pacing.delay_after(&page_with_limit(34, 40)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn mode_parses_from_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            pacing: PacingMode,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"pacing":"adaptive"}"#).unwrap();
        assert_eq!(parsed.pacing, PacingMode::Adaptive);
    }
}
