use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A unit cost, currency-agnostic. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Cost(f64);

impl Cost {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidCost {
                line: None,
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Cost {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidCost {
            line: None,
            value: s.to_owned(),
        };

        let value: f64 = s.trim().parse().map_err(|_| invalid())?;
        Self::new(value).map_err(|_| invalid())
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0 * 100.0;
        if (cents - cents.round()).abs() < 1e-9 {
            write!(f, "{:.2}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One row of the locally supplied cost list.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord {
    pub part_number: String,
    pub cost: Cost,
    /// Line in the source file, when the record was read from one.
    pub line: Option<u64>,
}

impl LocalRecord {
    pub fn new(part_number: impl Into<String>, cost: Cost) -> Self {
        Self {
            part_number: part_number.into(),
            cost,
            line: None,
        }
    }
}

/// Header names used to locate the part number and cost columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordColumns {
    #[serde(default = "default_part_number_column")]
    pub part_number: String,
    #[serde(default = "default_cost_column")]
    pub cost: String,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            part_number: default_part_number_column(),
            cost: default_cost_column(),
        }
    }
}

fn default_part_number_column() -> String {
    "Part No.".into()
}

fn default_cost_column() -> String {
    "Cost".into()
}

/// Problems with the input record set. Any of these aborts a run before
/// the catalog is contacted.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("empty part number{}", line_suffix(.line))]
    EmptyPartNumber { line: Option<u64> },

    #[error("invalid cost {value:?}{}", line_suffix(.line))]
    InvalidCost { line: Option<u64>, value: String },

    #[error("malformed CSV: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" on line {l}")).unwrap_or_default()
}

/// Reads records from CSV data with a header row.
///
/// Both configured columns must be present. Fully blank rows are skipped;
/// any other row with an empty part number or an unusable cost fails the
/// whole read.
pub fn read_records<R: io::Read>(
    reader: R,
    columns: &RecordColumns,
) -> Result<Vec<LocalRecord>, ValidationError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ValidationError::Csv(e.to_string()))?
        .clone();

    let position_of = |name: &str| headers.iter().position(|h| h == name);
    let part_idx = position_of(&columns.part_number);
    let cost_idx = position_of(&columns.cost);

    let (part_idx, cost_idx) = match (part_idx, cost_idx) {
        (Some(p), Some(c)) => (p, c),
        (p, c) => {
            let mut missing = Vec::new();
            if p.is_none() {
                missing.push(columns.part_number.clone());
            }
            if c.is_none() {
                missing.push(columns.cost.clone());
            }
            return Err(ValidationError::MissingColumns(missing));
        }
    };

    let mut records = Vec::new();

    for row in rdr.records() {
        let row = row.map_err(|e| ValidationError::Csv(e.to_string()))?;
        let line = row.position().map(|p| p.line());

        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let part_number = row.get(part_idx).unwrap_or_default();
        if part_number.is_empty() {
            return Err(ValidationError::EmptyPartNumber { line });
        }

        let raw_cost = row.get(cost_idx).unwrap_or_default();
        let cost = raw_cost
            .parse::<Cost>()
            .map_err(|_| ValidationError::InvalidCost {
                line,
                value: raw_cost.to_owned(),
            })?;

        records.push(LocalRecord {
            part_number: part_number.to_owned(),
            cost,
            line,
        });
    }

    Ok(records)
}

/// Reads records from a CSV file on disk.
pub fn read_records_from_path(
    path: &Path,
    columns: &RecordColumns,
) -> Result<Vec<LocalRecord>, ValidationError> {
    let file = std::fs::File::open(path)?;
    read_records(io::BufReader::new(file), columns)
}
