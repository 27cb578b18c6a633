//! Antenna record schema and CSV ingestion.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

/// Sentinel technology label for sites whose technology is not known.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "operator",
    "district",
    "technology_label",
    "service_start",
    "service_start_5g",
    "longitude",
    "latitude",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Administrative district key.
///
/// Treated as opaque. Integer-looking keys compare numerically so that
/// district `2` sorts before district `10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct District(String);

impl District {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Ord for District {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for District {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for District {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<i64> for District {
    fn from(key: i64) -> Self {
        Self(key.to_string())
    }
}

impl Serialize for District {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for District {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(District)
    }
}

/// One row of the input table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AntennaRecord {
    pub operator: String,
    #[serde(deserialize_with = "district_or_none")]
    pub district: Option<District>,
    #[serde(deserialize_with = "label_or_unknown")]
    pub technology_label: String,
    #[serde(deserialize_with = "lenient_date")]
    pub service_start: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_date")]
    pub service_start_5g: Option<NaiveDate>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
}

impl AntennaRecord {
    /// Returns the `(longitude, latitude)` pair when both are present and finite.
    pub fn coordinates(&self) -> Option<[f64; 2]> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some([lon, lat]),
            _ => None,
        }
    }
}

/// Parses a calendar date, accepting the date part of datetime strings.
///
/// Returns `None` for anything unparseable; bad dates are missing values.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let date_part = raw
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(raw);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn district_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<District>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(District))
}

fn label_or_unknown<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string()))
}

/// An immutable snapshot of input records plus the column names they came with.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<AntennaRecord>,
}

impl Dataset {
    /// Wraps in-memory records. The schema is complete by construction.
    pub fn from_records(records: Vec<AntennaRecord>) -> Self {
        Self {
            headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            records,
        }
    }

    /// Reads a CSV table with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Schema`] when a required column is absent and
    /// [`PipelineError::Csv`] when the header row cannot be read. Rows that
    /// fail to deserialize are logged and skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        check_columns(&headers)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, result) in rdr.deserialize::<AntennaRecord>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    skipped += 1;
                    warn!(row = line + 1, error = %e, "Skipping malformed row");
                }
            }
        }

        debug!(rows = records.len(), skipped, "CSV table loaded");
        Ok(Self { headers, records })
    }

    /// Opens and reads a CSV file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[AntennaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks the run-level preconditions: full schema, at least one record.
    pub fn validate(&self) -> Result<()> {
        check_columns(&self.headers)?;
        if self.records.is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        Ok(())
    }
}

fn check_columns(headers: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.as_str() == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema { missing })
    }
}
