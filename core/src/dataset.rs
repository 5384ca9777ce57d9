// Launch records dataset
//
// Loads the launch CSV once at startup into an immutable, ordered table and
// caches the payload bounds used to seed the range control.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const COL_LAUNCH_SITE: &str = "Launch Site";
pub const COL_PAYLOAD_MASS: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER_CATEGORY: &str = "Booster Version Category";

/// Fatal startup error raised while loading the launch table
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: column `{column}` is not a number: {value:?}")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: `class` must be 0 or 1, got {value:?}")]
    InvalidOutcome { row: usize, value: String },
}

/// Binary launch outcome (`class` column)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Failure,
    Success,
}

impl Outcome {
    /// Numeric class as stored in the source table
    pub fn class(self) -> u8 {
        match self {
            Outcome::Failure => 0,
            Outcome::Success => 1,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    fn parse(raw: &str) -> Option<Self> {
        let value: f64 = raw.parse().ok()?;
        if value == 1.0 {
            Some(Outcome::Success)
        } else if value == 0.0 {
            Some(Outcome::Failure)
        } else {
            None
        }
    }
}

/// One row of the launch table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub launch_site: String,
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version_category: String,
}

impl LaunchRecord {
    pub fn new(
        launch_site: impl Into<String>,
        payload_mass_kg: f64,
        outcome: Outcome,
        booster_version_category: impl Into<String>,
    ) -> Self {
        Self {
            launch_site: launch_site.into(),
            payload_mass_kg,
            outcome,
            booster_version_category: booster_version_category.into(),
        }
    }
}

/// Read-only launch table shared by every session
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    min_payload: Option<f64>,
    max_payload: Option<f64>,
}

impl Dataset {
    /// Load the table from a CSV file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;

        info!(
            target: "dataset",
            path = %path.display(),
            rows = dataset.len(),
            min_payload = ?dataset.min_payload,
            max_payload = ?dataset.max_payload,
            "Launch records loaded"
        );

        Ok(dataset)
    }

    /// Parse CSV content. Columns are located by header name; extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataLoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(DataLoadError::MissingColumn(name))
        };
        let site_idx = column(COL_LAUNCH_SITE)?;
        let payload_idx = column(COL_PAYLOAD_MASS)?;
        let class_idx = column(COL_CLASS)?;
        let booster_idx = column(COL_BOOSTER_CATEGORY)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let line = i + 1;
            let field = |idx: usize| row.get(idx).unwrap_or_default();

            let raw_payload = field(payload_idx);
            let payload_mass_kg = raw_payload
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DataLoadError::InvalidNumber {
                    row: line,
                    column: COL_PAYLOAD_MASS,
                    value: raw_payload.to_string(),
                })?;

            let raw_class = field(class_idx);
            let outcome =
                Outcome::parse(raw_class).ok_or_else(|| DataLoadError::InvalidOutcome {
                    row: line,
                    value: raw_class.to_string(),
                })?;

            records.push(LaunchRecord {
                launch_site: field(site_idx).to_string(),
                payload_mass_kg,
                outcome,
                booster_version_category: field(booster_idx).to_string(),
            });
        }

        Ok(Self::from_records(records))
    }

    /// Build a dataset from already-parsed records, computing payload bounds
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let min_payload = records
            .iter()
            .map(|r| r.payload_mass_kg)
            .reduce(f64::min);
        let max_payload = records
            .iter()
            .map(|r| r.payload_mass_kg)
            .reduce(f64::max);

        Self {
            records,
            min_payload,
            max_payload,
        }
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest payload in the table, `None` when empty
    pub fn min_payload(&self) -> Option<f64> {
        self.min_payload
    }

    /// Largest payload in the table, `None` when empty
    pub fn max_payload(&self) -> Option<f64> {
        self.max_payload
    }

    /// `(min, max)` payload pair when the table has rows
    pub fn payload_bounds(&self) -> Option<(f64, f64)> {
        self.min_payload.zip(self.max_payload)
    }

    /// Dataset-wide count of successful launches
    pub fn success_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }
}
