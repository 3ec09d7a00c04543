//! Historical dataset accessor
//!
//! Reads the PAM CSV once at startup; the resulting [`Dataset`] is shared
//! read-only for the lifetime of the process.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use shared::{HistoricalRecord, REQUIRED_COLUMNS};

use crate::error::{DatasetError, SchemaError};

/// In-memory historical records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<HistoricalRecord>,
}

impl Dataset {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        Self { records }
    }

    /// Load a dataset from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            municipalities = dataset.municipalities().len(),
            crops = dataset.crops().len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV content. Required columns are checked before any row is read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        check_schema(rdr.headers()?)?;

        let records = rdr
            .deserialize::<HistoricalRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed yields, in record order
    pub fn targets(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.yield_kg_ha).collect()
    }

    pub fn min_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).min()
    }

    pub fn max_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    /// Distinct municipality names, sorted
    pub fn municipalities(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.municipality.as_str()))
    }

    /// Distinct crop names, sorted
    pub fn crops(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.crop.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Fail with every required column absent from the header row
pub fn check_schema(headers: &csv::StringRecord) -> Result<(), SchemaError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}
