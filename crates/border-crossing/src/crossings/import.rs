use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::intake::normalize_plate;
use crate::risk::{classify_risk, RiskLevel};
use crate::rut::{format_rut, validate_rut};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read crossing batch: {}", err),
            ImportError::Csv(err) => write!(f, "invalid crossing batch CSV: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    driver_name: String,
    driver_rut: String,
    vehicle_plate: String,
    #[serde(default)]
    direction: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    observations: String,
    document_count: usize,
}

/// One classified line of a batch file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedRow {
    /// 1-based data line, header excluded.
    pub line: usize,
    pub driver_name: String,
    pub driver_rut: String,
    pub rut_valid: bool,
    /// Normalized plate, or the raw value uppercased when it fails validation.
    pub vehicle_plate: String,
    pub plate_valid: bool,
    pub direction: String,
    pub risk_level: RiskLevel,
}

/// Classifies a CSV batch of crossing requests into a review queue.
pub struct BatchImporter;

impl BatchImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ClassifiedRow>, ImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows come back ordered by risk, most severe first; equal tiers keep file order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ClassifiedRow>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (index, record) in csv_reader.deserialize::<BatchRow>().enumerate() {
            let row = record?;
            let (vehicle_plate, plate_valid) = match normalize_plate(&row.vehicle_plate) {
                Ok(plate) => (plate, true),
                Err(_) => (row.vehicle_plate.trim().to_uppercase(), false),
            };
            rows.push(ClassifiedRow {
                line: index + 1,
                rut_valid: validate_rut(&row.driver_rut),
                driver_rut: format_rut(&row.driver_rut),
                risk_level: classify_risk(&row.priority, &row.observations, row.document_count),
                driver_name: row.driver_name,
                vehicle_plate,
                plate_valid,
                direction: row.direction,
            });
        }

        rows.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));
        Ok(rows)
    }
}
