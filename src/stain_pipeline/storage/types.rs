use serde::Serialize;

use crate::stain_pipeline::estimation::CalculationRecord;

/// Aggregate figures over the stored history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_calculations: usize,
    pub total_samples: u64,
    /// Mean estimated stain area in square pixels
    pub average_stain_area: f64,
    /// Mean stain share of the bounding box, in [0, 1]
    pub average_coverage: f64,
}

impl HistorySummary {
    pub fn from_records(records: &[CalculationRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let count = records.len() as f64;
        Self {
            total_calculations: records.len(),
            total_samples: records.iter().map(|r| r.num_points as u64).sum(),
            average_stain_area: records.iter().map(|r| r.stain_area).sum::<f64>() / count,
            average_coverage: records.iter().map(CalculationRecord::coverage).sum::<f64>() / count,
        }
    }
}
