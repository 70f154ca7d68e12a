use std::collections::HashSet;

use crate::error::AnalyticsError;
use crate::models::DefectRecord;

pub const MIN_RESOLUTION_HOURS: f64 = 0.5;
pub const FLAGGED_STATUS: &str = "Under Review";

#[derive(Debug)]
pub struct RecordStore {
    records: Vec<DefectRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<DefectRecord>) -> Result<Self, AnalyticsError> {
        let mut seen = HashSet::new();
        for record in &records {
            validate(record)?;
            if !seen.insert(record.id) {
                return Err(AnalyticsError::InvalidRecord {
                    id: record.id,
                    reason: "duplicate id".to_string(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DefectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn set_flag(&mut self, id: u32, flagged: bool) -> Result<&DefectRecord, AnalyticsError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(AnalyticsError::RecordNotFound(id))?;
        record.flagged = flagged;
        record.status = if flagged {
            FLAGGED_STATUS.to_string()
        } else {
            String::new()
        };
        Ok(record)
    }

    pub fn set_note(&mut self, id: u32, note: &str) -> Result<&DefectRecord, AnalyticsError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(AnalyticsError::RecordNotFound(id))?;
        record.note = note.to_string();
        Ok(record)
    }
}

fn validate(record: &DefectRecord) -> Result<(), AnalyticsError> {
    if !(1..=10).contains(&record.severity_rating) {
        return Err(AnalyticsError::InvalidRecord {
            id: record.id,
            reason: format!("severity rating {} outside 1..=10", record.severity_rating),
        });
    }
    if !record.resolution_time.is_finite() || record.resolution_time < MIN_RESOLUTION_HOURS {
        return Err(AnalyticsError::InvalidRecord {
            id: record.id,
            reason: format!(
                "resolution time {} below minimum {MIN_RESOLUTION_HOURS}",
                record.resolution_time
            ),
        });
    }
    Ok(())
}
