use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductionShift {
    Morning,
    Afternoon,
    Night,
}

impl ProductionShift {
    pub const ALL: [ProductionShift; 3] = [
        ProductionShift::Morning,
        ProductionShift::Afternoon,
        ProductionShift::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionShift::Morning => "Morning",
            ProductionShift::Afternoon => "Afternoon",
            ProductionShift::Night => "Night",
        }
    }
}

impl fmt::Display for ProductionShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectCategory {
    Cosmetic,
    Functional,
    Critical,
}

impl DefectCategory {
    pub fn from_severity(severity: u8) -> Self {
        if severity > 7 {
            DefectCategory::Critical
        } else if severity > 4 {
            DefectCategory::Functional
        } else {
            DefectCategory::Cosmetic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectCategory::Cosmetic => "Cosmetic",
            DefectCategory::Functional => "Functional",
            DefectCategory::Critical => "Critical",
        }
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectRecord {
    pub id: u32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub defect_name: String,
    pub station: String,
    pub part_of_car: String,
    pub car_model: String,
    pub motor_type: String,
    pub design_package: String,
    pub production_shift: ProductionShift,
    pub defect_category: DefectCategory,
    pub reporter: String,
    pub part_number: String,
    pub severity_rating: u8,
    pub resolution_time: f64,
    pub root_cause_identified: bool,
    pub flagged: bool,
    pub status: String,
    pub note: String,
}

impl DefectRecord {
    pub fn root_cause_label(&self) -> &'static str {
        if self.root_cause_identified {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.to_string(),
            self.time.format("%H:%M").to_string(),
            self.defect_name.clone(),
            self.station.clone(),
            self.part_of_car.clone(),
            self.car_model.clone(),
            self.motor_type.clone(),
            self.design_package.clone(),
            self.production_shift.to_string(),
            self.defect_category.to_string(),
            self.reporter.clone(),
            self.part_number.clone(),
            self.severity_rating.to_string(),
            self.resolution_time.to_string(),
            self.root_cause_label().to_string(),
            self.flagged.to_string(),
            self.status.clone(),
            self.note.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricBounds {
    pub mean: f64,
    pub std_dev: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutlierBounds {
    pub resolution_time: MetricBounds,
    pub severity: MetricBounds,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupedCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupedAverage {
    pub key: String,
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParetoRow {
    pub key: String,
    pub count: usize,
    pub pct: f64,
    pub cum_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCell {
    pub defect: String,
    pub station: String,
    pub shift: ProductionShift,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapView {
    pub defects: Vec<String>,
    pub stations: Vec<String>,
    pub shifts: Vec<ProductionShift>,
    pub cells: Vec<HeatmapCell>,
    pub max: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriadAggregate {
    pub defect_name: String,
    pub station: String,
    pub part_of_car: String,
    pub count: usize,
    pub avg_severity: f64,
    pub avg_resolution_time: f64,
    pub root_cause_open: usize,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriadViews {
    pub by_count: Vec<TriadAggregate>,
    pub by_score: Vec<TriadAggregate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionStat {
    pub key: String,
    pub count: usize,
    pub avg_severity: f64,
    pub avg_resolution_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftStat {
    pub shift: ProductionShift,
    pub count: usize,
    pub avg_severity: f64,
    pub avg_resolution_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShiftDelta {
    pub from: ProductionShift,
    pub to: ProductionShift,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplorerResult {
    pub target: String,
    pub total: usize,
    pub top_stations: Vec<DimensionStat>,
    pub top_parts: Vec<DimensionStat>,
    pub shift_stats: Vec<ShiftStat>,
    pub shift_deltas: Vec<ShiftDelta>,
    pub samples: Vec<DefectRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickAction {
    pub label: String,
    pub search_filter: String,
    pub count: usize,
    pub avg_severity: f64,
    pub avg_resolution_time: f64,
    pub score: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tiers_follow_severity() {
        assert_eq!(DefectCategory::from_severity(2), DefectCategory::Cosmetic);
        assert_eq!(DefectCategory::from_severity(4), DefectCategory::Cosmetic);
        assert_eq!(DefectCategory::from_severity(5), DefectCategory::Functional);
        assert_eq!(DefectCategory::from_severity(7), DefectCategory::Functional);
        assert_eq!(DefectCategory::from_severity(8), DefectCategory::Critical);
        assert_eq!(DefectCategory::from_severity(10), DefectCategory::Critical);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(100.0), 100.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
