use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{DefectRecord, GroupedAverage, GroupedCount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    CarModel,
    DefectType,
    Reporter,
    Date,
    Shift,
    Station,
    Category,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::CarModel,
        Dimension::DefectType,
        Dimension::Reporter,
        Dimension::Date,
        Dimension::Shift,
        Dimension::Station,
        Dimension::Category,
    ];

    pub fn key_of(&self, record: &DefectRecord) -> String {
        match self {
            Dimension::CarModel => record.car_model.clone(),
            Dimension::DefectType => record.defect_name.clone(),
            Dimension::Reporter => record.reporter.clone(),
            Dimension::Date => record.date.to_string(),
            Dimension::Shift => record.production_shift.to_string(),
            Dimension::Station => record.station.clone(),
            Dimension::Category => record.defect_category.to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::CarModel => "model",
            Dimension::DefectType => "defect",
            Dimension::Reporter => "reporter",
            Dimension::Date => "date",
            Dimension::Shift => "shift",
            Dimension::Station => "station",
            Dimension::Category => "category",
        }
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .iter()
            .find(|dimension| dimension.as_str() == value.to_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown dimension '{value}' (expected one of model, defect, reporter, date, shift, station, category)"))
    }
}

// Groups are kept in key discovery order; ranked views rely on that plus
// stable sorting so equal counts surface in first-seen order.
pub fn counts_by<F>(records: &[DefectRecord], key_of: F) -> Vec<GroupedCount>
where
    F: Fn(&DefectRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupedCount> = Vec::new();
    for record in records {
        let key = key_of(record);
        match index.get(&key) {
            Some(&position) => groups[position].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(GroupedCount { key, count: 1 });
            }
        }
    }
    groups
}

pub fn aggregate(records: &[DefectRecord], dimension: Dimension) -> Vec<GroupedCount> {
    counts_by(records, |record| dimension.key_of(record))
}

pub fn averages_by<K, V>(records: &[DefectRecord], key_of: K, value_of: V) -> Vec<GroupedAverage>
where
    K: Fn(&DefectRecord) -> String,
    V: Fn(&DefectRecord) -> f64,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, usize, f64)> = Vec::new();
    for record in records {
        let key = key_of(record);
        match index.get(&key) {
            Some(&position) => {
                groups[position].1 += 1;
                groups[position].2 += value_of(record);
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 1, value_of(record)));
            }
        }
    }
    groups
        .into_iter()
        .map(|(key, count, total)| GroupedAverage {
            key,
            count,
            average: total / count as f64,
        })
        .collect()
}

pub fn reporter_severity(records: &[DefectRecord]) -> Vec<GroupedAverage> {
    averages_by(
        records,
        |record| record.reporter.clone(),
        |record| record.severity_rating as f64,
    )
}

pub fn shift_resolution(records: &[DefectRecord]) -> Vec<GroupedAverage> {
    averages_by(
        records,
        |record| record.production_shift.to_string(),
        |record| record.resolution_time,
    )
}

pub fn top_n(groups: &[GroupedCount], limit: usize) -> Vec<GroupedCount> {
    let mut ranked = groups.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}
