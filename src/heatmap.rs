use std::collections::HashMap;

use crate::aggregate;
use crate::models::{DefectRecord, HeatmapCell, HeatmapView, ProductionShift};

pub const TOP_DEFECT_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBand {
    None,
    Low,
    MediumLow,
    MediumHigh,
    High,
}

impl HeatBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeatBand::None => "none",
            HeatBand::Low => "low",
            HeatBand::MediumLow => "medium-low",
            HeatBand::MediumHigh => "medium-high",
            HeatBand::High => "high",
        }
    }
}

pub fn heat_band(value: usize, max: usize) -> HeatBand {
    if value == 0 {
        return HeatBand::None;
    }
    let ratio = value as f64 / max.max(1) as f64;
    if ratio < 0.25 {
        HeatBand::Low
    } else if ratio < 0.5 {
        HeatBand::MediumLow
    } else if ratio < 0.75 {
        HeatBand::MediumHigh
    } else {
        HeatBand::High
    }
}

pub fn heatmap(records: &[DefectRecord], top_limit: usize) -> HeatmapView {
    let ranked = aggregate::top_n(
        &aggregate::counts_by(records, |record| record.defect_name.clone()),
        top_limit,
    );
    let defects: Vec<String> = ranked.into_iter().map(|group| group.key).collect();

    // axes span everything observed in the dataset, in discovery order
    let mut stations: Vec<String> = Vec::new();
    let mut shifts: Vec<ProductionShift> = Vec::new();
    for record in records {
        if !stations.contains(&record.station) {
            stations.push(record.station.clone());
        }
        if !shifts.contains(&record.production_shift) {
            shifts.push(record.production_shift);
        }
    }

    let mut counts: HashMap<(&str, &str, ProductionShift), usize> = HashMap::new();
    for record in records {
        if defects.iter().any(|defect| *defect == record.defect_name) {
            *counts
                .entry((
                    record.defect_name.as_str(),
                    record.station.as_str(),
                    record.production_shift,
                ))
                .or_insert(0) += 1;
        }
    }

    let mut cells = Vec::with_capacity(defects.len() * stations.len() * shifts.len());
    let mut max = 0usize;
    for defect in &defects {
        for station in &stations {
            for shift in &shifts {
                let count = counts
                    .get(&(defect.as_str(), station.as_str(), *shift))
                    .copied()
                    .unwrap_or(0);
                max = max.max(count);
                cells.push(HeatmapCell {
                    defect: defect.clone(),
                    station: station.clone(),
                    shift: *shift,
                    count,
                });
            }
        }
    }

    HeatmapView {
        defects,
        stations,
        shifts,
        cells,
        max: max.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    #[test]
    fn cell_counts_sum_to_each_top_defects_total() {
        let records = dataset::generate(250, 17);
        let view = heatmap(&records, TOP_DEFECT_LIMIT);
        for defect in &view.defects {
            let cube_total: usize = view
                .cells
                .iter()
                .filter(|cell| cell.defect == *defect)
                .map(|cell| cell.count)
                .sum();
            let dataset_total = records.iter().filter(|r| r.defect_name == *defect).count();
            assert_eq!(cube_total, dataset_total, "defect {defect}");
        }
    }

    #[test]
    fn cube_is_dense_over_observed_axes() {
        let records = dataset::generate(250, 17);
        let view = heatmap(&records, TOP_DEFECT_LIMIT);
        assert_eq!(
            view.cells.len(),
            view.defects.len() * view.stations.len() * view.shifts.len()
        );
    }

    #[test]
    fn at_most_top_limit_defects_are_selected() {
        let records = dataset::generate(250, 17);
        let view = heatmap(&records, TOP_DEFECT_LIMIT);
        assert!(view.defects.len() <= TOP_DEFECT_LIMIT);
        let by_count = aggregate::top_n(
            &aggregate::counts_by(&records, |r| r.defect_name.clone()),
            TOP_DEFECT_LIMIT,
        );
        let expected: Vec<String> = by_count.into_iter().map(|g| g.key).collect();
        assert_eq!(view.defects, expected);
    }

    #[test]
    fn max_has_a_floor_of_one() {
        let view = heatmap(&[], TOP_DEFECT_LIMIT);
        assert_eq!(view.max, 1);
        assert!(view.cells.is_empty());
    }

    #[test]
    fn banding_boundaries() {
        assert_eq!(heat_band(0, 10), HeatBand::None);
        assert_eq!(heat_band(2, 10), HeatBand::Low);
        assert_eq!(heat_band(3, 10), HeatBand::MediumLow);
        assert_eq!(heat_band(5, 10), HeatBand::MediumHigh);
        assert_eq!(heat_band(7, 10), HeatBand::MediumHigh);
        assert_eq!(heat_band(8, 10), HeatBand::High);
        assert_eq!(heat_band(10, 10), HeatBand::High);
        assert_eq!(heat_band(3, 0), HeatBand::High);
    }
}
