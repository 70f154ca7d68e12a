use std::collections::HashMap;

use crate::aggregate;
use crate::models::{
    round2, DefectRecord, DimensionStat, ExplorerResult, ProductionShift, ShiftDelta, ShiftStat,
};

pub const TOP_LIMIT: usize = 5;
pub const SAMPLE_LIMIT: usize = 20;

pub fn resolve_target(records: &[DefectRecord], requested: Option<&str>) -> Option<String> {
    match requested {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            let groups = aggregate::counts_by(records, |record| record.defect_name.clone());
            aggregate::top_n(&groups, 1).into_iter().next().map(|group| group.key)
        }
    }
}

pub fn explore(records: &[DefectRecord], requested: Option<&str>) -> Option<ExplorerResult> {
    let target = resolve_target(records, requested)?;
    let subset: Vec<&DefectRecord> = records
        .iter()
        .filter(|record| record.defect_name == target)
        .collect();

    let shift_stats = shift_breakdown(&subset);
    let shift_deltas = shift_pair_deltas(&shift_stats);

    Some(ExplorerResult {
        total: subset.len(),
        top_stations: dimension_stats(&subset, |record| record.station.clone(), TOP_LIMIT),
        top_parts: dimension_stats(&subset, |record| record.part_of_car.clone(), TOP_LIMIT),
        shift_stats,
        shift_deltas,
        samples: subset
            .iter()
            .take(SAMPLE_LIMIT)
            .map(|record| (*record).clone())
            .collect(),
        target,
    })
}

fn dimension_stats<F>(subset: &[&DefectRecord], key_of: F, limit: usize) -> Vec<DimensionStat>
where
    F: Fn(&DefectRecord) -> String,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, usize, f64, f64)> = Vec::new();
    for record in subset {
        let key = key_of(record);
        let position = match index.get(&key) {
            Some(&position) => position,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 0, 0.0, 0.0));
                groups.len() - 1
            }
        };
        groups[position].1 += 1;
        groups[position].2 += record.severity_rating as f64;
        groups[position].3 += record.resolution_time;
    }

    let mut stats: Vec<DimensionStat> = groups
        .into_iter()
        .map(|(key, count, severity_total, resolution_total)| DimensionStat {
            key,
            count,
            avg_severity: round2(severity_total / count as f64),
            avg_resolution_time: round2(resolution_total / count as f64),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats.truncate(limit);
    stats
}

// The three fixed shifts are always present, zero-filled where the target
// defect never occurred.
fn shift_breakdown(subset: &[&DefectRecord]) -> Vec<ShiftStat> {
    ProductionShift::ALL
        .iter()
        .map(|shift| {
            let mut count = 0usize;
            let mut severity_total = 0.0;
            let mut resolution_total = 0.0;
            for record in subset.iter().filter(|r| r.production_shift == *shift) {
                count += 1;
                severity_total += record.severity_rating as f64;
                resolution_total += record.resolution_time;
            }
            ShiftStat {
                shift: *shift,
                count,
                avg_severity: if count == 0 {
                    0.0
                } else {
                    round2(severity_total / count as f64)
                },
                avg_resolution_time: if count == 0 {
                    0.0
                } else {
                    round2(resolution_total / count as f64)
                },
            }
        })
        .collect()
}

fn shift_pair_deltas(stats: &[ShiftStat]) -> Vec<ShiftDelta> {
    let mut deltas = Vec::new();
    for from in stats {
        for to in stats {
            if from.shift == to.shift {
                continue;
            }
            deltas.push(ShiftDelta {
                from: from.shift,
                to: to.shift,
                delta: to.count as i64 - from.count as i64,
            });
        }
    }
    deltas.sort_by(|a, b| b.delta.abs().cmp(&a.delta.abs()));
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    #[test]
    fn default_target_is_the_most_frequent_defect() {
        let mut records = dataset::generate(5, 31);
        for (record, name) in records.iter_mut().zip(["A", "B", "B", "C", "B"]) {
            record.defect_name = name.to_string();
        }
        assert_eq!(resolve_target(&records, None).unwrap(), "B");
        assert_eq!(resolve_target(&records, Some("C")).unwrap(), "C");
        assert_eq!(resolve_target(&records, Some("")).unwrap(), "B");
    }

    #[test]
    fn frequency_ties_resolve_to_first_seen() {
        let mut records = dataset::generate(4, 31);
        for (record, name) in records.iter_mut().zip(["B", "A", "A", "B"]) {
            record.defect_name = name.to_string();
        }
        assert_eq!(resolve_target(&records, None).unwrap(), "B");
    }

    #[test]
    fn shift_counts_sum_to_target_total() {
        let records = dataset::generate(200, 37);
        let result = explore(&records, None).unwrap();
        let shift_total: usize = result.shift_stats.iter().map(|s| s.count).sum();
        assert_eq!(shift_total, result.total);
        assert_eq!(
            result.total,
            records
                .iter()
                .filter(|r| r.defect_name == result.target)
                .count()
        );
    }

    #[test]
    fn all_three_shifts_are_reported_zero_filled() {
        let mut records = dataset::generate(3, 37);
        for record in records.iter_mut() {
            record.defect_name = "Glass Chip".to_string();
            record.production_shift = ProductionShift::Morning;
        }
        let result = explore(&records, Some("Glass Chip")).unwrap();
        assert_eq!(result.shift_stats.len(), 3);
        let night = result
            .shift_stats
            .iter()
            .find(|s| s.shift == ProductionShift::Night)
            .unwrap();
        assert_eq!(night.count, 0);
        assert_eq!(night.avg_severity, 0.0);
        assert_eq!(night.avg_resolution_time, 0.0);
    }

    #[test]
    fn six_ordered_shift_pairs_sorted_by_magnitude() {
        let records = dataset::generate(200, 37);
        let result = explore(&records, None).unwrap();
        assert_eq!(result.shift_deltas.len(), 6);
        for window in result.shift_deltas.windows(2) {
            assert!(window[0].delta.abs() >= window[1].delta.abs());
        }
        // signed: delta is to - from
        for delta in &result.shift_deltas {
            let from = result
                .shift_stats
                .iter()
                .find(|s| s.shift == delta.from)
                .unwrap();
            let to = result
                .shift_stats
                .iter()
                .find(|s| s.shift == delta.to)
                .unwrap();
            assert_eq!(delta.delta, to.count as i64 - from.count as i64);
        }
    }

    #[test]
    fn samples_are_bounded_and_in_original_order() {
        let mut records = dataset::generate(60, 41);
        for record in records.iter_mut() {
            record.defect_name = "Paint Run".to_string();
        }
        let result = explore(&records, Some("Paint Run")).unwrap();
        assert_eq!(result.samples.len(), SAMPLE_LIMIT);
        let ids: Vec<u32> = result.samples.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=SAMPLE_LIMIT as u32).collect::<Vec<u32>>());
    }

    #[test]
    fn top_breakdowns_are_capped_at_five() {
        let records = dataset::generate(300, 43);
        let result = explore(&records, None).unwrap();
        assert!(result.top_stations.len() <= TOP_LIMIT);
        assert!(result.top_parts.len() <= TOP_LIMIT);
    }

    #[test]
    fn empty_store_without_target_yields_none() {
        assert!(explore(&[], None).is_none());
        let result = explore(&[], Some("Paint Run")).unwrap();
        assert_eq!(result.total, 0);
        assert!(result.samples.is_empty());
    }
}
