use std::collections::HashMap;

use crate::models::{round2, DefectRecord, TriadAggregate, TriadViews};

// count x (0.6 + 0.4 x avgSeverity/10) + 0.2 x avgResolutionTime
pub fn impact_score(count: usize, avg_severity: f64, avg_resolution_time: f64) -> f64 {
    round2(count as f64 * (0.6 + 0.4 * avg_severity / 10.0) + 0.2 * avg_resolution_time)
}

struct TriadAccumulator {
    defect_name: String,
    station: String,
    part_of_car: String,
    count: usize,
    severity_total: f64,
    resolution_total: f64,
    root_cause_open: usize,
}

pub fn triads(records: &[DefectRecord]) -> TriadViews {
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    let mut accumulators: Vec<TriadAccumulator> = Vec::new();

    for record in records {
        let key = (
            record.defect_name.clone(),
            record.station.clone(),
            record.part_of_car.clone(),
        );
        let position = match index.get(&key) {
            Some(&position) => position,
            None => {
                index.insert(key, accumulators.len());
                accumulators.push(TriadAccumulator {
                    defect_name: record.defect_name.clone(),
                    station: record.station.clone(),
                    part_of_car: record.part_of_car.clone(),
                    count: 0,
                    severity_total: 0.0,
                    resolution_total: 0.0,
                    root_cause_open: 0,
                });
                accumulators.len() - 1
            }
        };
        let accumulator = &mut accumulators[position];
        accumulator.count += 1;
        accumulator.severity_total += record.severity_rating as f64;
        accumulator.resolution_total += record.resolution_time;
        if !record.root_cause_identified {
            accumulator.root_cause_open += 1;
        }
    }

    let aggregates: Vec<TriadAggregate> = accumulators
        .into_iter()
        .map(|acc| {
            let avg_severity = acc.severity_total / acc.count as f64;
            let avg_resolution_time = acc.resolution_total / acc.count as f64;
            TriadAggregate {
                defect_name: acc.defect_name,
                station: acc.station,
                part_of_car: acc.part_of_car,
                count: acc.count,
                avg_severity,
                avg_resolution_time,
                root_cause_open: acc.root_cause_open,
                score: impact_score(acc.count, avg_severity, avg_resolution_time),
            }
        })
        .collect();

    let mut by_count = aggregates.clone();
    by_count.sort_by(|a, b| b.count.cmp(&a.count));

    let mut by_score = aggregates;
    by_score.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    TriadViews { by_count, by_score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    #[test]
    fn score_matches_worked_example() {
        // 10 x (0.6 + 0.4 x 0.6) + 0.2 x 4 = 9.2
        assert_eq!(impact_score(10, 6.0, 4.0), 9.2);
    }

    #[test]
    fn triad_counts_sum_to_total() {
        let records = dataset::generate(160, 19);
        let views = triads(&records);
        let total: usize = views.by_count.iter().map(|t| t.count).sum();
        assert_eq!(total, records.len());
        assert_eq!(views.by_count.len(), views.by_score.len());
    }

    #[test]
    fn views_are_ranked_descending() {
        let records = dataset::generate(160, 19);
        let views = triads(&records);
        for window in views.by_count.windows(2) {
            assert!(window[0].count >= window[1].count);
        }
        for window in views.by_score.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn group_averages_and_open_root_causes_accumulate() {
        let mut records = dataset::generate(3, 23);
        for record in records.iter_mut() {
            record.defect_name = "Panel Gap".to_string();
            record.station = "Body Shop".to_string();
            record.part_of_car = "Hood".to_string();
            record.root_cause_identified = false;
        }
        records[0].severity_rating = 4;
        records[1].severity_rating = 6;
        records[2].severity_rating = 8;
        records[0].resolution_time = 2.0;
        records[1].resolution_time = 4.0;
        records[2].resolution_time = 6.0;

        let views = triads(&records);
        assert_eq!(views.by_count.len(), 1);
        let triad = &views.by_count[0];
        assert_eq!(triad.count, 3);
        assert!((triad.avg_severity - 6.0).abs() < 1e-9);
        assert!((triad.avg_resolution_time - 4.0).abs() < 1e-9);
        assert_eq!(triad.root_cause_open, 3);
        assert_eq!(triad.score, impact_score(3, 6.0, 4.0));
    }

    #[test]
    fn equal_scores_keep_discovery_order() {
        let mut records = dataset::generate(2, 23);
        for (record, station) in records.iter_mut().zip(["Trim Line", "Body Shop"]) {
            record.defect_name = "Loose Bolt".to_string();
            record.station = station.to_string();
            record.part_of_car = "Hood".to_string();
            record.severity_rating = 5;
            record.resolution_time = 3.0;
        }
        let views = triads(&records);
        assert_eq!(views.by_score[0].station, "Trim Line");
        assert_eq!(views.by_score[1].station, "Body Shop");
    }

    #[test]
    fn empty_set_yields_empty_views() {
        let views = triads(&[]);
        assert!(views.by_count.is_empty());
        assert!(views.by_score.is_empty());
    }
}
