use std::collections::HashMap;

use crate::models::{round2, DefectRecord, QuickAction};
use crate::recurrence;

pub const ACTION_LIMIT: usize = 3;

pub fn quick_actions(records: &[DefectRecord], target: &str) -> Vec<QuickAction> {
    let subset: Vec<&DefectRecord> = records
        .iter()
        .filter(|record| record.defect_name == target)
        .collect();

    let mut candidates = composite_candidates(
        &subset,
        |record| {
            (
                record.station.clone(),
                record.production_shift.to_string(),
            )
        },
        |station, shift| format!("{station} during the {shift} shift"),
        target,
    );
    candidates.extend(composite_candidates(
        &subset,
        |record| (record.station.clone(), record.part_of_car.clone()),
        |station, part| format!("{station} on {part}"),
        target,
    ));

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(ACTION_LIMIT);
    candidates
}

fn composite_candidates<K, L>(
    subset: &[&DefectRecord],
    key_of: K,
    label_of: L,
    target: &str,
) -> Vec<QuickAction>
where
    K: Fn(&DefectRecord) -> (String, String),
    L: Fn(&str, &str) -> String,
{
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<((String, String), usize, f64, f64)> = Vec::new();
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

    groups
        .into_iter()
        .map(|((first, second), count, severity_total, resolution_total)| {
            let avg_severity = severity_total / count as f64;
            let avg_resolution_time = resolution_total / count as f64;
            QuickAction {
                label: label_of(&first, &second),
                search_filter: format!("{target} {first} {second}"),
                count,
                avg_severity: round2(avg_severity),
                avg_resolution_time: round2(avg_resolution_time),
                score: recurrence::impact_score(count, avg_severity, avg_resolution_time),
            }
        })
        .collect()
}
