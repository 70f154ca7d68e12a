use crate::aggregate::{self, Dimension};
use crate::models::{round2, DefectRecord, ParetoRow};

pub fn pareto(records: &[DefectRecord], dimension: Dimension) -> Vec<ParetoRow> {
    let mut groups = aggregate::aggregate(records, dimension);
    groups.sort_by(|a, b| b.count.cmp(&a.count));

    // N floored at 1 so an empty set degrades to all-zero percentages
    let total = records.len().max(1) as f64;
    let mut running = 0usize;
    groups
        .into_iter()
        .map(|group| {
            running += group.count;
            ParetoRow {
                pct: round2(group.count as f64 / total * 100.0),
                cum_pct: round2(running as f64 / total * 100.0),
                key: group.key,
                count: group.count,
            }
        })
        .collect()
}
