use std::fmt::Write;

use crate::actions;
use crate::aggregate::{self, Dimension};
use crate::explore;
use crate::models::DefectRecord;
use crate::outlier;
use crate::pareto;
use crate::recurrence;

pub fn build_report(records: &[DefectRecord], threshold: f64) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Production Defect Report");
    let _ = writeln!(
        output,
        "Covering {} recorded defects (outlier threshold {:.1} sigma)",
        records.len(),
        threshold
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Defect Mix");

    let mix = aggregate::aggregate(records, Dimension::DefectType);
    if mix.is_empty() {
        let _ = writeln!(output, "No defects recorded.");
    } else {
        for row in pareto::pareto(records, Dimension::DefectType).iter().take(8) {
            let _ = writeln!(
                output,
                "- {}: {} defects ({:.2}%, cumulative {:.2}%)",
                row.key, row.count, row.pct, row.cum_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Recurrences");

    let views = recurrence::triads(records);
    if views.by_score.is_empty() {
        let _ = writeln!(output, "No recurring defect clusters.");
    } else {
        for triad in views.by_score.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} at {} on {}: {} occurrences, avg severity {:.2}, avg resolution {:.2}h, {} without root cause (impact {:.2})",
                triad.defect_name,
                triad.station,
                triad.part_of_car,
                triad.count,
                triad.avg_severity,
                triad.avg_resolution_time,
                triad.root_cause_open,
                triad.score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Outliers");

    let bounds = outlier::compute_bounds(records, threshold);
    let outliers: Vec<&DefectRecord> = records
        .iter()
        .filter(|record| outlier::is_outlier(record, &bounds))
        .collect();
    if outliers.is_empty() {
        let _ = writeln!(output, "No records outside the statistical bounds.");
    } else {
        let _ = writeln!(
            output,
            "{} of {} records flagged (resolution time bounds {:.2}h to {:.2}h):",
            outliers.len(),
            records.len(),
            bounds.resolution_time.lower,
            bounds.resolution_time.upper
        );
        for record in outliers.iter().take(10) {
            let reasons = outlier::outlier_reasons(record, &bounds).join(", ");
            let _ = writeln!(
                output,
                "- #{} {} at {} on {}: severity {}, {:.2}h ({})",
                record.id,
                record.defect_name,
                record.station,
                record.date,
                record.severity_rating,
                record.resolution_time,
                reasons
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Shift Breakdown");

    let shift_loads = aggregate::shift_resolution(records);
    if shift_loads.is_empty() {
        let _ = writeln!(output, "No defects recorded.");
    } else {
        for shift in shift_loads.iter() {
            let _ = writeln!(
                output,
                "- {}: {} defects, avg resolution {:.2}h",
                shift.key, shift.count, shift.average
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggested Focus");

    match explore::resolve_target(records, None) {
        None => {
            let _ = writeln!(output, "No defect data to focus on.");
        }
        Some(target) => {
            let candidates = actions::quick_actions(records, &target);
            if candidates.is_empty() {
                let _ = writeln!(output, "No recurring clusters for {target}.");
            } else {
                for candidate in candidates.iter() {
                    let _ = writeln!(
                        output,
                        "- {}: {} occurrences of {}, impact {:.2}",
                        candidate.label, candidate.count, target, candidate.score
                    );
                }
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;

    #[test]
    fn report_carries_every_section() {
        let records = dataset::generate(120, 71);
        let report = build_report(&records, 2.0);
        for heading in [
            "# Production Defect Report",
            "## Defect Mix",
            "## Top Recurrences",
            "## Outliers",
            "## Shift Breakdown",
            "## Suggested Focus",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn empty_set_degrades_to_explanatory_lines() {
        let report = build_report(&[], 2.0);
        assert!(report.contains("Covering 0 recorded defects"));
        assert!(report.contains("No defects recorded."));
        assert!(report.contains("No recurring defect clusters."));
        assert!(report.contains("No records outside the statistical bounds."));
        assert!(report.contains("No defect data to focus on."));
    }

    #[test]
    fn outlier_lines_carry_reason_codes() {
        let mut records = dataset::generate(40, 73);
        records[0].severity_rating = 10;
        let report = build_report(&records, 2.0);
        assert!(report.contains("Critical Severity"));
    }
}
