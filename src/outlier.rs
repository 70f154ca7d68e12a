use crate::error::AnalyticsError;
use crate::models::{DefectRecord, MetricBounds, OutlierBounds};

pub const DEFAULT_THRESHOLD: f64 = 2.0;
pub const CRITICAL_SEVERITY: f64 = 8.0;

pub const HIGH_RES_TIME: &str = "High Res Time";
pub const LOW_RES_TIME: &str = "Low Res Time";
pub const CRITICAL_SEVERITY_REASON: &str = "Critical Severity";
pub const HIGH_SEVERITY: &str = "High Severity";

pub fn validate_threshold(threshold: f64) -> Result<f64, AnalyticsError> {
    let in_range = (1.0..=3.0).contains(&threshold);
    let on_half_step = (threshold * 2.0).fract() == 0.0;
    if in_range && on_half_step {
        Ok(threshold)
    } else {
        Err(AnalyticsError::InvalidThreshold(threshold))
    }
}

pub fn compute_bounds(records: &[DefectRecord], threshold: f64) -> OutlierBounds {
    let resolution_times: Vec<f64> = records.iter().map(|r| r.resolution_time).collect();
    let severities: Vec<f64> = records.iter().map(|r| r.severity_rating as f64).collect();
    OutlierBounds {
        resolution_time: metric_bounds(&resolution_times, threshold),
        severity: metric_bounds(&severities, threshold),
        threshold,
    }
}

// Population standard deviation: the record set is the whole population,
// so the denominator is N rather than N-1.
fn metric_bounds(values: &[f64], threshold: f64) -> MetricBounds {
    if values.is_empty() {
        return MetricBounds {
            mean: 0.0,
            std_dev: 0.0,
            lower: 0.0,
            upper: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    MetricBounds {
        mean,
        std_dev,
        lower: mean - threshold * std_dev,
        upper: mean + threshold * std_dev,
    }
}

pub fn is_outlier(record: &DefectRecord, bounds: &OutlierBounds) -> bool {
    record.resolution_time > bounds.resolution_time.upper
        || record.resolution_time < bounds.resolution_time.lower
        || (record.severity_rating as f64) > bounds.severity.upper
        || (record.severity_rating as f64) >= CRITICAL_SEVERITY
}

pub fn outlier_reasons(record: &DefectRecord, bounds: &OutlierBounds) -> Vec<&'static str> {
    let mut reasons = Vec::new();
    if record.resolution_time > bounds.resolution_time.upper {
        reasons.push(HIGH_RES_TIME);
    }
    if record.resolution_time < bounds.resolution_time.lower {
        reasons.push(LOW_RES_TIME);
    }
    if (record.severity_rating as f64) >= CRITICAL_SEVERITY {
        reasons.push(CRITICAL_SEVERITY_REASON);
    }
    if (record.severity_rating as f64) > bounds.severity.upper {
        reasons.push(HIGH_SEVERITY);
    }
    reasons
}
