use std::fmt::Write;

use serde_json::json;

use crate::error::AnalyticsError;
use crate::models::{DefectRecord, OutlierBounds};
use crate::outlier;

pub const API_KEY_VAR: &str = "DEFECT_AI_API_KEY";
pub const ENDPOINT_VAR: &str = "DEFECT_AI_ENDPOINT";
pub const MODEL_VAR: &str = "DEFECT_AI_MODEL";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a manufacturing quality engineer. Given defect \
statistics from an assembly plant, summarize the dominant failure patterns and suggest \
where to focus containment. Be specific and concise.";

#[derive(Debug)]
pub struct AnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl AnalysisClient {
    pub fn from_env() -> Result<Self, AnalyticsError> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| AnalyticsError::MissingConfiguration(API_KEY_VAR))?;
        let endpoint =
            std::env::var(ENDPOINT_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            model,
        })
    }

    pub async fn summarize(
        &self,
        records: &[&DefectRecord],
        bounds: &OutlierBounds,
    ) -> Result<String, AnalyticsError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(records, bounds) },
            ],
            "temperature": 0.2,
            "max_tokens": 600,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AnalyticsError::ServiceFailure(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::ServiceFailure(format!(
                "endpoint returned {status}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| AnalyticsError::ServiceFailure(err.to_string()))?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AnalyticsError::ServiceFailure("response payload had no message content".to_string())
            })
    }
}

pub fn build_prompt(records: &[&DefectRecord], bounds: &OutlierBounds) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "{} defect records need attention. Statistical bounds at {:.1} sigma: \
         resolution time {:.2}h to {:.2}h, severity upper bound {:.2}.",
        records.len(),
        bounds.threshold,
        bounds.resolution_time.lower,
        bounds.resolution_time.upper,
        bounds.severity.upper
    );
    let _ = writeln!(prompt);
    for record in records {
        let reasons = outlier::outlier_reasons(record, bounds);
        let reasons = if reasons.is_empty() {
            "Flagged by reviewer".to_string()
        } else {
            reasons.join(", ")
        };
        let _ = writeln!(
            prompt,
            "- #{}: {} at {} on {} ({} shift, {}), severity {}/10, {:.2}h to resolve, root cause {}. {}",
            record.id,
            record.defect_name,
            record.station,
            record.part_of_car,
            record.production_shift,
            record.car_model,
            record.severity_rating,
            record.resolution_time,
            record.root_cause_label(),
            reasons
        );
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::outlier::compute_bounds;

    #[test]
    fn prompt_lists_each_record_with_its_reasons() {
        let mut records = dataset::generate(5, 79);
        records[0].severity_rating = 9;
        let bounds = compute_bounds(&records, 2.0);
        let flagged: Vec<&crate::models::DefectRecord> = records
            .iter()
            .filter(|r| crate::outlier::is_outlier(r, &bounds))
            .collect();
        let prompt = build_prompt(&flagged, &bounds);
        assert!(prompt.contains("Critical Severity"));
        assert!(prompt.contains("- #1:"));
        assert!(prompt.contains("severity 9/10"));
    }

    #[test]
    fn prompt_notes_reviewer_flags_without_statistical_reasons() {
        let records = dataset::generate(8, 79);
        let bounds = compute_bounds(&records, 3.0);
        let calm: Vec<&crate::models::DefectRecord> = records
            .iter()
            .filter(|r| !crate::outlier::is_outlier(r, &bounds))
            .take(1)
            .collect();
        if let Some(record) = calm.first() {
            let prompt = build_prompt(&[record], &bounds);
            assert!(prompt.contains("Flagged by reviewer"));
        }
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        std::env::remove_var(API_KEY_VAR);
        let err = AnalysisClient::from_env().unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingConfiguration(API_KEY_VAR)));
    }
}
