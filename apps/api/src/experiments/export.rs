//! Structured-text export of experiment history (JSON or CSV).

use std::fmt::Write as _;
use std::str::FromStr;

use crate::experiments::service::ExperimentResult;
use crate::experiments::ExperimentError;

/// Column order of the CSV export; one column per `ExperimentResult` field.
pub const CSV_COLUMNS: &[&str] = &[
    "experiment_id",
    "variant",
    "username",
    "quality_score",
    "validation_results",
    "user_selected",
    "generation_time_ms",
    "timestamp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExperimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExperimentError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Renders results as RFC 4180 CSV with a header row.
/// `validation_results` is embedded as a compact JSON cell.
pub fn render_csv(results: &[ExperimentResult]) -> Result<String, ExperimentError> {
    let mut out = CSV_COLUMNS.join(",");
    out.push_str("\r\n");

    for r in results {
        let validation = serde_json::to_string(&r.validation_results)?;
        let row = [
            escape_csv(&r.experiment_id),
            escape_csv(r.variant.as_str()),
            escape_csv(&r.username),
            r.quality_score.to_string(),
            escape_csv(&validation),
            r.user_selected.to_string(),
            r.generation_time_ms.map(|t| t.to_string()).unwrap_or_default(),
            escape_csv(&r.timestamp.to_rfc3339()),
        ];
        let _ = write!(out, "{}\r\n", row.join(","));
    }

    Ok(out)
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::variants::ExperimentVariant;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn result(username: &str) -> ExperimentResult {
        ExperimentResult {
            experiment_id: "abc123def456".to_string(),
            variant: ExperimentVariant::StoryFirst,
            username: username.to_string(),
            quality_score: 83.5,
            validation_results: json!({"no_markdown": true, "paragraph_count": false}),
            user_selected: true,
            generation_time_ms: Some(2100),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_header_lists_every_field_once() {
        let csv = render_csv(&[]).unwrap();
        let header: Vec<&str> = csv.trim_end().split(',').collect();
        assert_eq!(header, CSV_COLUMNS);

        let field_names: Vec<String> = serde_json::to_value(result("alexdev"))
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(field_names.len(), CSV_COLUMNS.len());
        for name in field_names {
            assert_eq!(header.iter().filter(|h| **h == name).count(), 1, "{name}");
        }
    }

    #[test]
    fn test_row_rendering_quotes_json_cell() {
        let csv = render_csv(&[result("alexdev")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("abc123def456,story_first,alexdev,83.5,"));
        assert!(row.contains(r#""{""no_markdown"":true,""paragraph_count"":false}""#));
        assert!(row.contains(",true,2100,2024-05-01T12:00:00+00:00"));
    }

    #[test]
    fn test_missing_generation_time_is_empty_cell() {
        let mut r = result("alexdev");
        r.generation_time_ms = None;
        let csv = render_csv(&[r]).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",true,,2024-05-01"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(" CSV ".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(ExperimentError::UnsupportedFormat(_))
        ));
    }
}
