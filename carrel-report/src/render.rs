use crate::models::{Report, ReportError, ReportFormat};
use serde_json::Value;

/// A rendered report body ready to be written to the download directory.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub extension: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Convert a report's computed payload into one output format.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, report: &Report) -> Result<RenderedReport, ReportError>;
}

pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Report) -> Result<RenderedReport, ReportError> {
        let bytes = serde_json::to_vec_pretty(&report.data)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        Ok(RenderedReport {
            extension: "json",
            content_type: "application/json",
            bytes,
        })
    }
}

pub struct CsvRenderer;

impl CsvRenderer {
    /// Flatten the payload into key/value rows; arrays of objects become
    /// sections with a header row derived from the first element.
    fn write_value(out: &mut String, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, v) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::write_value(out, &path, v);
                }
            }
            Value::Array(items) => {
                if let Some(Value::Object(first)) = items.first() {
                    let headers: Vec<&String> = first.keys().collect();
                    out.push_str(&format!("# {}\n", prefix));
                    out.push_str(
                        &headers.iter().map(|h| Self::escape(h)).collect::<Vec<_>>().join(","),
                    );
                    out.push('\n');
                    for item in items {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| Self::escape(&Self::scalar(item.get(h.as_str()))))
                            .collect();
                        out.push_str(&row.join(","));
                        out.push('\n');
                    }
                } else {
                    for (i, item) in items.iter().enumerate() {
                        Self::write_value(out, &format!("{}[{}]", prefix, i), item);
                    }
                }
            }
            scalar => {
                out.push_str(&Self::escape(prefix));
                out.push(',');
                out.push_str(&Self::escape(&Self::scalar(Some(scalar))));
                out.push('\n');
            }
        }
    }

    fn scalar(value: Option<&Value>) -> String {
        match value {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn escape(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl ReportRenderer for CsvRenderer {
    fn render(&self, report: &Report) -> Result<RenderedReport, ReportError> {
        let mut out = String::new();
        Self::write_value(&mut out, "", &report.data);
        Ok(RenderedReport {
            extension: "csv",
            content_type: "text/csv",
            bytes: out.into_bytes(),
        })
    }
}

/// Pick the renderer for a requested format, rejecting the formats this
/// service delegates to external tooling.
pub fn renderer_for(format: ReportFormat) -> Result<Box<dyn ReportRenderer>, ReportError> {
    match format {
        ReportFormat::Json => Ok(Box::new(JsonRenderer)),
        ReportFormat::Csv => Ok(Box::new(CsvRenderer)),
        ReportFormat::Pdf | ReportFormat::Excel => {
            Err(ReportError::UnsupportedFormat(format.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Period, ReportStatus, ReportType};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn report(data: Value, format: ReportFormat) -> Report {
        let mut r = Report::new(
            ReportType::Revenue,
            Period {
                start: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap(),
            },
            json!({}),
            format,
            Uuid::new_v4(),
        );
        r.data = data;
        r.status = ReportStatus::Completed;
        r
    }

    #[test]
    fn test_csv_scalar_rows() {
        let r = report(json!({"net_cents": 7000, "label": "June, 2025"}), ReportFormat::Csv);
        let rendered = CsvRenderer.render(&r).unwrap();
        let text = String::from_utf8(rendered.bytes).unwrap();
        assert!(text.contains("net_cents,7000"));
        // Comma in the value forces quoting
        assert!(text.contains("label,\"June, 2025\""));
    }

    #[test]
    fn test_csv_table_section() {
        let r = report(
            json!({"by_day": [
                {"date": "2025-06-02", "net_cents": 2000},
                {"date": "2025-06-03", "net_cents": 1500},
            ]}),
            ReportFormat::Csv,
        );
        let text = String::from_utf8(CsvRenderer.render(&r).unwrap().bytes).unwrap();
        assert!(text.contains("# by_day"));
        assert!(text.contains("date,net_cents"));
        assert!(text.contains("2025-06-02,2000"));
    }

    #[test]
    fn test_renderer_selection() {
        assert!(renderer_for(ReportFormat::Json).is_ok());
        assert!(renderer_for(ReportFormat::Csv).is_ok());
        assert!(renderer_for(ReportFormat::Pdf).is_err());
        assert!(renderer_for(ReportFormat::Excel).is_err());
    }
}
