// Plain-text rendering of doctor reports
use crate::core::doctor::types::{CheckReport, DoctorReport};

/// Renders a `DoctorReport` one line per check
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// ✓ shows status and latency; ✗ shows the error string
    pub fn render_check(&self, check: &CheckReport) -> String {
        let result = &check.result;
        match (&result.error, result.ok) {
            (None, true) => {
                let status = result
                    .status_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                format!("✓ {} {} ({}, {}ms)", check.name, result.url, status, result.latency_ms)
            }
            (error, _) => format!(
                "✗ {} {}: {}",
                check.name,
                result.url,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    pub fn render_report(&self, report: &DoctorReport) -> String {
        let mut lines: Vec<String> = report.checks.iter().map(|c| self.render_check(c)).collect();

        let failed = report.failed().count();
        lines.push(if failed == 0 {
            format!("All {} checks passed", report.checks.len())
        } else {
            format!("{} of {} checks failed", failed, report.checks.len())
        });
        lines.join("\n")
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}
