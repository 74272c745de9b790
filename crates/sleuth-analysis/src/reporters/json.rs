//! JSON reporter: the report model itself, pretty-printed.

use sleuth_core::errors::ReportError;

use crate::report::types::{DiffReport, Report};

use super::{DiffReporter, Reporter};

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &Report) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report).map_err(|e| ReportError::Serialize(e.to_string()))
    }
}

impl DiffReporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &DiffReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report).map_err(|e| ReportError::Serialize(e.to_string()))
    }
}
