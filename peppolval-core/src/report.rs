//! The normalized result model shared by both validation stages.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Step name for the structural stage.
pub const XSD_STEP: &str = "XML Schema";
/// Step name for the business-rule stage.
pub const SCHEMATRON_STEP: &str = "Schematron (XSLT2)";
/// Finding location used by the structural stage.
pub const XSD_LOCATION: &str = "XSD validation";
/// Finding location used by the business-rule stage when no report location
/// is available (process failure, timeout, unknown ruleset).
pub const SCHEMATRON_LOCATION: &str = "Schematron";

/// Severity of one finding. Warnings are surfaced but do not fail a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One normalized defect from either stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub message: String,
    pub location: String,
    pub severity: Severity,
}

impl Finding {
    pub fn error(message: impl Into<String>, location: impl Into<String>) -> Self {
        Finding {
            message: message.into(),
            location: location.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(message: impl Into<String>, location: impl Into<String>) -> Self {
        Finding {
            message: message.into(),
            location: location.into(),
            severity: Severity::Warning,
        }
    }
}

/// Summary row for one executed pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStep {
    pub name: String,
    pub artifact: String,
    pub warnings: u32,
    pub errors: u32,
}

impl ValidationStep {
    pub fn new(
        name: impl Into<String>,
        artifact: impl Into<String>,
        warnings: u32,
        errors: u32,
    ) -> Self {
        ValidationStep {
            name: name.into(),
            artifact: artifact.into(),
            warnings,
            errors,
        }
    }

    pub fn passed(&self) -> bool {
        self.errors == 0
    }
}

/// Caller-visible reference to a stored SVRL report artifact.
///
/// The `id` is the artifact's file basename and is the token callers hand
/// back to the store to retrieve the report later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHandle {
    pub id: String,
    pub path: PathBuf,
}

/// Outcome of one pipeline run: one summary row per stage attempted, the
/// normalized findings, and the report handle when every stage passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub summary: Vec<ValidationStep>,
    pub findings: Vec<Finding>,
    pub report: Option<ReportHandle>,
}

impl ValidationReport {
    /// True when every executed stage finished without errors. Warning-only
    /// findings do not count against this.
    pub fn passed(&self) -> bool {
        self.summary.iter().all(ValidationStep::passed)
    }
}
