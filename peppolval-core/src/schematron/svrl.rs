//! Typed parsing of SVRL reports produced by the rule processor.
use std::path::Path;

use libxml::{parser::Parser, tree::Document, xpath};
use thiserror::Error;

use crate::report::Severity;

/// SVRL namespace of `schematron-output` documents.
pub const SVRL_NS: &str = "http://purl.oclc.org/dsdl/svrl";

/// Errors while reading an SVRL report.
#[derive(Debug, Error)]
pub enum SvrlError {
    #[error("SVRL parse error: {0}")]
    Parse(String),
    #[error("XPath error: {0}")]
    XPath(String),
}

/// One `svrl:failed-assert` node.
///
/// Severity is read from the node's `flag` attribute: `flag="warning"` makes
/// a warning, any other value or an absent flag makes an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAssert {
    pub text: String,
    pub location: String,
    pub severity: Severity,
}

/// A parsed SVRL report: every failed assertion, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvrlReport {
    failed: Vec<FailedAssert>,
}

impl SvrlReport {
    pub fn parse_file(path: &Path) -> Result<SvrlReport, SvrlError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| SvrlError::Parse("non-UTF-8 report path".to_string()))?;
        let doc = Parser::default()
            .parse_file(path_str)
            .map_err(|e| SvrlError::Parse(format!("{e:?}")))?;
        Self::from_document(&doc)
    }

    pub fn parse_str(svrl: &str) -> Result<SvrlReport, SvrlError> {
        let doc = Parser::default()
            .parse_string(svrl)
            .map_err(|e| SvrlError::Parse(format!("{e:?}")))?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &Document) -> Result<SvrlReport, SvrlError> {
        let ctx = build_context(doc)?;
        let nodes = ctx
            .evaluate("//svrl:failed-assert")
            .map_err(|e| SvrlError::XPath(format!("{e:?}")))?
            .get_nodes_as_vec();

        let mut failed = Vec::with_capacity(nodes.len());
        for idx in 1..=nodes.len() {
            let base = format!("(//svrl:failed-assert)[{idx}]");
            let text = xpath_text(&ctx, &format!("{base}/svrl:text"))?.unwrap_or_default();
            let location = xpath_text(&ctx, &format!("{base}/@location"))?.unwrap_or_default();
            let severity = match xpath_text(&ctx, &format!("{base}/@flag"))?.as_deref() {
                Some("warning") => Severity::Warning,
                _ => Severity::Error,
            };
            failed.push(FailedAssert {
                text,
                location,
                severity,
            });
        }
        Ok(SvrlReport { failed })
    }

    pub fn failed_asserts(&self) -> &[FailedAssert] {
        &self.failed
    }

    pub fn error_count(&self) -> u32 {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> u32 {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> u32 {
        self.failed.iter().filter(|f| f.severity == severity).count() as u32
    }
}

fn build_context(doc: &Document) -> Result<xpath::Context, SvrlError> {
    let ctx = xpath::Context::new(doc).map_err(|e| SvrlError::XPath(format!("{e:?}")))?;
    ctx.register_namespace("svrl", SVRL_NS)
        .map_err(|e| SvrlError::XPath(format!("{e:?}")))?;
    Ok(ctx)
}

fn xpath_text(ctx: &xpath::Context, expr: &str) -> Result<Option<String>, SvrlError> {
    let nodes = ctx
        .evaluate(expr)
        .map_err(|e| SvrlError::XPath(format!("{e:?}")))?
        .get_nodes_as_vec();
    let node = match nodes.first() {
        Some(node) => node,
        None => return Ok(None),
    };
    let value = node.get_content().trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl" title="PEPPOL rules">
  <svrl:active-pattern name="UBL-model"/>
  <svrl:failed-assert flag="fatal" id="BR-01" location="/Invoice[1]/cbc:ID[1]" test="false()">
    <svrl:text>An Invoice shall have a Specification identifier.</svrl:text>
  </svrl:failed-assert>
  <svrl:failed-assert flag="warning" id="UBL-CR-001" location="/Invoice[1]" test="false()">
    <svrl:text>A UBL invoice should not include extensions.</svrl:text>
  </svrl:failed-assert>
  <svrl:failed-assert id="BR-02" location="/Invoice[1]/cbc:IssueDate[1]" test="false()">
    <svrl:text>An Invoice shall have an issue date.</svrl:text>
  </svrl:failed-assert>
</svrl:schematron-output>"#;

    #[test]
    fn classifies_flags_and_counts() {
        let report = SvrlReport::parse_str(MIXED).unwrap();
        assert_eq!(report.failed_asserts().len(), 3);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.warning_count(), 1);

        let first = &report.failed_asserts()[0];
        assert_eq!(first.severity, Severity::Error);
        assert_eq!(first.location, "/Invoice[1]/cbc:ID[1]");
        assert_eq!(
            first.text,
            "An Invoice shall have a Specification identifier."
        );

        let second = &report.failed_asserts()[1];
        assert_eq!(second.severity, Severity::Warning);

        // Absent flag defaults to error.
        assert_eq!(report.failed_asserts()[2].severity, Severity::Error);
    }

    #[test]
    fn clean_report_has_no_failed_asserts() {
        let clean = r#"<svrl:schematron-output xmlns:svrl="http://purl.oclc.org/dsdl/svrl">
  <svrl:active-pattern name="UBL-model"/>
</svrl:schematron-output>"#;
        let report = SvrlReport::parse_str(clean).unwrap();
        assert!(report.failed_asserts().is_empty());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn malformed_report_is_a_parse_error() {
        let err = SvrlReport::parse_str("<svrl:schematron-output").unwrap_err();
        assert!(matches!(err, SvrlError::Parse(_)));
    }
}
