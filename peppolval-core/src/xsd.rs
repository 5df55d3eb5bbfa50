//! Structural validation of a document against an XSD schema (libxml2).
use std::path::PathBuf;

use libxml::{
    error::StructuredError,
    parser::Parser,
    schemas::{SchemaParserContext, SchemaValidationContext},
};
use thiserror::Error;

use crate::registry::ResourceRef;

/// Errors from the structural validation stage.
#[derive(Debug, Error)]
pub enum XsdError {
    #[error("XML parse error: {0}")]
    MalformedDocument(String),
    #[error("failed to load XSD schema {path}: {detail}")]
    SchemaLoad { path: PathBuf, detail: String },
    #[error("document violates schema ({} violations)", violations.len())]
    SchemaViolation { violations: Vec<String> },
}

/// Validates `document` against the schema named by `schema`.
///
/// Emits one violation string per libxml structured error rather than one
/// aggregate message, so a document with several structural defects reports
/// all of them in a single run. No warnings are possible at this stage.
pub fn validate_bytes(document: &[u8], schema: &ResourceRef) -> Result<(), XsdError> {
    let text = std::str::from_utf8(document)
        .map_err(|e| XsdError::MalformedDocument(format!("document is not valid UTF-8: {e}")))?;
    let doc = Parser::default()
        .parse_string(text)
        .map_err(|e| XsdError::MalformedDocument(format!("{e:?}")))?;

    let xsd_path = schema
        .path()
        .to_str()
        .ok_or_else(|| XsdError::SchemaLoad {
            path: schema.path().to_path_buf(),
            detail: "non-UTF-8 schema path".to_string(),
        })?;
    let mut parser_ctx = SchemaParserContext::from_file(xsd_path);
    let mut validation_ctx =
        SchemaValidationContext::from_parser(&mut parser_ctx).map_err(|errors| {
            XsdError::SchemaLoad {
                path: schema.path().to_path_buf(),
                detail: format_violations(errors).join("; "),
            }
        })?;

    validation_ctx
        .validate_document(&doc)
        .map_err(|errors| XsdError::SchemaViolation {
            violations: format_violations(errors),
        })
}

fn format_violations(errors: Vec<StructuredError>) -> Vec<String> {
    errors.into_iter().map(|se| format!("{se:?}")).collect()
}
