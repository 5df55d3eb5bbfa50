//! The two-stage validation pipeline and its result normalization.
//!
//! `SCHEMA_CHECK` runs first; `RULE_CHECK` only runs when the schema stage
//! produced no findings. Every stage failure mode enumerated by the stage
//! errors is recovered here into summary rows and findings; `Err` is
//! reserved for service faults where the validator itself is broken.
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::registry::{Registry, RegistryError, RulesetKind, SchemaKind};
use crate::report::{
    Finding, ValidationReport, ValidationStep, SCHEMATRON_LOCATION, SCHEMATRON_STEP, XSD_LOCATION,
    XSD_STEP,
};
use crate::schematron::{svrl::SvrlReport, EngineError, SchematronEngine};
use crate::store::{ReportStore, StoreError};
use crate::xsd::{self, XsdError};

/// Service faults: the validator is unusable, as opposed to the document
/// being invalid. Validation outcomes never travel through this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("registry unavailable: {0}")]
    Registry(#[from] RegistryError),
    #[error("report store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("rule engine unavailable: {0}")]
    Engine(#[from] EngineError),
    #[error("rule processor succeeded but produced an unreadable report: {0}")]
    UnreadableReport(#[from] crate::schematron::svrl::SvrlError),
}

/// The validation pipeline: schema and ruleset registries, the rule engine,
/// and the report store, wired once at startup.
///
/// Immutable after construction and `Send + Sync`, so one instance can serve
/// concurrent requests from separate threads.
#[derive(Debug)]
pub struct Validator {
    schemas: Registry<SchemaKind>,
    rulesets: Registry<RulesetKind>,
    engine: SchematronEngine,
    store: ReportStore,
}

impl Validator {
    /// Scans both resource directories and opens the report store.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let schemas = Registry::scan(config.schema_dir())?;
        let rulesets = Registry::scan(config.ruleset_dir())?;
        let store = ReportStore::create(config.report_dir())?;
        let engine = SchematronEngine::from_config(config);
        debug!(
            "validator ready: {} schemas, {} rulesets",
            schemas.len(),
            rulesets.len()
        );
        Ok(Validator {
            schemas,
            rulesets,
            engine,
            store,
        })
    }

    pub fn schemas(&self) -> &Registry<SchemaKind> {
        &self.schemas
    }

    pub fn rulesets(&self) -> &Registry<RulesetKind> {
        &self.rulesets
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Runs the full pipeline over one document.
    ///
    /// The summary carries one row per stage attempted: one row when the
    /// schema stage fails, two otherwise. The report handle is present iff
    /// every executed stage passed; warning-only rule findings accompany a
    /// passing report instead of blocking it.
    pub fn validate(
        &self,
        document: &[u8],
        schema: &str,
        ruleset: &str,
    ) -> Result<ValidationReport, PipelineError> {
        let mut summary = Vec::with_capacity(2);

        // SCHEMA_CHECK
        let schema_ref = match self.schemas.get(schema) {
            Ok(schema_ref) => schema_ref,
            Err(err @ RegistryError::Unknown { .. }) => {
                warn!("schema lookup failed: {err}");
                summary.push(ValidationStep::new(XSD_STEP, schema, 0, 1));
                return Ok(ValidationReport {
                    summary,
                    findings: vec![Finding::error(err.to_string(), XSD_LOCATION)],
                    report: None,
                });
            }
            Err(err) => return Err(err.into()),
        };

        match xsd::validate_bytes(document, &schema_ref) {
            Ok(()) => {
                summary.push(ValidationStep::new(XSD_STEP, schema_ref.file_name(), 0, 0));
            }
            Err(XsdError::SchemaViolation { violations }) => {
                let findings: Vec<Finding> = violations
                    .into_iter()
                    .map(|msg| Finding::error(msg, XSD_LOCATION))
                    .collect();
                summary.push(ValidationStep::new(
                    XSD_STEP,
                    schema_ref.file_name(),
                    0,
                    findings.len() as u32,
                ));
                info!("schema check failed with {} violations", findings.len());
                return Ok(ValidationReport {
                    summary,
                    findings,
                    report: None,
                });
            }
            Err(err @ (XsdError::MalformedDocument(_) | XsdError::SchemaLoad { .. })) => {
                summary.push(ValidationStep::new(XSD_STEP, schema_ref.file_name(), 0, 1));
                info!("schema check failed: {err}");
                return Ok(ValidationReport {
                    summary,
                    findings: vec![Finding::error(err.to_string(), XSD_LOCATION)],
                    report: None,
                });
            }
        }

        // RULE_CHECK
        let ruleset_ref = match self.rulesets.get(ruleset) {
            Ok(ruleset_ref) => ruleset_ref,
            Err(err @ RegistryError::Unknown { .. }) => {
                warn!("ruleset lookup failed: {err}");
                summary.push(ValidationStep::new(SCHEMATRON_STEP, ruleset, 0, 1));
                return Ok(ValidationReport {
                    summary,
                    findings: vec![Finding::error(err.to_string(), SCHEMATRON_LOCATION)],
                    report: None,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let handle = self.store.allocate(ruleset_ref.name());
        match self.engine.apply(document, ruleset_ref.path(), &handle.path) {
            Ok(()) => {}
            Err(err @ (EngineError::Exit { .. } | EngineError::Timeout { .. })) => {
                let message = match &err {
                    EngineError::Exit { stderr, .. } if !stderr.is_empty() => stderr.clone(),
                    _ => err.to_string(),
                };
                summary.push(ValidationStep::new(
                    SCHEMATRON_STEP,
                    ruleset_ref.file_name(),
                    0,
                    1,
                ));
                info!("rule engine run failed: {err}");
                return Ok(ValidationReport {
                    summary,
                    findings: vec![Finding::error(message, SCHEMATRON_LOCATION)],
                    report: None,
                });
            }
            Err(err) => return Err(err.into()),
        }

        let svrl = SvrlReport::parse_file(&handle.path)?;
        let warnings = svrl.warning_count();
        let errors = svrl.error_count();
        summary.push(ValidationStep::new(
            SCHEMATRON_STEP,
            ruleset_ref.file_name(),
            warnings,
            errors,
        ));
        let findings: Vec<Finding> = svrl
            .failed_asserts()
            .iter()
            .map(|fa| Finding {
                message: fa.text.clone(),
                location: fa.location.clone(),
                severity: fa.severity,
            })
            .collect();

        if errors > 0 {
            info!("rule check failed: {errors} errors, {warnings} warnings");
            return Ok(ValidationReport {
                summary,
                findings,
                report: None,
            });
        }

        info!("document valid ({warnings} warnings), report {}", handle.id);
        Ok(ValidationReport {
            summary,
            findings,
            report: Some(handle),
        })
    }
}
