//! Two-stage validation of PEPPOL BIS Billing documents: XSD structure
//! first, Schematron business rules second, with both stages normalized
//! into one uniform report.
//!
//! # Examples
//! ```rust
//! use peppolval_core::config::Config;
//!
//! let config = Config::new("xsd/maindoc", "rulesets", "saxon/saxon-he-12.6.jar");
//! # let _ = config;
//! ```
pub mod config;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod schematron;
pub mod store;
pub mod xsd;

pub use pipeline::{PipelineError, Validator};
pub use report::{Finding, ReportHandle, Severity, ValidationReport, ValidationStep};

use thiserror::Error;

/// Top-level error wrapper for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] registry::RegistryError),
    #[error(transparent)]
    Store(#[from] store::StoreError),
    #[error(transparent)]
    Xsd(#[from] xsd::XsdError),
    #[error(transparent)]
    Engine(#[from] schematron::EngineError),
    #[error(transparent)]
    Svrl(#[from] schematron::svrl::SvrlError),
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
}
