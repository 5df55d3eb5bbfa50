//! Validator configuration: resource directories, the Saxon jar, and the
//! engine timeout.
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the validation pipeline.
///
/// The defaults mirror a typical deployment layout: XSD main documents under
/// `./xsd/maindoc`, compiled Schematron stylesheets under `./rulesets`, Saxon
/// HE next to them and `java` on the `PATH`.
///
/// # Examples
/// ```rust
/// use peppolval_core::config::Config;
///
/// let config = Config::new("xsd/maindoc", "rulesets", "saxon/saxon-he-12.6.jar");
/// # let _ = config;
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    schema_dir: PathBuf,
    ruleset_dir: PathBuf,
    saxon_jar: PathBuf,
    java_bin: PathBuf,
    report_dir: PathBuf,
    engine_timeout: Duration,
}

impl Config {
    pub fn new(
        schema_dir: impl Into<PathBuf>,
        ruleset_dir: impl Into<PathBuf>,
        saxon_jar: impl Into<PathBuf>,
    ) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            ruleset_dir: ruleset_dir.into(),
            saxon_jar: saxon_jar.into(),
            ..Self::default()
        }
    }

    pub fn with_java_bin(mut self, java_bin: impl Into<PathBuf>) -> Self {
        self.java_bin = java_bin.into();
        self
    }

    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = report_dir.into();
        self
    }

    pub fn with_engine_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout = timeout;
        self
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    pub fn ruleset_dir(&self) -> &Path {
        &self.ruleset_dir
    }

    pub fn saxon_jar(&self) -> &Path {
        &self.saxon_jar
    }

    pub fn java_bin(&self) -> &Path {
        &self.java_bin
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn engine_timeout(&self) -> Duration {
        self.engine_timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            schema_dir: PathBuf::from("./xsd/maindoc"),
            ruleset_dir: PathBuf::from("./rulesets"),
            saxon_jar: PathBuf::from("./saxon/saxon-he-12.6.jar"),
            java_bin: PathBuf::from("java"),
            report_dir: std::env::temp_dir(),
            engine_timeout: Duration::from_secs(30),
        }
    }
}
