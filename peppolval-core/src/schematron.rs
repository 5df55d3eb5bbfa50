//! Rule engine invocation: Saxon applies a compiled Schematron stylesheet
//! to the document and writes an SVRL report.
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod svrl;

/// Errors from one rule processor invocation.
///
/// `Exit` and `Timeout` describe the document run and are normalized into
/// findings by the pipeline; `Spawn` and `Stage` mean the engine itself is
/// unusable and are surfaced as service faults instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch rule processor {java}: {source}")]
    Spawn {
        java: String,
        #[source]
        source: std::io::Error,
    },
    #[error("rule processor exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },
    #[error("rule processor timed out after {}s", limit.as_secs())]
    Timeout { limit: Duration },
    #[error("failed to stage document for rule processing: {0}")]
    Stage(#[from] std::io::Error),
}

/// Invokes Saxon HE as a subprocess under a bounded timeout.
#[derive(Debug)]
pub struct SchematronEngine {
    java_bin: PathBuf,
    saxon_jar: PathBuf,
    timeout: Duration,
}

impl SchematronEngine {
    pub fn new(
        java_bin: impl Into<PathBuf>,
        saxon_jar: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        SchematronEngine {
            java_bin: java_bin.into(),
            saxon_jar: saxon_jar.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.java_bin(),
            config.saxon_jar(),
            config.engine_timeout(),
        )
    }

    /// Applies `stylesheet` to `document`, writing the SVRL report to
    /// `output`.
    ///
    /// The document is staged into a request-unique temp file which is
    /// removed on every exit path, including timeout and panic. Stderr goes
    /// to an anonymous temp file rather than a pipe so a chatty processor
    /// cannot deadlock on a full pipe buffer.
    pub fn apply(
        &self,
        document: &[u8],
        stylesheet: &Path,
        output: &Path,
    ) -> Result<(), EngineError> {
        let mut input = tempfile::Builder::new()
            .prefix("peppolval-")
            .suffix(".xml")
            .tempfile()?;
        input.write_all(document)?;
        input.flush()?;

        let mut stderr_file = tempfile::tempfile()?;
        let mut cmd = Command::new(&self.java_bin);
        cmd.arg("-jar")
            .arg(&self.saxon_jar)
            .arg(format!("-s:{}", input.path().display()))
            .arg(format!("-xsl:{}", stylesheet.display()))
            .arg(format!("-o:{}", output.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_file.try_clone()?));
        debug!(
            "running rule processor: {} -jar {} -s:{} -xsl:{} -o:{}",
            self.java_bin.display(),
            self.saxon_jar.display(),
            input.path().display(),
            stylesheet.display(),
            output.display()
        );

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            java: self.java_bin.display().to_string(),
            source,
        })?;

        let start = Instant::now();
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None => {
                    if start.elapsed() >= self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(EngineError::Timeout {
                            limit: self.timeout,
                        });
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            stderr_file.seek(SeekFrom::Start(0))?;
            stderr_file.read_to_string(&mut stderr)?;
            return Err(EngineError::Exit {
                code: status.code(),
                stderr: stderr.trim_end().to_string(),
            });
        }
        Ok(())
    }
}
