use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use peppolval_core::config::Config;
use peppolval_core::registry::{Registry, RulesetKind, SchemaKind};
use peppolval_core::report::{Severity, ValidationReport};
use peppolval_core::store::ReportStore;
use peppolval_core::Validator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peppolval")]
#[command(about = "PEPPOL BIS Billing document validator (XSD + Schematron)")]
struct Cli {
    #[command(flatten)]
    resources: ResourceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ResourceArgs {
    /// Directory holding XSD main documents.
    #[arg(long, default_value = "./xsd/maindoc")]
    schema_dir: PathBuf,
    /// Directory holding compiled Schematron stylesheets.
    #[arg(long, default_value = "./rulesets")]
    ruleset_dir: PathBuf,
    /// Saxon HE jar used to apply the stylesheets.
    #[arg(long, default_value = "./saxon/saxon-he-12.6.jar")]
    saxon_jar: PathBuf,
    /// Java binary invoking Saxon.
    #[arg(long, default_value = "java")]
    java_bin: PathBuf,
    /// Directory where SVRL reports are stored. Defaults to the system
    /// temp directory.
    #[arg(long)]
    report_dir: Option<PathBuf>,
    /// Rule engine timeout in seconds.
    #[arg(long, default_value_t = 30)]
    engine_timeout: u64,
}

impl ResourceArgs {
    fn to_config(&self) -> Config {
        let mut config = Config::new(&self.schema_dir, &self.ruleset_dir, &self.saxon_jar)
            .with_java_bin(&self.java_bin)
            .with_engine_timeout(Duration::from_secs(self.engine_timeout));
        if let Some(dir) = &self.report_dir {
            config = config.with_report_dir(dir);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against a schema and a ruleset.
    Validate {
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        schema: String,
        #[arg(long)]
        ruleset: String,
        /// Print the result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List the registered schemas and rulesets.
    List,
    /// Retrieve a stored SVRL report by id.
    Report {
        #[arg(long)]
        id: String,
        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = cli.resources.to_config();

    match cli.command {
        Commands::Validate {
            document,
            schema,
            ruleset,
            json,
        } => {
            let bytes = std::fs::read(&document)
                .with_context(|| format!("cannot read document {}", document.display()))?;
            let validator = Validator::from_config(&config)?;
            let report = validator.validate(&bytes, &schema, &ruleset)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render_text(&report);
            }
            if !report.passed() {
                std::process::exit(1);
            }
        }
        Commands::List => {
            let schemas: Registry<SchemaKind> = Registry::scan(config.schema_dir())?;
            let rulesets: Registry<RulesetKind> = Registry::scan(config.ruleset_dir())?;
            println!("XSD schemas:");
            for name in schemas.names() {
                println!("  {name}");
            }
            println!("Schematron rulesets:");
            for name in rulesets.names() {
                println!("  {name}");
            }
        }
        Commands::Report { id, output } => {
            let store = ReportStore::create(config.report_dir())?;
            let path = store.resolve(&id)?;
            match output {
                Some(target) => {
                    std::fs::copy(&path, &target)
                        .with_context(|| format!("cannot write {}", target.display()))?;
                    println!("{}", target.display());
                }
                None => {
                    let svrl = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    print!("{svrl}");
                }
            }
        }
    }

    Ok(())
}

fn render_text(report: &ValidationReport) {
    println!(
        "{:<20} {:<40} {:>8} {:>8}",
        "Validation type", "Validation artifact", "Warnings", "Errors"
    );
    for step in &report.summary {
        println!(
            "{:<20} {:<40} {:>8} {:>8}",
            step.name, step.artifact, step.warnings, step.errors
        );
    }
    if !report.findings.is_empty() {
        println!();
        println!("Validation details:");
        for finding in &report.findings {
            let tag = match finding.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            println!("  [{tag}] {}", finding.message);
            println!("          location: {}", finding.location);
        }
    }
    if report.passed() {
        println!();
        println!("The document is valid according to both XSD and Schematron rules.");
        if let Some(handle) = &report.report {
            println!("SVRL report: {}", handle.id);
        }
    }
}
