//! Plans a production line from a TOML plan file and prints the result as JSON.
//!
//! ```text
//! plan line.toml
//! plan line.toml --remediate --detector pairwise
//! plan line.toml --check
//! RUST_LOG=u_timeline=debug plan line.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_timeline::config::{DetectorChoice, PlanConfig};
use u_timeline::validation::validate_configs;

#[derive(Parser, Debug)]
#[command(name = "plan", about = "Timeline overlap planner", version)]
struct Cli {
    /// Plan file (TOML).
    path: PathBuf,

    /// Suggest waits and re-plan.
    #[arg(long)]
    remediate: bool,

    /// Overrides the file's detector.
    #[arg(long, value_enum)]
    detector: Option<Detector>,

    /// Print only the summary instead of the full plan.
    #[arg(long)]
    summary_only: bool,

    /// Validate the machines and print every issue instead of planning.
    #[arg(long, conflicts_with = "remediate")]
    check: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Detector {
    SweepLine,
    Pairwise,
}

impl From<Detector> for DetectorChoice {
    fn from(d: Detector) -> Self {
        match d {
            Detector::SweepLine => DetectorChoice::SweepLine,
            Detector::Pairwise => DetectorChoice::Pairwise,
        }
    }
}

/// `RUST_LOG` when set, otherwise info-level output from this crate.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("u_timeline=info"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = PlanConfig::load(&cli.path)
        .with_context(|| format!("failed to load plan file {}", cli.path.display()))?;
    if let Some(detector) = cli.detector {
        config.detector = detector.into();
    }

    let catalog = config.catalog().context("invalid line-wide step durations")?;
    let resolved = config
        .resource_configs(&catalog)
        .context("failed to resolve machines")?;
    info!(
        machines = resolved.configs.len(),
        fallbacks = resolved.fallbacks.len(),
        "resolved plan file"
    );

    if cli.check {
        let issues = validate_configs(&resolved.configs).err().unwrap_or_default();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "fallbacks": resolved.fallbacks,
                "issues": issues,
            }))
            .context("failed to serialize output")?
        );
        if !issues.is_empty() {
            anyhow::bail!("{} configuration issue(s) found", issues.len());
        }
        return Ok(());
    }

    let planner = config.planner();
    let output = if cli.remediate {
        let remediation = planner.plan_and_remediate(&resolved.configs);
        if cli.summary_only {
            json!({
                "fallbacks": resolved.fallbacks,
                "waits": remediation.waits,
                "before": remediation.before.summary,
                "after": remediation.after.summary,
                "deltas": remediation.deltas,
            })
        } else {
            json!({ "fallbacks": resolved.fallbacks, "remediation": remediation })
        }
    } else {
        let plan = planner.plan(&resolved.configs);
        if cli.summary_only {
            json!({
                "fallbacks": resolved.fallbacks,
                "summary": plan.summary,
                "rejected": plan.rejected,
            })
        } else {
            json!({ "fallbacks": resolved.fallbacks, "plan": plan })
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialize output")?
    );
    Ok(())
}
