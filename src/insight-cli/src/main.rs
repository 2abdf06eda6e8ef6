//! Opportunity Insight — sales-opportunity attribution analytics.
//!
//! One synchronous run per invocation: load the CSV, apply the
//! business-unit filter, fit the attribution model, and print the dashboard
//! report as JSON on stdout. Logs go to stderr.

use clap::Parser;
use insight_core::config::AppConfig;
use insight_dataprep::{derive_outcomes, load_records};
use insight_reporting::build_report;
use std::collections::BTreeSet;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "opportunity-insight")]
#[command(about = "Sales-opportunity attribution analytics over a CRM export")]
#[command(version)]
struct Cli {
    /// Input CSV path (overrides config)
    #[arg(long, env = "OPPORTUNITY_INSIGHT__INPUT_PATH")]
    input: Option<String>,

    /// Business unit to include; repeatable. Defaults to every unit present.
    #[arg(long = "unit")]
    units: Vec<String>,

    /// Significance level for the Wald test (overrides config)
    #[arg(long, env = "OPPORTUNITY_INSIGHT__MODEL__ALPHA")]
    alpha: Option<f64>,

    /// Predictor name to inspect regardless of significance
    #[arg(long)]
    predictor: Option<String>,

    /// Compact JSON instead of pretty-printed
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insight_cli=info,insight_reporting=info,insight_dataprep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(alpha) = cli.alpha {
        config.model.alpha = alpha;
    }

    info!(input = %config.input_path, alpha = config.model.alpha, "Opportunity Insight starting");

    let records = match load_records(&config.input_path, &config.columns) {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "no data available");
            return Err(e.into());
        }
    };
    let labels = derive_outcomes(&records, &config.columns.won_stage);

    let selected: BTreeSet<String> = if cli.units.is_empty() {
        records.iter().map(|r| r.business_unit.clone()).collect()
    } else {
        cli.units.into_iter().collect()
    };

    let report = build_report(
        &records,
        &labels,
        &selected,
        &config.model,
        cli.predictor.as_deref(),
    )?;

    let rendered = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{rendered}");
    Ok(())
}
