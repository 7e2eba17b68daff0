use std::path::PathBuf;

use restock_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use restock_core::engine::{RestockEngine, RunOutput};
use restock_core::errors::ApplicationError;
use restock_core::ingest::{build_working_set, index_inventory};
use restock_core::inventory::InMemoryInventory;
use restock_core::rules::RulesConfig;
use restock_core::scoring::PricingMode;
use tracing::info;

use crate::commands::CommandResult;
use crate::reports::read_bundle;

const COMMAND: &str = "suggest";

#[derive(Clone, Debug, Default)]
pub struct SuggestArgs {
    pub config_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
    pub sales_report: Option<PathBuf>,
    pub traffic_report: Option<PathBuf>,
    pub restock_report: Option<PathBuf>,
    pub inventory_report: Option<PathBuf>,
    pub suggest_price: bool,
    pub pretty: bool,
}

pub fn run(args: SuggestArgs) -> CommandResult {
    let require_file = args.config_path.is_some();
    let overrides = ConfigOverrides {
        rules_path: args.rules_path,
        sales_report: args.sales_report,
        traffic_report: args.traffic_report,
        restock_report: args.restock_report,
        inventory_report: args.inventory_report,
        // The flag can only switch price suggestion on; config decides otherwise.
        suggest_price: args.suggest_price.then_some(true),
        log_level: None,
    };

    let config = match AppConfig::load(LoadOptions {
        config_path: args.config_path,
        require_file,
        overrides,
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    crate::init_logging(&config.logging);

    let rules = match RulesConfig::load(&config.rules.path) {
        Ok(rules) => rules,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "rules_validation",
                format!("rules issue: {error}"),
                2,
            );
        }
    };

    let bundle = match read_bundle(
        &config.reports.sales,
        &config.reports.traffic,
        &config.reports.restock,
        &config.reports.inventory,
    ) {
        Ok(bundle) => bundle,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "report_ingestion",
                format!("report issue: {error:#}"),
                3,
            );
        }
    };

    let working_set = build_working_set(&rules, bundle.sales, bundle.traffic, bundle.restock);
    let catalog = InMemoryInventory::new(index_inventory(bundle.inventory));
    let mode = PricingMode::from(config.run.suggest_price);

    let output = match RestockEngine::new(rules, catalog)
        .and_then(|engine| engine.run(working_set, mode))
    {
        Ok(output) => output,
        Err(error) => return run_failure(&error),
    };

    for (reason, count) in output.exclusion_counts() {
        info!(
            event_name = "restock.run.exclusions",
            reason = reason.as_str(),
            count,
            "candidates excluded"
        );
    }

    render_output(&output, args.pretty)
}

fn run_failure(error: &ApplicationError) -> CommandResult {
    let exit_code = match error {
        ApplicationError::Configuration(_) => 2,
        ApplicationError::Domain(_) | ApplicationError::Integration(_) => 4,
    };
    CommandResult::failure(
        COMMAND,
        error.error_class(),
        format!("{} ({error})", error.user_message()),
        exit_code,
    )
}

fn render_output(output: &RunOutput, pretty: bool) -> CommandResult {
    let rendered =
        if pretty { serde_json::to_string_pretty(output) } else { serde_json::to_string(output) };

    match rendered {
        Ok(json) => CommandResult { exit_code: 0, output: json },
        Err(error) => CommandResult::failure(
            COMMAND,
            "serialization",
            format!("could not render run output: {error}"),
            4,
        ),
    }
}
