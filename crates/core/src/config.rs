use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "restock.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub rules: RulesFileConfig,
    pub reports: ReportsConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesFileConfig {
    pub path: PathBuf,
}

/// Locations of the three marketplace reports and the vendor inventory export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportsConfig {
    pub sales: PathBuf,
    pub traffic: PathBuf,
    pub restock: PathBuf,
    pub inventory: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub suggest_price: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub rules_path: Option<PathBuf>,
    pub sales_report: Option<PathBuf>,
    pub traffic_report: Option<PathBuf>,
    pub restock_report: Option<PathBuf>,
    pub inventory_report: Option<PathBuf>,
    pub suggest_price: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: RulesFileConfig { path: PathBuf::from("config/rules.toml") },
            reports: ReportsConfig {
                sales: PathBuf::from("reports/sales_performance.csv"),
                traffic: PathBuf::from("reports/traffic.csv"),
                restock: PathBuf::from("reports/restock.csv"),
                inventory: PathBuf::from("reports/inventory.csv"),
            },
            run: RunConfig { suggest_price: false },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(path) = patch.rules.and_then(|rules| rules.path) {
            self.rules.path = path;
        }

        if let Some(reports) = patch.reports {
            if let Some(sales) = reports.sales {
                self.reports.sales = sales;
            }
            if let Some(traffic) = reports.traffic {
                self.reports.traffic = traffic;
            }
            if let Some(restock) = reports.restock {
                self.reports.restock = restock;
            }
            if let Some(inventory) = reports.inventory {
                self.reports.inventory = inventory;
            }
        }

        if let Some(suggest_price) = patch.run.and_then(|run| run.suggest_price) {
            self.run.suggest_price = suggest_price;
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("RESTOCK_RULES_PATH") {
            self.rules.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("RESTOCK_REPORTS_SALES") {
            self.reports.sales = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_REPORTS_TRAFFIC") {
            self.reports.traffic = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_REPORTS_RESTOCK") {
            self.reports.restock = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_REPORTS_INVENTORY") {
            self.reports.inventory = PathBuf::from(value);
        }

        if let Some(value) = read_env("RESTOCK_SUGGEST_PRICE") {
            self.run.suggest_price = parse_bool("RESTOCK_SUGGEST_PRICE", &value)?;
        }

        let log_level =
            read_env("RESTOCK_LOGGING_LEVEL").or_else(|| read_env("RESTOCK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RESTOCK_LOGGING_FORMAT").or_else(|| read_env("RESTOCK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rules_path) = overrides.rules_path {
            self.rules.path = rules_path;
        }
        if let Some(sales) = overrides.sales_report {
            self.reports.sales = sales;
        }
        if let Some(traffic) = overrides.traffic_report {
            self.reports.traffic = traffic;
        }
        if let Some(restock) = overrides.restock_report {
            self.reports.restock = restock;
        }
        if let Some(inventory) = overrides.inventory_report {
            self.reports.inventory = inventory;
        }
        if let Some(suggest_price) = overrides.suggest_price {
            self.run.suggest_price = suggest_price;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_path("rules.path", &self.rules.path)?;
        validate_reports(&self.reports)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_path(field: &str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_reports(reports: &ReportsConfig) -> Result<(), ConfigError> {
    validate_path("reports.sales", &reports.sales)?;
    validate_path("reports.traffic", &reports.traffic)?;
    validate_path("reports.restock", &reports.restock)?;
    validate_path("reports.inventory", &reports.inventory)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    rules: Option<RulesFilePatch>,
    reports: Option<ReportsPatch>,
    run: Option<RunPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RulesFilePatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportsPatch {
    sales: Option<PathBuf>,
    traffic: Option<PathBuf>,
    restock: Option<PathBuf>,
    inventory: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RunPatch {
    suggest_price: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
