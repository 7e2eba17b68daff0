pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod ingest;
pub mod inventory;
pub mod partition;
pub mod rules;
pub mod scoring;
pub mod working_set;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::{
    ConfirmedRestockRecord, ExclusionReason, InventoryRecord, PendingRestockRecord,
    SalesPerformanceRecord, Sku, SuggestionRecord, TrafficRecord,
};
pub use engine::{RestockEngine, RunOutput};
pub use errors::{ApplicationError, DomainError};
pub use inventory::{InMemoryInventory, InventoryLookup, InventorySnapshot, LookupError};
pub use partition::{partition_restock, RestockPartition};
pub use rules::{FeeRules, FeeSchedule, RulesConfig, RulesError};
pub use scoring::{PricingMode, ScoreOutcome, SuggestionScorer};
pub use working_set::WorkingSet;
