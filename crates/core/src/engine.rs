//! One restock run: lookup, partition, score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{ExclusionReason, Sku, SuggestionRecord};
use crate::errors::ApplicationError;
use crate::inventory::InventoryLookup;
use crate::partition::ConfirmedRestock;
use crate::rules::RulesConfig;
use crate::scoring::{PricingMode, ScoringReport, SuggestionScorer};
use crate::working_set::WorkingSet;

/// Final result of a run, shaped like the restock API response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(rename = "Suggested")]
    pub suggested: BTreeMap<Sku, SuggestionRecord>,
    #[serde(rename = "FBARestock")]
    pub restock: ConfirmedRestock,
    /// Candidates left out of `suggested`, and why.
    #[serde(skip)]
    pub exclusions: BTreeMap<Sku, ExclusionReason>,
}

impl RunOutput {
    pub fn exclusion_counts(&self) -> BTreeMap<ExclusionReason, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.exclusions.values() {
            *counts.entry(*reason).or_insert(0) += 1;
        }
        counts
    }
}

pub struct RestockEngine<L> {
    rules: RulesConfig,
    lookup: L,
}

impl<L> RestockEngine<L>
where
    L: InventoryLookup,
{
    /// Fails before any work is done when the rules are unusable.
    pub fn new(rules: RulesConfig, lookup: L) -> Result<Self, ApplicationError> {
        rules.validate()?;
        Ok(Self { rules, lookup })
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Runs one scoring pass over `working_set`. Either the whole run
    /// completes or an error is returned with no partial output.
    pub fn run(
        &self,
        mut working_set: WorkingSet,
        mode: PricingMode,
    ) -> Result<RunOutput, ApplicationError> {
        let universe = working_set.sku_universe();
        let inventory = self.lookup.lookup(&universe)?;

        if inventory.len() != universe.len() {
            warn!(
                event_name = "restock.inventory.sku_mismatch",
                requested = universe.len(),
                returned = inventory.len(),
                missing = universe.len().saturating_sub(inventory.len()),
                "inventory lookup did not return every requested SKU"
            );
        }

        let candidates = working_set.confirm_restock(&inventory)?;
        let (sales, traffic, mut confirmed) = working_set.into_parts();

        let ScoringReport { suggestions, exclusions } = SuggestionScorer::new(&self.rules, mode)
            .score_all(&candidates, &sales, &traffic, &mut confirmed);

        info!(
            event_name = "restock.run.completed",
            mode = ?mode,
            requested = universe.len(),
            suggested = suggestions.len(),
            excluded = exclusions.len(),
            confirmed_restock = confirmed.len(),
            "restock run completed"
        );

        Ok(RunOutput { suggested: suggestions, restock: confirmed, exclusions })
    }
}
