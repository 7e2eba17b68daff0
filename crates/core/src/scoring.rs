//! Financial and quantity decision for each scoring candidate.
//!
//! Every candidate ends in exactly one of two states: scored (it appears in
//! the suggestion set) or excluded with an [`ExclusionReason`]. Missing
//! traffic degrades to zeros; a missing or unusable sales window excludes
//! the SKU instead of producing a non-finite rate.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    ConfirmedRestockRecord, ExclusionReason, InventoryRecord, SalesPerformanceRecord, Sku,
    SuggestionRecord, TrafficRecord,
};
use crate::partition::{Candidates, ConfirmedRestock};
use crate::rules::RulesConfig;
use crate::working_set::{SalesPerformance, Traffic};

/// Smallest reorder worth placing; a computed quantity of one is raised to this.
pub const MIN_REORDER_QTY: i64 = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Drop SKUs whose estimated profit is under the target.
    #[default]
    ProfitFloor,
    /// Keep low-profit SKUs and suggest a price that meets the target.
    SuggestPrice,
}

impl From<bool> for PricingMode {
    fn from(suggest_price: bool) -> Self {
        if suggest_price {
            Self::SuggestPrice
        } else {
            Self::ProfitFloor
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreOutcome {
    Scored(Box<SuggestionRecord>),
    Excluded(ExclusionReason),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoringReport {
    pub suggestions: BTreeMap<Sku, SuggestionRecord>,
    pub exclusions: BTreeMap<Sku, ExclusionReason>,
}

#[derive(Clone, Copy, Debug)]
pub struct SuggestionScorer<'a> {
    rules: &'a RulesConfig,
    mode: PricingMode,
}

impl<'a> SuggestionScorer<'a> {
    pub fn new(rules: &'a RulesConfig, mode: PricingMode) -> Self {
        Self { rules, mode }
    }

    /// Scores every candidate. `confirmed` is only touched to annotate alerts
    /// of worklist SKUs that had no marketplace sales.
    pub fn score_all(
        &self,
        candidates: &Candidates,
        sales: &SalesPerformance,
        traffic: &Traffic,
        confirmed: &mut ConfirmedRestock,
    ) -> ScoringReport {
        let mut report = ScoringReport::default();

        for (sku, inventory) in candidates {
            let outcome = self.score_sku(
                sku,
                inventory,
                sales.get(sku),
                traffic.get(sku),
                confirmed.get_mut(sku),
            );

            match outcome {
                ScoreOutcome::Scored(record) => {
                    report.suggestions.insert(sku.clone(), *record);
                }
                ScoreOutcome::Excluded(reason) => {
                    debug!(
                        event_name = "restock.scoring.excluded",
                        sku = %sku,
                        reason = reason.as_str(),
                        "candidate excluded from suggestions"
                    );
                    report.exclusions.insert(sku.clone(), reason);
                }
            }
        }

        report
    }

    pub fn score_sku(
        &self,
        sku: &Sku,
        inventory: &InventoryRecord,
        sales: Option<&SalesPerformanceRecord>,
        traffic: Option<&TrafficRecord>,
        confirmed: Option<&mut ConfirmedRestockRecord>,
    ) -> ScoreOutcome {
        let traffic = traffic.cloned().unwrap_or_default();
        let estimated_price = traffic.average_selling_price();
        let restock = confirmed.is_some();

        if let Some(confirmed) = confirmed {
            if estimated_price.is_zero() {
                confirmed.flag_no_marketplace_sales();
            }
        }

        if estimated_price <= Decimal::ZERO {
            return ScoreOutcome::Excluded(ExclusionReason::ZeroPrice);
        }

        let Some(financials) = self.financials(estimated_price, inventory) else {
            warn!(
                event_name = "restock.scoring.overflow",
                sku = %sku,
                cost = %inventory.cost,
                estimated_price = %estimated_price,
                "fee or profit arithmetic overflowed; skipping SKU"
            );
            return ScoreOutcome::Excluded(ExclusionReason::ArithmeticOverflow);
        };
        let Financials { estimated_fees, estimated_profit, suggested_price } = financials;

        if estimated_profit < self.rules.target_profit && self.mode == PricingMode::ProfitFloor {
            return ScoreOutcome::Excluded(ExclusionReason::BelowTargetProfit);
        }

        let Some(sales) = sales else {
            return ScoreOutcome::Excluded(ExclusionReason::MissingSalesRecord);
        };
        let Some(daily_rate) = sales.daily_sales_rate() else {
            warn!(
                event_name = "restock.scoring.invalid_window",
                sku = %sku,
                report_start_date = ?sales.report_start_date,
                report_end_date = ?sales.report_end_date,
                "sales window is missing, empty or inverted; skipping SKU"
            );
            return ScoreOutcome::Excluded(ExclusionReason::InvalidSalesWindow);
        };

        let suggested_qty = suggested_quantity(
            daily_rate,
            self.rules.days_of_coverage,
            self.rules.sales_multiplier,
            inventory.available_qty,
        );
        if suggested_qty <= 0 {
            return ScoreOutcome::Excluded(ExclusionReason::ZeroQuantity);
        }

        ScoreOutcome::Scored(Box::new(SuggestionRecord {
            sales: sales.clone(),
            traffic,
            inventory: inventory.clone(),
            estimated_fees,
            estimated_price,
            estimated_profit,
            suggested_qty,
            suggested_price,
            restock,
        }))
    }

    fn financials(
        &self,
        estimated_price: Decimal,
        inventory: &InventoryRecord,
    ) -> Option<Financials> {
        let estimated_fees =
            self.rules.estimated_fees(estimated_price, &inventory.classification)?;
        let total_cost = inventory.cost.checked_add(estimated_fees)?;
        let estimated_profit = estimated_price.checked_sub(total_cost)?;
        let suggested_price = match self.mode {
            PricingMode::SuggestPrice => Some(total_cost.checked_add(self.rules.target_profit)?),
            PricingMode::ProfitFloor => None,
        };

        Some(Financials { estimated_fees, estimated_profit, suggested_price })
    }
}

/// Fees, profit and optional suggested price for one SKU.
struct Financials {
    estimated_fees: Decimal,
    estimated_profit: Decimal,
    suggested_price: Option<Decimal>,
}

/// Units needed to cover `days_of_coverage` days at `daily_rate`, scaled by
/// `sales_multiplier` and rounded half-up. A result of one is raised to
/// [`MIN_REORDER_QTY`]; the result never exceeds `available_qty`.
pub fn suggested_quantity(
    daily_rate: Decimal,
    days_of_coverage: u32,
    sales_multiplier: Decimal,
    available_qty: i64,
) -> i64 {
    let projected = daily_rate
        .checked_mul(Decimal::from(days_of_coverage))
        .and_then(|units| units.checked_mul(sales_multiplier))
        .unwrap_or(Decimal::MAX);

    let mut qty = projected
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX);

    if qty == 1 {
        qty = MIN_REORDER_QTY;
    }

    qty.min(available_qty)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{suggested_quantity, PricingMode, ScoreOutcome, SuggestionScorer};
    use crate::domain::{
        ConfirmedRestockRecord, ExclusionReason, InventoryRecord, PendingRestockRecord,
        SalesPerformanceRecord, Sku, TrafficRecord, NO_SALES_ALERT_MARKER,
    };
    use crate::partition::{Candidates, ConfirmedRestock};
    use crate::rules::{FeeRules, FeeSchedule, RulesConfig};
    use crate::working_set::{SalesPerformance, Traffic};

    fn rules() -> RulesConfig {
        RulesConfig {
            topseller: 1,
            target_profit: Decimal::from(2),
            fees: FeeRules {
                fee_percentage: Decimal::new(10, 2),
                classes: FeeSchedule::new(BTreeMap::from([
                    ("default".to_owned(), Decimal::from(3)),
                    ("standard".to_owned(), Decimal::ONE),
                ]))
                .expect("schedule has default"),
            },
            days_of_coverage: 14,
            sales_multiplier: Decimal::ONE,
        }
    }

    fn sales(days: i64, qty_sold: u32) -> SalesPerformanceRecord {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single().expect("valid start");
        SalesPerformanceRecord {
            report_start_date: Some(start),
            report_end_date: Some(start + Duration::days(days)),
            title: "Widget".to_owned(),
            qty_sold,
            gmv: Decimal::from(300),
        }
    }

    fn traffic(revenue: i64, units: u32) -> TrafficRecord {
        TrafficRecord {
            sessions: 120,
            page_views: 180,
            units_ordered: units,
            ordered_product_sales: Decimal::from(revenue),
            ..TrafficRecord::default()
        }
    }

    fn inventory(cost: i64, available_qty: i64) -> InventoryRecord {
        InventoryRecord {
            cost: Decimal::from(cost),
            classification: "standard".to_owned(),
            upc: "012345678905".to_owned(),
            brand: "Acme".to_owned(),
            available_qty,
            vendor_title: "Acme Widget".to_owned(),
        }
    }

    fn score(
        mode: PricingMode,
        inventory: &InventoryRecord,
        sales: Option<&SalesPerformanceRecord>,
        traffic: Option<&TrafficRecord>,
    ) -> ScoreOutcome {
        let rules = rules();
        SuggestionScorer::new(&rules, mode).score_sku(
            &Sku::from("A1"),
            inventory,
            sales,
            traffic,
            None,
        )
    }

    #[test]
    fn profitable_sku_is_scored_with_all_computed_fields() {
        let outcome = score(
            PricingMode::ProfitFloor,
            &inventory(5, 100),
            Some(&sales(10, 30)),
            Some(&traffic(300, 30)),
        );

        let ScoreOutcome::Scored(record) = outcome else {
            panic!("expected A1 to be scored, got {outcome:?}");
        };
        assert_eq!(record.estimated_price, Decimal::from(10));
        assert_eq!(record.estimated_fees, Decimal::from(2));
        assert_eq!(record.estimated_profit, Decimal::from(3));
        assert_eq!(record.suggested_qty, 42);
        assert_eq!(record.suggested_price, None);
        assert!(!record.restock);
        assert_eq!(record.inventory.brand, "Acme");
        assert_eq!(record.traffic.sessions, 120);
    }

    #[test]
    fn zero_revenue_excludes_regardless_of_mode() {
        for mode in [PricingMode::ProfitFloor, PricingMode::SuggestPrice] {
            let outcome =
                score(mode, &inventory(5, 100), Some(&sales(10, 30)), Some(&traffic(0, 0)));
            assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::ZeroPrice));
        }
    }

    #[test]
    fn missing_traffic_is_treated_as_zero_and_excluded() {
        let outcome =
            score(PricingMode::SuggestPrice, &inventory(5, 100), Some(&sales(10, 30)), None);
        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::ZeroPrice));
    }

    #[test]
    fn profit_floor_applies_only_without_price_suggestion() {
        // price 10, fees 2, cost 7 => total 9, profit 1 < target 2
        let low_margin = inventory(7, 100);

        let outcome = score(
            PricingMode::ProfitFloor,
            &low_margin,
            Some(&sales(10, 30)),
            Some(&traffic(300, 30)),
        );
        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::BelowTargetProfit));

        let outcome = score(
            PricingMode::SuggestPrice,
            &low_margin,
            Some(&sales(10, 30)),
            Some(&traffic(300, 30)),
        );
        let ScoreOutcome::Scored(record) = outcome else {
            panic!("suggest-price mode should keep the SKU, got {outcome:?}");
        };
        assert_eq!(record.estimated_profit, Decimal::ONE);
        assert_eq!(record.suggested_price, Some(Decimal::from(11)));
    }

    #[test]
    fn invalid_or_missing_sales_window_excludes_without_panicking() {
        let outcome = score(
            PricingMode::ProfitFloor,
            &inventory(5, 100),
            Some(&sales(0, 30)),
            Some(&traffic(300, 30)),
        );
        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::InvalidSalesWindow));

        let outcome = score(
            PricingMode::ProfitFloor,
            &inventory(5, 100),
            Some(&sales(-3, 30)),
            Some(&traffic(300, 30)),
        );
        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::InvalidSalesWindow));

        let outcome =
            score(PricingMode::ProfitFloor, &inventory(5, 100), None, Some(&traffic(300, 30)));
        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::MissingSalesRecord));
    }

    #[test]
    fn extreme_vendor_cost_is_excluded_instead_of_overflowing() {
        let extreme = InventoryRecord { cost: Decimal::MAX, ..inventory(0, 100) };

        for mode in [PricingMode::ProfitFloor, PricingMode::SuggestPrice] {
            let outcome = score(mode, &extreme, Some(&sales(10, 30)), Some(&traffic(300, 30)));
            assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::ArithmeticOverflow));
        }
    }

    #[test]
    fn overflowing_sku_does_not_abort_the_batch() {
        let rules = rules();
        let scorer = SuggestionScorer::new(&rules, PricingMode::ProfitFloor);

        let candidates: Candidates = [
            (Sku::from("A1"), inventory(5, 100)),
            (Sku::from("X1"), InventoryRecord { cost: Decimal::MAX, ..inventory(0, 100) }),
        ]
        .into_iter()
        .collect();
        let sales: SalesPerformance =
            [(Sku::from("A1"), sales(10, 30)), (Sku::from("X1"), sales(10, 30))]
                .into_iter()
                .collect();
        let traffic: Traffic =
            [(Sku::from("A1"), traffic(300, 30)), (Sku::from("X1"), traffic(300, 30))]
                .into_iter()
                .collect();

        let report =
            scorer.score_all(&candidates, &sales, &traffic, &mut ConfirmedRestock::new());

        assert!(report.suggestions.contains_key(&Sku::from("A1")));
        assert_eq!(
            report.exclusions.get(&Sku::from("X1")),
            Some(&ExclusionReason::ArithmeticOverflow)
        );
    }

    #[test]
    fn no_availability_excludes_as_zero_quantity() {
        for available in [0, -4] {
            let outcome = score(
                PricingMode::ProfitFloor,
                &inventory(5, available),
                Some(&sales(10, 30)),
                Some(&traffic(300, 30)),
            );
            assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::ZeroQuantity));
        }
    }

    #[test]
    fn quantity_rounds_half_up() {
        // 0.25/day * 10 days = 2.5 => 3
        assert_eq!(suggested_quantity(Decimal::new(25, 2), 10, Decimal::ONE, 100), 3);
        // 0.24/day * 10 days = 2.4 => 2
        assert_eq!(suggested_quantity(Decimal::new(24, 2), 10, Decimal::ONE, 100), 2);
        // 0.04/day * 10 days = 0.4 => 0
        assert_eq!(suggested_quantity(Decimal::new(4, 2), 10, Decimal::ONE, 100), 0);
    }

    #[test]
    fn single_unit_is_raised_to_minimum_reorder() {
        // 0.1/day * 10 days = 1 exactly; 0.05 * 10 * 1.0 = 0.5 rounds to 1
        assert_eq!(suggested_quantity(Decimal::new(1, 1), 10, Decimal::ONE, 100), 2);
        assert_eq!(suggested_quantity(Decimal::new(5, 2), 10, Decimal::ONE, 100), 2);
    }

    #[test]
    fn quantity_is_clamped_to_availability() {
        assert_eq!(suggested_quantity(Decimal::from(3), 14, Decimal::ONE, 10), 10);
        assert_eq!(suggested_quantity(Decimal::from(3), 14, Decimal::new(15, 1), 100), 63);
    }

    #[test]
    fn confirmed_sku_sets_restock_flag_and_gets_no_sales_marker() {
        let rules = rules();
        let scorer = SuggestionScorer::new(&rules, PricingMode::ProfitFloor);
        let mut confirmed = ConfirmedRestockRecord::new(
            PendingRestockRecord { alert: "low stock".to_owned(), ..Default::default() },
            inventory(5, 100),
        );

        let outcome = scorer.score_sku(
            &Sku::from("C3"),
            &inventory(5, 100),
            Some(&sales(10, 30)),
            Some(&traffic(0, 0)),
            Some(&mut confirmed),
        );

        assert_eq!(outcome, ScoreOutcome::Excluded(ExclusionReason::ZeroPrice));
        assert_eq!(confirmed.pending.alert, format!("low stock{NO_SALES_ALERT_MARKER}"));

        let outcome = scorer.score_sku(
            &Sku::from("C3"),
            &inventory(5, 100),
            Some(&sales(10, 30)),
            Some(&traffic(300, 30)),
            Some(&mut confirmed),
        );
        let ScoreOutcome::Scored(record) = outcome else {
            panic!("expected C3 to be scored, got {outcome:?}");
        };
        assert!(record.restock);
    }

    #[test]
    fn score_all_keeps_survivors_and_ledgers_exclusions() {
        let rules = rules();
        let scorer = SuggestionScorer::new(&rules, PricingMode::ProfitFloor);

        let candidates: Candidates = [
            (Sku::from("A1"), inventory(5, 100)),
            (Sku::from("Z9"), inventory(5, 100)),
            (Sku::from("Q7"), inventory(5, 1)),
        ]
        .into_iter()
        .collect();
        let sales: SalesPerformance = [
            (Sku::from("A1"), sales(10, 30)),
            (Sku::from("Z9"), sales(10, 30)),
            (Sku::from("Q7"), sales(10, 1)),
        ]
        .into_iter()
        .collect();
        let traffic: Traffic = [
            (Sku::from("A1"), traffic(300, 30)),
            (Sku::from("Q7"), traffic(300, 30)),
        ]
        .into_iter()
        .collect();
        let mut confirmed = ConfirmedRestock::new();

        let report = scorer.score_all(&candidates, &sales, &traffic, &mut confirmed);

        let kept: Vec<&str> = report.suggestions.keys().map(Sku::as_str).collect();
        assert_eq!(kept, vec!["A1", "Q7"]);
        assert_eq!(report.exclusions.get(&Sku::from("Z9")), Some(&ExclusionReason::ZeroPrice));
        // 0.1/day * 14 = 1.4 => 1 => raised to 2 => clamped to the single unit on hand
        assert_eq!(report.suggestions[&Sku::from("Q7")].suggested_qty, 1);

        for record in report.suggestions.values() {
            assert!(record.estimated_price > Decimal::ZERO);
            assert!(record.suggested_qty >= 1);
            assert!(record.suggested_qty <= record.inventory.available_qty);
        }
    }
}
