use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::metrics::FlippingMetrics;
use crate::types::Percent;

/// Thresholds in percent. A deal is rejected outright below the RED_* floors
/// and only rated optimal at or above every GREEN_* target.
const RED_MIN_ANNUALIZED: Decimal = dec!(12);
const RED_MIN_SAFETY: Decimal = dec!(12);
const RED_MIN_MARGIN: Decimal = dec!(8);
const GREEN_MIN_ANNUALIZED: Decimal = dec!(30);
const GREEN_MIN_SAFETY: Decimal = dec!(25);
const GREEN_MIN_MARGIN: Decimal = dec!(18);

/// Three-tier investment recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Red,
    Yellow,
    Green,
}

/// Classification plus its fixed display strings.
#[derive(Debug, Clone, Serialize)]
pub struct Stoplight {
    pub tier: Tier,
    pub title: &'static str,
    pub message: &'static str,
}

/// Classify a computed project into red, yellow, or green.
///
/// Red conditions are checked first; green requires every target to be met
/// with no red condition present; everything else is yellow. A ratio that is
/// absent (zero capital base on a profitable deal) never triggers red and
/// counts as exceeding the green targets — the `gross_profit <= 0` gate
/// screens the unprofitable degenerate cases before any ratio is consulted.
pub fn classify(metrics: &FlippingMetrics) -> Stoplight {
    let below = |value: Option<Percent>, floor: Decimal| value.is_some_and(|v| v < floor);
    let at_least = |value: Option<Percent>, target: Decimal| value.is_none_or(|v| v >= target);

    let red = metrics.gross_profit <= Decimal::ZERO
        || below(metrics.annualized_return_pct, RED_MIN_ANNUALIZED)
        || below(metrics.safety_margin_pct, RED_MIN_SAFETY)
        || below(metrics.project_margin_pct, RED_MIN_MARGIN);

    if red {
        return Stoplight {
            tier: Tier::Red,
            title: "Not recommended",
            message: "Projected returns fall below minimum thresholds. \
                      Renegotiate the purchase price or discard the deal.",
        };
    }

    let green = at_least(metrics.annualized_return_pct, GREEN_MIN_ANNUALIZED)
        && at_least(metrics.safety_margin_pct, GREEN_MIN_SAFETY)
        && at_least(metrics.project_margin_pct, GREEN_MIN_MARGIN);

    if green {
        Stoplight {
            tier: Tier::Green,
            title: "Optimal deal",
            message: "All return targets are met. Proceed with standard due diligence.",
        }
    } else {
        Stoplight {
            tier: Tier::Yellow,
            title: "Needs review",
            message: "Returns are acceptable but below target. Tighten the cost plan \
                      or negotiate closer to the maximum allowable offer.",
        }
    }
}

/// Advisory line for the offer-versus-price comparison.
pub fn mao_advisory(metrics: &FlippingMetrics) -> String {
    let delta = metrics.mao_delta;
    if delta.is_zero() {
        "The asking price coincides exactly with the maximum allowable offer.".to_string()
    } else if delta > Decimal::ZERO {
        format!(
            "The asking price sits {delta} below the maximum allowable offer; \
             there is room to negotiate."
        )
    } else {
        format!(
            "The asking price exceeds the maximum allowable offer by {}.",
            -delta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flipping::metrics::{compute_flip_metrics, FlippingInputs};
    use rust_decimal_macros::dec;

    fn metrics_for(inputs: &FlippingInputs) -> FlippingMetrics {
        compute_flip_metrics(inputs).unwrap().result
    }

    /// Green baseline: profit 40M on 120M of cost, 25% safety, 300% annualized.
    fn green_inputs() -> FlippingInputs {
        FlippingInputs {
            price: dec!(100000000),
            area_m2: dec!(100),
            comparable_price_m2: dec!(1600000),
            safety_factor: dec!(1.0),
            renovation_cost: dec!(10000000),
            contingency_pct: dec!(10),
            acquisition_costs_pct: dec!(1.2),
            commission_pct: dec!(3),
            notary_fixed: dec!(1000000),
            down_payment_pct: dec!(20),
            annual_rate_pct: Decimal::ZERO,
            loan_term_months: 200,
            holding_months: 8,
            months_paying: 5,
            target_margin_pct: dec!(15),
            uf_value: Some(dec!(40000)),
        }
    }

    #[test]
    fn test_green_when_all_targets_met() {
        let light = classify(&metrics_for(&green_inputs()));
        assert_eq!(light.tier, Tier::Green);
        assert_eq!(light.title, "Optimal deal");
    }

    #[test]
    fn test_red_when_profit_non_positive() {
        // Comparables at 1M/m2 collapse the resale to 100M against 118.2M of
        // cost; the loss forces red regardless of any other ratio.
        let mut inputs = green_inputs();
        inputs.comparable_price_m2 = dec!(1000000);
        let m = metrics_for(&inputs);
        assert!(m.gross_profit <= Decimal::ZERO);
        assert_eq!(classify(&m).tier, Tier::Red);
    }

    #[test]
    fn test_red_precedes_green() {
        // Stretch the holding period until the annualized return drops under
        // the 12% floor: (40M/20M) / 250 * 12 * 100 = 9.6%.
        let mut inputs = green_inputs();
        inputs.holding_months = 250;
        let m = metrics_for(&inputs);
        assert_eq!(classify(&m).tier, Tier::Red);
    }

    #[test]
    fn test_yellow_between_floor_and_target() {
        // All-cash at a weaker resale: annualized 27.45% and safety 18.9%
        // clear the red floors but miss the green targets.
        let mut inputs = green_inputs();
        inputs.down_payment_pct = dec!(100);
        inputs.comparable_price_m2 = dec!(1450000);
        inputs.holding_months = 12;
        let m = metrics_for(&inputs);
        assert_eq!(classify(&m).tier, Tier::Yellow);
    }

    #[test]
    fn test_absent_ratios_do_not_trigger_red() {
        // Zero down payment on a profitable deal: unbounded returns are
        // absent, classification falls through to the bounded ratios.
        // Installments are never paid here, so the cost rollup matches the
        // green baseline minus financing: profit 42M, safety 26.25%.
        let mut inputs = green_inputs();
        inputs.down_payment_pct = Decimal::ZERO;
        inputs.months_paying = 0;
        let m = metrics_for(&inputs);
        assert_eq!(m.annualized_return_pct, None);
        assert_eq!(classify(&m).tier, Tier::Green);
    }

    #[test]
    fn test_advisory_for_exact_coincidence() {
        // With no percentage-based acquisition cost the offer no longer
        // depends on the price: MAO = 160M - (11M + 1M + 4.8M) - 24M = 119.2M.
        let mut inputs = green_inputs();
        inputs.acquisition_costs_pct = Decimal::ZERO;
        inputs.price = dec!(119200000);
        let m = metrics_for(&inputs);
        assert_eq!(m.mao_delta, Decimal::ZERO);
        assert!(mao_advisory(&m).contains("coincides exactly"));
    }

    #[test]
    fn test_advisory_when_asking_exceeds_offer() {
        let mut inputs = green_inputs();
        inputs.acquisition_costs_pct = Decimal::ZERO;
        inputs.price = dec!(125000000);
        let m = metrics_for(&inputs);
        assert!(m.mao_delta < Decimal::ZERO);
        assert!(mao_advisory(&m).contains("exceeds the maximum allowable offer"));
    }
}
