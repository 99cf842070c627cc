use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity;
use crate::error::PropFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::PropFinResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a flipping feasibility analysis.
///
/// All monetary fields share one unit of account (local currency); the
/// indexed-unit reference (`uf_value`) is only used to express the maximum
/// allowable offer in that secondary unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlippingInputs {
    /// Acquisition (asking) price
    pub price: Money,
    /// Property area
    pub area_m2: Decimal,
    /// Comparable price per area unit
    pub comparable_price_m2: Money,
    /// Discount factor applied to the theoretical market value (0.9 = -10%)
    pub safety_factor: Decimal,
    /// Renovation budget before contingency
    pub renovation_cost: Money,
    /// Contingency on the renovation budget, in percent
    pub contingency_pct: Percent,
    /// Percentage-based acquisition costs on the purchase price
    pub acquisition_costs_pct: Percent,
    /// Broker commission on the resale value, in percent
    pub commission_pct: Percent,
    /// Fixed notary and registration cost
    pub notary_fixed: Money,
    /// Down payment, in percent of the purchase price
    pub down_payment_pct: Percent,
    /// Annual nominal interest rate, in percent
    pub annual_rate_pct: Percent,
    /// Financing term in months
    pub loan_term_months: u32,
    /// Project holding period in months
    pub holding_months: u32,
    /// Months the installment is actually paid during the project
    pub months_paying: u32,
    /// Target profit margin on the resale value, in percent
    pub target_margin_pct: Percent,
    /// Reference value of the indexed unit (UF) in local currency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uf_value: Option<Money>,
}

/// Derived feasibility metrics, all pure functions of [`FlippingInputs`].
///
/// Ratios whose capital base is zero are `None`; consumers render a
/// placeholder instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlippingMetrics {
    /// Theoretical resale value (comparables times area, discounted)
    pub resale_value: Money,
    pub down_payment: Money,
    pub financed_amount: Money,
    pub monthly_installment: Money,
    /// Installments paid while the project runs
    pub financing_cost: Money,
    /// Renovation budget including contingency
    pub renovation_total: Money,
    /// Percentage-based acquisition costs plus fixed notary cost
    pub operational_costs: Money,
    /// Broker commission on the resale
    pub selling_cost: Money,
    pub total_cost: Money,
    pub gross_profit: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annualized_return_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_margin_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_margin_pct: Option<Percent>,
    /// Maximum allowable offer preserving the target margin
    pub mao: Money,
    /// The same offer expressed in the indexed unit
    pub mao_uf: Money,
    /// `mao - price`; positive means room to negotiate
    pub mao_delta: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full battery of feasibility metrics for a flipping project.
pub fn compute_flip_metrics(
    inputs: &FlippingInputs,
) -> PropFinResult<ComputationOutput<FlippingMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let uf_value = validate(inputs)?;

    if inputs.commission_pct > dec!(10) {
        warnings.push(format!(
            "Broker commission {}% exceeds 10% — above market norms",
            inputs.commission_pct
        ));
    }
    if inputs.contingency_pct > dec!(50) {
        warnings.push(format!(
            "Contingency of {}% exceeds 50% of the renovation budget",
            inputs.contingency_pct
        ));
    }
    if inputs.months_paying > inputs.holding_months {
        warnings.push(format!(
            "Paying the installment for {} months exceeds the {}-month holding period",
            inputs.months_paying, inputs.holding_months
        ));
    }
    if inputs.down_payment_pct > dec!(100) {
        warnings.push("Down payment exceeds 100% of the price — nothing is financed".into());
    }

    // 1. Theoretical resale value
    let resale_value = inputs.comparable_price_m2 * inputs.area_m2 * inputs.safety_factor;

    // 2. Financing split
    let down_payment = inputs.price * inputs.down_payment_pct / dec!(100);
    let financed_amount = inputs.price - down_payment;

    // 3. Monthly installment; an all-cash project finances nothing
    let monthly_rate = inputs.annual_rate_pct / dec!(100) / dec!(12);
    let monthly_installment = if financed_amount <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        annuity::monthly_payment(financed_amount, monthly_rate, inputs.loan_term_months)?
    };

    // 4-7. Cost buckets
    let financing_cost = monthly_installment * Decimal::from(inputs.months_paying);
    let renovation_total =
        inputs.renovation_cost * (Decimal::ONE + inputs.contingency_pct / dec!(100));
    let operational_costs =
        inputs.price * inputs.acquisition_costs_pct / dec!(100) + inputs.notary_fixed;
    let selling_cost = resale_value * inputs.commission_pct / dec!(100);

    // 8-9. Rollup
    let total_cost =
        inputs.price + operational_costs + renovation_total + financing_cost + selling_cost;
    let gross_profit = resale_value - total_cost;

    // 10-13. Ratios; a zero divisor yields an absent value, never a panic
    let roi_pct =
        (!down_payment.is_zero()).then(|| gross_profit / down_payment * dec!(100));
    let annualized_return_pct = (!down_payment.is_zero() && inputs.holding_months > 0).then(|| {
        gross_profit / down_payment / Decimal::from(inputs.holding_months) * dec!(12) * dec!(100)
    });
    let project_margin_pct =
        (!total_cost.is_zero()).then(|| gross_profit / total_cost * dec!(100));
    let safety_margin_pct = (!resale_value.is_zero())
        .then(|| (resale_value - total_cost) / resale_value * dec!(100));

    // 14. Maximum allowable offer
    let mao = resale_value
        - (renovation_total + operational_costs + selling_cost)
        - resale_value * inputs.target_margin_pct / dec!(100);
    let mao_uf = mao / uf_value;
    let mao_delta = mao - inputs.price;

    let metrics = FlippingMetrics {
        resale_value,
        down_payment,
        financed_amount,
        monthly_installment,
        financing_cost,
        renovation_total,
        operational_costs,
        selling_cost,
        total_cost,
        gross_profit,
        roi_pct,
        annualized_return_pct,
        project_margin_pct,
        safety_margin_pct,
        mao,
        mao_uf,
        mao_delta,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Flipping Feasibility Analysis (ARV and cost rollup)",
        inputs,
        warnings,
        elapsed,
        metrics,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// First-fault validation. Returns the indexed-unit reference so the caller
/// never converts through an unchecked value.
fn validate(inputs: &FlippingInputs) -> PropFinResult<Money> {
    let uf_value = inputs
        .uf_value
        .ok_or_else(|| PropFinError::InvalidInput {
            field: "uf_value".into(),
            reason: "Indexed-unit reference value is required for unit conversion".into(),
        })?;

    if uf_value <= Decimal::ZERO {
        return Err(PropFinError::InvalidInput {
            field: "uf_value".into(),
            reason: "Indexed-unit reference value must be strictly positive".into(),
        });
    }

    let fields = [
        ("price", inputs.price),
        ("area_m2", inputs.area_m2),
        ("comparable_price_m2", inputs.comparable_price_m2),
        ("safety_factor", inputs.safety_factor),
        ("renovation_cost", inputs.renovation_cost),
        ("contingency_pct", inputs.contingency_pct),
        ("acquisition_costs_pct", inputs.acquisition_costs_pct),
        ("commission_pct", inputs.commission_pct),
        ("notary_fixed", inputs.notary_fixed),
        ("down_payment_pct", inputs.down_payment_pct),
        ("annual_rate_pct", inputs.annual_rate_pct),
        ("target_margin_pct", inputs.target_margin_pct),
    ];

    for (field, value) in fields {
        if value < Decimal::ZERO {
            return Err(PropFinError::InvalidInput {
                field: field.into(),
                reason: "Must not be negative".into(),
            });
        }
    }

    Ok(uf_value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Hand-checkable project: resale 160M, total cost 120M, profit 40M.
    ///
    /// resale   = 1,600,000 * 100 * 1.0            = 160,000,000
    /// down     = 100M * 20%                       =  20,000,000
    /// financed = 80M at 0% over 200 months        =     400,000 / month
    /// financing cost = 400,000 * 5                =   2,000,000
    /// renovation     = 10M * 1.10                 =  11,000,000
    /// operational    = 100M * 1.2% + 1,000,000    =   2,200,000
    /// selling        = 160M * 3%                  =   4,800,000
    /// total          = 100M + 2.2M + 11M + 2M + 4.8M = 120,000,000
    fn sample_inputs() -> FlippingInputs {
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

    fn compute(inputs: &FlippingInputs) -> FlippingMetrics {
        compute_flip_metrics(inputs).unwrap().result
    }

    // --- Cost rollup against literal numbers ---

    #[test]
    fn test_resale_value_from_comparables() {
        let m = compute(&sample_inputs());
        assert_eq!(m.resale_value, dec!(160000000));
    }

    #[test]
    fn test_cost_buckets() {
        let m = compute(&sample_inputs());
        assert_eq!(m.down_payment, dec!(20000000));
        assert_eq!(m.financed_amount, dec!(80000000));
        assert_eq!(m.monthly_installment, dec!(400000));
        assert_eq!(m.financing_cost, dec!(2000000));
        assert_eq!(m.renovation_total, dec!(11000000));
        assert_eq!(m.operational_costs, dec!(2200000));
        assert_eq!(m.selling_cost, dec!(4800000));
        assert_eq!(m.total_cost, dec!(120000000));
    }

    #[test]
    fn test_profit_and_ratios() {
        let m = compute(&sample_inputs());
        assert_eq!(m.gross_profit, dec!(40000000));

        // ROI = 40M / 20M * 100 = 200%
        assert_eq!(m.roi_pct, Some(dec!(200)));

        // Annualized = (40M / 20M) / 8 * 12 * 100 = 300%
        assert_eq!(m.annualized_return_pct, Some(dec!(300)));

        // Margin = 40M / 120M * 100
        assert_eq!(
            m.project_margin_pct,
            Some(dec!(40000000) / dec!(120000000) * dec!(100))
        );

        // Safety margin = 40M / 160M * 100 = 25%
        assert_eq!(m.safety_margin_pct, Some(dec!(25)));
    }

    #[test]
    fn test_maximum_allowable_offer() {
        let m = compute(&sample_inputs());
        // 160M - (11M + 2.2M + 4.8M) - 160M * 15% = 118M
        assert_eq!(m.mao, dec!(118000000));
        assert_eq!(m.mao_uf, dec!(2950));
        assert_eq!(m.mao_delta, dec!(18000000));
    }

    // --- Degenerate divisors ---

    #[test]
    fn test_zero_down_payment_reports_absent_returns() {
        let mut inputs = sample_inputs();
        inputs.down_payment_pct = Decimal::ZERO;
        let m = compute(&inputs);
        assert_eq!(m.roi_pct, None);
        assert_eq!(m.annualized_return_pct, None);
        // The remaining metrics are still produced
        assert!(m.project_margin_pct.is_some());
    }

    #[test]
    fn test_zero_holding_period_reports_absent_annualized() {
        let mut inputs = sample_inputs();
        inputs.holding_months = 0;
        let m = compute(&inputs);
        assert!(m.roi_pct.is_some());
        assert_eq!(m.annualized_return_pct, None);
    }

    #[test]
    fn test_all_cash_project_has_no_financing_cost() {
        let mut inputs = sample_inputs();
        inputs.down_payment_pct = dec!(100);
        let m = compute(&inputs);
        assert_eq!(m.financed_amount, Decimal::ZERO);
        assert_eq!(m.monthly_installment, Decimal::ZERO);
        assert_eq!(m.financing_cost, Decimal::ZERO);
    }

    // --- Validation ---

    #[test]
    fn test_missing_uf_reference_rejected() {
        let mut inputs = sample_inputs();
        inputs.uf_value = None;
        match compute_flip_metrics(&inputs) {
            Err(PropFinError::InvalidInput { field, .. }) => assert_eq!(field, "uf_value"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_uf_reference_rejected() {
        let mut inputs = sample_inputs();
        inputs.uf_value = Some(Decimal::ZERO);
        assert!(compute_flip_metrics(&inputs).is_err());
    }

    #[test]
    fn test_negative_field_rejected_first_fault() {
        let mut inputs = sample_inputs();
        inputs.renovation_cost = dec!(-1);
        inputs.commission_pct = dec!(-1);
        match compute_flip_metrics(&inputs) {
            // Declaration order: renovation_cost is reported, commission never reached
            Err(PropFinError::InvalidInput { field, .. }) => assert_eq!(field, "renovation_cost"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    // --- Warnings ---

    #[test]
    fn test_high_commission_warning() {
        let mut inputs = sample_inputs();
        inputs.commission_pct = dec!(12);
        let out = compute_flip_metrics(&inputs).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("exceeds 10%")));
    }

    // --- Determinism ---

    #[test]
    fn test_identical_inputs_identical_metrics() {
        let a = compute(&sample_inputs());
        let b = compute(&sample_inputs());
        assert_eq!(a.total_cost, b.total_cost);
        assert_eq!(a.gross_profit, b.gross_profit);
        assert_eq!(a.mao, b.mao);
    }
}
