use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::annuity;
use crate::error::PropFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::PropFinResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the buyer's down payment is expressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPayment {
    /// Share of the property price, in percent (20 = 20%)
    Percent(Percent),
    /// Absolute amount, in the same unit as the price
    Amount(Money),
}

/// Balance the rate-based insurance charges are applied to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceBase {
    /// Each period's opening balance
    DecliningBalance,
    /// The original financed principal, fixed for the life of the loan
    OriginalPrincipal,
}

/// Insurance charged on top of every installment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceSpec {
    /// Two fixed monthly charges
    Fixed {
        desgravamen: Money,
        fire_earthquake: Money,
    },
    /// Two monthly rate fractions applied to the selected base
    RateBased {
        desgravamen_rate: Rate,
        fire_earthquake_rate: Rate,
        base: InsuranceBase,
    },
}

/// Input parameters for an amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Property price
    pub price: Money,
    /// Down payment, as a percentage of the price or an absolute amount
    pub down_payment: DownPayment,
    /// Annual nominal interest rate, in percent (4.5 = 4.5%)
    pub annual_rate_pct: Percent,
    /// Term in years; fractional terms round to the nearest month
    pub term_years: Decimal,
    /// Insurance specification
    pub insurance: InsuranceSpec,
}

/// One period of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period index
    pub period: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal_amortized: Money,
    pub closing_balance: Money,
    pub insurance: Money,
    pub total_payment: Money,
}

/// Column totals, each summed independently across all rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmortizationTotals {
    pub interest: Money,
    pub insurance: Money,
    pub payments: Money,
    pub principal_amortized: Money,
}

/// Complete amortization output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Financed principal (price minus down payment)
    pub principal: Money,
    /// Number of monthly periods
    pub months: u32,
    /// Fixed installment before insurance
    pub base_installment: Money,
    /// Base installment plus the first period's insurance
    pub total_installment: Money,
    pub rows: Vec<AmortizationRow>,
    pub totals: AmortizationTotals,
}

/// Reduced projection of [`AmortizationResult`] for summary views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal: Money,
    pub base_installment: Money,
    pub total_installment: Money,
    pub totals: AmortizationTotals,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full per-period schedule for a fixed-installment (French) loan.
///
/// Fails with a single [`PropFinError::ValidationFailed`] carrying every
/// violation [`validate`] collects.
pub fn build_amortization_table(
    inputs: &LoanInputs,
) -> PropFinResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let errors = validate(inputs);
    if !errors.is_empty() {
        return Err(PropFinError::ValidationFailed(errors));
    }

    if inputs.annual_rate_pct > dec!(25) {
        warnings.push(format!(
            "Annual rate {}% exceeds 25% — unusually high, verify input",
            inputs.annual_rate_pct
        ));
    }
    if inputs.term_years > dec!(40) {
        warnings.push(format!(
            "Term of {} years exceeds 40 — beyond typical mortgage terms",
            inputs.term_years
        ));
    }

    let principal = inputs.price - down_payment_amount(inputs);
    let months = months_in_term(inputs.term_years);
    let monthly_rate = inputs.annual_rate_pct / dec!(100) / dec!(12);
    let base_installment = annuity::monthly_payment(principal, monthly_rate, months)?;

    let state = (1..=months).fold(
        ScheduleState::opening(principal, months),
        |state, period| {
            state.step(
                period,
                monthly_rate,
                base_installment,
                &inputs.insurance,
                principal,
            )
        },
    );
    let (rows, totals) = state.finish();

    let first_insurance = rows
        .first()
        .map(|r| r.insurance)
        .unwrap_or(Decimal::ZERO);

    let result = AmortizationResult {
        principal,
        months,
        base_installment,
        total_installment: base_installment + first_insurance,
        rows,
        totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "French Amortization Schedule (fixed installment)",
        inputs,
        warnings,
        elapsed,
        result,
    ))
}

/// Reduced projection of the schedule: principal, installments, and totals.
pub fn loan_summary(inputs: &LoanInputs) -> PropFinResult<ComputationOutput<LoanSummary>> {
    let start = Instant::now();
    let table = build_amortization_table(inputs)?;

    let summary = LoanSummary {
        principal: table.result.principal,
        base_installment: table.result.base_installment,
        total_installment: table.result.total_installment,
        totals: table.result.totals,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Loan Summary (French amortization)",
        inputs,
        table.warnings,
        elapsed,
        summary,
    ))
}

/// Collect every validation violation. An empty vector means the inputs are
/// acceptable; this never raises.
pub fn validate(inputs: &LoanInputs) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if inputs.price <= Decimal::ZERO {
        errors.push("Property price must be a positive amount".into());
    }

    match inputs.down_payment {
        DownPayment::Percent(pct) if pct < Decimal::ZERO => {
            errors.push("Down payment percentage must not be negative".into());
        }
        DownPayment::Amount(amount) if amount < Decimal::ZERO => {
            errors.push("Down payment amount must not be negative".into());
        }
        _ => {}
    }

    if inputs.annual_rate_pct < Decimal::ZERO {
        errors.push("Annual interest rate must not be negative".into());
    }

    if inputs.term_years <= Decimal::ZERO {
        errors.push("Term must be a positive number of years".into());
    } else if months_in_term(inputs.term_years) == 0 {
        errors.push("Term is too short to produce a single monthly period".into());
    }

    match inputs.insurance {
        InsuranceSpec::Fixed {
            desgravamen,
            fire_earthquake,
        } => {
            if desgravamen < Decimal::ZERO {
                errors.push("Desgravamen insurance charge must not be negative".into());
            }
            if fire_earthquake < Decimal::ZERO {
                errors.push("Fire and earthquake insurance charge must not be negative".into());
            }
        }
        InsuranceSpec::RateBased {
            desgravamen_rate,
            fire_earthquake_rate,
            ..
        } => {
            if desgravamen_rate < Decimal::ZERO {
                errors.push("Desgravamen insurance rate must not be negative".into());
            }
            if fire_earthquake_rate < Decimal::ZERO {
                errors.push("Fire and earthquake insurance rate must not be negative".into());
            }
        }
    }

    // Only meaningful once price and the down payment itself are valid
    if inputs.price > Decimal::ZERO && down_payment_amount(inputs) >= inputs.price {
        errors.push("Down payment must be below the property price".into());
    }

    errors
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

fn down_payment_amount(inputs: &LoanInputs) -> Money {
    match inputs.down_payment {
        DownPayment::Percent(pct) => inputs.price * pct / dec!(100),
        DownPayment::Amount(amount) => amount,
    }
}

/// Term in months, rounded to the nearest integer (half away from zero).
fn months_in_term(term_years: Decimal) -> u32 {
    (term_years * dec!(12))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

fn periodic_insurance(spec: &InsuranceSpec, opening: Money, original_principal: Money) -> Money {
    match spec {
        InsuranceSpec::Fixed {
            desgravamen,
            fire_earthquake,
        } => desgravamen + fire_earthquake,
        InsuranceSpec::RateBased {
            desgravamen_rate,
            fire_earthquake_rate,
            base,
        } => {
            let base_amount = match base {
                InsuranceBase::DecliningBalance => opening,
                InsuranceBase::OriginalPrincipal => original_principal,
            };
            base_amount * (desgravamen_rate + fire_earthquake_rate)
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule fold
// ---------------------------------------------------------------------------

/// Accumulator threaded through the per-period fold. The outstanding balance
/// is the only value carried between periods; rows and totals are append-only.
struct ScheduleState {
    months: u32,
    balance: Money,
    rows: Vec<AmortizationRow>,
    totals: AmortizationTotals,
}

impl ScheduleState {
    fn opening(principal: Money, months: u32) -> Self {
        Self {
            months,
            balance: principal,
            rows: Vec::with_capacity(months as usize),
            totals: AmortizationTotals::default(),
        }
    }

    fn step(
        mut self,
        period: u32,
        monthly_rate: Rate,
        base_installment: Money,
        insurance: &InsuranceSpec,
        original_principal: Money,
    ) -> Self {
        let opening = self.balance;
        let interest = opening * monthly_rate;

        // The final period amortizes exactly its opening balance, absorbing
        // any rounding drift accumulated over the schedule; its installment
        // is recomputed accordingly.
        let (principal_amortized, installment_component) = if period == self.months {
            (opening, interest + opening)
        } else {
            (base_installment - interest, base_installment)
        };

        let closing = (opening - principal_amortized).max(Decimal::ZERO);
        let insurance_charge = periodic_insurance(insurance, opening, original_principal);
        let total_payment = installment_component + insurance_charge;

        self.totals.interest += interest;
        self.totals.insurance += insurance_charge;
        self.totals.payments += total_payment;
        self.totals.principal_amortized += principal_amortized;

        self.rows.push(AmortizationRow {
            period,
            opening_balance: opening,
            interest,
            principal_amortized,
            closing_balance: closing,
            insurance: insurance_charge,
            total_payment,
        });

        self.balance = closing;
        self
    }

    fn finish(self) -> (Vec<AmortizationRow>, AmortizationTotals) {
        (self.rows, self.totals)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
