use rust_decimal::Decimal;

use crate::error::PropFinError;
use crate::types::{Money, Rate};
use crate::PropFinResult;

/// Fixed monthly payment for a fully amortizing loan:
/// `P * r(1+r)^n / ((1+r)^n - 1)`.
///
/// A zero rate falls back to straight-line `P / n` — the annuity formula
/// would otherwise divide by zero.
pub fn monthly_payment(
    principal: Money,
    monthly_rate: Rate,
    total_months: u32,
) -> PropFinResult<Money> {
    if total_months == 0 {
        return Err(PropFinError::InvalidInput {
            field: "total_months".into(),
            reason: "Number of monthly periods must be > 0".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(total_months));
    }

    // (1 + r)^n via iterative multiplication
    let mut compound = Decimal::ONE;
    for _ in 0..total_months {
        compound *= Decimal::ONE + monthly_rate;
    }

    let numerator = principal * monthly_rate * compound;
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(PropFinError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_sanity() {
        // $750k at 6.5% over 30 years, expected ~$4,740/mo
        let payment = monthly_payment(dec!(750000), dec!(0.065) / dec!(12), 360).unwrap();
        assert!(
            payment > dec!(4700) && payment < dec!(4800),
            "Monthly payment {} outside expected range",
            payment
        );
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let payment = monthly_payment(dec!(360000), Decimal::ZERO, 360).unwrap();
        // $360k / 360 months = $1000/mo
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_zero_months_rejected() {
        let result = monthly_payment(dec!(100000), dec!(0.01), 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_single_period_repays_principal_plus_interest() {
        // One period: payment = P * (1 + r)
        let payment = monthly_payment(dec!(1000), dec!(0.02), 1).unwrap();
        assert_eq!(payment, dec!(1020));
    }
}
