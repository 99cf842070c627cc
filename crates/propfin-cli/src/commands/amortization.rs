use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use propfin_core::amortization::schedule::{
    self, DownPayment, InsuranceBase, InsuranceSpec, LoanInputs,
};

use crate::input;

/// Arguments for the amortization table
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment as a percentage of the price
    #[arg(long, conflicts_with = "down_payment_amount")]
    pub down_payment_pct: Option<Decimal>,

    /// Down payment as an absolute amount
    #[arg(long)]
    pub down_payment_amount: Option<Decimal>,

    /// Annual nominal interest rate, in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Term in years (fractional terms round to the nearest month)
    #[arg(long, alias = "term")]
    pub term_years: Option<Decimal>,

    /// Fixed monthly desgravamen charge
    #[arg(long, default_value = "0")]
    pub desgravamen: Decimal,

    /// Fixed monthly fire and earthquake charge
    #[arg(long, default_value = "0")]
    pub fire_earthquake: Decimal,

    /// Monthly desgravamen rate fraction (switches to rate-based insurance)
    #[arg(long)]
    pub desgravamen_rate: Option<Decimal>,

    /// Monthly fire and earthquake rate fraction
    #[arg(long)]
    pub fire_earthquake_rate: Option<Decimal>,

    /// Base the rate-based insurance is applied to
    #[arg(long, value_enum, default_value = "declining-balance")]
    pub insurance_base: InsuranceBaseArg,
}

/// Arguments for the loan summary
#[derive(Args)]
pub struct SummaryArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InsuranceBaseArg {
    DecliningBalance,
    OriginalPrincipal,
}

impl From<InsuranceBaseArg> for InsuranceBase {
    fn from(arg: InsuranceBaseArg) -> Self {
        match arg {
            InsuranceBaseArg::DecliningBalance => InsuranceBase::DecliningBalance,
            InsuranceBaseArg::OriginalPrincipal => InsuranceBase::OriginalPrincipal,
        }
    }
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_inputs: LoanInputs = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        loan_inputs_from_flags(&args)?
    };

    let result = schedule::build_amortization_table(&loan_inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_inputs: LoanInputs = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file or piped JSON is required for a loan summary".into());
    };

    let result = schedule::loan_summary(&loan_inputs)?;
    Ok(serde_json::to_value(result)?)
}

fn loan_inputs_from_flags(args: &ScheduleArgs) -> Result<LoanInputs, Box<dyn std::error::Error>> {
    let down_payment = match (args.down_payment_pct, args.down_payment_amount) {
        (Some(pct), _) => DownPayment::Percent(pct),
        (None, Some(amount)) => DownPayment::Amount(amount),
        (None, None) => {
            return Err(
                "--down-payment-pct or --down-payment-amount is required (or provide --input)"
                    .into(),
            )
        }
    };

    let insurance = if args.desgravamen_rate.is_some() || args.fire_earthquake_rate.is_some() {
        InsuranceSpec::RateBased {
            desgravamen_rate: args.desgravamen_rate.unwrap_or(Decimal::ZERO),
            fire_earthquake_rate: args.fire_earthquake_rate.unwrap_or(Decimal::ZERO),
            base: args.insurance_base.into(),
        }
    } else {
        InsuranceSpec::Fixed {
            desgravamen: args.desgravamen,
            fire_earthquake: args.fire_earthquake,
        }
    };

    Ok(LoanInputs {
        price: args
            .price
            .ok_or("--price is required (or provide --input)")?,
        down_payment,
        annual_rate_pct: args
            .annual_rate_pct
            .ok_or("--annual-rate-pct is required (or provide --input)")?,
        term_years: args
            .term_years
            .ok_or("--term-years is required (or provide --input)")?,
        insurance,
    })
}
