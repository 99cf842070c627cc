use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use propfin_core::flipping::{metrics, metrics::FlippingInputs, stoplight};

use crate::input;

/// Arguments for the flipping feasibility analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FlipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Acquisition (asking) price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Property area
    #[arg(long, alias = "area")]
    pub area_m2: Option<Decimal>,

    /// Comparable price per area unit
    #[arg(long, alias = "comparable")]
    pub comparable_price_m2: Option<Decimal>,

    /// Discount factor on the theoretical market value (0.9 = -10%)
    #[arg(long, default_value = "1")]
    pub safety_factor: Decimal,

    /// Renovation budget before contingency
    #[arg(long)]
    pub renovation_cost: Option<Decimal>,

    /// Contingency on the renovation budget, in percent
    #[arg(long, default_value = "0")]
    pub contingency_pct: Decimal,

    /// Percentage-based acquisition costs on the purchase price
    #[arg(long, default_value = "0")]
    pub acquisition_costs_pct: Decimal,

    /// Broker commission on the resale value, in percent
    #[arg(long, default_value = "0")]
    pub commission_pct: Decimal,

    /// Fixed notary and registration cost
    #[arg(long, default_value = "0")]
    pub notary_fixed: Decimal,

    /// Down payment, in percent of the purchase price
    #[arg(long)]
    pub down_payment_pct: Option<Decimal>,

    /// Annual nominal interest rate, in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Financing term in months
    #[arg(long)]
    pub loan_term_months: Option<u32>,

    /// Project holding period in months
    #[arg(long)]
    pub holding_months: Option<u32>,

    /// Months the installment is actually paid during the project
    #[arg(long)]
    pub months_paying: Option<u32>,

    /// Target profit margin on the resale value, in percent
    #[arg(long)]
    pub target_margin_pct: Option<Decimal>,

    /// Reference value of the indexed unit (UF) in local currency
    #[arg(long, alias = "uf")]
    pub uf_value: Option<Decimal>,
}

pub fn run_flip(args: FlipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flip_inputs: FlippingInputs = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(data) = input::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        flip_inputs_from_flags(&args)?
    };

    let output = metrics::compute_flip_metrics(&flip_inputs)?;
    let light = stoplight::classify(&output.result);
    let advisory = stoplight::mao_advisory(&output.result);

    let mut value = serde_json::to_value(&output)?;
    value["stoplight"] = serde_json::to_value(light)?;
    value["mao_advisory"] = Value::String(advisory);
    Ok(value)
}

fn flip_inputs_from_flags(args: &FlipArgs) -> Result<FlippingInputs, Box<dyn std::error::Error>> {
    Ok(FlippingInputs {
        price: args
            .price
            .ok_or("--price is required (or provide --input)")?,
        area_m2: args
            .area_m2
            .ok_or("--area-m2 is required (or provide --input)")?,
        comparable_price_m2: args
            .comparable_price_m2
            .ok_or("--comparable-price-m2 is required (or provide --input)")?,
        safety_factor: args.safety_factor,
        renovation_cost: args
            .renovation_cost
            .ok_or("--renovation-cost is required (or provide --input)")?,
        contingency_pct: args.contingency_pct,
        acquisition_costs_pct: args.acquisition_costs_pct,
        commission_pct: args.commission_pct,
        notary_fixed: args.notary_fixed,
        down_payment_pct: args
            .down_payment_pct
            .ok_or("--down-payment-pct is required (or provide --input)")?,
        annual_rate_pct: args
            .annual_rate_pct
            .ok_or("--annual-rate-pct is required (or provide --input)")?,
        loan_term_months: args
            .loan_term_months
            .ok_or("--loan-term-months is required (or provide --input)")?,
        holding_months: args
            .holding_months
            .ok_or("--holding-months is required (or provide --input)")?,
        months_paying: args
            .months_paying
            .ok_or("--months-paying is required (or provide --input)")?,
        target_margin_pct: args
            .target_margin_pct
            .ok_or("--target-margin-pct is required (or provide --input)")?,
        uf_value: args.uf_value,
    })
}
