use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization_table(input_json: String) -> NapiResult<String> {
    let input: propfin_core::amortization::schedule::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = propfin_core::amortization::schedule::build_amortization_table(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_summary(input_json: String) -> NapiResult<String> {
    let input: propfin_core::amortization::schedule::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        propfin_core::amortization::schedule::loan_summary(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Returns the collected validation messages; an empty array means the
/// inputs are acceptable. Never fails on bad values, only on bad JSON.
#[napi]
pub fn validate_loan_inputs(input_json: String) -> NapiResult<Vec<String>> {
    let input: propfin_core::amortization::schedule::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    Ok(propfin_core::amortization::schedule::validate(&input))
}

// ---------------------------------------------------------------------------
// Flipping
// ---------------------------------------------------------------------------

#[napi]
pub fn flip_metrics(input_json: String) -> NapiResult<String> {
    let input: propfin_core::flipping::metrics::FlippingInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        propfin_core::flipping::metrics::compute_flip_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Classify already-computed metrics and attach the offer advisory.
#[napi]
pub fn classify_flip(metrics_json: String) -> NapiResult<String> {
    let metrics: propfin_core::flipping::metrics::FlippingMetrics =
        serde_json::from_str(&metrics_json).map_err(to_napi_error)?;
    let light = propfin_core::flipping::stoplight::classify(&metrics);
    let advisory = propfin_core::flipping::stoplight::mao_advisory(&metrics);

    let value = serde_json::json!({
        "tier": light.tier,
        "title": light.title,
        "message": light.message,
        "mao_advisory": advisory,
    });
    serde_json::to_string(&value).map_err(to_napi_error)
}
