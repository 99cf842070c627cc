use rust_decimal::Decimal;
use serde_json::Value;
use std::io;
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => print_table(value),
        OutputFormat::Csv => print_csv(value),
        OutputFormat::Minimal => print_minimal(value),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Column contract for schedule exports, consumed by downstream tooling.
/// One line per period, fixed six-decimal values.
const SCHEDULE_HEADER: [&str; 7] = [
    "cuota",
    "saldo_inicial",
    "interes",
    "amortizacion",
    "saldo_final",
    "seguros",
    "pago_total",
];

/// Schedule row fields, in header order after the period column.
const SCHEDULE_COLUMNS: [&str; 6] = [
    "opening_balance",
    "interest",
    "principal_amortized",
    "closing_balance",
    "insurance",
    "total_payment",
];

/// Write output as CSV to stdout. Amortization schedules get the fixed
/// column contract; any other payload falls back to field,value pairs.
fn print_csv(value: &Value) {
    if let Some(rows) = value.pointer("/result/rows").and_then(Value::as_array) {
        match schedule_csv(rows) {
            Ok(csv_text) => print!("{}", csv_text),
            Err(e) => eprintln!("CSV serialization error: {}", e),
        }
        return;
    }

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in fields {
                let _ = wtr.write_record([key.as_str(), &format_value(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn schedule_csv(rows: &[Value]) -> Result<String, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(SCHEDULE_HEADER)?;

    for row in rows {
        let map = row
            .as_object()
            .ok_or("schedule row is not a JSON object")?;

        let period = map
            .get("period")
            .and_then(Value::as_u64)
            .ok_or("schedule row is missing its period")?;

        let mut record = Vec::with_capacity(SCHEDULE_HEADER.len());
        record.push(period.to_string());
        for column in SCHEDULE_COLUMNS {
            let cell = map
                .get(column)
                .ok_or_else(|| format!("schedule row is missing '{column}'"))?;
            record.push(six_decimals(cell)?);
        }
        wtr.write_record(&record)?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

/// Monetary cells print with exactly six decimal places.
fn six_decimals(value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    let decimal = match value {
        Value::String(s) => Decimal::from_str(s)?,
        Value::Number(n) => Decimal::from_str(&n.to_string())?,
        other => return Err(format!("expected a numeric cell, got {other}").into()),
    };
    Ok(format!("{:.6}", decimal))
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Format output as a table using the tabled crate.
fn print_table(value: &Value) {
    if let Some(rows) = value.pointer("/result/rows").and_then(Value::as_array) {
        print_array_table(rows);
        print_envelope_footer(value);
        return;
    }

    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in fields {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
            print_envelope_footer(value);
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_envelope_footer(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

// ---------------------------------------------------------------------------
// Minimal
// ---------------------------------------------------------------------------

/// Print just the key answer value from the output.
fn print_minimal(value: &Value) {
    // A classified flip answers with its tier
    if let Some(Value::String(tier)) = value.pointer("/stoplight/tier") {
        println!("{}", tier);
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = ["total_installment", "base_installment", "mao", "gross_profit"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_value(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schedule_csv_header_and_precision() {
        let rows = vec![
            json!({
                "period": 1,
                "opening_balance": "80000",
                "interest": "800",
                "principal_amortized": "6307.9028",
                "closing_balance": "73692.0972",
                "insurance": "35",
                "total_payment": "7142.9028"
            }),
            json!({
                "period": 2,
                "opening_balance": "73692.0972",
                "interest": "736.920972",
                "principal_amortized": "6370.981828",
                "closing_balance": "67321.115372",
                "insurance": "35",
                "total_payment": "7142.902800"
            }),
        ];

        let text = schedule_csv(&rows).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "cuota,saldo_inicial,interes,amortizacion,saldo_final,seguros,pago_total"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,80000.000000,800.000000,6307.902800,73692.097200,35.000000,7142.902800"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2,73692.097200,736.920972,6370.981828,67321.115372,35.000000,7142.902800"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_six_decimals_rounds_long_fractions() {
        let cell = json!("1234.56789012345");
        assert_eq!(six_decimals(&cell).unwrap(), "1234.567890");
    }

    #[test]
    fn test_schedule_csv_rejects_malformed_row() {
        let rows = vec![json!({"period": 1})];
        assert!(schedule_csv(&rows).is_err());
    }
}
