//! Reduction of a reading series to one sensor value

use ma_core::{AggregationMethod, SensorValue};

/// Aggregates above this magnitude are reported as integers
const INTEGER_THRESHOLD: f64 = 100.0;

/// Apply `method` to readings ordered newest first
///
/// Returns `None` for an empty series.
pub fn aggregate(values: &[f64], method: AggregationMethod) -> Option<f64> {
    let (first, last) = (values.first()?, values.last()?);

    let result = match method {
        AggregationMethod::Maximum => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationMethod::Minimum => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregationMethod::Difference => first - last,
    };

    Some(result)
}

/// Shape an aggregate for display
///
/// Magnitudes above 100 are truncated toward zero, everything else is
/// rounded to one decimal place.
pub fn display_value(result: f64) -> SensorValue {
    if result.abs() > INTEGER_THRESHOLD {
        SensorValue::Integer(result.trunc() as i64)
    } else {
        SensorValue::Float(round_one_decimal(result))
    }
}

/// Round on the exact binary value, so 42.345 (stored as 42.34499...) gives 42.3
fn round_one_decimal(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Aggregate and shape in one step; an empty series yields 0
pub fn reduce(values: &[f64], method: AggregationMethod) -> SensorValue {
    aggregate(values, method)
        .map(display_value)
        .unwrap_or_default()
}
