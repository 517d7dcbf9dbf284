//! Series API payload → tidy series.
//!
//! The API answers with `data` (rows of `[timestamp, value]`) and `headers`
//! (column descriptors with a `name`). Normalization:
//! 1. Reject payloads without data rows or with fewer than two named headers
//! 2. Coerce each row's first cell to a date and second cell to a number
//! 3. Drop rows where either coercion fails (logged, never fatal)
//! 4. Sort ascending by date, dropping repeated dates

use super::provider::FetchError;
use crate::domain::{parse_date, Observation, TidySeries};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Raw JSON body of a series query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesPayload {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub headers: Option<Vec<HeaderDescriptor>>,
}

/// Column descriptor; only `name` matters here, other metadata is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeaderDescriptor {
    #[serde(default)]
    pub name: Option<String>,
}

/// Decode a response body. Any decoding failure is a malformed response.
pub fn parse_payload(series_id: &str, body: &str) -> Result<SeriesPayload, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse {
        series_id: series_id.to_string(),
        reason: format!("invalid JSON body: {e}"),
    })
}

/// Validate a decoded payload and turn it into a tidy series.
pub fn normalize_payload(series_id: &str, payload: SeriesPayload) -> Result<TidySeries, FetchError> {
    let malformed = |reason: String| FetchError::MalformedResponse {
        series_id: series_id.to_string(),
        reason,
    };

    let data = payload.data.unwrap_or_default();
    let headers = payload.headers.unwrap_or_default();

    if data.is_empty() {
        return Err(malformed("no data rows".into()));
    }
    if headers.len() < 2 {
        return Err(malformed(format!(
            "expected at least 2 column headers, got {}",
            headers.len()
        )));
    }
    let (date_col, value_col) = match (&headers[0].name, &headers[1].name) {
        (Some(d), Some(v)) => (d.as_str(), v.as_str()),
        _ => return Err(malformed("column headers without a name".into())),
    };
    debug!(series_id, date_col, value_col, rows = data.len(), "normalizing payload");

    let total = data.len();
    let mut rows = Vec::with_capacity(total);
    for row in &data {
        if let Some(obs) = coerce_row(row) {
            rows.push(obs);
        }
    }
    let unparseable = total - rows.len();

    let (series, discarded) = TidySeries::from_observations_counted(rows);
    if unparseable > 0 {
        warn!(series_id, dropped = unparseable, total, "dropped rows with unparseable date or value");
    }
    if discarded > 0 {
        warn!(series_id, dropped = discarded, "dropped rows with repeated dates");
    }
    if series.is_empty() {
        warn!(series_id, "no usable observations after normalization");
    }

    Ok(series)
}

/// `[date, value]` → observation, or `None` if either cell cannot be coerced.
fn coerce_row(row: &Value) -> Option<Observation> {
    let cells = row.as_array()?;
    if cells.len() < 2 {
        return None;
    }
    let date = coerce_date(&cells[0])?;
    let value = coerce_value(&cells[1])?;
    Some(Observation { date, value })
}

fn coerce_date(cell: &Value) -> Option<chrono::NaiveDate> {
    match cell {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

fn coerce_value(cell: &Value) -> Option<f64> {
    let v = match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn payload(v: Value) -> SeriesPayload {
        serde_json::from_value(v).unwrap()
    }

    fn headers() -> Value {
        json!([
            {"name": "indice_tiempo", "frequency": "month"},
            {"name": "tipo_cambio", "units": "ARS/USD"}
        ])
    }

    #[test]
    fn normalizes_sorts_and_coerces() {
        let p = payload(json!({
            "data": [["2020-02-01", 62.5], ["2020-01-01", "60.0"], ["2020-03-01", 64]],
            "headers": headers(),
        }));
        let s = normalize_payload("usd", p).unwrap();
        assert_eq!(
            s.observations(),
            &[
                Observation::new(d("2020-01-01"), 60.0),
                Observation::new(d("2020-02-01"), 62.5),
                Observation::new(d("2020-03-01"), 64.0),
            ]
        );
    }

    #[test]
    fn drops_unparseable_rows() {
        let p = payload(json!({
            "data": [
                ["2020-01-01", 1.0],
                ["not a date", 2.0],
                ["2020-03-01", null],
                ["2020-04-01", "n/a"],
                ["2020-05-01"],
                "garbage",
                ["2020-06-01", 6.0]
            ],
            "headers": headers(),
        }));
        let s = normalize_payload("usd", p).unwrap();
        assert_eq!(s.dates().collect::<Vec<_>>(), vec![d("2020-01-01"), d("2020-06-01")]);
    }

    #[test]
    fn empty_data_is_malformed_and_names_series() {
        let p = payload(json!({"data": [], "headers": headers()}));
        let err = normalize_payload("147.3_IBIENESUYO_DICI_T_15", p).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.series_id(), Some("147.3_IBIENESUYO_DICI_T_15"));
    }

    #[test]
    fn missing_fields_are_malformed() {
        let err = normalize_payload("x", payload(json!({"headers": headers()}))).unwrap_err();
        assert!(err.is_malformed());

        let err = normalize_payload("x", payload(json!({"data": null, "headers": headers()})))
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn short_headers_are_malformed() {
        let p = payload(json!({
            "data": [["2020-01-01", 1.0]],
            "headers": [{"name": "indice_tiempo"}],
        }));
        let err = normalize_payload("x", p).unwrap_err();
        assert!(err.to_string().contains("at least 2 column headers"));
    }

    #[test]
    fn unnamed_headers_are_malformed() {
        let p = payload(json!({
            "data": [["2020-01-01", 1.0]],
            "headers": [{"name": "indice_tiempo"}, {"units": "x"}],
        }));
        assert!(normalize_payload("x", p).unwrap_err().is_malformed());
    }

    #[test]
    fn all_rows_unparseable_yields_empty_series() {
        let p = payload(json!({
            "data": [["bad", 1.0], ["2020-01-01", null]],
            "headers": headers(),
        }));
        let s = normalize_payload("x", p).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_payload("x", "<html>maintenance</html>").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("invalid JSON"));
    }
}
