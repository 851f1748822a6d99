use serde::Serialize;
use serde_json::json;

use crate::db::samples::PriceSample;

/// Outbound wire message: one OHLC row plus whatever indicator values the
/// trailing window supported.  Absent indicators are omitted from the JSON
/// entirely (never null), so the chart can probe with `"sma_20" in data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSample {
    pub time: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_lower: Option<f64>,
}

impl EnrichedSample {
    pub fn from_sample(sample: &PriceSample) -> Self {
        Self {
            time: sample.time,
            open_price: sample.open_price,
            high_price: sample.high_price,
            low_price: sample.low_price,
            close_price: sample.close_price,
            sma_20: None,
            macd: None,
            macd_signal: None,
            rsi: None,
            bb_upper: None,
            bb_middle: None,
            bb_lower: None,
        }
    }
}

/// Payload for a viewer that connects before any rows exist.
pub fn no_data_payload() -> String {
    json!({ "error": "No data available" }).to_string()
}

/// Payload for a viewer whose snapshot query failed.
pub fn query_error_payload() -> String {
    json!({ "error": "Database query error" }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample() -> PriceSample {
        PriceSample {
            time: 1700000000,
            open_price: 1.0,
            high_price: 2.0,
            low_price: 0.5,
            close_price: 1.5,
        }
    }

    #[test]
    fn bare_sample_serializes_without_indicator_keys() {
        let text = serde_json::to_string(&EnrichedSample::from_sample(&sample())).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["time"], 1700000000);
        assert_eq!(v["close_price"], 1.5);
        assert!(v.get("sma_20").is_none());
        assert!(v.get("rsi").is_none());
        assert!(v.get("bb_middle").is_none());
    }

    #[test]
    fn present_indicators_serialize_as_plain_numbers() {
        let mut enriched = EnrichedSample::from_sample(&sample());
        enriched.sma_20 = Some(10.5);
        enriched.rsi = Some(55.0);
        let v: Value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(v["sma_20"], 10.5);
        assert_eq!(v["rsi"], 55.0);
    }

    #[test]
    fn error_payloads_match_the_wire_contract() {
        let v: Value = serde_json::from_str(&no_data_payload()).unwrap();
        assert_eq!(v["error"], "No data available");
        let v: Value = serde_json::from_str(&query_error_payload()).unwrap();
        assert_eq!(v["error"], "Database query error");
    }
}
