//! Lenient deserializers for form input.
//!
//! Browser forms post numbers as strings and yes/no selects as `"yes"`/`"no"`.
//! These helpers accept both the loose and the typed JSON shapes so that
//! malformed values surface as field-level validation errors instead of
//! rejecting the whole body.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberInput {
    Number(f64),
    Text(String),
    Null,
}

impl NumberInput {
    fn into_f64(self) -> Option<f64> {
        match self {
            NumberInput::Number(n) => Some(n),
            NumberInput::Text(s) => s.trim().parse::<f64>().ok(),
            NumberInput::Null => None,
        }
        .filter(|n| n.is_finite())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagInput {
    Bool(bool),
    Number(i64),
    Text(String),
    Null,
}

/// Whole-number field. Unparseable, negative or missing input becomes `0`,
/// which every bounded field rejects with its own message.
pub fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberInput::deserialize(deserializer)?.into_f64();
    Ok(value
        .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
        .unwrap_or(0))
}

/// Fractional field (shoe sizes come in halves). Unparseable input, or a value
/// too large for `f32`, becomes `0.0`.
pub fn decimal<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberInput::deserialize(deserializer)?.into_f64();
    Ok(value
        .map(|n| n as f32)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0))
}

/// Optional price. Empty strings and `null` mean "not offered".
pub fn optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberInput::deserialize(deserializer)? {
        NumberInput::Null => Ok(None),
        NumberInput::Text(s) if s.trim().is_empty() => Ok(None),
        NumberInput::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid price '{s}'"))),
        NumberInput::Number(n) => Ok(Some(n)),
    }
}

/// Boolean flag encoded either as a JSON bool or as `"yes"`/`"no"`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagInput::deserialize(deserializer)? {
        FlagInput::Bool(b) => b,
        FlagInput::Number(n) => n != 0,
        FlagInput::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "true" | "on" | "1"
        ),
        FlagInput::Null => false,
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::whole_number")]
        age: u32,
        #[serde(deserialize_with = "super::decimal")]
        shoe: f32,
        #[serde(default, deserialize_with = "super::optional_price")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "super::flag")]
        flag: bool,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numbers_accept_strings() {
        let p = sample(r#"{"age": "25", "shoe": "38.5", "price": "50", "flag": "yes"}"#);
        assert_eq!(p.age, 25);
        assert_eq!(p.shoe, 38.5);
        assert_eq!(p.price, Some(50.0));
        assert!(p.flag);
    }

    #[test]
    fn test_garbage_numbers_become_zero() {
        let p = sample(r#"{"age": "abc", "shoe": "", "flag": "no"}"#);
        assert_eq!(p.age, 0);
        assert_eq!(p.shoe, 0.0);
        assert!(!p.flag);
    }

    #[test]
    fn test_decimal_out_of_f32_range_becomes_zero() {
        assert_eq!(sample(r#"{"age": 20, "shoe": "1e39"}"#).shoe, 0.0);
        assert_eq!(sample(r#"{"age": 20, "shoe": -1e39}"#).shoe, 0.0);
    }

    #[test]
    fn test_negative_age_becomes_zero() {
        assert_eq!(sample(r#"{"age": -4, "shoe": 37}"#).age, 0);
    }

    #[test]
    fn test_empty_price_is_absent() {
        assert_eq!(sample(r#"{"age": 20, "shoe": 37, "price": ""}"#).price, None);
        assert_eq!(sample(r#"{"age": 20, "shoe": 37, "price": null}"#).price, None);
    }

    #[test]
    fn test_unparseable_price_is_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"age": 20, "shoe": 37, "price": "cheap"}"#).is_err());
    }

    #[test]
    fn test_flag_accepts_bool_and_missing() {
        assert!(sample(r#"{"age": 20, "shoe": 37, "flag": true}"#).flag);
        assert!(!sample(r#"{"age": 20, "shoe": 37}"#).flag);
    }
}
