use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a loosely typed JSON value into a decimal.
///
/// Accepts numbers and numeric strings (`"12.5"`, `" 7 "`). Anything else
/// (null, empty string, `"n/a"`, booleans, NaN) yields `None`.
pub fn lenient_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_decimal_numbers() {
        assert_eq!(lenient_decimal(&json!(12)), Some(Decimal::from(12)));
        assert_eq!(
            lenient_decimal(&json!(2.5)),
            Some(Decimal::from_str("2.5").unwrap())
        );
    }

    #[test]
    fn test_lenient_decimal_strings() {
        assert_eq!(
            lenient_decimal(&json!(" 7.25 ")),
            Some(Decimal::from_str("7.25").unwrap())
        );
        assert_eq!(lenient_decimal(&json!("")), None);
        assert_eq!(lenient_decimal(&json!("n/a")), None);
    }

    #[test]
    fn test_lenient_decimal_other() {
        assert_eq!(lenient_decimal(&json!(null)), None);
        assert_eq!(lenient_decimal(&json!(true)), None);
        assert_eq!(lenient_decimal(&json!([1])), None);
    }
}
