//! @acp:module "Default Coercion"
//! @acp:summary "Truthiness and numeric rules of the source dialect for declared defaults"
//! @acp:domain schema
//! @acp:layer utility

use serde_json::{Number, Value};

use super::types::{ArgType, Scalar};

/// Source-dialect truthiness: null, false, 0, NaN and "" are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Source-dialect numeric conversion; `None` where it would yield NaN or infinity
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_numeric_string(s)?,
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] if !matches!(single, Value::Array(_) | Value::Object(_)) => {
                to_number(single)?
            }
            _ => return None,
        },
        Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_numeric_string(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let radix = match digits.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        // signed prefixed literals are NaN in the dialect
        if negative || s.starts_with('+') {
            return None;
        }
        return u64::from_str_radix(&digits[2..], radix).ok().map(|n| n as f64);
    }
    // reject Rust-only spellings such as "inf" and "nan"
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// @acp:summary "Coerce a declared default to the native form of its argument type"
///
/// Float targets take the numeric value or drop the default. Boolean targets
/// accept `true`, `"true"` and `"1"` as true. Everything else is kept as is.
/// Applying it to its own output returns the same value.
pub fn coerce_default(value: &Value, ty: &ArgType) -> Option<Value> {
    if ty.is_scalar(Scalar::Float) {
        let n = to_number(value)?;
        return Number::from_f64(n).map(Value::Number);
    }
    if ty.is_scalar(Scalar::Boolean) {
        let t = matches!(value, Value::Bool(true))
            || matches!(value.as_str(), Some("true") | Some("1"));
        return Some(Value::Bool(t));
    }
    Some(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&v), "{} should be falsy", v);
        }
        for v in [json!(true), json!(1), json!("0"), json!("false"), json!([]), json!({})] {
            assert!(is_truthy(&v), "{} should be truthy", v);
        }
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&json!("10")), Some(10.0));
        assert_eq!(to_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(to_number(&json!("0x10")), Some(16.0));
        assert_eq!(to_number(&json!(true)), Some(1.0));
        assert_eq!(to_number(&json!(["7"])), Some(7.0));
        assert_eq!(to_number(&json!("1m")), None);
        assert_eq!(to_number(&json!("inf")), None);
        assert_eq!(to_number(&json!({})), None);
    }

    #[test]
    fn test_float_coercion_drops_non_numeric() {
        let float = ArgType::Scalar(Scalar::Float);
        assert_eq!(coerce_default(&json!("30"), &float), Some(json!(30.0)));
        assert_eq!(coerce_default(&json!("1s"), &float), None);
    }

    #[test]
    fn test_boolean_coercion() {
        let boolean = ArgType::Scalar(Scalar::Boolean);
        assert_eq!(coerce_default(&json!("true"), &boolean), Some(json!(true)));
        assert_eq!(coerce_default(&json!("1"), &boolean), Some(json!(true)));
        assert_eq!(coerce_default(&json!(true), &boolean), Some(json!(true)));
        assert_eq!(coerce_default(&json!("yes"), &boolean), Some(json!(false)));
        assert_eq!(coerce_default(&json!(1), &boolean), Some(json!(false)));
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let cases = [
            (json!("30"), ArgType::Scalar(Scalar::Float)),
            (json!("1"), ArgType::Scalar(Scalar::Boolean)),
            (json!("open"), ArgType::Scalar(Scalar::String)),
            (json!(["a", "b"]), ArgType::Scalar(Scalar::Json)),
        ];
        for (value, ty) in cases {
            let once = coerce_default(&value, &ty).unwrap();
            assert_eq!(coerce_default(&once, &ty), Some(once.clone()));
        }
    }
}
