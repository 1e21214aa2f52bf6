//! Raw value coercion into schema field types.
//!
//! Two entry points, one per source representation:
//!
//! - [`coerce_text`] for legacy DYR tokens, which are always strings
//! - [`coerce_dynamic`] for structured-format values, which arrive as native
//!   scalars (or lists) and only fall back to string parsing for text
//!
//! Both are pure and report failures as [`ConversionError`].

use gridyn_core::{ConversionError, FieldType, RawValue, Value};

/// Parse an integer token, ignoring surrounding whitespace.
pub fn parse_int(raw: &str) -> Result<i64, ConversionError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| ConversionError::new(FieldType::Integer, raw, e.to_string()))
}

/// Parse a float token, ignoring surrounding whitespace.
///
/// Fortran-style exponents with an `E`/`e` marker (`0.60000E-01`) are
/// accepted as-is. A `D` exponent marker (`1.5D-3`) is not.
pub fn parse_float(raw: &str) -> Result<f64, ConversionError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| ConversionError::new(FieldType::Float, raw, e.to_string()))
}

/// Trim a token and strip one matching pair of surrounding single quotes.
pub fn parse_text(raw: &str) -> String {
    strip_quotes(raw.trim()).to_string()
}

/// Parse a legacy boolean token: `1`/`true`/`t` or `0`/`false`/`f`.
pub fn parse_bool(raw: &str) -> Result<bool, ConversionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" => Ok(true),
        "0" | "false" | "f" => Ok(false),
        _ => Err(ConversionError::new(
            FieldType::Boolean,
            raw,
            "expected one of 1, 0, true, false, t, f",
        )),
    }
}

/// Strip one layer of matching single quotes, if present.
pub(crate) fn strip_quotes(token: &str) -> &str {
    token
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(token)
}

/// Coerce a legacy text token into `target`.
pub fn coerce_text(target: FieldType, raw: &str) -> Result<Value, ConversionError> {
    match target {
        FieldType::Integer => parse_int(raw).map(Value::Integer),
        FieldType::Float => parse_float(raw).map(Value::Float),
        FieldType::Text => Ok(Value::Text(parse_text(raw))),
        FieldType::Boolean => parse_bool(raw).map(Value::Boolean),
    }
}

/// Coerce a structured-format value into `target`.
///
/// Native values of the target type pass through unchanged. Integers widen to
/// floats, whole floats narrow to integers, scalars render to text, and
/// strings are parsed. Lists never convert.
pub fn coerce_dynamic(target: FieldType, raw: &RawValue) -> Result<Value, ConversionError> {
    let mismatch = |reason: &str| ConversionError::new(target, raw.to_string(), reason);

    match (target, raw) {
        (_, RawValue::List(_)) => Err(mismatch("lists cannot be stored in a scalar field")),

        (FieldType::Integer, RawValue::Integer(i)) => Ok(Value::Integer(*i)),
        (FieldType::Integer, RawValue::Float(f)) => float_to_int(*f)
            .map(Value::Integer)
            .ok_or_else(|| mismatch("float has a fractional part or is out of range")),
        (FieldType::Integer, RawValue::Text(s)) => parse_int(s).map(Value::Integer),

        (FieldType::Float, RawValue::Float(f)) => Ok(Value::Float(*f)),
        (FieldType::Float, RawValue::Integer(i)) => Ok(Value::Float(*i as f64)),
        (FieldType::Float, RawValue::Text(s)) => parse_float(s).map(Value::Float),

        (FieldType::Text, RawValue::Text(s)) => Ok(Value::Text(s.clone())),
        (FieldType::Text, scalar) => Ok(Value::Text(scalar.to_string())),

        (FieldType::Boolean, RawValue::Boolean(b)) => Ok(Value::Boolean(*b)),
        (FieldType::Boolean, RawValue::Integer(i)) => Ok(Value::Boolean(*i != 0)),
        (FieldType::Boolean, RawValue::Text(s)) => parse_loose_bool(s)
            .map(Value::Boolean)
            .ok_or_else(|| mismatch("expected one of 1, 0, true, false, t, f, yes, no, y, n")),

        (_, other) => Err(mismatch(&format!(
            "{} value cannot be converted to {}",
            other.kind(),
            target
        ))),
    }
}

fn parse_loose_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => Some(true),
        "0" | "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn float_to_int(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
    {
        Some(value as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_numeric_tokens() {
        assert_eq!(parse_int("  123  ").unwrap(), 123);
        assert!(parse_int("12.5").is_err());
        assert!(parse_int("abc").is_err());

        let v = parse_float("0.60000E-01").unwrap();
        assert!((v - 0.06).abs() < 1e-12);
        assert_eq!(parse_float(" 5.0 ").unwrap(), 5.0);
        assert_eq!(parse_float("1e3").unwrap(), 1000.0);
        assert!(parse_float("1.5D-3").is_err());
    }

    #[test]
    fn legacy_text_and_bool_tokens() {
        assert_eq!(parse_text("'GENROU'"), "GENROU");
        assert_eq!(parse_text("  'A B'  "), "A B");
        assert_eq!(parse_text("plain"), "plain");
        assert_eq!(parse_text("'"), "'");

        assert!(!parse_bool("FALSE").unwrap());
        assert!(parse_bool("t").unwrap());
        assert!(parse_bool(" 1 ").unwrap());
        let err = parse_bool("invalid").unwrap_err();
        assert_eq!(err.target, FieldType::Boolean);
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn coerce_text_dispatches_by_type() {
        assert_eq!(
            coerce_text(FieldType::Integer, "7").unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            coerce_text(FieldType::Text, "'1'").unwrap(),
            Value::Text("1".into())
        );
        assert!(coerce_text(FieldType::Float, "x").is_err());
    }

    #[test]
    fn dynamic_identity() {
        for (target, raw, expected) in [
            (FieldType::Integer, RawValue::Integer(3), Value::Integer(3)),
            (FieldType::Float, RawValue::Float(2.5), Value::Float(2.5)),
            (
                FieldType::Text,
                RawValue::Text("x".into()),
                Value::Text("x".into()),
            ),
            (FieldType::Boolean, RawValue::Boolean(true), Value::Boolean(true)),
        ] {
            assert_eq!(coerce_dynamic(target, &raw).unwrap(), expected);
        }
    }

    #[test]
    fn dynamic_numeric_promotion() {
        assert_eq!(
            coerce_dynamic(FieldType::Float, &RawValue::Integer(2)).unwrap(),
            Value::Float(2.0)
        );
        assert_eq!(
            coerce_dynamic(FieldType::Integer, &RawValue::Float(4.0)).unwrap(),
            Value::Integer(4)
        );
        assert!(coerce_dynamic(FieldType::Integer, &RawValue::Float(4.5)).is_err());
        assert!(coerce_dynamic(FieldType::Integer, &RawValue::Float(f64::NAN)).is_err());
        assert!(coerce_dynamic(FieldType::Integer, &RawValue::Float(1e300)).is_err());
    }

    #[test]
    fn dynamic_text_rendering() {
        assert_eq!(
            coerce_dynamic(FieldType::Text, &RawValue::Integer(1)).unwrap(),
            Value::Text("1".into())
        );
        assert_eq!(
            coerce_dynamic(FieldType::Text, &RawValue::Float(1.0)).unwrap(),
            Value::Text("1.0".into())
        );
        assert_eq!(
            coerce_dynamic(FieldType::Text, &RawValue::Boolean(false)).unwrap(),
            Value::Text("false".into())
        );
    }

    #[test]
    fn dynamic_booleans() {
        for s in ["1", "TRUE", "t", "Yes", "y"] {
            assert_eq!(
                coerce_dynamic(FieldType::Boolean, &RawValue::Text(s.into())).unwrap(),
                Value::Boolean(true)
            );
        }
        for s in ["0", "false", "F", "no", "N"] {
            assert_eq!(
                coerce_dynamic(FieldType::Boolean, &RawValue::Text(s.into())).unwrap(),
                Value::Boolean(false)
            );
        }
        assert!(coerce_dynamic(FieldType::Boolean, &RawValue::Text("maybe".into())).is_err());
        assert_eq!(
            coerce_dynamic(FieldType::Boolean, &RawValue::Integer(-2)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            coerce_dynamic(FieldType::Boolean, &RawValue::Integer(0)).unwrap(),
            Value::Boolean(false)
        );
        assert!(coerce_dynamic(FieldType::Boolean, &RawValue::Float(1.0)).is_err());
    }

    #[test]
    fn dynamic_strings_and_lists() {
        assert_eq!(
            coerce_dynamic(FieldType::Float, &RawValue::Text("0.60000E-01".into())).unwrap(),
            Value::Float(0.06)
        );
        assert!(coerce_dynamic(FieldType::Integer, &RawValue::Text("abc".into())).is_err());
        assert!(coerce_dynamic(FieldType::Integer, &RawValue::Boolean(true)).is_err());

        let list = RawValue::List(vec![RawValue::Integer(1)]);
        for target in [
            FieldType::Integer,
            FieldType::Float,
            FieldType::Text,
            FieldType::Boolean,
        ] {
            let err = coerce_dynamic(target, &list).unwrap_err();
            assert_eq!(err.target, target);
            assert_eq!(err.raw, "[1]");
        }
    }
}
