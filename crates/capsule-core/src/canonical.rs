//! # Canonical Serialization — Deterministic Capsule Bytes
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in capsule hashing.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only ways to
//! construct it are [`canonicalize()`] and [`CanonicalBytes::new()`], both of
//! which run the full normalization pipeline below. Every hash in the
//! workspace accepts `&CanonicalBytes`, so a digest can never be computed over
//! bytes that skipped normalization.
//!
//! ## Rules
//!
//! 1. **Objects**: keys sorted by Unicode code point, values recursed.
//!    Duplicate keys in source text are resolved by the JSON parser before
//!    they reach this module (last value wins).
//! 2. **Arrays**: element order is preserved.
//! 3. **Strings and keys**: normalized to NFC unless disabled.
//! 4. **Numbers**: rounded to a fixed number of decimals (default 6),
//!    half away from zero, negative zero collapsed, rendered as plain
//!    decimal with trailing fractional zeros trimmed. Never exponent form.
//! 5. **Output**: single line, zero insignificant whitespace.
//!
//! The output is produced by the writer in this module rather than
//! `serde_json::to_string`, so number formatting and the computed key order
//! are under our control.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use serde::ser;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use unicode_normalization::UnicodeNormalization;

use crate::error::CanonicalizationError;

/// Default number of decimal places numbers are rounded to.
pub const DEFAULT_DECIMALS: u32 = 6;

/// Largest supported rounding precision. `10^15` is the largest power of
/// ten below 2^53, so scaling stays exact.
pub const MAX_DECIMALS: u32 = 15;

/// Canonicalization configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalizeOptions {
    /// Round all non-integral numbers to this many decimals.
    pub decimals: u32,
    /// Normalize strings and object keys to Unicode NFC.
    pub normalize_nfc: bool,
}

impl Default for CanonicalizeOptions {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            normalize_nfc: true,
        }
    }
}

/// Bytes produced exclusively by capsule canonicalization.
///
/// # Invariants
///
/// - Valid UTF-8 (the inner buffer is a `String`).
/// - Contains no insignificant whitespace and no exponent-form numbers.
/// - Object keys appear in ascending code point order at every depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(String);

impl CanonicalBytes {
    /// Canonicalize any serializable value with default options.
    ///
    /// Non-finite floats are rejected before the value is converted to the
    /// JSON model, since `serde_json` would otherwise turn them into `null`.
    ///
    /// # Errors
    ///
    /// `NonFiniteNumber` for NaN/±Infinity, `UnsupportedType` for values
    /// with no JSON representation (e.g. maps keyed by non-strings).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        Self::with_options(obj, &CanonicalizeOptions::default())
    }

    /// Canonicalize any serializable value with explicit options.
    pub fn with_options(
        obj: &impl Serialize,
        opts: &CanonicalizeOptions,
    ) -> Result<Self, CanonicalizationError> {
        obj.serialize(FiniteProbe).map_err(|ProbeError(e)| e)?;
        let value = serde_json::to_value(obj)
            .map_err(|e| CanonicalizationError::UnsupportedType(e.to_string()))?;
        canonicalize(&value, opts)
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The canonical JSON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the canonical JSON text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a JSON value.
///
/// Pure and deterministic: identical input and options always yield
/// identical bytes.
pub fn canonicalize(
    value: &Value,
    opts: &CanonicalizeOptions,
) -> Result<CanonicalBytes, CanonicalizationError> {
    let mut out = String::new();
    write_value(&mut out, value, opts)?;
    Ok(CanonicalBytes(out))
}

/// Render a float under the canonical number rules.
///
/// Integral values skip scaling, which keeps large magnitudes exact and
/// means only genuinely non-finite input can fail.
pub fn canonical_f64(value: f64, decimals: u32) -> Result<String, CanonicalizationError> {
    if !value.is_finite() {
        return Err(CanonicalizationError::NonFiniteNumber(value));
    }
    // -0 compares equal to 0; replace it so its sign never reaches the output.
    let value = if value == 0.0 { 0.0 } else { value };

    let rounded = if value.fract() == 0.0 {
        value
    } else {
        let factor = 10f64.powi(decimals as i32);
        let scaled = value * factor;
        if !scaled.is_finite() {
            return Err(CanonicalizationError::NonFiniteNumber(value));
        }
        scaled.round() / factor
    };

    if rounded == 0.0 {
        return Ok("0".to_string());
    }

    let mut out = format!("{:.*}", decimals as usize, rounded);
    if out.contains('.') {
        let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(trimmed);
    }
    Ok(out)
}

fn canonical_number(n: &Number, decimals: u32) -> Result<String, CanonicalizationError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    match n.as_f64() {
        Some(f) => canonical_f64(f, decimals),
        None => Err(CanonicalizationError::UnsupportedType(format!(
            "number {n} has no f64 representation"
        ))),
    }
}

fn normalize_str<'a>(s: &'a str, opts: &CanonicalizeOptions) -> std::borrow::Cow<'a, str> {
    if opts.normalize_nfc {
        std::borrow::Cow::Owned(s.nfc().collect())
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

fn write_value(
    out: &mut String,
    value: &Value,
    opts: &CanonicalizeOptions,
) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&canonical_number(n, opts.decimals)?),
        Value::String(s) => write_json_string(out, &normalize_str(s, opts)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, opts)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // Keys are normalized before sorting so the emitted order is the
            // order of the keys actually written.
            let sorted: BTreeMap<String, &Value> = map
                .iter()
                .map(|(k, v)| (normalize_str(k, opts).into_owned(), v))
                .collect();
            out.push('{');
            for (i, (k, v)) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(out, k);
                out.push(':');
                write_value(out, v, opts)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Standard JSON string escaping: quote, backslash, and control characters.
/// Everything else, including non-ASCII, is written as UTF-8.
fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

// ─── Non-finite probe ────────────────────────────────────────────────

/// Walks a `Serialize` value and fails on the first non-finite float.
/// Everything else is accepted; structural problems surface later from
/// `serde_json::to_value`.
struct FiniteProbe;

#[derive(Debug)]
struct ProbeError(CanonicalizationError);

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ProbeError {}

impl ser::Error for ProbeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ProbeError(CanonicalizationError::UnsupportedType(msg.to_string()))
    }
}

fn check_float(v: f64) -> Result<(), ProbeError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ProbeError(CanonicalizationError::NonFiniteNumber(v)))
    }
}

impl ser::Serializer for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i8(self, _v: i8) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i16(self, _v: i16) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i32(self, _v: i32) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i64(self, _v: i64) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u8(self, _v: u8) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u16(self, _v: u16) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u32(self, _v: u32) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u64(self, _v: u64) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> Result<(), ProbeError> {
        check_float(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<(), ProbeError> {
        check_float(v)
    }
    fn serialize_char(self, _v: char) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_str(self, _v: &str) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_bytes(self, _v: &[u8]) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_none(self) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple(self, _len: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, ProbeError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ProbeError> {
        key.serialize(FiniteProbe)
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn canon(v: &Value) -> String {
        canonicalize(v, &CanonicalizeOptions::default())
            .expect("should canonicalize")
            .into_string()
    }

    #[test]
    fn test_sorted_keys_compact() {
        assert_eq!(canon(&json!({"b": 2, "a": 1, "c": "hello"})), r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_nested_sorting_and_array_order() {
        let v = json!({"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]});
        assert_eq!(canon(&v), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_rounding_collapses_tiny_differences() {
        assert_eq!(canon(&json!(1.0000001)), canon(&json!(1.0)));
        assert_eq!(canon(&json!(1.0)), "1");
    }

    #[test]
    fn test_negative_zero_collapses() {
        assert_eq!(canon(&json!(-0.0)), canon(&json!(0)));
        assert_eq!(canon(&json!(-0.0000001)), "0");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(canonical_f64(2.5, 0).unwrap(), "3");
        assert_eq!(canonical_f64(-2.5, 0).unwrap(), "-3");
        assert_eq!(canonical_f64(0.125, 2).unwrap(), "0.13");
    }

    #[test]
    fn test_trailing_zeros_trimmed() {
        assert_eq!(canon(&json!(1.5)), "1.5");
        assert_eq!(canon(&json!(0.1)), "0.1");
        assert_eq!(canon(&json!(-12.25)), "-12.25");
        assert_eq!(canon(&json!(3.14159265)), "3.141593");
    }

    #[test]
    fn test_no_exponent_form() {
        assert_eq!(canon(&json!(1e20)), "100000000000000000000");
        assert_eq!(canon(&json!(0.000001)), "0.000001");
        assert!(!canon(&json!(1e-7)).contains('e'));
    }

    #[test]
    fn test_integers_exact() {
        assert_eq!(canon(&json!(-42)), "-42");
        assert_eq!(canon(&json!(u64::MAX)), u64::MAX.to_string());
    }

    #[test]
    fn test_configurable_decimals() {
        let opts = CanonicalizeOptions {
            decimals: 2,
            normalize_nfc: true,
        };
        let cb = canonicalize(&json!({"v": 1.23456}), &opts).unwrap();
        assert_eq!(cb.as_str(), r#"{"v":1.23}"#);
    }

    #[test]
    fn test_nfc_normalization() {
        // "e" + combining acute accent vs precomposed "é".
        let decomposed = json!({"name": "e\u{0301}"});
        let composed = json!({"name": "\u{00e9}"});
        assert_eq!(canon(&decomposed), canon(&composed));
    }

    #[test]
    fn test_nfc_can_be_disabled() {
        let opts = CanonicalizeOptions {
            decimals: 6,
            normalize_nfc: false,
        };
        let a = canonicalize(&json!("e\u{0301}"), &opts).unwrap();
        let b = canonicalize(&json!("\u{00e9}"), &opts).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_keys_are_normalized() {
        let v = json!({"e\u{0301}": 1});
        assert_eq!(canon(&v), "{\"\u{00e9}\":1}");
    }

    #[test]
    fn test_code_point_key_order() {
        // U+FF61 sorts after U+1F600 in UTF-16 order but before it by code point.
        let v = json!({"\u{1F600}": 1, "\u{FF61}": 2, "a": 3});
        assert_eq!(canon(&v), "{\"a\":3,\"\u{FF61}\":2,\"\u{1F600}\":1}");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(canon(&json!("a\"b\\c\nd\u{0001}")), r#""a\"b\\c\nd\u0001""#);
        assert_eq!(canon(&json!("snow ☃")), "\"snow ☃\"");
    }

    #[test]
    fn test_scalars_and_empties() {
        assert_eq!(canon(&json!(null)), "null");
        assert_eq!(canon(&json!(true)), "true");
        assert_eq!(canon(&json!({})), "{}");
        assert_eq!(canon(&json!([])), "[]");
    }

    #[test]
    fn test_non_finite_rejected() {
        assert_eq!(
            canonical_f64(f64::NAN, 6).unwrap_err().to_string(),
            CanonicalizationError::NonFiniteNumber(f64::NAN).to_string()
        );
        assert!(canonical_f64(f64::INFINITY, 6).is_err());
        assert!(canonical_f64(f64::NEG_INFINITY, 6).is_err());
    }

    #[test]
    fn test_typed_non_finite_rejected() {
        #[derive(serde::Serialize)]
        struct Reading {
            value: f64,
        }
        let err = CanonicalBytes::new(&Reading { value: f64::NAN }).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFiniteNumber(_)));
        let err = CanonicalBytes::new(&vec![1.0, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, CanonicalizationError::NonFiniteNumber(_)));
    }

    #[test]
    fn test_non_string_keys_unsupported() {
        let mut m: HashMap<(u8, u8), u8> = HashMap::new();
        m.insert((1, 2), 3);
        let err = CanonicalBytes::new(&m).unwrap_err();
        assert!(matches!(err, CanonicalizationError::UnsupportedType(_)));
    }

    #[test]
    fn test_typed_input_matches_value_input() {
        #[derive(serde::Serialize)]
        struct Event {
            zeta: u32,
            alpha: &'static str,
        }
        let typed = CanonicalBytes::new(&Event { zeta: 1, alpha: "x" }).unwrap();
        assert_eq!(typed.as_str(), canon(&json!({"alpha": "x", "zeta": 1})));
    }

    #[test]
    fn test_len_and_bytes() {
        let cb = canonicalize(&json!({"a": 1}), &CanonicalizeOptions::default()).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":1}"#);
        assert_eq!(cb.len(), 7);
        assert!(!cb.is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e9f64..1.0e9f64).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ éü]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,8}", inner), 0..8).prop_map(|pairs| {
                    Value::Object(pairs.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        /// Canonical output is valid JSON.
        #[test]
        fn canonical_is_valid_json(value in json_value()) {
            let cb = canonicalize(&value, &CanonicalizeOptions::default()).unwrap();
            prop_assert!(serde_json::from_str::<Value>(cb.as_str()).is_ok());
        }

        /// Re-canonicalizing the canonical text yields the same bytes.
        #[test]
        fn canonical_is_idempotent(value in json_value()) {
            let opts = CanonicalizeOptions::default();
            let first = canonicalize(&value, &opts).unwrap();
            let reparsed: Value = serde_json::from_str(first.as_str()).unwrap();
            let second = canonicalize(&reparsed, &opts).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Key insertion order never affects the output.
        #[test]
        fn key_order_is_irrelevant(
            pairs in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 1..8)
        ) {
            let forward: serde_json::Map<String, Value> = pairs
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let reverse: serde_json::Map<String, Value> = pairs
                .iter()
                .rev()
                .map(|(k, v)| (k.clone(), serde_json::json!(v)))
                .collect();
            let opts = CanonicalizeOptions::default();
            prop_assert_eq!(
                canonicalize(&Value::Object(forward), &opts).unwrap(),
                canonicalize(&Value::Object(reverse), &opts).unwrap()
            );
        }

        /// Finite floats never render in exponent form.
        #[test]
        fn floats_never_use_exponent(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            let s = canonical_f64(f, DEFAULT_DECIMALS).unwrap();
            prop_assert!(!s.contains('e') && !s.contains('E'), "exponent in {}", s);
            prop_assert!(!s.starts_with("-0") || s.starts_with("-0."), "negative zero in {}", s);
        }
    }
}
