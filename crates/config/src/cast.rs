//! Typed conversions over retrieved configuration values.
//!
//! Responsibilities:
//! - Wrap the result of `Config::get` and expose typed accessors.
//! - Apply lenient conversions so env-style strings (`"8080"`, `"true"`) cast cleanly.
//!
//! Does NOT handle:
//! - Key lookup (see the individual stores).
//!
//! Invariants:
//! - A missing value always yields `CastError::Missing`, never a default.
//! - Conversion failures are scoped to the accessor call and never touch store state.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CastError;

/// Typed view over a configuration value that may be absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Caster {
    value: Option<Value>,
}

impl Caster {
    pub fn new(value: Option<Value>) -> Self {
        Self { value }
    }

    /// True if the value is absent or an explicit JSON null.
    pub fn is_nil(&self) -> bool {
        matches!(self.value, None | Some(Value::Null))
    }

    /// True if the key was found, even when it holds null.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// The raw value, if any.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn string(&self) -> Result<String, CastError> {
        match self.present()? {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(mismatch("string", other)),
        }
    }

    /// Booleans, `0`/`1`, and the usual spellings of true and false.
    pub fn bool(&self) -> Result<bool, CastError> {
        match self.present()? {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(CastError::Parse {
                    expected: "bool",
                    input: n.to_string(),
                }),
            },
            Value::String(s) => parse_bool(s.trim()).ok_or_else(|| CastError::Parse {
                expected: "bool",
                input: s.clone(),
            }),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn i64(&self) -> Result<i64, CastError> {
        match self.present()? {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i)
                } else if n.is_u64() {
                    Err(out_of_range("i64", n))
                } else {
                    float_to_i64(n.as_f64().unwrap_or(f64::NAN), n)
                }
            }
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| CastError::Parse {
                expected: "i64",
                input: s.clone(),
            }),
            other => Err(mismatch("i64", other)),
        }
    }

    pub fn i32(&self) -> Result<i32, CastError> {
        let wide = self.i64()?;
        i32::try_from(wide).map_err(|_| CastError::OutOfRange {
            expected: "i32",
            value: wide.to_string(),
        })
    }

    pub fn u64(&self) -> Result<u64, CastError> {
        match self.present()? {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(u)
                } else if n.is_i64() {
                    Err(out_of_range("u64", n))
                } else {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && (0.0..u64::MAX as f64).contains(&f) {
                        Ok(f as u64)
                    } else {
                        Err(out_of_range("u64", n))
                    }
                }
            }
            Value::String(s) => s.trim().parse::<u64>().map_err(|_| CastError::Parse {
                expected: "u64",
                input: s.clone(),
            }),
            other => Err(mismatch("u64", other)),
        }
    }

    pub fn u32(&self) -> Result<u32, CastError> {
        let wide = self.u64()?;
        u32::try_from(wide).map_err(|_| CastError::OutOfRange {
            expected: "u32",
            value: wide.to_string(),
        })
    }

    pub fn f64(&self) -> Result<f64, CastError> {
        match self.present()? {
            Value::Number(n) => n.as_f64().ok_or_else(|| out_of_range("f64", n)),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| CastError::Parse {
                expected: "f64",
                input: s.clone(),
            }),
            other => Err(mismatch("f64", other)),
        }
    }

    /// Arrays cast element-wise; a string is treated as a comma-separated list.
    pub fn string_vec(&self) -> Result<Vec<String>, CastError> {
        self.elements("string list")?
            .into_iter()
            .map(|item| Caster::new(Some(item)).string())
            .collect()
    }

    pub fn i64_vec(&self) -> Result<Vec<i64>, CastError> {
        self.elements("i64 list")?
            .into_iter()
            .map(|item| Caster::new(Some(item)).i64())
            .collect()
    }

    /// Deserialize the value into any `serde` type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, CastError> {
        let value = self.present()?.clone();
        Ok(serde_json::from_value(value)?)
    }

    pub fn string_or(&self, fallback: impl Into<String>) -> String {
        self.string().unwrap_or_else(|_| fallback.into())
    }

    pub fn bool_or(&self, fallback: bool) -> bool {
        self.bool().unwrap_or(fallback)
    }

    pub fn i64_or(&self, fallback: i64) -> i64 {
        self.i64().unwrap_or(fallback)
    }

    pub fn f64_or(&self, fallback: f64) -> f64 {
        self.f64().unwrap_or(fallback)
    }

    fn present(&self) -> Result<&Value, CastError> {
        self.value.as_ref().ok_or(CastError::Missing)
    }

    fn elements(&self, expected: &'static str) -> Result<Vec<Value>, CastError> {
        match self.present()? {
            Value::Array(items) => Ok(items.clone()),
            Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
            Value::String(s) => Ok(s
                .split(',')
                .map(|part| Value::String(part.trim().to_string()))
                .collect()),
            other => Err(mismatch(expected, other)),
        }
    }
}

impl From<Option<Value>> for Caster {
    fn from(value: Option<Value>) -> Self {
        Self::new(value)
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn float_to_i64(f: f64, n: &serde_json::Number) -> Result<i64, CastError> {
    if f.fract() != 0.0 {
        return Err(CastError::Parse {
            expected: "i64",
            input: n.to_string(),
        });
    }
    if !(i64::MIN as f64..i64::MAX as f64).contains(&f) {
        return Err(out_of_range("i64", n));
    }
    Ok(f as i64)
}

fn out_of_range(expected: &'static str, n: &serde_json::Number) -> CastError {
    CastError::OutOfRange {
        expected,
        value: n.to_string(),
    }
}

fn mismatch(expected: &'static str, found: &Value) -> CastError {
    CastError::Mismatch {
        expected,
        found: kind_of(found),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
