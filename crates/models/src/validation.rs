//! Request-body validation.
//!
//! A [`Schema`] turns an untyped JSON candidate into a typed, normalized
//! record or a list of [`FieldError`]s. Validation is pure: nothing here
//! touches the database.
//!
//! Two modes exist per schema. Creation requires every mandatory field.
//! Patching accepts any subset of fields but still checks each one supplied.
//! `null` is treated the same as an absent field.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// One rejected field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field error found in one candidate, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError { field: field.to_string(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Field schema for one resource type.
pub trait Schema {
    /// Normalized record accepted for insertion.
    type Create: Send + 'static;
    /// Normalized subset of fields accepted for a partial update.
    type Patch: Send + 'static;

    fn validate_create(candidate: &Value) -> Result<Self::Create, FieldErrors>;
    fn validate_patch(candidate: &Value) -> Result<Self::Patch, FieldErrors>;
}

pub const INVALID_ID: &str = "Invalid ID";

/// Validate a path identifier: a base-10 integer that fits the id column.
pub fn parse_id(raw: &str) -> Result<i32, FieldErrors> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(['-', '+']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldErrors::single("id", INVALID_ID));
    }
    trimmed.parse::<i32>().map_err(|_| FieldErrors::single("id", INVALID_ID))
}

/// Whether a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Cursor over a JSON object that records errors as fields are read.
///
/// Each accessor returns `None` both for absent optional fields and for
/// rejected ones; callers check [`Fields::finish`] before using the values.
pub struct Fields<'a> {
    obj: Option<&'a Map<String, Value>>,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn new(candidate: &'a Value) -> Self {
        match candidate.as_object() {
            Some(obj) => Self { obj: Some(obj), errors: FieldErrors::new() },
            None => Self { obj: None, errors: FieldErrors::single("body", "Expected object") },
        }
    }

    fn lookup(&mut self, name: &str, presence: Presence) -> Option<&'a Value> {
        let obj = self.obj?;
        match obj.get(name) {
            None | Some(Value::Null) => {
                if presence == Presence::Required {
                    self.errors.push(name, "Required");
                }
                None
            }
            Some(v) => Some(v),
        }
    }

    pub fn string(&mut self, name: &str, presence: Presence) -> Option<String> {
        match self.lookup(name, presence)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.push(name, "Expected string");
                None
            }
        }
    }

    pub fn number(&mut self, name: &str, presence: Presence) -> Option<f64> {
        match self.lookup(name, presence)? {
            Value::Number(n) => n.as_f64(),
            _ => {
                self.errors.push(name, "Expected number");
                None
            }
        }
    }

    /// Integral JSON numbers only; `5.0` is accepted, `5.5` is not.
    pub fn integer(&mut self, name: &str, presence: Presence) -> Option<i64> {
        match self.lookup(name, presence)? {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(i);
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Some(f as i64),
                    _ => {
                        self.errors.push(name, "Expected integer, received float");
                        None
                    }
                }
            }
            _ => {
                self.errors.push(name, "Expected number");
                None
            }
        }
    }

    /// Record a constraint failure for a field that parsed fine.
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors.push(name, message);
    }

    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self.errors)
        }
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
