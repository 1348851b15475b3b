use serde_json::{Map, Value};

use crate::error::{ApiError, FieldErrors};

/// Reads an allowlisted set of fields out of a JSON request body.
///
/// Only fields explicitly asked for are read, so anything else the caller sends
/// (including server-derived fields such as a patient's owner) is ignored.
/// Problems are collected per field and reported together by [`Payload::finish`].
///
/// Every reader takes the record's current value: when it is `Some`, a missing
/// field falls back to it (partial update); when `None`, the field is required.
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Payload<'a> {
    pub fn new(body: &'a Value) -> Result<Self, ApiError> {
        match body {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: FieldErrors::new(),
            }),
            _ => Err(ApiError::invalid_json("Request body must be a JSON object")),
        }
    }

    pub fn string(&mut self, field: &str, current: Option<&str>) -> String {
        let fields = self.fields;
        match fields.get(field) {
            None => match current {
                Some(value) => value.to_string(),
                None => self.reject(field, "This field is required.", String::new()),
            },
            Some(Value::String(value)) => value.trim().to_string(),
            Some(Value::Null) => self.reject(field, "This field may not be null.", String::new()),
            Some(_) => self.reject(field, "Not a valid string.", String::new()),
        }
    }

    /// Optional free text: absent keeps `current`, null clears it
    pub fn nullable_string(&mut self, field: &str, current: Option<String>) -> Option<String> {
        let fields = self.fields;
        match fields.get(field) {
            None => current,
            Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => self.reject(field, "Not a valid string.", None),
        }
    }

    /// Integers may arrive as JSON numbers or numeric strings
    pub fn integer(&mut self, field: &str, current: Option<i64>) -> i64 {
        let fields = self.fields;
        let parsed = match fields.get(field) {
            None => match current {
                Some(value) => return value,
                None => return self.reject(field, "This field is required.", 0),
            },
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(Value::Null) => return self.reject(field, "This field may not be null.", 0),
            Some(_) => None,
        };

        match parsed {
            Some(value) => value,
            None => self.reject(field, "A valid integer is required.", 0),
        }
    }

    /// Record `message` against `field` unless `ok`, keeping the first problem per field
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) {
        if !ok && !self.errors.contains_key(field) {
            self.errors.insert(field.to_string(), message.into());
        }
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.errors)))
        }
    }

    fn reject<T>(&mut self, field: &str, message: &str, placeholder: T) -> T {
        self.check(field, false, message);
        placeholder
    }
}
