//! Reduction of host values to [`Value`] before canonicalization.
//!
//! Coercion rules, in the order the serializer applies them:
//!
//! - [`Value`] is used as is.
//! - [`serde_json::Value`] converts structurally; it has no `Omitted` form.
//! - [`Serde`] wraps any [`serde::Serialize`] type and goes through
//!   [`serde_json::to_value`]: `NaN` and infinities become `null`, `None`
//!   becomes `null` unless the type skips the field, unit and unit structs
//!   become `null`, and maps whose keys cannot be written as strings are
//!   rejected with [`Error::UnsupportedValue`].
//! - An optional [`Replacer`] then filters or rewrites the reduced value.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// Conversion of a host value into a structured [`Value`].
pub trait Reduce {
    /// Reduces `self`, borrowing when no conversion is needed.
    fn reduce(&self) -> Result<Cow<'_, Value>>;
}

impl Reduce for Value {
    fn reduce(&self) -> Result<Cow<'_, Value>> {
        Ok(Cow::Borrowed(self))
    }
}

impl Reduce for serde_json::Value {
    fn reduce(&self) -> Result<Cow<'_, Value>> {
        Ok(Cow::Owned(Value::from(self.clone())))
    }
}

/// Adapter reducing any [`Serialize`] type through serde_json.
#[derive(Debug, Clone, Copy)]
pub struct Serde<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Reduce for Serde<'_, T> {
    fn reduce(&self) -> Result<Cow<'_, Value>> {
        serde_json::to_value(self.0)
            .map(|value| Cow::Owned(Value::from(value)))
            .map_err(|err| Error::UnsupportedValue(err.to_string()))
    }
}

impl<R: Reduce + ?Sized> Reduce for &R {
    fn reduce(&self) -> Result<Cow<'_, Value>> {
        (**self).reduce()
    }
}

/// Callback type of [`Replacer::Function`].
pub type ReplaceFn<'r> = Box<dyn Fn(&str, Value) -> Value + Send + Sync + 'r>;

/// Filter applied to the reduced value, before keys are sorted.
pub enum Replacer<'r> {
    /// Keep only these keys in every object, at every depth.
    Keys(Vec<String>),
    /// Called with `(key, value)` for the root (key `""`), then for every
    /// entry of the value it returns, in insertion order. Object entries
    /// holding [`Value::Omitted`] are visited too. Array elements are keyed
    /// by index. Returning [`Value::Omitted`] drops an object entry; inside
    /// an array the slot renders as `null`.
    Function(ReplaceFn<'r>),
}

impl<'r> Replacer<'r> {
    /// Builds an allow-list replacer.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Replacer::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Builds a function replacer.
    pub fn function(f: impl Fn(&str, Value) -> Value + Send + Sync + 'r) -> Self {
        Replacer::Function(Box::new(f))
    }

    pub(crate) fn apply(&self, value: Value) -> Value {
        match self {
            Replacer::Keys(allowed) => retain_keys(value, allowed),
            Replacer::Function(f) => replace(f.as_ref(), "", value),
        }
    }
}

impl fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacer::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            Replacer::Function(_) => f.write_str("Function(..)"),
        }
    }
}

fn retain_keys(value: Value, allowed: &[String]) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| retain_keys(item, allowed))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| allowed.iter().any(|k| k == key))
                .map(|(key, child)| (key, retain_keys(child, allowed)))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn replace(f: &(dyn Fn(&str, Value) -> Value + Send + Sync), key: &str, value: Value) -> Value {
    match f(key, value) {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| replace(f, &index.to_string(), item))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let replaced = replace(f, &key, child);
                if !replaced.is_omitted() {
                    out.insert(key, replaced);
                }
            }
            Value::Object(out)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn serde_types_reduce_through_serde_json() {
        #[derive(Serialize)]
        struct Sample {
            b: f64,
            a: Option<u8>,
        }
        let sample = Sample { b: f64::NAN, a: None };
        let reduced = Serde(&sample).reduce().unwrap().into_owned();
        assert_eq!(reduced, Value::from(json!({"b": null, "a": null})));
    }

    #[test]
    fn non_string_map_keys_are_unsupported() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = Serde(&map).reduce().unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue(_)));
    }

    #[test]
    fn values_are_borrowed() {
        let value = Value::from(1);
        assert!(matches!(value.reduce().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn key_allow_list_applies_at_every_depth() {
        let value = Value::from(json!({"a": {"a": 1, "b": 2}, "b": 3, "c": [{"a": 4, "d": 5}]}));
        let kept = Replacer::keys(["a", "c"]).apply(value);
        assert_eq!(kept, Value::from(json!({"a": {"a": 1}, "c": [{"a": 4}]})));
    }

    #[test]
    fn function_replacer_runs_top_down() {
        let replacer = Replacer::function(|key, value| match (key, value) {
            ("", Value::Object(_)) => Value::from(json!({"wrapped": {"secret": 1, "n": 2}})),
            ("secret", _) => Value::Omitted,
            (_, Value::Number(n)) => Value::from(n.as_i64().unwrap_or(0) * 10),
            (_, other) => other,
        });
        let out = replacer.apply(Value::from(json!({"ignored": true})));
        assert_eq!(out, Value::from(json!({"wrapped": {"n": 20}})));
    }
}
