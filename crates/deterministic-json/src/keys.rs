//! Sorted key enumeration.

use crate::value::{Map, Value};

/// Returns the keys of `map` whose values are not [`Value::Omitted`], sorted
/// ascending by code point.
///
/// `Null` values count as present. An empty or fully omitted mapping yields an
/// empty vector.
pub fn keys(map: &Map) -> Vec<&str> {
    sorted_entries(map.iter(), Value::is_omitted)
        .into_iter()
        .map(|(key, _)| key)
        .collect()
}

/// Sorts `(key, value)` pairs by key, dropping pairs whose value is `omitted`.
///
/// Shared by [`keys`] and the canonicalizer, which needs the values alongside
/// the keys for both owned maps and graph objects.
pub(crate) fn sorted_entries<'a, V: 'a>(
    entries: impl IntoIterator<Item = (&'a String, &'a V)>,
    omitted: impl Fn(&V) -> bool,
) -> Vec<(&'a str, &'a V)> {
    let mut sorted: Vec<(&str, &V)> = entries
        .into_iter()
        .filter(|(_, value)| !omitted(value))
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    // `str` ordering is byte order, which for UTF-8 is code-point order.
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    sorted
}
