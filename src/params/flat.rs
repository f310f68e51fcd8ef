use std::collections::BTreeMap;
use tracing::warn;

/// Flat dotted-key parameters as given on the command line.
///
/// Backed by a `BTreeMap`, so iteration is always in ascending key order.
/// The decoder relies on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatParams(BTreeMap<String, String>);

impl FlatParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes `key value` pairs two at a time. A trailing key without a
    /// value is dropped; a repeated key keeps its last value.
    pub fn from_pairs<S: AsRef<str>>(args: &[S]) -> Self {
        if args.len() % 2 != 0 {
            if let Some(last) = args.last() {
                warn!("Ignoring parameter '{}' without a value", last.as_ref());
            }
        }

        args.chunks_exact(2)
            .map(|pair| (pair[0].as_ref().to_string(), pair[1].as_ref().to_string()))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rewrites every key; later keys win when two rewrite to the same string.
    pub fn map_keys<F>(self, mut rewrite: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        self.0
            .into_iter()
            .map(|(key, value)| (rewrite(&key), value))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatParams(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FlatParams {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
