//! Per-service parameter hooks: key rewrites applied before decoding and
//! predicates that exempt keys from heuristic type guessing.

use crate::params::FlatParams;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

pub type KeyRewrite = fn(FlatParams) -> FlatParams;
pub type ExemptionPredicate = fn(&str) -> bool;

lazy_static! {
    static ref FILTER_VALUE: Regex = Regex::new(r"^(Filters?\.\d+\.Values?)\.(\d+)$").unwrap();
    static ref AUTOSCALING_FILTER_VALUE: Regex = Regex::new(r"^Filters\.\d+\.Values\.\d+$").unwrap();
}

/// `Filters.member.1.Name` -> `Filters.1.Name`.
///
/// Query-protocol wire keys carry a `member` segment for every list; the
/// decoder works on plain indices and the serializer adds it back.
pub fn strip_member_segment(params: FlatParams) -> FlatParams {
    params.map_keys(|key| {
        let mut key = key.to_string();
        while key.contains(".member.") {
            key = key.replace(".member.", ".");
        }
        key
    })
}

/// Renumbers the values of each filter so they run 1..n.
///
/// `Filter.1.Value.2` and `Filter.1.Value.5` become `Filter.1.Value.1` and
/// `Filter.1.Value.2`; order follows the numeric value of the old index.
pub fn renumber_filter_values(params: FlatParams) -> FlatParams {
    let mut positions: BTreeMap<String, BTreeSet<u64>> = BTreeMap::new();
    for (key, _) in params.iter() {
        if let Some((prefix, index)) = filter_value_parts(key) {
            positions.entry(prefix.to_string()).or_default().insert(index);
        }
    }

    if positions.is_empty() {
        return params;
    }

    params.map_keys(|key| match filter_value_parts(key) {
        Some((prefix, index)) => {
            let position = positions
                .get(prefix)
                .and_then(|indices| indices.iter().position(|i| *i == index))
                .map(|p| p + 1)
                .unwrap_or(1);
            format!("{}.{}", prefix, position)
        }
        None => key.to_string(),
    })
}

fn filter_value_parts(key: &str) -> Option<(&str, u64)> {
    let captures = FILTER_VALUE.captures(key)?;
    let prefix = captures.get(1)?.as_str();
    let index = captures.get(2)?.as_str().parse().ok()?;
    Some((prefix, index))
}

/// Auto Scaling filter values are free-form strings (tag values, names) and
/// must not be turned into numbers or booleans.
pub fn autoscaling_filter_values(key: &str) -> bool {
    AUTOSCALING_FILTER_VALUE.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &FlatParams) -> Vec<String> {
        params.iter().map(|(k, _)| k.to_string()).collect()
    }

    #[test]
    fn test_strip_member_segment() {
        let params: FlatParams = [
            ("Filters.member.1.Name", "auto-scaling-group"),
            ("Filters.member.1.Values.member.1", "web"),
            ("MaxRecords", "10"),
        ]
        .into_iter()
        .collect();

        let rewritten = strip_member_segment(params);
        assert_eq!(
            keys(&rewritten),
            vec!["Filters.1.Name", "Filters.1.Values.1", "MaxRecords"]
        );
        assert_eq!(rewritten.get("Filters.1.Values.1"), Some("web"));
    }

    #[test]
    fn test_renumber_filter_values() {
        let params: FlatParams = [
            ("Filter.1.Name", "tag:env"),
            ("Filter.1.Value.3", "stage"),
            ("Filter.1.Value.10", "prod"),
            ("Filter.2.Name", "state"),
            ("Filter.2.Value.2", "running"),
            ("InstanceId.1", "i-1"),
        ]
        .into_iter()
        .collect();

        let rewritten = renumber_filter_values(params);
        assert_eq!(rewritten.get("Filter.1.Value.1"), Some("stage"));
        assert_eq!(rewritten.get("Filter.1.Value.2"), Some("prod"));
        assert_eq!(rewritten.get("Filter.2.Value.1"), Some("running"));
        assert_eq!(rewritten.get("InstanceId.1"), Some("i-1"));
        assert_eq!(rewritten.len(), 6);
    }

    #[test]
    fn test_renumber_handles_plural_form() {
        let params: FlatParams = [("Filters.1.Values.4", "a"), ("Filters.1.Values.7", "b")]
            .into_iter()
            .collect();

        let rewritten = renumber_filter_values(params);
        assert_eq!(keys(&rewritten), vec!["Filters.1.Values.1", "Filters.1.Values.2"]);
    }

    #[test]
    fn test_autoscaling_exemption_is_full_match() {
        assert!(autoscaling_filter_values("Filters.1.Values.2"));
        assert!(!autoscaling_filter_values("Filters.1.Values.2.Extra"));
        assert!(!autoscaling_filter_values("X.Filters.1.Values.2"));
        assert!(!autoscaling_filter_values("Filters.1.Name"));
    }
}
