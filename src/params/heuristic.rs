//! Type guessing for backends that expose no parameter schema.
//!
//! Values made only of ASCII digits become integers and `true` / `false`
//! (any case) become booleans. There is no way to force a string, so a
//! parameter that legitimately holds `"true"` or `"0042"` must be exempted
//! by the service's exemption predicate.

use super::document::Document;
use super::errors::{ParamsError, ParamsResult};

/// Guesses the type of a single raw value.
pub fn guess(raw: &str) -> Document {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = raw.parse::<i64>() {
            return Document::Integer(number);
        }
    } else if raw.eq_ignore_ascii_case("true") {
        return Document::Boolean(true);
    } else if raw.eq_ignore_ascii_case("false") {
        return Document::Boolean(false);
    }
    Document::string(raw)
}

/// Applies [`guess`] to every string leaf whose dotted key (1-based indices,
/// as typed on the command line) is not exempted.
pub fn coerce_heuristic<F>(doc: Document, exempt: F) -> Document
where
    F: Fn(&str) -> bool,
{
    walk(doc, "", &exempt)
}

fn walk<F>(doc: Document, path: &str, exempt: &F) -> Document
where
    F: Fn(&str) -> bool,
{
    match doc {
        Document::Mapping(entries) => Document::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| {
                    let child = join(path, &key);
                    (key, walk(value, &child, exempt))
                })
                .collect(),
        ),
        Document::Sequence(items) => Document::Sequence(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| walk(item, &join(path, &(i + 1).to_string()), exempt))
                .collect(),
        ),
        Document::String(raw) if !exempt(path) => guess(&raw),
        other => other,
    }
}

/// Converts the named top-level entries to integers; everything else stays
/// a string. A value that does not parse is an error.
pub fn coerce_named_integers(doc: Document, names: &[&str]) -> ParamsResult<Document> {
    let mut entries = match doc {
        Document::Mapping(entries) => entries,
        other => return Ok(other),
    };

    for name in names {
        let Some(Document::String(raw)) = entries.get(*name) else {
            continue;
        };
        let number = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ParamsError::invalid_scalar(name, "integer", raw.as_str()))?;
        entries.insert(name.to_string(), Document::Integer(number));
    }

    Ok(Document::Mapping(entries))
}

fn join(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::decoder::decode;
    use crate::params::flat::FlatParams;
    use serde_json::{json, Value};

    fn decoded(pairs: &[(&str, &str)]) -> Document {
        let flat: FlatParams = pairs.iter().copied().collect();
        decode(&flat).unwrap()
    }

    #[test]
    fn test_guess() {
        assert_eq!(guess("42"), Document::Integer(42));
        assert_eq!(guess("True"), Document::Boolean(true));
        assert_eq!(guess("FALSE"), Document::Boolean(false));
        assert_eq!(guess("-1"), Document::string("-1"));
        assert_eq!(guess("1.5"), Document::string("1.5"));
        assert_eq!(guess(""), Document::string(""));
        assert_eq!(
            guess("99999999999999999999999"),
            Document::string("99999999999999999999999")
        );
    }

    #[test]
    fn test_coerce_heuristic_nested() {
        let doc = decoded(&[
            ("DesiredCapacity", "3"),
            ("HonorCooldown", "true"),
            ("Tags.1.Key", "env"),
            ("Tags.1.Value", "prod"),
        ]);

        assert_eq!(
            Value::from(coerce_heuristic(doc, |_| false)),
            json!({
                "DesiredCapacity": 3,
                "HonorCooldown": true,
                "Tags": [{"Key": "env", "Value": "prod"}]
            })
        );
    }

    #[test]
    fn test_exempt_keys_stay_strings() {
        let doc = decoded(&[
            ("Filters.1.Name", "tag:build"),
            ("Filters.1.Values.1", "0042"),
            ("MaxRecords", "10"),
        ]);
        let exempt = |key: &str| key.starts_with("Filters.") && key.contains(".Values.");

        assert_eq!(
            Value::from(coerce_heuristic(doc, exempt)),
            json!({
                "Filters": [{"Name": "tag:build", "Values": ["0042"]}],
                "MaxRecords": 10
            })
        );
    }

    #[test]
    fn test_named_integers() {
        let doc = decoded(&[("MaxResults", "50"), ("LookupAttributes.1.AttributeValue", "7")]);
        let converted = coerce_named_integers(doc, &["MaxResults", "StartTime"]).unwrap();

        assert_eq!(
            Value::from(converted),
            json!({"LookupAttributes": [{"AttributeValue": "7"}], "MaxResults": 50})
        );
    }

    #[test]
    fn test_named_integers_reject_garbage() {
        let doc = decoded(&[("StartTime", "yesterday")]);
        let err = coerce_named_integers(doc, &["StartTime"]).unwrap_err();
        assert_eq!(err, ParamsError::invalid_scalar("StartTime", "integer", "yesterday"));
    }
}
