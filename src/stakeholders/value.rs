use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Preference key → merged value, as handed to every reasoning call.
pub type AggregatedPreferences = BTreeMap<String, PreferenceValue>;

/// A preference as stakeholders express it: any JSON-shaped value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PreferenceValue>),
    Map(BTreeMap<String, PreferenceValue>),
}

impl PreferenceValue {
    /// False when any number inside is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            Self::List(items) => items.iter().all(Self::is_finite),
            Self::Map(entries) => entries.values().all(Self::is_finite),
            Self::Null | Self::Bool(_) | Self::Text(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<serde_json::Value> for PreferenceValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Fold `incoming`, carrying stake `weight`, into the running aggregate.
///
/// With no aggregate yet, or when the two sides differ in type, the incoming
/// value is taken as is.
pub fn merge_preference(
    existing: Option<PreferenceValue>,
    incoming: PreferenceValue,
    weight: f64,
) -> PreferenceValue {
    use PreferenceValue::{Bool, List, Map, Number, Text};

    let Some(existing) = existing else {
        return incoming;
    };

    match (existing, incoming) {
        (Number(current), Number(new)) => Number(current * (1.0 - weight) + new * weight),
        (Bool(current), Bool(new)) => Bool(if weight > 0.7 { new } else { current }),
        (Text(current), Text(new)) => Text(if weight > 0.5 { new } else { current }),
        (Map(mut current), Map(new)) => {
            for (key, value) in new {
                let merged = merge_preference(current.remove(&key), value, weight);
                current.insert(key, merged);
            }
            Map(current)
        }
        (List(mut current), List(mut new)) => {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let take_new = ((new.len() as f64 * weight).floor() as usize).min(new.len());
            let keep_old = current.len().saturating_sub(take_new);
            current.truncate(keep_old);
            new.truncate(take_new);
            current.extend(new);
            List(current)
        }
        (_, incoming) => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PreferenceValue::{Bool, List, Map, Null, Number, Text};

    fn texts(items: &[&str]) -> PreferenceValue {
        List(items.iter().map(|s| Text((*s).to_string())).collect())
    }

    #[test]
    fn numbers_average_by_weight() {
        assert_eq!(merge_preference(Some(Number(10.0)), Number(20.0), 0.5), Number(15.0));
        assert_eq!(merge_preference(None, Number(20.0), 0.1), Number(20.0));
    }

    #[test]
    fn bool_needs_heavy_weight() {
        assert_eq!(merge_preference(Some(Bool(true)), Bool(false), 0.7), Bool(true));
        assert_eq!(merge_preference(Some(Bool(true)), Bool(false), 0.71), Bool(false));
    }

    #[test]
    fn text_needs_majority_weight() {
        let current = Some(Text("fast".into()));
        assert_eq!(merge_preference(current.clone(), Text("cheap".into()), 0.5), Text("fast".into()));
        assert_eq!(merge_preference(current, Text("cheap".into()), 0.6), Text("cheap".into()));
    }

    #[test]
    fn maps_merge_per_key() {
        let current = Map(BTreeMap::from([
            ("budget".to_string(), Number(100.0)),
            ("tone".to_string(), Text("formal".into())),
        ]));
        let incoming = Map(BTreeMap::from([
            ("budget".to_string(), Number(200.0)),
            ("channel".to_string(), Text("x".into())),
        ]));
        let merged = merge_preference(Some(current), incoming, 0.25);
        assert_eq!(
            merged,
            Map(BTreeMap::from([
                ("budget".to_string(), Number(125.0)),
                ("channel".to_string(), Text("x".into())),
                ("tone".to_string(), Text("formal".into())),
            ]))
        );
    }

    #[test]
    fn lists_take_weighted_prefixes() {
        let merged = merge_preference(Some(texts(&["a", "b", "c", "d"])), texts(&["x", "y"]), 0.5);
        assert_eq!(merged, texts(&["a", "b", "c", "x"]));

        let all_new = merge_preference(Some(texts(&["a"])), texts(&["x", "y", "z"]), 1.0);
        assert_eq!(all_new, texts(&["x", "y", "z"]));

        let none_new = merge_preference(Some(texts(&["a", "b"])), texts(&["x"]), 0.4);
        assert_eq!(none_new, texts(&["a", "b"]));
    }

    #[test]
    fn mismatched_types_take_incoming() {
        assert_eq!(merge_preference(Some(Number(1.0)), Text("hi".into()), 0.0), Text("hi".into()));
        assert_eq!(merge_preference(Some(Bool(true)), Null, 0.9), Null);
    }

    #[test]
    fn decodes_untagged_json() {
        let value: PreferenceValue =
            serde_json::from_str(r#"{"a": [1, true, "x", null], "b": 2.5}"#).unwrap();
        assert_eq!(
            value,
            Map(BTreeMap::from([
                ("a".to_string(), List(vec![Number(1.0), Bool(true), Text("x".into()), Null])),
                ("b".to_string(), Number(2.5)),
            ]))
        );
    }

    #[test]
    fn display_is_plain_for_scalars() {
        assert_eq!(Number(10.0).to_string(), "10");
        assert_eq!(Text("low latency".into()).to_string(), "low latency");
        assert_eq!(texts(&["a"]).to_string(), r#"["a"]"#);
    }

    #[test]
    fn finiteness_is_recursive() {
        assert!(texts(&["a"]).is_finite());
        assert!(!List(vec![Number(f64::NAN)]).is_finite());
    }
}
