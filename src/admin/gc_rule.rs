//! Garbage-collection rules for column families.
//!
//! The REST surface encodes a rule as an object with exactly one of
//! `maxNumVersions`, `maxAge`, `intersection` or `union` set. `GcRule` is the
//! typed form; conversion goes through `GcRuleWire`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// A column family garbage-collection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GcRuleWire", into = "GcRuleWire")]
pub enum GcRule {
    /// Keep at most this many cell versions.
    MaxNumVersions(i32),
    /// Drop cells older than this.
    MaxAge(Duration),
    /// Delete a cell if every nested rule matches.
    Intersection(Vec<GcRule>),
    /// Delete a cell if any nested rule matches.
    Union(Vec<GcRule>),
}

impl GcRule {
    pub fn max_num_versions(n: i32) -> Self {
        GcRule::MaxNumVersions(n)
    }

    pub fn max_age(age: Duration) -> Self {
        GcRule::MaxAge(age)
    }

    pub fn union(rules: impl IntoIterator<Item = GcRule>) -> Self {
        GcRule::Union(rules.into_iter().collect())
    }

    pub fn intersection(rules: impl IntoIterator<Item = GcRule>) -> Self {
        GcRule::Intersection(rules.into_iter().collect())
    }
}

/// Renders the rule in single-line text form, e.g.
/// `union { rules { max_num_versions: 5 } rules { max_age { seconds: 604800 } } }`.
impl fmt::Display for GcRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GcRule::MaxNumVersions(n) => write!(f, "max_num_versions: {n}"),
            GcRule::MaxAge(age) => {
                write!(f, "max_age {{ seconds: {}", age.as_secs())?;
                if age.subsec_nanos() != 0 {
                    write!(f, " nanos: {}", age.subsec_nanos())?;
                }
                f.write_str(" }")
            }
            GcRule::Intersection(rules) => write_nested(f, "intersection", rules),
            GcRule::Union(rules) => write_nested(f, "union", rules),
        }
    }
}

fn write_nested(f: &mut fmt::Formatter<'_>, label: &str, rules: &[GcRule]) -> fmt::Result {
    write!(f, "{label} {{")?;
    for rule in rules {
        write!(f, " rules {{ {rule} }}")?;
    }
    f.write_str(" }")
}

/* ---- Wire form ---- */

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GcRuleWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_num_versions: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intersection: Option<RuleList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    union: Option<RuleList>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleList {
    #[serde(default)]
    rules: Vec<GcRuleWire>,
}

impl GcRuleWire {
    fn is_empty(&self) -> bool {
        self.max_num_versions.is_none()
            && self.max_age.is_none()
            && self.intersection.is_none()
            && self.union.is_none()
    }
}

impl From<GcRule> for GcRuleWire {
    fn from(rule: GcRule) -> Self {
        let list = |rules: Vec<GcRule>| RuleList {
            rules: rules.into_iter().map(GcRuleWire::from).collect(),
        };
        match rule {
            GcRule::MaxNumVersions(n) => GcRuleWire {
                max_num_versions: Some(n),
                ..Default::default()
            },
            GcRule::MaxAge(age) => GcRuleWire {
                max_age: Some(format_duration(age)),
                ..Default::default()
            },
            GcRule::Intersection(rules) => GcRuleWire {
                intersection: Some(list(rules)),
                ..Default::default()
            },
            GcRule::Union(rules) => GcRuleWire {
                union: Some(list(rules)),
                ..Default::default()
            },
        }
    }
}

impl TryFrom<GcRuleWire> for GcRule {
    type Error = String;

    fn try_from(wire: GcRuleWire) -> Result<Self, Self::Error> {
        let nested = |list: RuleList| -> Result<Vec<GcRule>, String> {
            list.rules.into_iter().map(GcRule::try_from).collect()
        };
        if let Some(n) = wire.max_num_versions {
            return Ok(GcRule::MaxNumVersions(n));
        }
        if let Some(age) = wire.max_age {
            return parse_duration(&age).map(GcRule::MaxAge);
        }
        if let Some(list) = wire.intersection {
            return nested(list).map(GcRule::Intersection);
        }
        if let Some(list) = wire.union {
            return nested(list).map(GcRule::Union);
        }
        Err("gc rule has no rule set".to_string())
    }
}

/// Deserialize an optional rule, treating `{}` the same as an absent field.
pub(crate) fn deserialize_optional<'de, D>(de: D) -> Result<Option<GcRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<GcRuleWire>::deserialize(de)?;
    match wire {
        Some(w) if !w.is_empty() => GcRule::try_from(w)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/* ---- Durations ("259200s", "1.5s") ---- */

pub(crate) fn format_duration(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}.{:09}s", d.as_secs(), d.subsec_nanos())
    }
}

pub(crate) fn parse_duration(raw: &str) -> Result<Duration, String> {
    let secs = raw
        .trim()
        .strip_suffix('s')
        .ok_or_else(|| format!("duration missing 's' suffix: {raw}"))?;
    let (whole, frac) = secs.split_once('.').unwrap_or((secs, ""));
    let whole: u64 = whole
        .parse()
        .map_err(|e| format!("invalid duration '{raw}': {e}"))?;
    let nanos = if frac.is_empty() {
        0
    } else {
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid duration fraction '{raw}'"));
        }
        format!("{frac:0<9}")
            .parse::<u32>()
            .map_err(|e| format!("invalid duration '{raw}': {e}"))?
    };
    Ok(Duration::new(whole, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOUR: u64 = 3600;

    #[test]
    fn encodes_nested_rules() {
        let rule = GcRule::union([
            GcRule::max_num_versions(5),
            GcRule::max_age(Duration::from_secs(24 * 7 * HOUR)),
        ]);
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"union": {"rules": [{"maxNumVersions": 5}, {"maxAge": "604800s"}]}})
        );
    }

    #[test]
    fn decodes_fractional_age() {
        let rule: GcRule = serde_json::from_value(json!({"maxAge": "1.5s"})).unwrap();
        assert_eq!(rule, GcRule::MaxAge(Duration::from_millis(1500)));
    }

    #[test]
    fn empty_rule_is_rejected() {
        let err = serde_json::from_value::<GcRule>(json!({})).unwrap_err();
        assert!(err.to_string().contains("no rule set"));
    }

    #[test]
    fn text_form() {
        let rule = GcRule::intersection([
            GcRule::max_num_versions(3),
            GcRule::max_age(Duration::from_secs(72 * HOUR)),
        ]);
        assert_eq!(
            rule.to_string(),
            "intersection { rules { max_num_versions: 3 } rules { max_age { seconds: 259200 } } }"
        );
    }

    #[test]
    fn duration_parsing_rejects_garbage() {
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("x s").is_err());
        assert_eq!(parse_duration("0.25s").unwrap(), Duration::from_millis(250));
        assert_eq!(format_duration(Duration::from_millis(250)), "0.250000000s");
    }
}
