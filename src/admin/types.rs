//! Resource types exchanged with the table admin API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::gc_rule::{self, GcRule};

/// How much of a table's definition the server should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableView {
    #[default]
    Unspecified,
    NameOnly,
    Full,
}

impl TableView {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableView::Unspecified => "VIEW_UNSPECIFIED",
            TableView::NameOnly => "NAME_ONLY",
            TableView::Full => "FULL",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFamily {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "gc_rule::deserialize_optional"
    )]
    pub gc_rule: Option<GcRule>,
}

impl ColumnFamily {
    pub fn with_rule(rule: GcRule) -> Self {
        Self {
            gc_rule: Some(rule),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub column_families: BTreeMap<String, ColumnFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,
}

impl Table {
    /// Table definition used for creation: only the column families.
    pub fn with_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = (S, GcRule)>,
        S: Into<String>,
    {
        Self {
            column_families: families
                .into_iter()
                .map(|(id, rule)| (id.into(), ColumnFamily::with_rule(rule)))
                .collect(),
            ..Default::default()
        }
    }
}

/// Single-line text form: `name: "..." column_families { key: "fam" value { gc_rule { ... } } }`.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name: {:?}", self.name)?;
        for (id, family) in &self.column_families {
            write!(f, " column_families {{ key: {id:?} value {{")?;
            if let Some(rule) = &family.gc_rule {
                write!(f, " gc_rule {{ {rule} }}")?;
            }
            f.write_str(" } }")?;
        }
        if let Some(g) = &self.granularity {
            write!(f, " granularity: {g}")?;
        }
        Ok(())
    }
}

/// One change applied by `modify_column_families`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFamilyModification {
    Create { id: String, rule: GcRule },
    Update { id: String, rule: GcRule },
    Drop { id: String },
}

impl ColumnFamilyModification {
    pub fn create(id: impl Into<String>, rule: GcRule) -> Self {
        Self::Create {
            id: id.into(),
            rule,
        }
    }

    pub fn update(id: impl Into<String>, rule: GcRule) -> Self {
        Self::Update {
            id: id.into(),
            rule,
        }
    }

    pub fn drop(id: impl Into<String>) -> Self {
        Self::Drop { id: id.into() }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Create { id, .. } | Self::Update { id, .. } | Self::Drop { id } => id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModificationWire {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    create: Option<ColumnFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<ColumnFamily>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    drop: bool,
}

impl From<&ColumnFamilyModification> for ModificationWire {
    fn from(m: &ColumnFamilyModification) -> Self {
        let mut wire = ModificationWire {
            id: m.id().to_string(),
            create: None,
            update: None,
            drop: false,
        };
        match m {
            ColumnFamilyModification::Create { rule, .. } => {
                wire.create = Some(ColumnFamily::with_rule(rule.clone()))
            }
            ColumnFamilyModification::Update { rule, .. } => {
                wire.update = Some(ColumnFamily::with_rule(rule.clone()))
            }
            ColumnFamilyModification::Drop { .. } => wire.drop = true,
        }
        wire
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_table: Option<Table>,
    /// int64 values arrive as JSON strings.
    #[serde(default)]
    pub data_size_bytes: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub delete_time: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Opaque token returned by `generate_consistency_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyToken(String);

impl ConsistencyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsistencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
