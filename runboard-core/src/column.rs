//! Column kinds and column descriptors.

use crate::error::ValidationError;
use crate::row::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Namespace a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Built-in run attribute (`start_time`, `status`, ...)
    Attribute,
    Tag,
    Metric,
    Param,
}

impl ColumnKind {
    pub const ALL: [ColumnKind; 4] = [
        ColumnKind::Attribute,
        ColumnKind::Tag,
        ColumnKind::Metric,
        ColumnKind::Param,
    ];

    /// Prefix used in column ids and row groups.
    pub fn prefix(self) -> &'static str {
        match self {
            ColumnKind::Attribute => "attributes",
            ColumnKind::Tag => "tags",
            ColumnKind::Metric => "metrics",
            ColumnKind::Param => "params",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Attribute => "attribute",
            ColumnKind::Tag => "tag",
            ColumnKind::Metric => "metric",
            ColumnKind::Param => "param",
        };
        f.write_str(name)
    }
}

/// A selectable column, addressed by `(kind, name)`.
///
/// Fields are private so a descriptor cannot drift from the pair it was
/// built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnDescriptor {
    kind: ColumnKind,
    name: String,
    display_label: String,
}

impl ColumnDescriptor {
    pub fn new(kind: ColumnKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            display_label: name.clone(),
            name,
        }
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Self::new(ColumnKind::Attribute, name)
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::new(ColumnKind::Tag, name)
    }

    pub fn metric(name: impl Into<String>) -> Self {
        Self::new(ColumnKind::Metric, name)
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::new(ColumnKind::Param, name)
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// Path used to read this column's value out of a [`Row`].
    pub fn accessor(&self) -> (ColumnKind, &str) {
        (self.kind, &self.name)
    }

    /// Identifier shared with the table widget and the search service,
    /// e.g. ``metrics.`acc` ``.
    pub fn id(&self) -> String {
        format!("{}.`{}`", self.kind.prefix(), self.name)
    }

    /// Parse a column id back into a descriptor.
    ///
    /// The name may be written bare (`tags.mlflow.user`) or backquoted
    /// (``tags.`mlflow.user` ``). Only the first `.` separates the prefix.
    pub fn parse_id(id: &str) -> Result<Self, ValidationError> {
        let (prefix, rest) = id
            .split_once('.')
            .ok_or_else(|| ValidationError::invalid_column_id(id, "expected <kind>.<name>"))?;
        let kind = ColumnKind::from_prefix(prefix.trim()).ok_or_else(|| {
            ValidationError::invalid_column_id(id, format!("unknown column kind {prefix:?}"))
        })?;
        let rest = rest.trim();
        let name = match rest.strip_prefix('`') {
            Some(quoted) => quoted.strip_suffix('`').ok_or_else(|| {
                ValidationError::invalid_column_id(id, "unterminated backquote")
            })?,
            None => rest,
        };
        if name.is_empty() {
            return Err(ValidationError::invalid_column_id(id, "column name is empty"));
        }
        Ok(Self::new(kind, name))
    }

    /// Read this column's value from a row. Missing keys resolve to `None`.
    pub fn resolve<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        row.get(self.kind, &self.name)
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.`{}`", self.kind.prefix(), self.name)
    }
}

/// Case-insensitive ordering for column names, lowercase first on ties.
///
/// Approximates a locale collator: punctuation and whitespace sort before
/// digits, digits before letters, and `"alpha" < "beta" < "Beta" < "gamma"`
/// where byte order would put every uppercase name first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_keys(a)
        .cmp(collation_keys(b))
        .then_with(|| b.cmp(a))
}

fn collation_keys(name: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    name.chars().flat_map(char::to_lowercase).map(|ch| {
        let class = if ch.is_ascii_punctuation() || ch.is_whitespace() {
            0
        } else if ch.is_ascii_digit() {
            1
        } else {
            2
        };
        (class, ch)
    })
}
