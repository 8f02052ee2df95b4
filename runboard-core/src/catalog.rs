//! Column catalog and column selection.
//!
//! The catalog is everything a collection can show; the selection is what
//! the grid currently shows and queries for.

use crate::column::{locale_compare, ColumnDescriptor, ColumnKind};
use crate::error::ValidationError;
use crate::protocol::{ColumnNames, FieldWhitelist};
use crate::row::Row;
use serde_json::Value;

/// Order in which kinds are concatenated when building a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindOrder([ColumnKind; 4]);

impl KindOrder {
    /// Build an order from a list naming each of the four kinds exactly once.
    pub fn new(kinds: &[ColumnKind]) -> Result<Self, ValidationError> {
        let order: [ColumnKind; 4] = kinds.try_into().map_err(|_| {
            ValidationError::invalid_value(
                "kind_order",
                format!("expected 4 kinds, got {}", kinds.len()),
            )
        })?;
        for kind in ColumnKind::ALL {
            if !order.contains(&kind) {
                return Err(ValidationError::invalid_value(
                    "kind_order",
                    format!("missing kind {kind}"),
                ));
            }
        }
        Ok(Self(order))
    }

    pub fn kinds(&self) -> &[ColumnKind] {
        &self.0
    }
}

impl Default for KindOrder {
    fn default() -> Self {
        Self([
            ColumnKind::Attribute,
            ColumnKind::Metric,
            ColumnKind::Param,
            ColumnKind::Tag,
        ])
    }
}

/// Every column a collection exposes, grouped by kind and sorted within each.
///
/// A catalog is only ever replaced, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCatalog {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnCatalog {
    pub fn from_names(names: &ColumnNames, order: &KindOrder) -> Self {
        let mut columns = Vec::new();
        for &kind in order.kinds() {
            let mut sorted: Vec<&str> = names.for_kind(kind).iter().map(String::as_str).collect();
            sorted.sort_by(|a, b| locale_compare(a, b));
            sorted.dedup();
            columns.extend(sorted.into_iter().map(|name| ColumnDescriptor::new(kind, name)));
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, kind: ColumnKind, name: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.kind() == kind && column.name() == name)
    }

    pub fn of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(move |column| column.kind() == kind)
    }
}

/// Columns shown before the catalog arrives.
pub const SEED_COLUMNS: [(ColumnKind, &str); 5] = [
    (ColumnKind::Attribute, "start_time"),
    (ColumnKind::Tag, "mlflow.user"),
    (ColumnKind::Tag, "mlflow.runName"),
    (ColumnKind::Metric, "triplet_precision"),
    (ColumnKind::Param, "batch_size"),
];

/// The columns currently displayed and requested, in display order.
///
/// Entries need not exist in the catalog; unknown columns render empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnSelection {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// An absent selection is an empty one.
    pub fn from_option(columns: Option<Vec<ColumnDescriptor>>) -> Self {
        Self::new(columns.unwrap_or_default())
    }

    pub fn seed() -> Self {
        Self::new(
            SEED_COLUMNS
                .iter()
                .map(|&(kind, name)| ColumnDescriptor::new(kind, name))
                .collect(),
        )
    }

    /// Build a selection from column ids such as ``tags.`mlflow.user` ``.
    pub fn from_ids<I, S>(ids: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = ids
            .into_iter()
            .map(|id| ColumnDescriptor::parse_id(id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(columns))
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Selected names of one kind, in selection order.
    pub fn names_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.kind() == kind)
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Projection list sent to the service for `kind`.
    pub fn whitelist(&self, kind: ColumnKind) -> FieldWhitelist {
        FieldWhitelist {
            fields: self.names_of_kind(kind),
        }
    }

    /// One cell per selected column.
    pub fn cells<'r>(&self, row: &'r Row) -> Vec<Option<&'r Value>> {
        self.columns.iter().map(|column| column.resolve(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> ColumnNames {
        ColumnNames {
            attributes: vec!["status".into(), "start_time".into()],
            tags: vec!["mlflow.user".into(), "Mlflow.source".into(), "mlflow.user".into()],
            metrics: vec!["loss".into(), "acc".into()],
            params: vec!["lr".into()],
        }
    }

    #[test]
    fn catalog_sorts_within_kind_and_uses_default_order() {
        let catalog = ColumnCatalog::from_names(&names(), &KindOrder::default());
        let ids: Vec<String> = catalog.columns().iter().map(ColumnDescriptor::id).collect();
        assert_eq!(
            ids,
            vec![
                "attributes.`start_time`",
                "attributes.`status`",
                "metrics.`acc`",
                "metrics.`loss`",
                "params.`lr`",
                "tags.`Mlflow.source`",
                "tags.`mlflow.user`",
            ]
        );
    }

    #[test]
    fn catalog_respects_custom_order() {
        let order = KindOrder::new(&[
            ColumnKind::Tag,
            ColumnKind::Param,
            ColumnKind::Metric,
            ColumnKind::Attribute,
        ])
        .unwrap();
        let catalog = ColumnCatalog::from_names(&names(), &order);
        assert_eq!(catalog.columns()[0].kind(), ColumnKind::Tag);
        assert_eq!(catalog.columns().last().map(|c| c.kind()), Some(ColumnKind::Attribute));
        assert_eq!(catalog.of_kind(ColumnKind::Tag).count(), 2);
    }

    #[test]
    fn kind_order_requires_all_four_kinds() {
        assert!(KindOrder::new(&[ColumnKind::Tag]).is_err());
        assert!(KindOrder::new(&[
            ColumnKind::Tag,
            ColumnKind::Tag,
            ColumnKind::Metric,
            ColumnKind::Param,
        ])
        .is_err());
    }

    #[test]
    fn empty_names_build_empty_catalog() {
        let catalog = ColumnCatalog::from_names(&ColumnNames::default(), &KindOrder::default());
        assert!(catalog.is_empty());
    }

    #[test]
    fn seed_selection_spans_all_kinds() {
        let selection = ColumnSelection::seed();
        assert_eq!(selection.len(), 5);
        assert_eq!(selection.names_of_kind(ColumnKind::Attribute), vec!["start_time"]);
        assert_eq!(
            selection.names_of_kind(ColumnKind::Tag),
            vec!["mlflow.user", "mlflow.runName"]
        );
        assert_eq!(
            selection.whitelist(ColumnKind::Metric).fields,
            vec!["triplet_precision"]
        );
        assert_eq!(selection.names_of_kind(ColumnKind::Param), vec!["batch_size"]);
    }

    #[test]
    fn absent_selection_is_empty() {
        let selection = ColumnSelection::from_option(None);
        assert!(selection.is_empty());
        for kind in ColumnKind::ALL {
            assert!(selection.whitelist(kind).fields.is_empty());
        }
        assert!(selection.cells(&Row::default()).is_empty());
    }

    #[test]
    fn selection_from_ids_keeps_order() {
        let selection =
            ColumnSelection::from_ids(["params.`lr`", "attributes.`status`"]).unwrap();
        assert_eq!(selection.columns()[0], ColumnDescriptor::param("lr"));
        assert_eq!(selection.columns()[1], ColumnDescriptor::attribute("status"));
        assert!(ColumnSelection::from_ids(["bogus"]).is_err());
    }
}
