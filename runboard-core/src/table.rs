//! Paging, sorting and filtering state reported by the table widget.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// One sort key. The widget lists them primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(rename = "id")]
    pub column_id: String,
    #[serde(rename = "desc", default)]
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: false,
        }
    }

    pub fn descending(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            descending: true,
        }
    }

    /// `<columnId>` or `<columnId> DESC`.
    pub fn to_order_by(&self) -> String {
        if self.descending {
            format!("{} DESC", self.column_id)
        } else {
            self.column_id.clone()
        }
    }
}

/// An equality filter typed into a column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(rename = "id")]
    pub column_id: String,
    pub value: String,
}

impl FilterSpec {
    pub fn new(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of the widget's state for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRequestState {
    #[serde(rename = "page")]
    pub page_index: u32,
    pub page_size: u32,
    #[serde(rename = "sorted", default)]
    pub sort_specs: Vec<SortSpec>,
    #[serde(rename = "filtered", default)]
    pub filter_specs: Vec<FilterSpec>,
}

impl TableRequestState {
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
            sort_specs: Vec::new(),
            filter_specs: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort_specs.push(sort);
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter_specs.push(filter);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::invalid_value("pageSize", "must be > 0"));
        }
        Ok(())
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}
