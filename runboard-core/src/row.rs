//! Rows derived from search results.

use crate::column::ColumnKind;
use crate::error::ValidationError;
use crate::protocol::{KeyValue, Run, SearchRunsResponse};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub type CellMap = BTreeMap<String, Value>;

/// Attribute fields holding epoch-millisecond timestamps.
pub const TIMESTAMP_FIELDS: [&str; 2] = ["start_time", "end_time"];

/// One run, reshaped into per-kind maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    pub attributes: CellMap,
    pub tags: CellMap,
    pub metrics: CellMap,
    pub params: CellMap,
}

impl Row {
    pub fn group(&self, kind: ColumnKind) -> &CellMap {
        match kind {
            ColumnKind::Attribute => &self.attributes,
            ColumnKind::Tag => &self.tags,
            ColumnKind::Metric => &self.metrics,
            ColumnKind::Param => &self.params,
        }
    }

    pub fn get(&self, kind: ColumnKind, name: &str) -> Option<&Value> {
        self.group(kind).get(name)
    }
}

/// Renders epoch-millisecond timestamps as date-time strings.
///
/// The default is UTC with [`Self::DEFAULT_FORMAT`] so rendered rows do not
/// depend on the host. Set `local` (config `timestamps.local`) to render in
/// the host's time zone instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRenderer {
    format: String,
    local: bool,
}

impl TimestampRenderer {
    pub const DEFAULT_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// `format` is a chrono strftime string; `local` renders in the host's
    /// time zone instead of UTC.
    pub fn new(format: impl Into<String>, local: bool) -> Result<Self, ValidationError> {
        let format = format.into();
        if format.trim().is_empty() {
            return Err(ValidationError::invalid_value("timestamps.format", "must not be empty"));
        }
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ValidationError::invalid_value(
                "timestamps.format",
                format!("invalid strftime pattern {format:?}"),
            ));
        }
        Ok(Self { format, local })
    }

    /// Accepts the millisecond count as a JSON string or number.
    pub fn render(&self, raw: &Value) -> Option<String> {
        let millis = match raw {
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            Value::Number(n) => n.as_i64()?,
            _ => return None,
        };
        let utc = DateTime::<Utc>::from_timestamp_millis(millis)?;
        let rendered = if self.local {
            utc.with_timezone(&Local).format(&self.format).to_string()
        } else {
            utc.format(&self.format).to_string()
        };
        Some(rendered)
    }
}

impl Default for TimestampRenderer {
    fn default() -> Self {
        Self {
            format: Self::DEFAULT_FORMAT.to_string(),
            local: false,
        }
    }
}

/// Later duplicates overwrite earlier ones.
pub fn key_values_to_map(pairs: &[KeyValue]) -> CellMap {
    let mut map = CellMap::new();
    for pair in pairs {
        map.insert(pair.key.clone(), pair.value.clone());
    }
    map
}

/// Copy the attribute block, rendering the timestamp fields. Values that do
/// not parse as timestamps are kept as they came.
pub fn render_attributes(run: &Run, renderer: &TimestampRenderer) -> CellMap {
    let mut attributes: CellMap = run
        .info
        .fields()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    for field in TIMESTAMP_FIELDS {
        if let Some(rendered) = attributes.get(field).and_then(|raw| renderer.render(raw)) {
            attributes.insert(field.to_string(), Value::String(rendered));
        }
    }
    attributes
}

pub fn transform_run(run: &Run, renderer: &TimestampRenderer) -> Row {
    let attributes = render_attributes(run, renderer);
    match &run.data {
        Some(data) => Row {
            attributes,
            tags: key_values_to_map(&data.tags),
            metrics: key_values_to_map(&data.metrics),
            params: key_values_to_map(&data.params),
        },
        None => Row {
            attributes,
            ..Row::default()
        },
    }
}

/// `ceil(total / page_size)`; a zero page size yields zero pages.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// What the table renders for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPage {
    pub rows: Vec<Row>,
    pub pages: u64,
    /// Set when the fetch failed; rows are then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GridPage {
    /// No rows, a single page.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            pages: 1,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty()
        }
    }

    pub fn from_response(
        response: &SearchRunsResponse,
        page_size: u32,
        renderer: &TimestampRenderer,
    ) -> Self {
        let Some(runs) = &response.runs else {
            return Self::empty();
        };
        Self {
            rows: runs.iter().map(|run| transform_run(run, renderer)).collect(),
            pages: page_count(response.total_run_count, page_size),
            error: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

impl Default for GridPage {
    fn default() -> Self {
        Self::empty()
    }
}
