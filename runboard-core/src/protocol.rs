//! Wire types exchanged with the run search service.

use crate::column::ColumnKind;
use crate::token::PageToken;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Column names a collection exposes, one list per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub params: Vec<String>,
}

impl ColumnNames {
    pub fn for_kind(&self, kind: ColumnKind) -> &[String] {
        match kind {
            ColumnKind::Attribute => &self.attributes,
            ColumnKind::Tag => &self.tags,
            ColumnKind::Metric => &self.metrics,
            ColumnKind::Param => &self.params,
        }
    }
}

/// Per-kind projection: only these keys come back for each run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWhitelist {
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRunsRequest {
    pub experiment_ids: Vec<String>,
    pub max_results: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<PageToken>,
    pub order_by: Vec<String>,
    pub tags_whitelist: FieldWhitelist,
    pub metrics_whitelist: FieldWhitelist,
    pub params_whitelist: FieldWhitelist,
    pub filter: String,
}

impl SearchRunsRequest {
    /// Whitelist sent for `kind`; attributes are never projected.
    pub fn whitelist(&self, kind: ColumnKind) -> Option<&FieldWhitelist> {
        match kind {
            ColumnKind::Attribute => None,
            ColumnKind::Tag => Some(&self.tags_whitelist),
            ColumnKind::Metric => Some(&self.metrics_whitelist),
            ColumnKind::Param => Some(&self.params_whitelist),
        }
    }

    /// True when both requests ask for the same result set, ignoring which
    /// page they point at.
    pub fn same_query(&self, other: &Self) -> bool {
        self.experiment_ids == other.experiment_ids
            && self.max_results == other.max_results
            && self.order_by == other.order_by
            && self.tags_whitelist == other.tags_whitelist
            && self.metrics_whitelist == other.metrics_whitelist
            && self.params_whitelist == other.params_whitelist
            && self.filter == other.filter
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRunsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<Run>>,
    /// int64 on the wire, so it may arrive as a string.
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub total_run_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<PageToken>,
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid run count {text:?}"))),
    }
}

/// A run as returned by search. `data` is missing when nothing survived the
/// whitelist projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub info: RunInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RunData>,
}

/// Attribute block of a run, kept as raw JSON fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunInfo(pub Map<String, Value>);

impl RunInfo {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunData {
    #[serde(default)]
    pub tags: Vec<KeyValue>,
    #[serde(default)]
    pub metrics: Vec<KeyValue>,
    #[serde(default)]
    pub params: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_missing_page_token() {
        let request = SearchRunsRequest {
            experiment_ids: vec!["7".into()],
            max_results: 10,
            page_token: None,
            order_by: vec![],
            tags_whitelist: FieldWhitelist::default(),
            metrics_whitelist: FieldWhitelist::default(),
            params_whitelist: FieldWhitelist {
                fields: vec!["lr".into()],
            },
            filter: String::new(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("page_token").is_none());
        assert_eq!(body["params_whitelist"], json!({ "fields": ["lr"] }));
        assert_eq!(body["experiment_ids"], json!(["7"]));
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: SearchRunsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.runs.is_none());
        assert_eq!(response.total_run_count, 0);

        let response: SearchRunsResponse = serde_json::from_value(json!({
            "runs": [{ "info": { "run_uuid": "r1", "start_time": "1700000000000" } }],
            "total_run_count": 1,
        }))
        .unwrap();
        let runs = response.runs.unwrap();
        assert!(runs[0].data.is_none());
        assert_eq!(runs[0].info.get("run_uuid"), Some(&json!("r1")));
    }

    #[test]
    fn total_run_count_accepts_string_or_number() {
        let response: SearchRunsResponse = serde_json::from_value(json!({
            "runs": [{ "info": { "run_uuid": "r1" } }],
            "total_run_count": "25",
        }))
        .unwrap();
        assert_eq!(response.total_run_count, 25);

        let response: SearchRunsResponse =
            serde_json::from_str(r#"{"runs":[],"total_run_count":25}"#).unwrap();
        assert_eq!(response.total_run_count, 25);

        let bad = serde_json::from_str::<SearchRunsResponse>(r#"{"total_run_count":"many"}"#);
        assert!(bad.is_err());

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["total_run_count"], json!(25));
    }

    #[test]
    fn column_names_default_missing_lists() {
        let names: ColumnNames = serde_json::from_value(json!({ "metrics": ["acc"] })).unwrap();
        assert_eq!(names.for_kind(ColumnKind::Metric), ["acc".to_string()]);
        assert!(names.for_kind(ColumnKind::Tag).is_empty());
    }
}
