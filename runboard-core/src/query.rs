//! Translate table state and column selection into a search request.

use crate::catalog::ColumnSelection;
use crate::column::ColumnKind;
use crate::error::ValidationError;
use crate::filter::FilterExpression;
use crate::protocol::SearchRunsRequest;
use crate::table::{SortSpec, TableRequestState};
use crate::token::PageToken;

pub fn order_by(sorts: &[SortSpec]) -> Vec<String> {
    sorts.iter().map(SortSpec::to_order_by).collect()
}

/// Build the request for one page. The caller decides the page token; the
/// request carries whatever it is given.
pub fn build_search_request(
    experiment_id: &str,
    state: &TableRequestState,
    selection: &ColumnSelection,
    page_token: Option<PageToken>,
) -> Result<SearchRunsRequest, ValidationError> {
    state.validate()?;
    Ok(SearchRunsRequest {
        experiment_ids: vec![experiment_id.to_string()],
        max_results: state.page_size,
        page_token,
        order_by: order_by(&state.sort_specs),
        tags_whitelist: selection.whitelist(ColumnKind::Tag),
        metrics_whitelist: selection.whitelist(ColumnKind::Metric),
        params_whitelist: selection.whitelist(ColumnKind::Param),
        filter: FilterExpression::from_specs(&state.filter_specs).render(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::table::FilterSpec;

    #[test]
    fn sort_specs_keep_widget_order() {
        let sorts = vec![
            SortSpec::descending("metrics.`acc`"),
            SortSpec::ascending("attributes.`start_time`"),
        ];
        assert_eq!(
            order_by(&sorts),
            vec!["metrics.`acc` DESC", "attributes.`start_time`"]
        );
    }

    #[test]
    fn whitelists_follow_selection() {
        let selection = ColumnSelection::new(vec![
            ColumnDescriptor::attribute("start_time"),
            ColumnDescriptor::tag("mlflow.user"),
            ColumnDescriptor::metric("acc"),
            ColumnDescriptor::tag("team"),
        ]);
        let request =
            build_search_request("3", &TableRequestState::new(0, 25), &selection, None).unwrap();
        assert_eq!(request.experiment_ids, vec!["3"]);
        assert_eq!(request.max_results, 25);
        assert_eq!(request.tags_whitelist.fields, vec!["mlflow.user", "team"]);
        assert_eq!(request.metrics_whitelist.fields, vec!["acc"]);
        assert!(request.params_whitelist.fields.is_empty());
        assert!(request.page_token.is_none());
        assert_eq!(request.filter, "");
    }

    #[test]
    fn empty_selection_sends_empty_whitelists() {
        let request = build_search_request(
            "3",
            &TableRequestState::new(0, 10),
            &ColumnSelection::default(),
            None,
        )
        .unwrap();
        for kind in [ColumnKind::Tag, ColumnKind::Metric, ColumnKind::Param] {
            assert!(request.whitelist(kind).unwrap().fields.is_empty());
        }
        assert!(request.whitelist(ColumnKind::Attribute).is_none());
    }

    #[test]
    fn filters_render_into_expression() {
        let state = TableRequestState::new(1, 10)
            .with_filter(FilterSpec::new("tags.`mlflow.user`", "ana"))
            .with_filter(FilterSpec::new("params.`lr`", "0.1"));
        let token = PageToken::new("opaque");
        let request =
            build_search_request("3", &state, &ColumnSelection::seed(), Some(token.clone()))
                .unwrap();
        assert_eq!(
            request.filter,
            r#"tags.`mlflow.user` = "ana" params.`lr` = "0.1""#
        );
        assert_eq!(request.page_token, Some(token));
    }

    #[test]
    fn zero_page_size_builds_nothing() {
        let result = build_search_request(
            "3",
            &TableRequestState::new(0, 0),
            &ColumnSelection::seed(),
            None,
        );
        assert!(result.is_err());
    }
}
