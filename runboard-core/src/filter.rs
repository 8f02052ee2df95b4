//! Search filter expressions
//!
//! Filters are assembled from typed clauses and only turned into the
//! service's textual syntax at the edge, so user input can never change the
//! shape of the expression.

use crate::table::FilterSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Equality clause: `<column> = "<value>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterClause {
    /// Column id as understood by the service
    pub column_id: String,
    /// Raw, unescaped value
    pub value: String,
}

impl FilterClause {
    pub fn equals(column_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.column_id, quote(&self.value))
    }
}

impl From<&FilterSpec> for FilterClause {
    fn from(spec: &FilterSpec) -> Self {
        Self::equals(spec.column_id.clone(), spec.value.clone())
    }
}

/// Conjunction of clauses, rendered space-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    clauses: Vec<FilterClause>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[FilterSpec]) -> Self {
        Self {
            clauses: specs.iter().map(FilterClause::from).collect(),
        }
    }

    pub fn push(&mut self, clause: FilterClause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Double-quote a value, backslash-escaping `\` and `"`.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_quoted() {
        let clause = FilterClause::equals("tags.`mlflow.user`", "ana");
        assert_eq!(clause.to_string(), r#"tags.`mlflow.user` = "ana""#);
    }

    #[test]
    fn clauses_join_with_single_space() {
        let expr = FilterExpression::from_specs(&[
            FilterSpec::new("params.`lr`", "0.1"),
            FilterSpec::new("tags.`team`", "vision"),
        ]);
        assert_eq!(expr.render(), r#"params.`lr` = "0.1" tags.`team` = "vision""#);
    }

    #[test]
    fn empty_expression_renders_empty_string() {
        assert_eq!(FilterExpression::new().render(), "");
        assert!(FilterExpression::from_specs(&[]).is_empty());
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        let mut expr = FilterExpression::new();
        expr.push(FilterClause::equals("tags.`note`", r#"say "hi" \o/"#));
        assert_eq!(expr.render(), r#"tags.`note` = "say \"hi\" \\o/""#);
        assert_eq!(expr.clauses()[0].value, r#"say "hi" \o/"#);
    }
}
