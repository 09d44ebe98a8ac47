//! SOQL and SOSL layout.
//!
//! ```text
//! [
//!     SELECT
//!         Id,
//!         Name
//!     FROM
//!         Account
//!     WHERE
//!         Name = 'Bob'
//!         AND Active = true
//! ]
//! ```

use super::codegen::Generator;
use super::error::{GenerateError, GenerateResult};
use crate::ast::*;

impl Generator {
    pub(super) fn query(&self, query: &Query, depth: usize) -> GenerateResult<String> {
        if query.select.is_empty() {
            return Err(GenerateError::structural("query", "no select items"));
        }
        if query.from.is_empty() {
            return Err(GenerateError::structural("query", "no target object"));
        }

        let content = depth + 2;
        let mut out = String::from("[\n");

        let select = query
            .select
            .iter()
            .map(|item| {
                let field = self.query_field(&item.field)?;
                Ok(match &item.alias {
                    Some(alias) => format!("{field} {alias}"),
                    None => field,
                })
            })
            .collect::<GenerateResult<Vec<_>>>()?;
        self.section(&mut out, "SELECT", &select, depth);
        self.section(&mut out, "FROM", &[query.from.clone()], depth);

        if let Some(condition) = &query.condition {
            let rendered = self.condition(condition, content)?;
            self.section(&mut out, "WHERE", &[rendered], depth);
        }

        if !query.order_by.is_empty() {
            let items = query
                .order_by
                .iter()
                .map(|item| {
                    let mut rendered = self.query_field(&item.field)?;
                    match item.direction {
                        Some(SortDirection::Asc) => rendered.push_str(" ASC"),
                        Some(SortDirection::Desc) => rendered.push_str(" DESC"),
                        None => {}
                    }
                    match item.nulls {
                        Some(NullsOrder::First) => rendered.push_str(" NULLS FIRST"),
                        Some(NullsOrder::Last) => rendered.push_str(" NULLS LAST"),
                        None => {}
                    }
                    Ok(rendered)
                })
                .collect::<GenerateResult<Vec<_>>>()?;
            self.section(&mut out, "ORDER BY", &items, depth);
        }

        if let Some(limit) = &query.limit {
            let rendered = self.expression(limit, content)?;
            self.section(&mut out, "LIMIT", &[rendered], depth);
        }
        if let Some(offset) = &query.offset {
            let rendered = self.expression(offset, content)?;
            self.section(&mut out, "OFFSET", &[rendered], depth);
        }

        out.push_str(&self.indent(depth));
        out.push(']');
        Ok(out)
    }

    pub(super) fn search(&self, search: &Search, depth: usize) -> GenerateResult<String> {
        if matches!(&search.term, Expression::String(term) if term.trim().is_empty()) {
            return Err(GenerateError::structural("search", "empty search term"));
        }

        let content = depth + 2;
        let mut out = String::from("[\n");

        let term = self.expression(&search.term, content)?;
        self.section(&mut out, "FIND", &[term], depth);

        if let Some(scope) = search.scope {
            self.section(&mut out, "IN", &[scope.as_str().to_string()], depth);
        }

        if !search.returning.is_empty() {
            let items = search
                .returning
                .iter()
                .map(|item| {
                    if item.fields.is_empty() {
                        return Ok(item.object.clone());
                    }
                    let fields = item
                        .fields
                        .iter()
                        .map(|field| self.qualified_name(field, "search field"))
                        .collect::<GenerateResult<Vec<_>>>()?;
                    Ok(format!("{}({})", item.object, fields.join(", ")))
                })
                .collect::<GenerateResult<Vec<_>>>()?;
            self.section(&mut out, "RETURNING", &items, depth);
        }

        if let Some(limit) = &search.limit {
            let rendered = self.expression(limit, content)?;
            self.section(&mut out, "LIMIT", &[rendered], depth);
        }

        out.push_str(&self.indent(depth));
        out.push(']');
        Ok(out)
    }

    /// Keyword one level inside the bracket, items one level further
    fn section(&self, out: &mut String, keyword: &str, items: &[String], depth: usize) {
        let content = self.indent(depth + 2);
        out.push_str(&self.indent(depth + 1));
        out.push_str(keyword);
        out.push('\n');
        let body = items
            .iter()
            .map(|item| format!("{content}{item}"))
            .collect::<Vec<_>>()
            .join(",\n");
        out.push_str(&body);
        out.push('\n');
    }

    fn query_field(&self, field: &QueryField) -> GenerateResult<String> {
        match field {
            QueryField::Path(path) => self.qualified_name(path, "query field"),
            QueryField::Function { name, argument } => match argument {
                Some(argument) => Ok(format!(
                    "{name}({})",
                    self.qualified_name(argument, "query field")?
                )),
                None => Ok(format!("{name}()")),
            },
        }
    }

    /// Conditions are laid out one operand per line at `depth`, each
    /// continuation line starting with its logical operator.
    fn condition(&self, condition: &Condition, depth: usize) -> GenerateResult<String> {
        match condition {
            Condition::Comparison {
                field,
                operator,
                value,
            } => Ok(format!(
                "{} {} {}",
                self.query_field(field)?,
                operator.as_str(),
                self.expression(value, depth)?
            )),
            Condition::Logical {
                operator,
                left,
                right,
            } => {
                let mut out = self.condition_operand(left, Some(*operator), false, depth)?;
                if let Some(right) = right {
                    out.push('\n');
                    out.push_str(&self.indent(depth));
                    out.push_str(operator.as_str());
                    out.push(' ');
                    out.push_str(&self.condition_operand(right, Some(*operator), true, depth)?);
                }
                Ok(out)
            }
            Condition::Not(inner) => Ok(format!(
                "NOT {}",
                self.condition_operand(inner, None, true, depth)?
            )),
        }
    }

    /// A nested logical node is parenthesized unless it continues a
    /// left-leaning chain of the same operator.
    fn condition_operand(
        &self,
        operand: &Condition,
        parent: Option<LogicalOp>,
        is_right: bool,
        depth: usize,
    ) -> GenerateResult<String> {
        let rendered = self.condition(operand, depth)?;
        match operand {
            Condition::Logical {
                operator,
                right: Some(_),
                ..
            } if is_right || parent != Some(*operator) => Ok(format!("({rendered})")),
            _ => Ok(rendered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn comparison(field: &str, value: i64) -> Condition {
        Condition::Comparison {
            field: QueryField::Path(QualifiedName::parse_dotted(field)),
            operator: ComparisonOp::Equal,
            value: Expression::Integer(value),
        }
    }

    fn logical(operator: LogicalOp, left: Condition, right: Condition) -> Condition {
        Condition::Logical {
            operator,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    #[test]
    fn test_same_operator_chain_is_flat() {
        let cond = logical(
            LogicalOp::And,
            logical(LogicalOp::And, comparison("A", 1), comparison("B", 2)),
            comparison("C", 3),
        );
        assert_eq!(
            Generator::new().condition(&cond, 2).unwrap(),
            "A = 1\n        AND B = 2\n        AND C = 3"
        );
    }

    #[test]
    fn test_mixed_operators_are_parenthesized() {
        let cond = logical(
            LogicalOp::Or,
            comparison("A", 1),
            logical(LogicalOp::And, comparison("B", 2), comparison("C", 3)),
        );
        assert_eq!(
            Generator::new().condition(&cond, 0).unwrap(),
            "A = 1\nOR (B = 2\nAND C = 3)"
        );
    }

    #[test]
    fn test_not_wraps_logical() {
        let cond = Condition::Not(Box::new(logical(
            LogicalOp::Or,
            comparison("A", 1),
            comparison("B", 2),
        )));
        assert_eq!(
            Generator::new().condition(&cond, 0).unwrap(),
            "NOT (A = 1\nOR B = 2)"
        );
    }

    #[test]
    fn test_query_without_select_is_structural() {
        let query = Query {
            select: vec![],
            from: "Account".to_string(),
            condition: None,
            order_by: vec![],
            limit: None,
            offset: None,
        };
        assert!(Generator::new().query(&query, 0).is_err());
    }
}
