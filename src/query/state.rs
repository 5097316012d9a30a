// Accumulator owned by each concrete builder. Dialect rules are passed in as
// identifier checks; everything here is dialect-agnostic.

use super::{Dialect, Direction, OrderBy, Predicate, Query, Value};
use crate::error::QueryError;
use tracing::warn;

pub(super) type IdentifierCheck = fn(&str) -> Result<(), QueryError>;

#[derive(Debug, Clone, Default)]
pub(super) struct BuilderState {
    table: Option<String>,
    columns: Vec<String>,
    predicate: Option<Predicate>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    error: Option<QueryError>,
    finalized_for: Option<String>,
}

impl BuilderState {
    fn record(&mut self, err: QueryError) {
        if self.error.is_none() {
            warn!(error = %err, "query builder input rejected");
            self.error = Some(err);
        }
    }

    pub fn set_table(&mut self, name: &str, check: IdentifierCheck) {
        let name = name.trim();
        if name.is_empty() {
            return self.record(QueryError::EmptyTable);
        }
        if let Some(finalized) = &self.finalized_for {
            if finalized != name {
                let err = QueryError::StaleBuilder {
                    finalized: finalized.clone(),
                    requested: name.to_string(),
                };
                return self.record(err);
            }
        }
        match check(name) {
            Ok(()) => self.table = Some(name.to_string()),
            Err(err) => self.record(err),
        }
    }

    pub fn set_columns(&mut self, columns: &[&str], check: IdentifierCheck) {
        if columns.is_empty() {
            return self.record(QueryError::EmptyColumn { context: "select" });
        }

        let mut accepted = Vec::with_capacity(columns.len());
        for column in columns {
            match validate_column(column, "select", check) {
                Ok(column) => accepted.push(column),
                Err(err) => return self.record(err),
            }
        }
        self.columns = accepted;
    }

    pub fn set_limit(&mut self, value: i64) {
        match u64::try_from(value) {
            Ok(limit) => self.limit = Some(limit),
            Err(_) => self.record(QueryError::NegativeLimit(value)),
        }
    }

    pub fn set_predicate(&mut self, column: &str, value: Value, check: IdentifierCheck) {
        match validate_column(column, "where", check) {
            Ok(column) => self.predicate = Some(Predicate { column, value }),
            Err(err) => self.record(err),
        }
    }

    pub fn push_order(&mut self, column: &str, direction: Direction, check: IdentifierCheck) {
        match validate_column(column, "order by", check) {
            // One entry per column: a repeated column keeps its position and
            // takes the newer direction.
            Ok(column) => match self.order_by.iter_mut().find(|o| o.column == column) {
                Some(existing) => existing.direction = direction,
                None => self.order_by.push(OrderBy { column, direction }),
            },
            Err(err) => self.record(err),
        }
    }

    pub fn finalize(&mut self, dialect: Dialect) -> Result<Query, QueryError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let table = self.table.clone().ok_or(QueryError::MissingTable)?;
        self.finalized_for = Some(table.clone());

        Ok(Query {
            dialect,
            table,
            columns: self.columns.clone(),
            predicate: self.predicate.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
        })
    }

    pub fn reset(&mut self) {
        *self = BuilderState::default();
    }
}

fn validate_column(
    column: &str,
    context: &'static str,
    check: IdentifierCheck,
) -> Result<String, QueryError> {
    let column = column.trim();
    if column.is_empty() {
        return Err(QueryError::EmptyColumn { context });
    }
    check(column)?;
    Ok(column.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(_: &str) -> Result<(), QueryError> {
        Ok(())
    }

    fn reject_all(name: &str) -> Result<(), QueryError> {
        Err(QueryError::invalid_identifier("test", name, "rejected"))
    }

    #[test]
    fn test_repeated_order_column_is_replaced_in_place() {
        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        state.push_order("id", Direction::Desc, accept);
        state.push_order("title", Direction::Asc, accept);
        state.push_order("id", Direction::Asc, accept);

        let query = state.finalize(Dialect::MySql).unwrap();
        let order: Vec<(&str, Direction)> = query
            .order_by()
            .iter()
            .map(|o| (o.column.as_str(), o.direction))
            .collect();
        assert_eq!(order, [("id", Direction::Asc), ("title", Direction::Asc)]);
    }

    #[test]
    fn test_first_error_wins() {
        let mut state = BuilderState::default();
        state.set_limit(-3);
        state.set_table("", accept);
        state.set_limit(-9);
        assert_eq!(state.finalize(Dialect::MySql), Err(QueryError::NegativeLimit(-3)));
    }

    #[test]
    fn test_missing_table() {
        let mut state = BuilderState::default();
        state.set_columns(&["id"], accept);
        assert_eq!(state.finalize(Dialect::MySql), Err(QueryError::MissingTable));
    }

    #[test]
    fn test_blank_column_rejected() {
        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        state.set_columns(&["id", "  "], accept);
        assert_eq!(
            state.finalize(Dialect::Mongo),
            Err(QueryError::EmptyColumn { context: "select" })
        );
    }

    #[test]
    fn test_empty_select_rejected() {
        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        state.set_columns(&[], accept);
        assert!(state.finalize(Dialect::MySql).is_err());
    }

    #[test]
    fn test_identifier_check_applies_to_every_position() {
        let mut state = BuilderState::default();
        state.set_predicate("id", Value::Int(1), reject_all);
        assert!(matches!(
            state.finalize(Dialect::MySql),
            Err(QueryError::InvalidIdentifier { .. })
        ));

        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        state.push_order("created", Direction::Desc, reject_all);
        assert!(state.finalize(Dialect::MySql).is_err());
    }

    #[test]
    fn test_refinement_after_finalize_keeps_table() {
        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        let first = state.finalize(Dialect::MySql).unwrap();

        state.set_table("posts", accept);
        state.set_limit(2);
        let second = state.finalize(Dialect::MySql).unwrap();

        assert_eq!(first.limit(), None);
        assert_eq!(second.limit(), Some(2));
    }

    #[test]
    fn test_new_table_after_finalize_requires_reset() {
        let mut state = BuilderState::default();
        state.set_table("posts", accept);
        state.finalize(Dialect::MySql).unwrap();

        state.set_table("users", accept);
        assert_eq!(
            state.finalize(Dialect::MySql),
            Err(QueryError::StaleBuilder {
                finalized: "posts".to_string(),
                requested: "users".to_string(),
            })
        );

        state.reset();
        state.set_table("users", accept);
        assert_eq!(state.finalize(Dialect::MySql).unwrap().table(), "users");
    }
}
