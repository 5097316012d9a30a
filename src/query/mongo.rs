use super::state::BuilderState;
use super::{Dialect, Direction, Query, QueryBuilder, QueryBuilderFactory, Value};
use crate::error::QueryError;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as Json};

lazy_static! {
    // Names the shell accepts as `db.<name>`, dotted sub-collections included.
    static ref SHELL_PATH: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("invalid collection pattern");
}

fn check_collection(name: &str) -> Result<(), QueryError> {
    if name.contains('$') || name.contains('\0') {
        return Err(QueryError::invalid_identifier(
            "MongoDB",
            name,
            "collection names cannot contain '$' or NUL",
        ));
    }
    if name.starts_with("system.") {
        return Err(QueryError::invalid_identifier(
            "MongoDB",
            name,
            "the 'system.' prefix is reserved",
        ));
    }
    Ok(())
}

fn check_field(name: &str) -> Result<(), QueryError> {
    if name.starts_with('$') || name.contains('\0') {
        return Err(QueryError::invalid_identifier(
            "MongoDB",
            name,
            "field names cannot start with '$' or contain NUL",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct MongoQueryBuilder {
    state: BuilderState,
}

impl MongoQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryBuilder for MongoQueryBuilder {
    fn dialect(&self) -> Dialect {
        Dialect::Mongo
    }

    fn table(&mut self, name: &str) -> &mut dyn QueryBuilder {
        self.state.set_table(name, check_collection);
        self
    }

    fn select(&mut self, columns: &[&str]) -> &mut dyn QueryBuilder {
        self.state.set_columns(columns, check_field);
        self
    }

    fn limit(&mut self, value: i64) -> &mut dyn QueryBuilder {
        self.state.set_limit(value);
        self
    }

    fn where_eq(&mut self, column: &str, value: Value) -> &mut dyn QueryBuilder {
        self.state.set_predicate(column, value, check_field);
        self
    }

    fn order_by(&mut self, column: &str, direction: Direction) -> &mut dyn QueryBuilder {
        self.state.push_order(column, direction, check_field);
        self
    }

    fn finalize(&mut self) -> Result<Query, QueryError> {
        self.state.finalize(Dialect::Mongo)
    }

    fn reset(&mut self) -> &mut dyn QueryBuilder {
        self.state.reset();
        self
    }

    fn fork(&self) -> Box<dyn QueryBuilder> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDialect;

impl QueryBuilderFactory for MongoDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Mongo
    }

    fn new_builder(&self) -> Box<dyn QueryBuilder> {
        Box::new(MongoQueryBuilder::new())
    }
}

fn collection_ref(name: &str) -> String {
    if SHELL_PATH.is_match(name) {
        format!("db.{name}")
    } else {
        format!("db.getCollection({})", Json::from(name))
    }
}

/// Renders as a mongo shell expression, e.g.
/// `db.posts.find({"id":5}, {"title":1}).sort({"id":-1}).limit(5)`.
/// Collections that are not plain dotted identifiers go through
/// `db.getCollection("...")`.
pub(super) fn render(query: &Query) -> String {
    let mut filter = Map::new();
    if let Some(predicate) = &query.predicate {
        filter.insert(predicate.column.clone(), Json::from(&predicate.value));
    }

    let mut shell = format!("{}.find({}", collection_ref(&query.table), Json::Object(filter));

    if !query.columns.is_empty() {
        let projection: Map<String, Json> = query
            .columns
            .iter()
            .map(|c| (c.clone(), Json::from(1)))
            .collect();
        shell.push_str(&format!(", {}", Json::Object(projection)));
    }
    shell.push(')');

    if !query.order_by.is_empty() {
        let sort: Map<String, Json> = query
            .order_by
            .iter()
            .map(|o| {
                let direction = match o.direction {
                    Direction::Asc => 1,
                    Direction::Desc => -1,
                };
                (o.column.clone(), Json::from(direction))
            })
            .collect();
        shell.push_str(&format!(".sort({})", Json::Object(sort)));
    }

    if let Some(limit) = query.limit {
        shell.push_str(&format!(".limit({limit})"));
    }

    shell
}
