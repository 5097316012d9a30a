//! Dialect query builders.
//!
//! A builder accumulates table, columns, predicate, ordering and limit through
//! chained calls and freezes them into an immutable [`Query`] on `finalize`.
//! Invalid arguments do not interrupt the chain: the first failure is recorded
//! and returned by `finalize`.
//!
//! ```
//! use design_patterns::query::{MySqlQueryBuilder, QueryBuilder};
//!
//! let mut builder = MySqlQueryBuilder::new();
//! let query = builder
//!     .table("posts")
//!     .select(&["id", "title"])
//!     .limit(5)
//!     .finalize()
//!     .unwrap();
//!
//! assert_eq!(query.render(), "SELECT `id`, `title` FROM `posts` LIMIT 5;");
//! ```

mod mongo;
mod mysql;
mod state;

pub use mongo::{MongoDialect, MongoQueryBuilder};
pub use mysql::{MySqlDialect, MySqlQueryBuilder};

use crate::error::{QueryError, UnknownSelector};
use crate::registry::Registry;
use lazy_static::lazy_static;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Query value types
// =============================================================================

/// Predicate operand. Only integers and text are supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Equality filter `column = value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Mongo,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::MySql, Dialect::Mongo];

    pub fn selector(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Mongo => "mongo",
        }
    }
}

impl FromStr for Dialect {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|candidate| candidate.selector() == wanted)
            .ok_or_else(|| UnknownSelector::new("dialect", s))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Finalized query. The field set is the same for every dialect; only
/// [`Query::render`] differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    predicate: Option<Predicate>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
}

impl Query {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Selected columns. Empty means every column.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Dialect-specific text of the query.
    pub fn render(&self) -> String {
        match self.dialect {
            Dialect::MySql => mysql::render(self),
            Dialect::Mongo => mongo::render(self),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// Builder interface
// =============================================================================

/// Fluent query builder. Every configuration call returns the same builder so
/// calls compose left to right.
pub trait QueryBuilder: Send {
    fn dialect(&self) -> Dialect;

    fn table(&mut self, name: &str) -> &mut dyn QueryBuilder;

    fn select(&mut self, columns: &[&str]) -> &mut dyn QueryBuilder;

    fn limit(&mut self, value: i64) -> &mut dyn QueryBuilder;

    /// Sets the equality predicate, replacing any earlier one.
    fn where_eq(&mut self, column: &str, value: Value) -> &mut dyn QueryBuilder;

    fn order_by(&mut self, column: &str, direction: Direction) -> &mut dyn QueryBuilder;

    /// Freezes the accumulated state. Returns the first recorded validation
    /// failure instead, if any. Repeated calls on unchanged state return equal
    /// results.
    fn finalize(&mut self) -> Result<Query, QueryError>;

    /// Clears all state, including recorded failures.
    fn reset(&mut self) -> &mut dyn QueryBuilder;

    /// Independent copy of the current state.
    fn fork(&self) -> Box<dyn QueryBuilder>;
}

/// Hands out fresh builders for one dialect.
pub trait QueryBuilderFactory: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn new_builder(&self) -> Box<dyn QueryBuilder>;
}

/// Dialect registry. Unknown dialects fall back to MySQL.
pub fn dialect_registry() -> Registry<dyn QueryBuilderFactory> {
    let mut registry =
        Registry::<dyn QueryBuilderFactory>::new("dialect", Dialect::MySql.selector(), || {
            Arc::new(MySqlDialect)
        });
    registry.register(Dialect::Mongo.selector(), || Arc::new(MongoDialect));
    registry
}

lazy_static! {
    static ref DIALECTS: Registry<dyn QueryBuilderFactory> = dialect_registry();
}

/// Fresh builder for `selector` from the built-in dialect registry.
pub fn new_query_builder(selector: &str) -> Box<dyn QueryBuilder> {
    DIALECTS.get(selector).new_builder()
}
