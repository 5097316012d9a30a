use super::state::BuilderState;
use super::{Dialect, Direction, Query, QueryBuilder, QueryBuilderFactory, Value};
use crate::error::QueryError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier pattern");
}

fn check_identifier(name: &str) -> Result<(), QueryError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(QueryError::invalid_identifier(
            "MySQL",
            name,
            "expected letters, digits or '_' and no leading digit",
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MySqlQueryBuilder {
    state: BuilderState,
}

impl MySqlQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryBuilder for MySqlQueryBuilder {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn table(&mut self, name: &str) -> &mut dyn QueryBuilder {
        self.state.set_table(name, check_identifier);
        self
    }

    fn select(&mut self, columns: &[&str]) -> &mut dyn QueryBuilder {
        self.state.set_columns(columns, check_identifier);
        self
    }

    fn limit(&mut self, value: i64) -> &mut dyn QueryBuilder {
        self.state.set_limit(value);
        self
    }

    fn where_eq(&mut self, column: &str, value: Value) -> &mut dyn QueryBuilder {
        self.state.set_predicate(column, value, check_identifier);
        self
    }

    fn order_by(&mut self, column: &str, direction: Direction) -> &mut dyn QueryBuilder {
        self.state.push_order(column, direction, check_identifier);
        self
    }

    fn finalize(&mut self) -> Result<Query, QueryError> {
        self.state.finalize(Dialect::MySql)
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
pub struct MySqlDialect;

impl QueryBuilderFactory for MySqlDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn new_builder(&self) -> Box<dyn QueryBuilder> {
        Box::new(MySqlQueryBuilder::new())
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{name}`")
}

fn literal(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Text(s) => {
            // MySQL treats a backslash as an escape inside literals unless
            // NO_BACKSLASH_ESCAPES is set, so backslashes are doubled too.
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("''"),
                    '\0' => out.push_str("\\0"),
                    c => out.push(c),
                }
            }
            out.push('\'');
            out
        }
    }
}

pub(super) fn render(query: &Query) -> String {
    let columns = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {columns} FROM {}", quote_identifier(&query.table));

    if let Some(predicate) = &query.predicate {
        sql.push_str(&format!(
            " WHERE {} = {}",
            quote_identifier(&predicate.column),
            literal(&predicate.value)
        ));
    }

    if !query.order_by.is_empty() {
        let order = query
            .order_by
            .iter()
            .map(|o| {
                let direction = match o.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {direction}", quote_identifier(&o.column))
            })
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ORDER BY {order}"));
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    sql.push(';');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_query() {
        let query = MySqlQueryBuilder::new()
            .table("posts")
            .select(&["id", "title"])
            .where_eq("author_id", 42.into())
            .order_by("id", Direction::Desc)
            .limit(5)
            .finalize()
            .unwrap();

        assert_eq!(
            query.render(),
            "SELECT `id`, `title` FROM `posts` WHERE `author_id` = 42 ORDER BY `id` DESC LIMIT 5;"
        );
    }

    #[test]
    fn test_render_all_columns() {
        let query = MySqlQueryBuilder::new().table("posts").finalize().unwrap();
        assert_eq!(query.render(), "SELECT * FROM `posts`;");
    }

    #[test]
    fn test_text_literal_is_escaped() {
        let query = MySqlQueryBuilder::new()
            .table("users")
            .where_eq("name", "O'Brien".into())
            .finalize()
            .unwrap();
        assert!(query.render().contains("WHERE `name` = 'O''Brien'"));
    }

    #[test]
    fn test_backslash_cannot_close_literal() {
        let query = MySqlQueryBuilder::new()
            .table("users")
            .where_eq("name", r"x\' OR 1=1 -- ".into())
            .finalize()
            .unwrap();
        assert_eq!(
            query.render(),
            r"SELECT * FROM `users` WHERE `name` = 'x\\'' OR 1=1 -- ';"
        );
    }

    #[test]
    fn test_nul_is_escaped() {
        let query = MySqlQueryBuilder::new()
            .table("users")
            .where_eq("name", "a\0b".into())
            .finalize()
            .unwrap();
        assert!(query.render().contains(r"= 'a\0b'"));
    }

    #[test]
    fn test_identifier_rules() {
        let result = MySqlQueryBuilder::new().table("posts; DROP").finalize();
        assert!(matches!(
            result,
            Err(QueryError::InvalidIdentifier { dialect: "MySQL", .. })
        ));

        let result = MySqlQueryBuilder::new().table("posts").select(&["1st"]).finalize();
        assert!(result.is_err());
    }

    #[test]
    fn test_multiple_orderings() {
        let query = MySqlQueryBuilder::new()
            .table("posts")
            .order_by("pinned", Direction::Desc)
            .order_by("created_at", Direction::Asc)
            .finalize()
            .unwrap();
        assert_eq!(
            query.render(),
            "SELECT * FROM `posts` ORDER BY `pinned` DESC, `created_at` ASC;"
        );
    }
}
