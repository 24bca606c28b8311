//! The relational backend that loaded tables live in.
//!
//! The loader and the query orchestrator only ever talk to an [`Engine`]:
//! declare a table, insert typed rows, run a query. [`SqliteEngine`] backs it
//! with an in-memory SQLite connection owned for the life of a session.

use log::debug;
use rusqlite::{Connection, params_from_iter};

use crate::{data::Value, error::Result, schema::TableSchema};

/// Receives a query result: the column names once, then each row.
pub trait RowSink {
    fn columns(&mut self, names: &[String]) -> Result<()>;
    fn row(&mut self, values: &[Value]) -> Result<()>;
}

pub trait Engine {
    fn define_schema(&mut self, schema: &TableSchema) -> Result<()>;
    fn insert_row(&mut self, table: &str, values: &[Value]) -> Result<()>;
    /// Runs `sql`, streaming its result into `sink`. Engine errors pass through verbatim.
    fn execute_query(&self, sql: &str, sink: &mut dyn RowSink) -> Result<()>;
}

/// Double-quotes an identifier, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_table_sql(schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_identifier(&c.name), c.datatype.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", quote_identifier(&schema.name))
}

pub fn insert_sql(table: &str, width: usize) -> String {
    let placeholders = vec!["?"; width].join(",");
    format!(
        "INSERT INTO {} VALUES ({placeholders})",
        quote_identifier(table)
    )
}

pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }
}

impl Engine for SqliteEngine {
    fn define_schema(&mut self, schema: &TableSchema) -> Result<()> {
        let sql = create_table_sql(schema);
        debug!("{sql}");
        self.conn.execute(&sql, [])?;
        Ok(())
    }

    fn insert_row(&mut self, table: &str, values: &[Value]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&insert_sql(table, values.len()))?;
        stmt.execute(params_from_iter(values.iter()))?;
        Ok(())
    }

    fn execute_query(&self, sql: &str, sink: &mut dyn RowSink) -> Result<()> {
        let mut stmt = self.conn.prepare(sql)?;
        let names = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        sink.columns(&names)?;

        let mut rows = stmt.query([])?;
        let mut values = Vec::with_capacity(names.len());
        while let Some(row) = rows.next()? {
            values.clear();
            for idx in 0..names.len() {
                values.push(Value::from(row.get_ref(idx)?));
            }
            sink.row(&values)?;
        }
        Ok(())
    }
}
