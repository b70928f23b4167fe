use std::sync::{Arc, Mutex};

use diesel::{
    result::{DatabaseErrorKind, Error as DieselError},
    QueryResult,
};

use super::{SqlValue, Statement, Store, StoreConnection};
use crate::{errors::ServerError, models::todo::TodoRow};

#[derive(Default)]
struct Table {
    rows: Vec<TodoRow>,
    last_id: i32,
    executed: Vec<Statement>,
    failure: Option<String>,
}

/// In-memory `todo` table that understands the statements the handlers issue.
#[derive(Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
    offline: bool,
}

impl MemoryStore {
    pub fn offline() -> Self {
        MemoryStore {
            offline: true,
            ..Default::default()
        }
    }

    /// Every following statement fails with `message`.
    pub fn fail_with(&self, message: &str) {
        self.table.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.table.lock().unwrap().executed.clone()
    }

    pub fn rows(&self) -> Vec<TodoRow> {
        self.table.lock().unwrap().rows.clone()
    }
}

pub struct MemoryConnection {
    table: Arc<Mutex<Table>>,
    last_insert_id: Option<i32>,
}

impl Store for MemoryStore {
    type Connection = MemoryConnection;

    fn connect(&self) -> Result<MemoryConnection, ServerError> {
        if self.offline {
            return Err(ServerError::ConnectionFailed);
        }
        Ok(MemoryConnection {
            table: self.table.clone(),
            last_insert_id: None,
        })
    }
}

fn store_error(message: &str) -> DieselError {
    DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(message.to_string()))
}

fn int(value: &SqlValue) -> QueryResult<i32> {
    match value {
        SqlValue::Int(v) => Ok(*v),
        other => Err(store_error(&format!("expected an integer, got {other:?}"))),
    }
}

fn text(value: &SqlValue) -> QueryResult<Option<String>> {
    match value {
        SqlValue::Text(v) => Ok(Some(v.clone())),
        SqlValue::Null => Ok(None),
        other => Err(store_error(&format!("expected text, got {other:?}"))),
    }
}

fn tiny_int(value: &SqlValue) -> QueryResult<i8> {
    match value {
        SqlValue::Bool(v) => Ok(*v as i8),
        other => Err(store_error(&format!("expected a boolean, got {other:?}"))),
    }
}

impl Table {
    fn record(&mut self, statement: &Statement) -> QueryResult<()> {
        self.executed.push(statement.clone());
        match &self.failure {
            Some(message) => Err(store_error(message)),
            None => Ok(()),
        }
    }

    fn insert(&mut self, params: &[SqlValue]) -> QueryResult<i32> {
        let todo = text(&params[0])?.ok_or_else(|| store_error("Column 'todo' cannot be null"))?;
        self.last_id += 1;
        self.rows.push(TodoRow {
            id: self.last_id,
            todo,
            note: text(&params[1])?,
            finished: tiny_int(&params[2])?,
        });
        Ok(self.last_id)
    }

    fn update(&mut self, sql: &str, params: &[SqlValue]) -> QueryResult<usize> {
        let assignments = sql
            .strip_prefix("UPDATE todo SET ")
            .and_then(|rest| rest.strip_suffix(" WHERE id = ?"))
            .ok_or_else(|| store_error("unsupported update"))?;
        let (values, id) = params.split_at(params.len() - 1);
        let id = int(&id[0])?;

        let row = match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => row,
            None => return Ok(0),
        };
        for (clause, value) in assignments.split(", ").zip(values) {
            match clause {
                "todo = ?" => {
                    row.todo = text(value)?.ok_or_else(|| store_error("Column 'todo' cannot be null"))?
                }
                "note = ?" => row.note = text(value)?,
                "finished = ?" => row.finished = tiny_int(value)?,
                _ => return Err(store_error("unknown column")),
            }
        }
        // matched, not changed, rows
        Ok(1)
    }
}

impl StoreConnection for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> QueryResult<usize> {
        let mut table = self.table.lock().unwrap();
        table.record(statement)?;

        let sql = statement.sql.as_str();
        if sql.starts_with("INSERT INTO todo ") {
            self.last_insert_id = Some(table.insert(&statement.params)?);
            Ok(1)
        } else if sql.starts_with("UPDATE todo ") {
            table.update(sql, &statement.params)
        } else if sql == "DELETE FROM todo WHERE id = ?" {
            let id = int(&statement.params[0])?;
            let before = table.rows.len();
            table.rows.retain(|row| row.id != id);
            Ok(before - table.rows.len())
        } else {
            Err(store_error("unsupported statement"))
        }
    }

    fn fetch(&mut self, statement: &Statement) -> QueryResult<Vec<TodoRow>> {
        let mut table = self.table.lock().unwrap();
        table.record(statement)?;

        match statement.sql.as_str() {
            "SELECT id, todo, note, finished FROM todo ORDER BY id" => {
                let mut rows = table.rows.clone();
                rows.sort_by_key(|row| row.id);
                Ok(rows)
            }
            "SELECT id, todo, note, finished FROM todo WHERE id = ?" => {
                let id = int(&statement.params[0])?;
                Ok(table.rows.iter().filter(|row| row.id == id).cloned().collect())
            }
            _ => Err(store_error("unsupported query")),
        }
    }

    fn last_insert_id(&mut self) -> QueryResult<i32> {
        Ok(self.last_insert_id.unwrap_or(0))
    }
}
