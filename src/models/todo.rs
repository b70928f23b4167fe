use diesel::{
    sql_types::{Integer, Nullable, Text, TinyInt},
    QueryableByName,
};
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    errors::ServerError,
    store::{SqlValue, Statement},
};

const SELECT_ALL: &str = "SELECT id, todo, note, finished FROM todo ORDER BY id";
const SELECT_ONE: &str = "SELECT id, todo, note, finished FROM todo WHERE id = ?";
const INSERT: &str = "INSERT INTO todo (todo, note, finished) VALUES (?, ?, ?)";
const DELETE: &str = "DELETE FROM todo WHERE id = ?";

const NO_DATA: &str = "No data provided for update";
const NO_VALID_FIELDS: &str =
    "No valid fields provided for update (expected 'todo', 'note', or 'finished')";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub todo: String,
    pub note: Option<String>,
    pub finished: bool,
}

/// A `todo` row as the store returns it, `finished` still a 0/1 tiny int.
#[derive(Clone, Debug, PartialEq, Eq, QueryableByName)]
pub struct TodoRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub todo: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub note: Option<String>,
    #[diesel(sql_type = TinyInt)]
    pub finished: i8,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            todo: row.todo,
            note: row.note,
            finished: row.finished != 0,
        }
    }
}

impl Todo {
    pub fn select_all() -> Statement {
        Statement::new(SELECT_ALL, vec![])
    }

    pub fn select_one(id: i32) -> Statement {
        Statement::new(SELECT_ONE, vec![SqlValue::Int(id)])
    }

    pub fn delete(id: i32) -> Statement {
        Statement::new(DELETE, vec![SqlValue::Int(id)])
    }

    /// First row of a single-row read, `None` when nothing matched.
    pub fn from_rows(rows: Vec<TodoRow>) -> Option<Todo> {
        rows.into_iter().next().map(Todo::from)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTodo {
    pub todo: Option<String>,
    pub note: Option<String>,
    pub finished: Option<bool>,
}

impl NewTodo {
    pub fn insert_statement(self) -> Result<Statement, ServerError> {
        let todo = self
            .todo
            .ok_or(ServerError::UserError("Missing 'todo' field in request data"))?;

        Ok(Statement::new(
            INSERT,
            vec![
                SqlValue::Text(todo),
                self.note.map_or(SqlValue::Null, SqlValue::Text),
                SqlValue::Bool(self.finished.unwrap_or(false)),
            ],
        ))
    }
}

/// The recognized subset of an update body. `note: Some(None)` clears the note.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub todo: Option<String>,
    pub note: Option<Option<String>>,
    pub finished: Option<bool>,
}

impl TodoChanges {
    pub fn from_body(body: &[u8]) -> Result<Self, ServerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ServerError::UserError(NO_DATA));
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self::from_fields(&fields),
            // empty JSON values carry no changes either
            Ok(Value::Null) => Err(ServerError::UserError(NO_DATA)),
            Ok(Value::Array(items)) if items.is_empty() => Err(ServerError::UserError(NO_DATA)),
            Ok(_) | Err(_) => Err(ServerError::UserError(
                "Request body must be a valid JSON object",
            )),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ServerError> {
        if fields.is_empty() {
            return Err(ServerError::UserError(NO_DATA));
        }

        let changes = TodoChanges {
            todo: match fields.get("todo") {
                None => None,
                Some(Value::String(todo)) => Some(todo.clone()),
                Some(_) => return Err(ServerError::UserError("'todo' must be a string")),
            },
            note: match fields.get("note") {
                None => None,
                Some(Value::Null) => Some(None),
                Some(Value::String(note)) => Some(Some(note.clone())),
                Some(_) => return Err(ServerError::UserError("'note' must be a string or null")),
            },
            finished: match fields.get("finished") {
                None => None,
                Some(Value::Bool(finished)) => Some(*finished),
                Some(_) => return Err(ServerError::UserError("'finished' must be a boolean")),
            },
        };

        if changes == TodoChanges::default() {
            return Err(ServerError::UserError(NO_VALID_FIELDS));
        }

        Ok(changes)
    }

    /// Clauses and values are pushed pairwise in column order; the id binds last.
    pub fn update_statement(&self, id: i32) -> Statement {
        let mut clauses: Vec<&str> = Vec::with_capacity(3);
        let mut params: Vec<SqlValue> = Vec::with_capacity(4);

        if let Some(todo) = &self.todo {
            clauses.push("todo = ?");
            params.push(SqlValue::Text(todo.clone()));
        }
        if let Some(note) = &self.note {
            clauses.push("note = ?");
            params.push(note.clone().map_or(SqlValue::Null, SqlValue::Text));
        }
        if let Some(finished) = self.finished {
            clauses.push("finished = ?");
            params.push(SqlValue::Bool(finished));
        }
        params.push(SqlValue::Int(id));

        Statement::new(
            format!("UPDATE todo SET {} WHERE id = ?", clauses.join(", ")),
            params,
        )
    }
}
