use diesel::{
    mysql::{Mysql, MysqlConnection},
    query_builder::{BoxedSqlQuery, SqlQuery},
    r2d2::ConnectionManager,
    result::Error as DieselError,
    sql_types::{BigInt, Bool, Integer, Nullable, Text, Unsigned},
    QueryResult, QueryableByName, RunQueryDsl,
};

use crate::{config::DatabaseConfig, errors::ServerError, models::todo::TodoRow};

#[cfg(test)]
pub mod memory;

pub type Pool = r2d2::Pool<ConnectionManager<MysqlConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<MysqlConnection>>;

/// A positional statement parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlValue {
    Int(i32),
    Text(String),
    Bool(bool),
    Null,
}

/// SQL text with `?` placeholders and the values bound to them, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Statement {
            sql: sql.into(),
            params,
        }
    }
}

pub trait StoreConnection {
    /// Runs a write and returns the number of matched rows.
    fn execute(&mut self, statement: &Statement) -> QueryResult<usize>;
    fn fetch(&mut self, statement: &Statement) -> QueryResult<Vec<TodoRow>>;
    /// Id assigned by the most recent insert on this connection.
    fn last_insert_id(&mut self) -> QueryResult<i32>;
}

/// Hands out one connection per request. The connection is released when dropped.
pub trait Store: Send + Sync + 'static {
    type Connection: StoreConnection;

    fn connect(&self) -> Result<Self::Connection, ServerError>;
}

pub fn build_pool(config: &DatabaseConfig) -> Pool {
    let manager = ConnectionManager::<MysqlConnection>::new(config.url());
    // unchecked so a database that is down at startup only fails requests
    r2d2::Pool::builder()
        .max_size(config.pool_size)
        .min_idle(Some(0))
        .connection_timeout(config.connect_timeout)
        .build_unchecked(manager)
}

impl Store for Pool {
    type Connection = PooledConnection;

    fn connect(&self) -> Result<PooledConnection, ServerError> {
        Ok(self.get()?)
    }
}

fn bound<'f>(statement: &Statement) -> BoxedSqlQuery<'f, Mysql, SqlQuery> {
    statement.params.iter().cloned().fold(
        diesel::sql_query(statement.sql.as_str()).into_boxed(),
        |query, param| match param {
            SqlValue::Int(value) => query.bind::<Integer, _>(value),
            SqlValue::Text(value) => query.bind::<Text, _>(value),
            SqlValue::Bool(value) => query.bind::<Bool, _>(value),
            SqlValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        },
    )
}

#[derive(QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = Unsigned<BigInt>)]
    id: u64,
}

impl StoreConnection for PooledConnection {
    fn execute(&mut self, statement: &Statement) -> QueryResult<usize> {
        let connection: &mut MysqlConnection = self;
        bound(statement).execute(connection)
    }

    fn fetch(&mut self, statement: &Statement) -> QueryResult<Vec<TodoRow>> {
        let connection: &mut MysqlConnection = self;
        bound(statement).load::<TodoRow>(connection)
    }

    fn last_insert_id(&mut self) -> QueryResult<i32> {
        let connection: &mut MysqlConnection = self;
        let inserted = diesel::sql_query("SELECT LAST_INSERT_ID() AS id")
            .get_result::<InsertedId>(connection)?;
        i32::try_from(inserted.id).map_err(|err| DieselError::DeserializationError(Box::new(err)))
    }
}
