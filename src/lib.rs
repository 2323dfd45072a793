pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

use crate::db::{DbConnection, DbPool};
use crate::error::WebResult;

/// Shared by every worker: the connection pool and the password hashing cost.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(pool: DbPool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    pub fn conn(&self) -> WebResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
