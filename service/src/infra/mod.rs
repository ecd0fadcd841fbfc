//! Infrastructure layer.

pub mod cache;
pub mod database;

pub use self::{cache::Cache, database::Database};
#[cfg(test)]
pub use self::database::{memory, Memory};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
