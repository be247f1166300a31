//! SQLite backend for the bonus market engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
