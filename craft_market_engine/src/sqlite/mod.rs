//! SQLite backend for the Craft Market engine.
pub mod db;
mod sqlite_impl;

pub use sqlite_impl::SqliteDatabase;
