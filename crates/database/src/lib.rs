//! # Alexandria Database Crate
//!
//! This crate acts as a thin, application-specific interface to the
//! PostgreSQL catalog database. Every public method issues exactly one
//! parameterized SQL statement and converts the rows into a typed record.
//!
//! ## Architectural Principles
//!
//! - **Boundary Adapter:** All SQL lives here. Callers see typed records and
//!   `DbError`, never raw rows or SQL text.
//! - **Parameterized Only:** Every caller-supplied value is bound through a
//!   positional placeholder. No query is ever assembled by string
//!   concatenation, which is the necessary defense against injection.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   connection pool (`PgPool`); each operation borrows one connection for
//!   the duration of a single statement.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply the catalog schema, ensuring it is up-to-date.
//! - `CatalogRepository`: The main struct that holds the connection pool and
//!   provides all the data access methods (e.g., `search_titles`, `add_user`).
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{
    AuthorBook, AuthorHit, CatalogRepository, CategoryHit, TitleHit, UserHit, UserListRow,
};
