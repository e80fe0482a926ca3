//! Async schema introspection for SQLite, MySQL and Postgres.
//!
//! `schemagen` connects to a live database, enumerates its tables, columns
//! and single-column primary keys, and either populates an in-memory
//! [`Schema`] in place or generates a static schema-definition document via
//! placeholder substitution.
//!
//! ```no_run
//! use schemagen::{ConnectInfo, GenerateOptions, Loader};
//!
//! # async fn demo() -> Result<(), schemagen::LoaderError> {
//! let loader = Loader::new();
//! let text = loader
//!     .generate_schema_text(
//!         "MyApp::Schema",
//!         &GenerateOptions::default(),
//!         ConnectInfo::new("sqlite:db/app.db"),
//!     )
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod libs;

pub use libs::*;
