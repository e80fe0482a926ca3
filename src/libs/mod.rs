pub mod connect;
pub mod driver;
pub mod error;
pub mod loader;
pub mod schema;
pub mod template;

// Re-export everything for flat access from the crate root.
pub use connect::*;
pub use driver::*;
pub use error::*;
pub use loader::*;
pub use schema::*;
pub use template::*;
