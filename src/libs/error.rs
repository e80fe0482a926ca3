use thiserror::Error;

/// Errors raised by the loader pipeline.
///
/// Every variant is fatal for the operation that produced it: there is no
/// retry and no partial output mode. Errors from the underlying database
/// driver are carried as their `sqlx` source.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The data-source string has no scheme token before the first `:`.
    #[error("missing scheme in data source string: {dsn}")]
    MissingScheme { dsn: String },

    /// The scheme token is not one of `sqlite`, `mysql`, `postgres`.
    #[error("unsupported database scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// No connection descriptor was passed and the loader has neither a
    /// configured descriptor nor a descriptor provider.
    #[error("no connection info supplied and no provider configured")]
    MissingConnectInfo,

    /// Driver initialization or connection establishment failed.
    #[error("connection failed: {source}")]
    Connect {
        #[source]
        source: sqlx::Error,
    },

    /// A catalog or metadata query failed mid-traversal.
    #[error("metadata query failed: {source}")]
    Metadata {
        #[source]
        source: sqlx::Error,
    },

    /// A table declared a primary key spanning more than one column.
    /// Composite primary keys are not representable in the schema model.
    #[error("composite primary key on table {table}: {}", columns.join(", "))]
    CompositePrimaryKey { table: String, columns: Vec<String> },

    /// A caller-supplied template used a placeholder outside the closed
    /// set of `table`, `pk`, `columns`.
    #[error("unknown template placeholder: [% {token} %]")]
    UnknownPlaceholder { token: String },
}
