use std::sync::OnceLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use sqlx::{Column, Executor, Row};
use tokio::sync::OnceCell;

use crate::libs::connect::{ConnectInfo, parse_scheme};
use crate::libs::error::LoaderError;

/// The supported database engines.
///
/// Selected from the data-source string's scheme token; the scheme
/// identifiers are case-sensitive and exactly `sqlite`, `mysql`, `postgres`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Sqlite,
    Mysql,
    Postgres,
}

impl DriverKind {
    /// Resolve the engine kind from a data-source string.
    pub fn resolve(dsn: &str) -> Result<Self, LoaderError> {
        match parse_scheme(dsn)? {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            "postgres" => Ok(Self::Postgres),
            other => Err(LoaderError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            Self::Postgres => "postgres",
        }
    }

    fn backend(&self) -> &'static dyn Backend {
        match self {
            Self::Sqlite => &SqliteBackend,
            Self::Mysql => &MysqlBackend,
            Self::Postgres => &PostgresBackend,
        }
    }
}

/// Identifier-quoting metadata for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoting {
    pub quote: char,
    pub separator: &'static str,
}

impl Quoting {
    /// Quote an identifier, doubling any embedded quote characters.
    pub fn ident(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        out.push(self.quote);
        for ch in name.chars() {
            out.push(ch);
            if ch == self.quote {
                out.push(ch);
            }
        }
        out.push(self.quote);
        out
    }
}

/// Engine-specific catalog queries. Everything outside this trait is shared
/// across the three engines.
#[async_trait]
trait Backend: Send + Sync {
    fn quoting(&self) -> Quoting;

    /// All user tables visible to the connection, ordered by name.
    async fn tables(&self, pool: &AnyPool) -> sqlx::Result<Vec<String>>;

    /// The primary-key columns of `table`, in key order. May return more
    /// than one entry; the caller decides whether that is fatal.
    async fn primary_key_columns(&self, pool: &AnyPool, table: &str) -> sqlx::Result<Vec<String>>;
}

struct SqliteBackend;

#[async_trait]
impl Backend for SqliteBackend {
    fn quoting(&self) -> Quoting {
        Quoting {
            quote: '"',
            separator: ".",
        }
    }

    async fn tables(&self, pool: &AnyPool) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )
        .fetch_all(pool)
        .await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }

    async fn primary_key_columns(&self, pool: &AnyPool, table: &str) -> sqlx::Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", self.quoting().ident(table));
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        // `pk` is the 1-based position of the column within the primary
        // key, or 0 when the column is not part of it.
        let mut keyed: Vec<(i64, String)> = Vec::new();
        for row in &rows {
            let ordinal: i64 = row.try_get("pk")?;
            if ordinal > 0 {
                keyed.push((ordinal, row.try_get("name")?));
            }
        }
        keyed.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(keyed.into_iter().map(|(_, name)| name).collect())
    }
}

struct MysqlBackend;

#[async_trait]
impl Backend for MysqlBackend {
    fn quoting(&self) -> Quoting {
        Quoting {
            quote: '`',
            separator: ".",
        }
    }

    async fn tables(&self, pool: &AnyPool) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(pool)
        .await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }

    async fn primary_key_columns(&self, pool: &AnyPool, table: &str) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT column_name FROM information_schema.key_column_usage \
             WHERE table_schema = DATABASE() AND table_name = ? \
               AND constraint_name = 'PRIMARY' \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(pool)
        .await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }
}

struct PostgresBackend;

#[async_trait]
impl Backend for PostgresBackend {
    fn quoting(&self) -> Quoting {
        Quoting {
            quote: '"',
            separator: ".",
        }
    }

    async fn tables(&self, pool: &AnyPool) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        )
        .fetch_all(pool)
        .await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }

    async fn primary_key_columns(&self, pool: &AnyPool, table: &str) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT kcu.column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON kcu.constraint_name = tc.constraint_name \
              AND kcu.table_schema = tc.table_schema \
             WHERE tc.constraint_type = 'PRIMARY KEY' \
               AND tc.table_schema = 'public' \
               AND tc.table_name = $1 \
             ORDER BY kcu.ordinal_position",
        )
        .bind(table)
        .fetch_all(pool)
        .await?;
        rows.iter().map(|row| row.try_get(0)).collect()
    }
}

/// A live introspection handle for one engine.
///
/// Owns the connection pool for the duration of one loader invocation. The
/// table list is computed once and cached; quoting metadata is resolved on
/// first use.
pub struct Driver {
    kind: DriverKind,
    pool: AnyPool,
    tables: OnceCell<Vec<String>>,
    quoting: OnceLock<Quoting>,
}

impl Driver {
    /// Establish a connection for `kind` using the given descriptor.
    pub async fn connect(kind: DriverKind, info: &ConnectInfo) -> Result<Self, LoaderError> {
        sqlx::any::install_default_drivers();
        let url = info.url();
        tracing::debug!(kind = kind.as_str(), "connecting");
        let pool = AnyPoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|source| LoaderError::Connect { source })?;
        Ok(Self {
            kind,
            pool,
            tables: OnceCell::new(),
            quoting: OnceLock::new(),
        })
    }

    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    pub fn quoting(&self) -> &Quoting {
        self.quoting.get_or_init(|| self.kind.backend().quoting())
    }

    pub fn quote_ident(&self, name: &str) -> String {
        self.quoting().ident(name)
    }

    /// All user tables visible to the connection. Computed once per driver
    /// instance and reused.
    pub async fn tables(&self) -> Result<&[String], LoaderError> {
        let tables = self
            .tables
            .get_or_try_init(|| async {
                self.kind
                    .backend()
                    .tables(&self.pool)
                    .await
                    .map_err(|source| LoaderError::Metadata { source })
            })
            .await?;
        Ok(tables)
    }

    /// Column names of `table` in driver-reported order, lower-cased.
    ///
    /// Uses a zero-row projection so it works on empty tables; the names
    /// come from the statement metadata, not from row contents.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<String>, LoaderError> {
        let sql = format!("SELECT * FROM {} LIMIT 0", self.quote_ident(table));
        let describe = self
            .pool
            .describe(&sql)
            .await
            .map_err(|source| LoaderError::Metadata { source })?;
        Ok(describe
            .columns()
            .iter()
            .map(|col| col.name().to_lowercase())
            .collect())
    }

    /// The single primary-key column of `table`, if it has one.
    ///
    /// A key spanning more than one column is fatal: composite primary keys
    /// are not representable in the schema model.
    pub async fn table_pk(&self, table: &str) -> Result<Option<String>, LoaderError> {
        let mut columns = self
            .kind
            .backend()
            .primary_key_columns(&self.pool, table)
            .await
            .map_err(|source| LoaderError::Metadata { source })?;
        for col in &mut columns {
            *col = col.to_lowercase();
        }
        match columns.len() {
            0 => Ok(None),
            1 => Ok(columns.pop()),
            _ => Err(LoaderError::CompositePrimaryKey {
                table: table.to_string(),
                columns,
            }),
        }
    }
}
