use crate::libs::connect::ConnectInfo;
use crate::libs::driver::{Driver, DriverKind};
use crate::libs::error::LoaderError;
use crate::libs::schema::Schema;
use crate::libs::template::{DEFAULT_TABLE_TEMPLATE, render, trim_block};

/// The schema-declaration module named in the generated header's `use` line.
pub const SCHEMA_DECLARATION_MODULE: &str = "DBIx::Skinny::Schema";

/// Options for static schema-text generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Free-form text inserted verbatim before the table blocks.
    pub before_template: Option<String>,
    /// Deprecated synonym for `before_template`, applied in the same
    /// position; ignored when `before_template` is set.
    #[deprecated(note = "use `before_template`")]
    pub template: Option<String>,
    /// Free-form text inserted verbatim after the table blocks.
    pub after_template: Option<String>,
    /// Per-table rendering template overriding the default block. Useful
    /// only if it carries the `table` / `pk` / `columns` placeholders, but
    /// a template without them is not an error.
    pub table_template: Option<String>,
}

/// Resolve the engine kind for a data-source string.
pub fn resolve_driver(dsn: &str) -> Result<DriverKind, LoaderError> {
    DriverKind::resolve(dsn)
}

type ConnectInfoProvider = dyn Fn() -> ConnectInfo + Send + Sync;

/// Orchestrates driver selection and schema traversal.
///
/// Connection info is resolved in order: the descriptor passed to the call,
/// then the loader's configured descriptor, then its provider adapter. The
/// provider is the hook for applications that keep connection settings
/// somewhere of their own.
#[derive(Default)]
pub struct Loader {
    connect_info: Option<ConnectInfo>,
    provider: Option<Box<ConnectInfoProvider>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_info(mut self, info: ConnectInfo) -> Self {
        self.connect_info = Some(info);
        self
    }

    pub fn with_provider(
        mut self,
        provider: impl Fn() -> ConnectInfo + Send + Sync + 'static,
    ) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    fn resolve_connect_info(
        &self,
        explicit: Option<ConnectInfo>,
    ) -> Result<ConnectInfo, LoaderError> {
        explicit
            .or_else(|| self.connect_info.clone())
            .or_else(|| self.provider.as_ref().map(|p| p()))
            .ok_or(LoaderError::MissingConnectInfo)
    }

    /// Populate `schema` in place from the live database.
    ///
    /// Every table reported by the driver gets its columns set; the primary
    /// key is set only when the table has one. A composite primary key
    /// anywhere aborts the whole traversal.
    pub async fn load_schema(
        &self,
        schema: &mut Schema,
        connect_info: Option<ConnectInfo>,
    ) -> Result<(), LoaderError> {
        let info = self.resolve_connect_info(connect_info)?;
        let driver = self.connect(&info).await?;
        let tables = driver.tables().await?.to_vec();
        tracing::info!(tables = tables.len(), "loading schema");
        for table in &tables {
            let pk = driver.table_pk(table).await?;
            let columns = driver.table_columns(table).await?;
            let entry = schema.table_mut(table);
            if let Some(pk) = pk {
                entry.primary_key = Some(pk);
            }
            entry.columns = columns;
            tracing::debug!(
                table = table.as_str(),
                columns = entry.columns.len(),
                "loaded table"
            );
        }
        Ok(())
    }

    /// Generate a self-contained schema source document from the live
    /// database.
    ///
    /// Introspects into a fresh schema, then renders it; composite primary
    /// keys abort generation the same way they abort `load_schema`.
    pub async fn generate_schema_text(
        &self,
        schema_class_name: &str,
        options: &GenerateOptions,
        connect_info: ConnectInfo,
    ) -> Result<String, LoaderError> {
        let mut schema = Schema::new();
        self.load_schema(&mut schema, Some(connect_info)).await?;
        render_schema_text(schema_class_name, &schema, options)
    }

    async fn connect(&self, info: &ConnectInfo) -> Result<Driver, LoaderError> {
        let kind = DriverKind::resolve(&info.dsn)?;
        Driver::connect(kind, info).await
    }
}

/// Render a schema as a self-contained source document.
///
/// Assembly is concatenation in a fixed order: header, before-text, one
/// block per table in schema order, after-text, trailer. Free-text blocks
/// are kept verbatim apart from trailing-whitespace trimming and a
/// normalized blank-line separator.
#[allow(deprecated)]
pub fn render_schema_text(
    schema_class_name: &str,
    schema: &Schema,
    options: &GenerateOptions,
) -> Result<String, LoaderError> {
    let table_template = options
        .table_template
        .as_deref()
        .unwrap_or(DEFAULT_TABLE_TEMPLATE);

    let mut out = format!("package {schema_class_name};\nuse {SCHEMA_DECLARATION_MODULE};\n\n");

    let before = options
        .before_template
        .as_deref()
        .or(options.template.as_deref());
    if let Some(text) = before {
        out.push_str(trim_block(text));
        out.push_str("\n\n");
    }

    for table in schema.iter_tables() {
        let columns = table.columns.join(" ");
        let block = render(
            table_template,
            &[
                ("table", table.name.as_str()),
                ("pk", table.primary_key.as_deref().unwrap_or("")),
                ("columns", columns.as_str()),
            ],
        )?;
        out.push_str(trim_block(&block));
        out.push_str("\n\n");
    }

    if let Some(text) = options.after_template.as_deref() {
        out.push_str(trim_block(text));
        out.push('\n');
    }
    out.push_str("1;\n");
    Ok(out)
}
