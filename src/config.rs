//! Scan configurations: connection identifiers plus an effective read request.
//!
//! A [`ScanConfig`] carries everything a client needs to issue a range read
//! against one table: the three connection identifiers (project, instance,
//! table — each possibly late-bound), an additional key/value configuration
//! map, and the wire request. The request's table name is resolved lazily, on
//! every access, because the identifiers may only become available after the
//! configuration was built.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    adapter::{DefaultReadHooks, RangeScanAdapter, ScanAdapter},
    buf::ByteBuf,
    error::ConfigError,
    logging::keyspan_log,
    param::Param,
    range::{ByteKey, ByteKeyRange},
    request::{ReadRowsRequest, RowRange},
    scan::Scan,
};

/// The resource path of one instance of the remote store.
///
/// Renders as `{project}/instances/{instance}`; table paths append
/// `/tables/{table}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceName {
    project_id: String,
    instance_id: String,
}

impl InstanceName {
    /// Build the instance path for `project_id` / `instance_id`.
    pub fn new(project_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        InstanceName {
            project_id: project_id.into(),
            instance_id: instance_id.into(),
        }
    }

    /// The fully-qualified path of `table_id` under this instance.
    pub fn table_name(&self, table_id: &str) -> String {
        format!("{self}/tables/{table_id}")
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/instances/{}", self.project_id, self.instance_id)
    }
}

/// Connection parameters for one table: the three identifiers plus an
/// additional configuration map. All values may be late-bound.
#[derive(Clone, Debug)]
pub struct TableConfig {
    project_id: Param<String>,
    instance_id: Param<String>,
    table_id: Param<String>,
    additional: BTreeMap<String, Param<String>>,
}

impl TableConfig {
    /// Start building a table configuration.
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::default()
    }

    /// The project identifier.
    pub fn project_id(&self) -> &Param<String> {
        &self.project_id
    }

    /// The instance identifier.
    pub fn instance_id(&self) -> &Param<String> {
        &self.instance_id
    }

    /// The table identifier.
    pub fn table_id(&self) -> &Param<String> {
        &self.table_id
    }

    /// Additional connection configuration entries.
    pub fn additional(&self) -> &BTreeMap<String, Param<String>> {
        &self.additional
    }

    /// Stage this configuration into a fresh builder. Deferred identifiers
    /// keep sharing their binding cells.
    pub fn to_builder(&self) -> TableConfigBuilder {
        TableConfigBuilder {
            project_id: self.project_id.clone(),
            instance_id: self.instance_id.clone(),
            table_id: self.table_id.clone(),
            additional: self.additional.clone(),
        }
    }

    /// Key/value dump of the connection parameters for diagnostics. Unbound
    /// identifiers render as a placeholder.
    pub fn display_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        for (key, value) in &self.additional {
            data.insert(key.clone(), display_param(value));
        }
        data.insert("project_id".to_owned(), display_param(&self.project_id));
        data.insert("instance_id".to_owned(), display_param(&self.instance_id));
        data.insert("table_id".to_owned(), display_param(&self.table_id));
        data
    }
}

/// Staging object for a [`TableConfig`].
#[derive(Clone, Debug, Default)]
pub struct TableConfigBuilder {
    project_id: Param<String>,
    instance_id: Param<String>,
    table_id: Param<String>,
    additional: BTreeMap<String, Param<String>>,
}

impl TableConfigBuilder {
    /// Set the project identifier.
    pub fn with_project_id(mut self, project_id: impl Into<Param<String>>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Set the instance identifier.
    pub fn with_instance_id(mut self, instance_id: impl Into<Param<String>>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    /// Set the table identifier.
    pub fn with_table_id(mut self, table_id: impl Into<Param<String>>) -> Self {
        self.table_id = table_id.into();
        self
    }

    /// Add one additional configuration entry.
    pub fn with_configuration(
        mut self,
        key: impl Into<String>,
        value: impl Into<Param<String>>,
    ) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }

    /// Finalize the configuration.
    pub fn build(self) -> TableConfig {
        TableConfig {
            project_id: self.project_id,
            instance_id: self.instance_id,
            table_id: self.table_id,
            additional: self.additional,
        }
    }
}

// The two row-selection sources are mutually exclusive; staging one replaces
// the other.
#[derive(Debug, Default)]
enum RowSelection {
    #[default]
    Unset,
    Scan(Scan),
    Request(ReadRowsRequest),
}

/// Staging object for a [`ScanConfig`].
///
/// Accumulates connection identifiers and exactly one row-selection source —
/// a [`Scan`] to be adapted, or a pre-built [`ReadRowsRequest`]. The builder
/// is a single-threaded staging object; the built configuration is immutable
/// and freely shareable.
pub struct ScanConfigBuilder {
    connection: TableConfigBuilder,
    selection: RowSelection,
    adapter: Arc<dyn ScanAdapter>,
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        ScanConfigBuilder {
            connection: TableConfigBuilder::default(),
            selection: RowSelection::Unset,
            adapter: Arc::new(RangeScanAdapter),
        }
    }
}

impl ScanConfigBuilder {
    /// A fresh builder with nothing staged.
    pub fn new() -> Self {
        ScanConfigBuilder::default()
    }

    /// Set the project identifier.
    pub fn with_project_id(mut self, project_id: impl Into<Param<String>>) -> Self {
        self.connection = self.connection.with_project_id(project_id);
        self
    }

    /// Set the instance identifier.
    pub fn with_instance_id(mut self, instance_id: impl Into<Param<String>>) -> Self {
        self.connection = self.connection.with_instance_id(instance_id);
        self
    }

    /// Set the table identifier.
    pub fn with_table_id(mut self, table_id: impl Into<Param<String>>) -> Self {
        self.connection = self.connection.with_table_id(table_id);
        self
    }

    /// Add one additional configuration entry.
    pub fn with_configuration(
        mut self,
        key: impl Into<String>,
        value: impl Into<Param<String>>,
    ) -> Self {
        self.connection = self.connection.with_configuration(key, value);
        self
    }

    /// Stage `scan` as the row-selection source, replacing any staged
    /// request.
    pub fn with_scan(mut self, scan: Scan) -> Self {
        self.selection = RowSelection::Scan(scan);
        self
    }

    /// Stage a pre-built wire request as the row-selection source, replacing
    /// any staged scan.
    pub fn with_request(mut self, request: ReadRowsRequest) -> Self {
        self.selection = RowSelection::Request(request);
        self
    }

    /// Replace the scan adapter used when a scan is staged.
    pub fn with_adapter(mut self, adapter: Arc<dyn ScanAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    /// Narrow the staged request to the rows in `[start, stop)`.
    ///
    /// Used by a paginating source to split a large read into shards, so it
    /// requires a request (not a scan) to be staged already.
    pub(crate) fn with_key_range(
        mut self,
        start: impl Into<ByteBuf>,
        stop: impl Into<ByteBuf>,
    ) -> Result<Self, ConfigError> {
        match std::mem::take(&mut self.selection) {
            RowSelection::Request(request) => {
                self.selection = RowSelection::Request(
                    request
                        .into_builder()
                        .row_range(RowRange::new(start.into(), stop.into()))
                        .build(),
                );
                Ok(self)
            }
            _ => Err(ConfigError::NoStagedRequest),
        }
    }

    /// Finalize the configuration.
    ///
    /// A staged scan (or, with nothing staged, the default full scan) is run
    /// through the adapter, whose pre-send directives are applied exactly
    /// once before the request is treated as final. Adaptation failures
    /// propagate unchanged. Table-name resolution is *not* performed here —
    /// it stays deferred to every [`ScanConfig::request`] access.
    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        let (request, source) = match self.selection {
            RowSelection::Request(request) => (request, "request"),
            RowSelection::Scan(scan) => (adapt(self.adapter.as_ref(), &scan)?, "scan"),
            RowSelection::Unset => (adapt(self.adapter.as_ref(), &Scan::new())?, "default"),
        };
        keyspan_log!(log::Level::Debug, "build_config", "source={}", source);
        Ok(ScanConfig {
            connection: self.connection.build(),
            request,
        })
    }
}

fn adapt(adapter: &dyn ScanAdapter, scan: &Scan) -> Result<ReadRowsRequest, ConfigError> {
    let mut hooks = DefaultReadHooks::new();
    let builder = adapter.adapt(scan, &mut hooks)?;
    Ok(hooks.apply_pre_send_hook(builder))
}

/// An immutable scan configuration: connection parameters plus the effective
/// read request.
///
/// All state is fixed after construction; the only temporal indirection is
/// table-name resolution, which is recomputed from the identifier values on
/// every [`request`](ScanConfig::request) call rather than cached, so
/// identifiers bound after `build()` are picked up. Resolution is a pure
/// function of the identifiers, so concurrent reads need no synchronization.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    connection: TableConfig,
    request: ReadRowsRequest,
}

impl ScanConfig {
    /// Start building a scan configuration.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::new()
    }

    /// Build a configuration performing `scan` against the table described
    /// by `config`.
    pub fn from_config(config: &TableConfig, scan: Scan) -> Result<ScanConfig, ConfigError> {
        let mut builder = ScanConfig::builder();
        builder.connection = config.to_builder();
        builder.with_scan(scan).build()
    }

    /// The connection parameters.
    pub fn connection(&self) -> &TableConfig {
        &self.connection
    }

    /// The effective read request, with its table name resolved.
    ///
    /// A request that already carries a non-empty table name is returned
    /// verbatim; otherwise the name is composed from the three identifiers at
    /// call time. Reading an unbound identifier is an error.
    pub fn request(&self) -> Result<ReadRowsRequest, ConfigError> {
        if !self.request.table_name().is_empty() {
            return Ok(self.request.clone());
        }
        let table_name = self.full_table_name()?;
        keyspan_log!(log::Level::Trace, "resolve_table_name", "table={}", table_name);
        Ok(self
            .request
            .clone()
            .into_builder()
            .table_name(table_name)
            .build())
    }

    fn full_table_name(&self) -> Result<String, ConfigError> {
        let project_id = param_value(&self.connection.project_id, "project_id")?;
        let instance_id = param_value(&self.connection.instance_id, "instance_id")?;
        let table_id = param_value(&self.connection.table_id, "table_id")?;
        Ok(InstanceName::new(project_id, instance_id).table_name(table_id))
    }

    fn row_range(&self) -> Result<RowRange, ConfigError> {
        self.request()?
            .row_ranges()
            .first()
            .cloned()
            .ok_or(ConfigError::MissingRowRange)
    }

    /// The start row of the configured range, as a fresh copy.
    pub fn start_row(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(self.row_range()?.start_key_closed().to_vec())
    }

    /// The stop row of the configured range, as a fresh copy.
    pub fn stop_row(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(self.row_range()?.end_key_open().to_vec())
    }

    /// The start row sharing the request's backing storage where possible.
    pub fn zero_copy_start_row(&self) -> Result<Arc<[u8]>, ConfigError> {
        Ok(self.row_range()?.start_key_closed().extract())
    }

    /// The stop row sharing the request's backing storage where possible.
    pub fn zero_copy_stop_row(&self) -> Result<Arc<[u8]>, ConfigError> {
        Ok(self.row_range()?.end_key_open().extract())
    }

    /// The configured range as a half-open lexicographic key interval, built
    /// from the zero-copy bounds.
    pub fn to_byte_key_range(&self) -> Result<ByteKeyRange, ConfigError> {
        Ok(ByteKeyRange::of(
            ByteKey::from_shared(self.zero_copy_start_row()?),
            ByteKey::from_shared(self.zero_copy_stop_row()?),
        ))
    }

    /// Stage the effective request back into a fresh builder carrying the
    /// same connection parameters. The table name stays deferred.
    pub fn to_builder(&self) -> ScanConfigBuilder {
        ScanConfigBuilder {
            connection: self.connection.to_builder(),
            selection: RowSelection::Request(self.request.clone()),
            adapter: Arc::new(RangeScanAdapter),
        }
    }

    /// Key/value dump of the effective configuration for diagnostics.
    pub fn display_data(&self) -> BTreeMap<String, String> {
        let mut data = self.connection.display_data();
        data.insert(
            "read_rows_request".to_owned(),
            match self.request() {
                Ok(request) => format!("{request:?}"),
                Err(_) => "<deferred>".to_owned(),
            },
        );
        data
    }
}

fn param_value<'a>(
    param: &'a Param<String>,
    name: &'static str,
) -> Result<&'a str, ConfigError> {
    param
        .get()
        .map(String::as_str)
        .ok_or(ConfigError::UnboundParam(name))
}

fn display_param(param: &Param<String>) -> String {
    param
        .get()
        .cloned()
        .unwrap_or_else(|| "<deferred>".to_owned())
}
