//! The wire-level read request handed to the transport.
//!
//! A [`ReadRowsRequest`] is either supplied whole by the caller or synthesized
//! once from a [`Scan`](crate::scan::Scan); afterwards it is immutable.
//! Rewrites go through [`ReadRowsRequest::into_builder`].

use crate::buf::ByteBuf;

/// A closed-open row interval `[start_key_closed, end_key_open)`.
///
/// An empty bound is unbounded on that side. The start key must not sort
/// after a non-empty stop key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowRange {
    start_key_closed: ByteBuf,
    end_key_open: ByteBuf,
}

impl RowRange {
    /// Build the range `[start, stop)`.
    pub fn new(start_key_closed: ByteBuf, end_key_open: ByteBuf) -> Self {
        RowRange {
            start_key_closed,
            end_key_open,
        }
    }

    /// The range covering all rows.
    pub fn unbounded() -> Self {
        RowRange::default()
    }

    /// Inclusive start key; empty means unbounded below.
    pub fn start_key_closed(&self) -> &ByteBuf {
        &self.start_key_closed
    }

    /// Exclusive stop key; empty means unbounded above.
    pub fn end_key_open(&self) -> &ByteBuf {
        &self.end_key_open
    }

    /// Whether the range is unbounded on both sides.
    pub fn is_unbounded(&self) -> bool {
        self.start_key_closed.is_empty() && self.end_key_open.is_empty()
    }
}

/// Opaque row-filter payload carried on a request.
///
/// The core only transports the representation; evaluating a filter against
/// rows is the remote store's job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowFilter {
    /// Rows whose column family matches the regex.
    FamilyNameRegex(String),
    /// Union of the nested filters.
    Interleave(Vec<RowFilter>),
    /// Sequential application of the nested filters.
    Chain(Vec<RowFilter>),
}

/// The canonical read specification for one table: a target table name, the
/// row ranges to read (exactly one in this core), an optional filter and a
/// row limit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadRowsRequest {
    table_name: String,
    row_ranges: Vec<RowRange>,
    filter: Option<RowFilter>,
    rows_limit: u64,
}

impl ReadRowsRequest {
    /// Start building a request.
    pub fn builder() -> ReadRowsRequestBuilder {
        ReadRowsRequestBuilder::default()
    }

    /// Fully-qualified table name; empty until resolved.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The row ranges to read.
    pub fn row_ranges(&self) -> &[RowRange] {
        &self.row_ranges
    }

    /// The filter payload, if any.
    pub fn filter(&self) -> Option<&RowFilter> {
        self.filter.as_ref()
    }

    /// Maximum number of rows to return; `0` means unlimited.
    pub fn rows_limit(&self) -> u64 {
        self.rows_limit
    }

    /// Reopen this request for rewriting.
    pub fn into_builder(self) -> ReadRowsRequestBuilder {
        ReadRowsRequestBuilder {
            table_name: self.table_name,
            row_ranges: self.row_ranges,
            filter: self.filter,
            rows_limit: self.rows_limit,
        }
    }
}

/// Staging object for a [`ReadRowsRequest`].
#[derive(Debug, Default)]
pub struct ReadRowsRequestBuilder {
    table_name: String,
    row_ranges: Vec<RowRange>,
    filter: Option<RowFilter>,
    rows_limit: u64,
}

impl ReadRowsRequestBuilder {
    /// Set the fully-qualified table name.
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Replace the row ranges with the single range `range`.
    pub fn row_range(mut self, range: RowRange) -> Self {
        self.row_ranges = vec![range];
        self
    }

    /// Set the filter payload.
    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the row limit; `0` means unlimited.
    pub fn rows_limit(mut self, rows_limit: u64) -> Self {
        self.rows_limit = rows_limit;
        self
    }

    /// Finalize the request.
    pub fn build(self) -> ReadRowsRequest {
        ReadRowsRequest {
            table_name: self.table_name,
            row_ranges: self.row_ranges,
            filter: self.filter,
            rows_limit: self.rows_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadRowsRequest, RowFilter, RowRange};
    use crate::buf::ByteBuf;

    #[test]
    fn builder_round_trip() {
        let request = ReadRowsRequest::builder()
            .table_name("p/instances/i/tables/t")
            .row_range(RowRange::new(
                ByteBuf::from(&b"a"[..]),
                ByteBuf::from(&b"z"[..]),
            ))
            .filter(RowFilter::FamilyNameRegex("cf".to_owned()))
            .rows_limit(10)
            .build();

        assert_eq!(request.table_name(), "p/instances/i/tables/t");
        assert_eq!(request.row_ranges().len(), 1);
        assert_eq!(request.rows_limit(), 10);

        let rebuilt = request.clone().into_builder().build();
        assert_eq!(rebuilt, request);
    }

    #[test]
    fn row_range_replaces_previous_ranges() {
        let request = ReadRowsRequest::builder()
            .row_range(RowRange::new(ByteBuf::from(&b"a"[..]), ByteBuf::empty()))
            .row_range(RowRange::unbounded())
            .build();

        assert_eq!(request.row_ranges(), &[RowRange::unbounded()]);
        assert!(request.row_ranges()[0].is_unbounded());
    }

    #[test]
    fn default_request_is_empty() {
        let request = ReadRowsRequest::default();
        assert!(request.table_name().is_empty());
        assert!(request.row_ranges().is_empty());
        assert!(request.filter().is_none());
        assert_eq!(request.rows_limit(), 0);
    }
}
