//! High-level row-selection descriptions.
//!
//! A [`Scan`] is what callers phrase their read in: raw start/stop keys, a
//! column-family selection, a limit. It is transient input — consumed once
//! during adaptation into a wire request and never retained afterwards.

use crate::buf::ByteBuf;

/// A pre-adaptation description of which rows to read.
///
/// The default scan selects every row in the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scan {
    start_row: ByteBuf,
    stop_row: ByteBuf,
    families: Vec<String>,
    limit: Option<u64>,
    reversed: bool,
}

impl Scan {
    /// A full-table scan.
    pub fn new() -> Self {
        Scan::default()
    }

    /// Set the inclusive start row.
    pub fn with_start_row(mut self, start_row: impl Into<ByteBuf>) -> Self {
        self.start_row = start_row.into();
        self
    }

    /// Set the exclusive stop row.
    pub fn with_stop_row(mut self, stop_row: impl Into<ByteBuf>) -> Self {
        self.stop_row = stop_row.into();
        self
    }

    /// Restrict the scan to a column family. May be called repeatedly to
    /// select several families.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.families.push(family.into());
        self
    }

    /// Cap the number of rows returned.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Request reverse iteration order.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Inclusive start row; empty means unbounded below.
    pub fn start_row(&self) -> &ByteBuf {
        &self.start_row
    }

    /// Exclusive stop row; empty means unbounded above.
    pub fn stop_row(&self) -> &ByteBuf {
        &self.stop_row
    }

    /// Selected column families; empty means all families.
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Row limit, if any.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Whether reverse iteration was requested.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }
}

#[cfg(test)]
mod tests {
    use super::Scan;
    use crate::buf::ByteBuf;

    #[test]
    fn default_scan_selects_everything() {
        let scan = Scan::new();
        assert!(scan.start_row().is_empty());
        assert!(scan.stop_row().is_empty());
        assert!(scan.families().is_empty());
        assert_eq!(scan.limit(), None);
        assert!(!scan.is_reversed());
    }

    #[test]
    fn setters_accumulate() {
        let scan = Scan::new()
            .with_start_row(&b"a"[..])
            .with_stop_row(&b"z"[..])
            .with_family("cf1")
            .with_family("cf2")
            .with_limit(100);

        assert_eq!(scan.start_row(), &ByteBuf::from(&b"a"[..]));
        assert_eq!(scan.stop_row(), &ByteBuf::from(&b"z"[..]));
        assert_eq!(scan.families(), &["cf1".to_owned(), "cf2".to_owned()]);
        assert_eq!(scan.limit(), Some(100));
    }
}
