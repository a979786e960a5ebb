//! Scan adaptation: turning a [`Scan`] into a wire request.
//!
//! The adapter is a collaborator seam. The core hands it the scan plus a
//! [`ReadHooks`] sink; the adapter returns a request builder and may park
//! pre-send directives in the sink. The core applies those directives exactly
//! once, after adaptation and before the request is treated as final.

use regex::escape;

use crate::{
    logging::keyspan_log,
    request::{ReadRowsRequest, ReadRowsRequestBuilder, RowFilter, RowRange},
    scan::Scan,
};

/// Error produced when a scan cannot be adapted into a wire request.
///
/// Adaptation failures propagate to the caller unchanged; the core never
/// translates or suppresses them.
#[derive(Debug, thiserror::Error)]
pub enum AdaptError {
    /// Reverse iteration has no wire representation here.
    #[error("reversed scans are not supported")]
    ReversedScan,
    /// The start key sorts after the (non-empty) stop key.
    #[error("scan start key sorts after its stop key")]
    DisorderedKeys,
}

/// A directive applied to the synthesized request before it is finalized.
pub type PreSendHook = Box<dyn FnOnce(ReadRowsRequestBuilder) -> ReadRowsRequestBuilder + Send>;

/// Side channel an adapter uses to defer request adjustments to just before
/// the request is finalized.
pub trait ReadHooks {
    /// Park `hook` for application after adaptation. Hooks run in the order
    /// they were composed.
    fn compose_pre_send_hook(&mut self, hook: PreSendHook);
}

/// The standard [`ReadHooks`] sink.
///
/// Applying the hooks consumes the sink, so they cannot run twice.
#[derive(Default)]
pub struct DefaultReadHooks {
    hooks: Vec<PreSendHook>,
}

impl DefaultReadHooks {
    /// An empty sink.
    pub fn new() -> Self {
        DefaultReadHooks::default()
    }

    /// Run every composed hook over `builder`, in order, and finalize.
    pub fn apply_pre_send_hook(self, mut builder: ReadRowsRequestBuilder) -> ReadRowsRequest {
        for hook in self.hooks {
            builder = hook(builder);
        }
        builder.build()
    }
}

impl ReadHooks for DefaultReadHooks {
    fn compose_pre_send_hook(&mut self, hook: PreSendHook) {
        self.hooks.push(hook);
    }
}

impl std::fmt::Debug for DefaultReadHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultReadHooks")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Translates a [`Scan`] into a wire request builder.
///
/// Implementations own filter translation; the core only transports the
/// result. The returned builder carries no table name — name resolution
/// happens later, against the connection identifiers.
pub trait ScanAdapter: Send + Sync {
    /// Adapt `scan`, parking any pre-send directives in `hooks`.
    fn adapt(
        &self,
        scan: &Scan,
        hooks: &mut dyn ReadHooks,
    ) -> Result<ReadRowsRequestBuilder, AdaptError>;
}

/// Built-in adapter covering key ranges, family selection and limits.
///
/// Family names are literal, so they are regex-escaped before landing in the
/// filter payload. The limit is deliberately routed through a pre-send hook
/// rather than set inline.
#[derive(Debug, Default)]
pub struct RangeScanAdapter;

impl ScanAdapter for RangeScanAdapter {
    fn adapt(
        &self,
        scan: &Scan,
        hooks: &mut dyn ReadHooks,
    ) -> Result<ReadRowsRequestBuilder, AdaptError> {
        if scan.is_reversed() {
            return Err(AdaptError::ReversedScan);
        }
        let (start, stop) = (scan.start_row(), scan.stop_row());
        if !start.is_empty() && !stop.is_empty() && start.as_slice() > stop.as_slice() {
            return Err(AdaptError::DisorderedKeys);
        }

        keyspan_log!(
            log::Level::Debug,
            "adapt_scan",
            "families={} limit={:?}",
            scan.families().len(),
            scan.limit(),
        );

        let mut builder = ReadRowsRequestBuilder::default()
            .row_range(RowRange::new(start.clone(), stop.clone()));
        if let Some(filter) = family_filter(scan.families()) {
            builder = builder.filter(filter);
        }
        if let Some(limit) = scan.limit() {
            hooks.compose_pre_send_hook(Box::new(move |b| b.rows_limit(limit)));
        }
        Ok(builder)
    }
}

fn family_filter(families: &[String]) -> Option<RowFilter> {
    match families {
        [] => None,
        [family] => Some(RowFilter::FamilyNameRegex(escape(family))),
        many => Some(RowFilter::Interleave(
            many.iter()
                .map(|family| RowFilter::FamilyNameRegex(escape(family)))
                .collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{AdaptError, DefaultReadHooks, RangeScanAdapter, ReadHooks, ScanAdapter};
    use crate::{
        buf::ByteBuf,
        request::{ReadRowsRequest, RowFilter},
        scan::Scan,
    };

    #[test]
    fn default_scan_adapts_to_unbounded_range() {
        let mut hooks = DefaultReadHooks::new();
        let builder = RangeScanAdapter.adapt(&Scan::new(), &mut hooks).unwrap();
        let request = hooks.apply_pre_send_hook(builder);

        assert_eq!(request.row_ranges().len(), 1);
        assert!(request.row_ranges()[0].is_unbounded());
        assert!(request.filter().is_none());
        assert_eq!(request.rows_limit(), 0);
        assert!(request.table_name().is_empty());
    }

    #[test]
    fn keys_and_family_are_carried_over() {
        let scan = Scan::new()
            .with_start_row(&b"a"[..])
            .with_stop_row(&b"z"[..])
            .with_family("cf.1");

        let mut hooks = DefaultReadHooks::new();
        let builder = RangeScanAdapter.adapt(&scan, &mut hooks).unwrap();
        let request = hooks.apply_pre_send_hook(builder);

        let range = &request.row_ranges()[0];
        assert_eq!(range.start_key_closed(), &ByteBuf::from(&b"a"[..]));
        assert_eq!(range.end_key_open(), &ByteBuf::from(&b"z"[..]));
        // literal family name, regex-escaped
        assert_eq!(
            request.filter(),
            Some(&RowFilter::FamilyNameRegex("cf\\.1".to_owned()))
        );
    }

    #[test]
    fn several_families_interleave() {
        let scan = Scan::new().with_family("cf1").with_family("cf2");

        let mut hooks = DefaultReadHooks::new();
        let builder = RangeScanAdapter.adapt(&scan, &mut hooks).unwrap();
        let request = hooks.apply_pre_send_hook(builder);

        assert_eq!(
            request.filter(),
            Some(&RowFilter::Interleave(vec![
                RowFilter::FamilyNameRegex("cf1".to_owned()),
                RowFilter::FamilyNameRegex("cf2".to_owned()),
            ]))
        );
    }

    #[test]
    fn limit_arrives_through_the_pre_send_hook() {
        let scan = Scan::new().with_limit(42);

        let mut hooks = DefaultReadHooks::new();
        let builder = RangeScanAdapter.adapt(&scan, &mut hooks).unwrap();
        let request = hooks.apply_pre_send_hook(builder);

        assert_eq!(request.rows_limit(), 42);
    }

    #[test]
    fn hooks_compose_in_order() {
        let mut hooks = DefaultReadHooks::new();
        hooks.compose_pre_send_hook(Box::new(|b| b.rows_limit(1)));
        hooks.compose_pre_send_hook(Box::new(|b| b.rows_limit(2)));

        let request = hooks.apply_pre_send_hook(ReadRowsRequest::builder());
        assert_eq!(request.rows_limit(), 2);
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        let mut hooks = DefaultReadHooks::new();
        assert!(matches!(
            RangeScanAdapter.adapt(&Scan::new().reversed(true), &mut hooks),
            Err(AdaptError::ReversedScan)
        ));

        let disordered = Scan::new().with_start_row(&b"z"[..]).with_stop_row(&b"a"[..]);
        assert!(matches!(
            RangeScanAdapter.adapt(&disordered, &mut hooks),
            Err(AdaptError::DisorderedKeys)
        ));
    }
}
