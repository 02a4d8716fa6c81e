//! Total estimation for upstreams that only report page counters.

/// Page counters as reported by an upstream that has no grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCounters {
    pub items_on_current_page: u64,
    pub page_size: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl PageCounters {
    pub fn total(&self) -> u64 {
        reconcile_total(
            self.items_on_current_page,
            self.page_size,
            self.current_page,
            self.total_pages,
        )
    }
}

/// Best-effort total item count.
///
/// While more pages remain the result is an upper bound (every page assumed
/// full); on the last page it is exact. Callers rely on the over-estimate for
/// "has more" checks, so it must stay as is.
pub fn reconcile_total(
    items_on_current_page: u64,
    page_size: u64,
    current_page: u64,
    total_pages: u64,
) -> u64 {
    if current_page < total_pages {
        page_size.saturating_mul(total_pages)
    } else if total_pages > 1 {
        page_size
            .saturating_mul(total_pages - 1)
            .saturating_add(items_on_current_page)
    } else {
        items_on_current_page
    }
}
