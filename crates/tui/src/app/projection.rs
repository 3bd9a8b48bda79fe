use api_types::Region;
use api_types::entry::FinancialEntry;
use engine::DerivedMetrics;

/// Immutable snapshot of the region-filtered entry set and everything
/// derived from it.
///
/// Metrics are recomputed only when the filtered content actually changes
/// (content comparison, not render count), so unrelated UI events never
/// trigger a derive pass.
#[derive(Debug, Default)]
pub struct Projection {
    filtered: Vec<FinancialEntry>,
    stocks: Vec<FinancialEntry>,
    mutual_funds: Vec<FinancialEntry>,
    metrics: DerivedMetrics,
    recomputes: u64,
}

impl Projection {
    /// Rebuilds the snapshot from the cache and region. Returns whether the
    /// filtered set changed (and metrics were re-derived).
    pub fn rebuild(&mut self, entries: &[FinancialEntry], region: Region) -> bool {
        let filtered = engine::by_region(entries, region);
        if filtered == self.filtered {
            return false;
        }
        self.stocks = engine::stocks(&filtered);
        self.mutual_funds = engine::mutual_funds(&filtered);
        self.metrics = engine::derive(&filtered);
        self.filtered = filtered;
        self.recomputes += 1;
        true
    }

    pub fn filtered(&self) -> &[FinancialEntry] {
        &self.filtered
    }

    pub fn stocks(&self) -> &[FinancialEntry] {
        &self.stocks
    }

    pub fn mutual_funds(&self) -> &[FinancialEntry] {
        &self.mutual_funds
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
