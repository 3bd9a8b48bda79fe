use api_types::Region;
use api_types::entry::FinancialEntry;

/// Projects the entry cache down to a single region.
///
/// Pure: clones matching entries in their original relative order and never
/// touches the input slice. Empty iff no entry matches.
pub fn by_region(entries: &[FinancialEntry], region: Region) -> Vec<FinancialEntry> {
    entries
        .iter()
        .filter(|entry| entry.region == region)
        .cloned()
        .collect()
}

/// Stock entries of a (typically already region-filtered) set, order kept.
pub fn stocks(entries: &[FinancialEntry]) -> Vec<FinancialEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_stock())
        .cloned()
        .collect()
}

/// Mutual fund entries of a set, order kept.
pub fn mutual_funds(entries: &[FinancialEntry]) -> Vec<FinancialEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_mutual_fund())
        .cloned()
        .collect()
}

/// Distinct instrument names in first-seen order.
pub fn unique_names(entries: &[FinancialEntry]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        if !names.iter().any(|name| name == &entry.name) {
            names.push(entry.name.clone());
        }
    }
    names
}
