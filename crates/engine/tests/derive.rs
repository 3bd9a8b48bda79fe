use chrono::{TimeZone, Utc};
use uuid::Uuid;

use api_types::Region;
use api_types::entry::{Category, FinancialEntry, InstrumentDetail, Operation};
use engine::{by_region, derive, mutual_funds, stocks, unique_names};

fn user_id() -> Uuid {
    Uuid::from_u128(1)
}

fn stock(name: &str, region: Region, operation: Operation, price: f64, quantity: f64) -> FinancialEntry {
    FinancialEntry {
        id: Uuid::new_v4(),
        user_id: user_id(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        name: name.to_string(),
        region,
        operation,
        detail: InstrumentDetail::Stock { price, quantity },
    }
}

fn fund(name: &str, region: Region, operation: Operation, units: f64, nav: f64, amount: f64) -> FinancialEntry {
    FinancialEntry {
        id: Uuid::new_v4(),
        user_id: user_id(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap(),
        name: name.to_string(),
        region,
        operation,
        detail: InstrumentDetail::MutualFund {
            units,
            nav,
            amount,
            category: Category::Equity,
        },
    }
}

fn sample_entries() -> Vec<FinancialEntry> {
    vec![
        stock("INFY", Region::India, Operation::Buy, 1400.0, 10.0),
        stock("AAPL", Region::Us, Operation::Buy, 180.0, 5.0),
        fund("Flexi Cap", Region::India, Operation::Buy, 100.0, 50.0, 5000.0),
        stock("INFY", Region::India, Operation::Sell, 1500.0, 4.0),
        fund("Flexi Cap", Region::India, Operation::Sell, 20.0, 55.0, 1100.0),
    ]
}

#[test]
fn region_filter_keeps_exactly_matching_entries_in_order() {
    let entries = sample_entries();
    let india = by_region(&entries, Region::India);

    assert_eq!(india.len(), 4);
    assert!(india.iter().all(|e| e.region == Region::India));
    // Relative order preserved.
    assert_eq!(india[0].name, "INFY");
    assert_eq!(india[1].name, "Flexi Cap");
    assert_eq!(india[2].name, "INFY");
    assert_eq!(india[3].name, "Flexi Cap");

    assert!(by_region(&entries, Region::Japan).is_empty());
}

#[test]
fn region_filter_never_mutates_the_cache() {
    let entries = sample_entries();
    let before = entries.clone();
    let _ = by_region(&entries, Region::Us);
    let _ = by_region(&entries, Region::Japan);
    assert_eq!(entries, before);
}

#[test]
fn kind_splits_partition_the_set() {
    let entries = sample_entries();
    let s = stocks(&entries);
    let m = mutual_funds(&entries);
    assert_eq!(s.len() + m.len(), entries.len());
    assert!(s.iter().all(FinancialEntry::is_stock));
    assert!(m.iter().all(FinancialEntry::is_mutual_fund));
}

#[test]
fn unique_names_first_seen_order() {
    let entries = sample_entries();
    assert_eq!(unique_names(&entries), vec!["INFY", "AAPL", "Flexi Cap"]);
}

#[test]
fn derive_is_pure_and_does_not_mutate_input() {
    let entries = sample_entries();
    let before = entries.clone();

    let first = derive(&entries);
    let second = derive(&entries);

    assert_eq!(first, second);
    assert_eq!(entries, before);
}

#[test]
fn derive_nets_buys_against_sells_per_instrument() {
    let entries = by_region(&sample_entries(), Region::India);
    let metrics = derive(&entries);

    let infy = metrics
        .stocks
        .iter()
        .find(|p| p.name == "INFY")
        .expect("INFY position");
    // 10 bought at 1400, 4 sold at 1500.
    assert_eq!(infy.net_quantity, 6.0);
    assert_eq!(infy.invested, 10.0 * 1400.0 - 4.0 * 1500.0);
    // Valued at the last seen trade price.
    assert_eq!(infy.current_value, 6.0 * 1500.0);
    assert_eq!(infy.gain_loss, infy.current_value - infy.invested);

    let flexi = metrics
        .mutual_funds
        .iter()
        .find(|p| p.name == "Flexi Cap")
        .expect("Flexi Cap position");
    assert_eq!(flexi.net_quantity, 80.0);
    assert_eq!(flexi.invested, 5000.0 - 1100.0);
    assert_eq!(flexi.current_value, 80.0 * 55.0);
}

#[test]
fn derive_totals_are_consistent() {
    let metrics = derive(&sample_entries());

    assert_eq!(metrics.total_invested, metrics.stock_invested + metrics.mf_invested);
    assert_eq!(metrics.current_value, metrics.stock_value + metrics.mf_value);
    assert_eq!(metrics.gain_loss, metrics.current_value - metrics.total_invested);
}

#[test]
fn derive_of_empty_set_is_zeroed() {
    let metrics = derive(&[]);
    assert_eq!(metrics, engine::DerivedMetrics::default());
    assert_eq!(metrics.gain_loss_pct, 0.0);
}
