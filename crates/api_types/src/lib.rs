use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency/market partition under which entries and metrics are scoped.
///
/// Serialized as the plain region name, matching the `region` column of the
/// remote store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    India,
    #[serde(rename = "US")]
    Us,
    Europe,
    Japan,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::India, Region::Us, Region::Europe, Region::Japan];

    pub fn label(self) -> &'static str {
        match self {
            Self::India => "India",
            Self::Us => "US",
            Self::Europe => "Europe",
            Self::Japan => "Japan",
        }
    }

    /// ISO 4217 code of the region's currency.
    pub fn currency_code(self) -> &'static str {
        match self {
            Self::India => "INR",
            Self::Us => "USD",
            Self::Europe => "EUR",
            Self::Japan => "JPY",
        }
    }

    pub fn currency_symbol(self) -> &'static str {
        match self {
            Self::India => "₹",
            Self::Us => "$",
            Self::Europe => "€",
            Self::Japan => "¥",
        }
    }

    /// Next region in display order, wrapping around.
    pub fn next(self) -> Region {
        match self {
            Self::India => Self::Us,
            Self::Us => Self::Europe,
            Self::Europe => Self::Japan,
            Self::Japan => Self::India,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub mod entry {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Operation {
        Buy,
        Sell,
    }

    impl Operation {
        pub fn label(self) -> &'static str {
            match self {
                Self::Buy => "BUY",
                Self::Sell => "SELL",
            }
        }
    }

    /// Mutual fund category.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Category {
        Equity,
        Debt,
        Hybrid,
        Other,
    }

    impl Category {
        pub fn label(self) -> &'static str {
            match self {
                Self::Equity => "Equity",
                Self::Debt => "Debt",
                Self::Hybrid => "Hybrid",
                Self::Other => "Other",
            }
        }
    }

    /// Instrument-specific columns of an entry row.
    ///
    /// The remote rows are flat; the `type` column discriminates between
    /// `stock` and `mf`, so this flattens into [`FinancialEntry`].
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum InstrumentDetail {
        #[serde(rename = "stock")]
        Stock { price: f64, quantity: f64 },
        #[serde(rename = "mf")]
        MutualFund {
            units: f64,
            nav: f64,
            amount: f64,
            category: Category,
        },
    }

    /// A single buy/sell transaction record, owned by the remote store.
    ///
    /// The client only ever holds read-only cached copies of these.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FinancialEntry {
        pub id: Uuid,
        pub user_id: Uuid,
        pub created_at: DateTime<Utc>,
        pub name: String,
        pub region: Region,
        pub operation: Operation,
        #[serde(flatten)]
        pub detail: InstrumentDetail,
    }

    impl FinancialEntry {
        pub fn is_stock(&self) -> bool {
            matches!(self.detail, InstrumentDetail::Stock { .. })
        }

        pub fn is_mutual_fund(&self) -> bool {
            matches!(self.detail, InstrumentDetail::MutualFund { .. })
        }
    }
}

pub mod user {
    use super::*;

    /// Row shape returned by the users lookup.
    ///
    /// The password only ever travels as a query filter; it is never read
    /// back.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserRecord {
        pub id: Uuid,
        pub username: String,
    }
}

#[cfg(test)]
mod tests {
    use super::entry::{FinancialEntry, InstrumentDetail, Operation};
    use super::*;

    #[test]
    fn stock_row_round_trips_flat() {
        let raw = serde_json::json!({
            "id": "7f0e97a2-7c3f-4f54-9d10-2f9c01a1a111",
            "user_id": "b0b2b2a4-0000-4e1f-8e7e-6a21c64ab001",
            "created_at": "2024-05-01T10:00:00Z",
            "name": "INFY",
            "region": "India",
            "operation": "buy",
            "type": "stock",
            "price": 1450.5,
            "quantity": 10.0
        });

        let entry: FinancialEntry = serde_json::from_value(raw.clone()).unwrap();
        assert!(entry.is_stock());
        assert_eq!(entry.region, Region::India);
        assert_eq!(entry.operation, Operation::Buy);
        match entry.detail {
            InstrumentDetail::Stock { price, quantity } => {
                assert_eq!(price, 1450.5);
                assert_eq!(quantity, 10.0);
            }
            InstrumentDetail::MutualFund { .. } => panic!("expected stock detail"),
        }

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["type"], "stock");
        assert_eq!(back["region"], "India");
    }

    #[test]
    fn mutual_fund_row_round_trips_flat() {
        let raw = serde_json::json!({
            "id": "7f0e97a2-7c3f-4f54-9d10-2f9c01a1a112",
            "user_id": "b0b2b2a4-0000-4e1f-8e7e-6a21c64ab001",
            "created_at": "2024-05-02T10:00:00Z",
            "name": "Parag Parikh Flexi Cap",
            "region": "US",
            "operation": "sell",
            "type": "mf",
            "units": 25.5,
            "nav": 61.2,
            "amount": 1560.6,
            "category": "Equity"
        });

        let entry: FinancialEntry = serde_json::from_value(raw).unwrap();
        assert!(entry.is_mutual_fund());
        assert_eq!(entry.region, Region::Us);

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["type"], "mf");
        assert_eq!(back["category"], "Equity");
    }

    #[test]
    fn region_cycle_wraps() {
        let mut region = Region::India;
        for _ in 0..Region::ALL.len() {
            region = region.next();
        }
        assert_eq!(region, Region::India);
    }
}
