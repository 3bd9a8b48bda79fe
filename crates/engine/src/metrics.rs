use api_types::entry::{FinancialEntry, InstrumentDetail, Operation};

/// Aggregated figures for a single instrument (all entries sharing a name).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionMetrics {
    pub name: String,
    /// Net held amount: quantity for stocks, units for mutual funds.
    pub net_quantity: f64,
    /// Cost basis: buys minus sell proceeds.
    pub invested: f64,
    /// Net quantity valued at the most recent trade price / NAV seen.
    pub current_value: f64,
    pub gain_loss: f64,
}

/// Portfolio metrics derived from one filtered entry set.
///
/// Computed, never persisted; recomputed whenever the filtered set changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedMetrics {
    pub stock_invested: f64,
    pub stock_value: f64,
    pub mf_invested: f64,
    pub mf_value: f64,
    pub total_invested: f64,
    pub current_value: f64,
    pub gain_loss: f64,
    /// Percent gain/loss over invested; 0 when nothing is invested.
    pub gain_loss_pct: f64,
    pub stocks: Vec<PositionMetrics>,
    pub mutual_funds: Vec<PositionMetrics>,
}

/// Derives portfolio metrics from an entry sequence.
///
/// Pure and referentially transparent: equal inputs always yield equal
/// outputs and the input is never mutated, so callers may memoize on the
/// sequence content. Positions appear in first-seen order.
///
/// Holdings are valued at the last trade price (stocks) or last NAV (funds)
/// present in the sequence itself; there is no external market-data feed.
pub fn derive(entries: &[FinancialEntry]) -> DerivedMetrics {
    let mut stocks: Vec<PositionState> = Vec::new();
    let mut funds: Vec<PositionState> = Vec::new();

    for entry in entries {
        let sign = match entry.operation {
            Operation::Buy => 1.0,
            Operation::Sell => -1.0,
        };
        match entry.detail {
            InstrumentDetail::Stock { price, quantity } => {
                let position = position_mut(&mut stocks, &entry.name);
                position.net_quantity += sign * quantity;
                position.invested += sign * price * quantity;
                position.last_price = price;
            }
            InstrumentDetail::MutualFund {
                units, nav, amount, ..
            } => {
                let position = position_mut(&mut funds, &entry.name);
                position.net_quantity += sign * units;
                position.invested += sign * amount;
                position.last_price = nav;
            }
        }
    }

    let stocks: Vec<PositionMetrics> = stocks.into_iter().map(PositionState::finish).collect();
    let mutual_funds: Vec<PositionMetrics> = funds.into_iter().map(PositionState::finish).collect();

    let stock_invested: f64 = stocks.iter().map(|p| p.invested).sum();
    let stock_value: f64 = stocks.iter().map(|p| p.current_value).sum();
    let mf_invested: f64 = mutual_funds.iter().map(|p| p.invested).sum();
    let mf_value: f64 = mutual_funds.iter().map(|p| p.current_value).sum();

    let total_invested = stock_invested + mf_invested;
    let current_value = stock_value + mf_value;
    let gain_loss = current_value - total_invested;
    let gain_loss_pct = if total_invested == 0.0 {
        0.0
    } else {
        gain_loss / total_invested * 100.0
    };

    DerivedMetrics {
        stock_invested,
        stock_value,
        mf_invested,
        mf_value,
        total_invested,
        current_value,
        gain_loss,
        gain_loss_pct,
        stocks,
        mutual_funds,
    }
}

#[derive(Default)]
struct PositionState {
    name: String,
    net_quantity: f64,
    invested: f64,
    last_price: f64,
}

impl PositionState {
    fn finish(self) -> PositionMetrics {
        let current_value = self.net_quantity * self.last_price;
        let gain_loss = current_value - self.invested;
        PositionMetrics {
            name: self.name,
            net_quantity: self.net_quantity,
            invested: self.invested,
            current_value,
            gain_loss,
        }
    }
}

fn position_mut<'a>(positions: &'a mut Vec<PositionState>, name: &str) -> &'a mut PositionState {
    if let Some(index) = positions.iter().position(|p| p.name == name) {
        return &mut positions[index];
    }
    positions.push(PositionState {
        name: name.to_string(),
        ..PositionState::default()
    });
    let last = positions.len() - 1;
    &mut positions[last]
}
