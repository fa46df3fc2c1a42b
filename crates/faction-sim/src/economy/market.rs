//! Market Pricing
//!
//! Each faction keeps local markets whose price follows the demand/supply
//! ratio. Buying draws supply down and pushes demand up; selling does the
//! reverse.

use faction_records::resources::keys;
use faction_records::{Faction, MarketEntry};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::round_price;
use crate::SimError;

/// Pricing constants.
pub mod pricing {
    /// Price multiplier when nothing is on offer.
    pub const SCARCITY_MULTIPLIER: f64 = 10.0;
    /// Price multiplier when nobody wants the good.
    pub const FIRE_SALE_MULTIPLIER: f64 = 0.1;
    /// Lowest price as a fraction of base.
    pub const PRICE_FLOOR: f64 = 0.1;
    /// Default maximum relative swing of supply and demand per fluctuation.
    pub const DEFAULT_VOLATILITY: f64 = 0.1;
}

/// `base * demand / supply`, floored at 10% of base and rounded to cents.
pub fn calculate_price(base_price: f64, supply: f64, demand: f64) -> f64 {
    if supply <= 0.0 {
        return round_price(base_price * pricing::SCARCITY_MULTIPLIER);
    }
    if demand <= 0.0 {
        return round_price(base_price * pricing::FIRE_SALE_MULTIPLIER);
    }
    let price = (base_price * demand / supply).max(base_price * pricing::PRICE_FLOOR);
    round_price(price)
}

/// Recomputes one entry's current price.
pub fn refresh_price(entry: &mut MarketEntry) {
    entry.current_price = calculate_price(entry.base_price, entry.supply, entry.demand);
}

/// Recomputes every market's current price.
pub fn update_market_prices(faction: &mut Faction) {
    for entry in &mut faction.markets {
        refresh_price(entry);
    }
}

pub fn find_market<'a>(faction: &'a Faction, resource: &str) -> Option<&'a MarketEntry> {
    faction.markets.iter().find(|m| m.resource == resource)
}

fn market_mut<'a>(faction: &'a mut Faction, resource: &str) -> Result<&'a mut MarketEntry, SimError> {
    faction
        .markets
        .iter_mut()
        .find(|m| m.resource == resource)
        .ok_or_else(|| SimError::not_found("Market", resource))
}

/// Shifts supply and demand by the given deltas (floored at 0) and returns
/// the new price.
pub fn update_market(
    faction: &mut Faction,
    resource: &str,
    supply_delta: f64,
    demand_delta: f64,
) -> Result<f64, SimError> {
    let entry = market_mut(faction, resource)?;
    entry.supply = (entry.supply + supply_delta).max(0.0);
    entry.demand = (entry.demand + demand_delta).max(0.0);
    refresh_price(entry);
    Ok(entry.current_price)
}

/// A completed market trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub resource: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

/// Buys `quantity` of `resource` from the faction's market with gold.
pub fn buy_resource(faction: &mut Faction, resource: &str, quantity: f64) -> Result<Transaction, SimError> {
    let gold = faction.resource(keys::GOLD);
    let entry = market_mut(faction, resource)?;
    if entry.supply < quantity {
        return Err(SimError::InsufficientSupply {
            resource: resource.to_string(),
            requested: quantity,
            available: entry.supply,
        });
    }

    let unit_price = calculate_price(entry.base_price, entry.supply, entry.demand);
    let total = round_price(unit_price * quantity);
    if gold < total {
        return Err(SimError::insufficient(keys::GOLD, total, gold));
    }

    entry.supply -= quantity;
    entry.demand += quantity;
    refresh_price(entry);

    let bag = faction.resources_mut();
    bag.add(keys::GOLD, -total);
    bag.add(resource, quantity);

    tracing::debug!(faction = %faction.name, resource, quantity, total, "Bought from market");
    Ok(Transaction {
        resource: resource.to_string(),
        quantity,
        unit_price,
        total,
    })
}

/// Sells `quantity` of `resource` into the faction's market for gold.
pub fn sell_resource(faction: &mut Faction, resource: &str, quantity: f64) -> Result<Transaction, SimError> {
    let held = faction.resource(resource);
    if held < quantity {
        return Err(SimError::insufficient(resource, quantity, held));
    }

    let entry = market_mut(faction, resource)?;
    let unit_price = calculate_price(entry.base_price, entry.supply, entry.demand);
    let total = round_price(unit_price * quantity);

    entry.supply += quantity;
    entry.demand = (entry.demand - quantity).max(0.0);
    refresh_price(entry);

    let bag = faction.resources_mut();
    bag.add(resource, -quantity);
    bag.add(keys::GOLD, total);

    tracing::debug!(faction = %faction.name, resource, quantity, total, "Sold to market");
    Ok(Transaction {
        resource: resource.to_string(),
        quantity,
        unit_price,
        total,
    })
}

/// Random walk on every market: supply and demand each move by up to
/// `volatility` of their current value, floored at 0.
pub fn fluctuate_markets<R: Rng + ?Sized>(faction: &mut Faction, volatility: f64, rng: &mut R) {
    if volatility <= 0.0 {
        return;
    }
    for entry in &mut faction.markets {
        let supply_swing = rng.gen_range(-volatility..=volatility);
        let demand_swing = rng.gen_range(-volatility..=volatility);
        entry.supply = (entry.supply * (1.0 + supply_swing)).max(0.0);
        entry.demand = (entry.demand * (1.0 + demand_swing)).max(0.0);
        refresh_price(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faction_records::Resources;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn market_faction() -> Faction {
        let mut faction = Faction::new("Ironmere")
            .with_resources(Resources::from([("gold", 1000.0), ("iron", 30.0)]))
            .with_market(MarketEntry::new("iron", 10.0, 100.0, 100.0))
            .with_market(MarketEntry::new("grain", 5.0, 50.0, 50.0));
        update_market_prices(&mut faction);
        faction
    }

    #[test]
    fn test_price_formula() {
        assert_eq!(calculate_price(100.0, 50.0, 100.0), 200.0);
        assert_eq!(calculate_price(50.0, 200.0, 100.0), 25.0);
        assert_eq!(calculate_price(100.0, 0.0, 100.0), 1000.0);
        assert_eq!(calculate_price(100.0, 50.0, 0.0), 10.0);
    }

    #[test]
    fn test_price_floor() {
        assert_eq!(calculate_price(100.0, 10_000.0, 1.0), 10.0);
    }

    #[test]
    fn test_price_rounds_to_cents() {
        assert_eq!(calculate_price(10.0, 3.0, 1.0), 3.33);
    }

    #[test]
    fn test_buy_moves_supply_and_demand() {
        let mut faction = market_faction();
        let tx = buy_resource(&mut faction, "iron", 20.0).unwrap();

        assert_eq!(tx.unit_price, 10.0);
        assert_eq!(tx.total, 200.0);
        let market = find_market(&faction, "iron").unwrap();
        assert_eq!(market.supply, 80.0);
        assert_eq!(market.demand, 120.0);
        assert_eq!(market.current_price, 15.0);
        assert_eq!(faction.resource("gold"), 800.0);
        assert_eq!(faction.resource("iron"), 50.0);
    }

    #[test]
    fn test_buy_insufficient_supply() {
        let mut faction = market_faction();
        let err = buy_resource(&mut faction, "iron", 500.0).unwrap_err();
        assert!(matches!(err, SimError::InsufficientSupply { .. }));
        assert!(err.to_string().contains("Insufficient supply"));
    }

    #[test]
    fn test_buy_insufficient_gold() {
        let mut faction = market_faction();
        faction.resources_mut().set("gold", 10.0);
        let err = buy_resource(&mut faction, "iron", 20.0).unwrap_err();
        assert!(err.to_string().contains("Insufficient gold"));
        assert_eq!(find_market(&faction, "iron").unwrap().supply, 100.0);
    }

    #[test]
    fn test_sell() {
        let mut faction = market_faction();
        let tx = sell_resource(&mut faction, "iron", 20.0).unwrap();

        assert_eq!(tx.total, 200.0);
        let market = find_market(&faction, "iron").unwrap();
        assert_eq!(market.supply, 120.0);
        assert_eq!(market.demand, 80.0);
        assert_eq!(faction.resource("iron"), 10.0);
        assert_eq!(faction.resource("gold"), 1200.0);
    }

    #[test]
    fn test_sell_insufficient_resource() {
        let mut faction = market_faction();
        let err = sell_resource(&mut faction, "iron", 31.0).unwrap_err();
        assert!(err.to_string().contains("Insufficient iron"));
    }

    #[test]
    fn test_unknown_market() {
        let mut faction = market_faction();
        let err = buy_resource(&mut faction, "silk", 1.0).unwrap_err();
        assert!(matches!(err, SimError::NotFound { .. }));
    }

    #[test]
    fn test_update_market_floors_at_zero() {
        let mut faction = market_faction();
        let price = update_market(&mut faction, "grain", -100.0, 0.0).unwrap();
        assert_eq!(price, 50.0);
        assert_eq!(find_market(&faction, "grain").unwrap().supply, 0.0);
    }

    #[test]
    fn test_fluctuation_stays_bounded() {
        let mut faction = market_faction();
        let mut rng = SmallRng::seed_from_u64(7);
        fluctuate_markets(&mut faction, 0.2, &mut rng);

        let iron = find_market(&faction, "iron").unwrap();
        assert!(iron.supply >= 80.0 && iron.supply <= 120.0);
        assert!(iron.demand >= 80.0 && iron.demand <= 120.0);
    }

    #[test]
    fn test_zero_volatility_is_noop() {
        let mut faction = market_faction();
        let before = faction.markets.clone();
        let mut rng = SmallRng::seed_from_u64(7);
        fluctuate_markets(&mut faction, 0.0, &mut rng);
        assert_eq!(faction.markets, before);
    }
}
