//! Regional Markets
//!
//! Shared markets that several factions trade through. Prices respond to
//! supply and demand, to temporary market events, and to a slow economic
//! cycle that scales demand.

use faction_records::{generate_record_id, MarketEntry};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::market::calculate_price;
use super::round_price;
use crate::SimError;

/// Constants for regional markets
pub mod regional_constants {
    /// Starting volatility (0-100)
    pub const DEFAULT_VOLATILITY: f64 = 50.0;
    /// Starting market health (0-100)
    pub const DEFAULT_HEALTH: f64 = 75.0;
    /// Base daily chance of a random market event
    pub const BASE_EVENT_CHANCE: f64 = 0.05;
    /// Demand signal per unit bought or sold
    pub const DEMAND_SIGNAL: f64 = 0.1;
    /// Price points kept per history
    pub const HISTORY_LENGTH: usize = 30;
    /// Window used for trend and prediction
    pub const TREND_WINDOW: usize = 7;
    /// Relative change over the window that counts as a trend
    pub const TREND_THRESHOLD: f64 = 0.1;
}

use regional_constants::*;

/// Kind of market disturbance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketEventKind {
    Shortage,
    Surplus,
    Speculation,
    Panic,
    Boom,
    Embargo,
    Innovation,
}

impl MarketEventKind {
    pub const ALL: [MarketEventKind; 7] = [
        MarketEventKind::Shortage,
        MarketEventKind::Surplus,
        MarketEventKind::Speculation,
        MarketEventKind::Panic,
        MarketEventKind::Boom,
        MarketEventKind::Embargo,
        MarketEventKind::Innovation,
    ];

    /// Price multiplier while the event lasts.
    pub fn impact(&self) -> f64 {
        match self {
            MarketEventKind::Shortage => 2.0,
            MarketEventKind::Surplus => 0.5,
            MarketEventKind::Speculation => 1.5,
            MarketEventKind::Panic => 2.5,
            MarketEventKind::Boom => 1.3,
            MarketEventKind::Embargo => 3.0,
            MarketEventKind::Innovation => 0.7,
        }
    }

    fn describe(&self, resource: &str, market: &str) -> String {
        match self {
            MarketEventKind::Shortage => format!("Severe shortage of {} in {}", resource, market),
            MarketEventKind::Surplus => format!("Market flooded with {} in {}", resource, market),
            MarketEventKind::Speculation => format!("Speculators driving up {} prices in {}", resource, market),
            MarketEventKind::Panic => format!("Panic buying of {} in {}", resource, market),
            MarketEventKind::Boom => format!("Economic boom increasing {} demand in {}", resource, market),
            MarketEventKind::Embargo => format!("Trade embargo on {} in {}", resource, market),
            MarketEventKind::Innovation => format!("New production methods lower {} costs in {}", resource, market),
        }
    }
}

/// A temporary price modifier. `resource == "all"` affects every good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MarketEventKind,
    pub resource: String,
    pub impact: f64,
    /// Days remaining.
    pub duration: u32,
    pub description: String,
}

/// A trade executed against a regional market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrade {
    pub buyer: String,
    pub seller: String,
    pub resource: String,
    pub quantity: f64,
    pub price: f64,
    pub total: f64,
}

/// A market shared by several factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalMarket {
    pub id: String,
    pub name: String,
    pub goods: Vec<MarketEntry>,
    pub factions: Vec<String>,
    /// 0-100; scales the daily random walk.
    pub volatility: f64,
    /// 0-100 moving average of price stability.
    pub health: f64,
    #[serde(default)]
    pub events: Vec<MarketEvent>,
}

impl RegionalMarket {
    pub fn new(name: impl Into<String>, factions: Vec<String>, goods: Vec<MarketEntry>) -> Self {
        let mut market = Self {
            id: generate_record_id("market"),
            name: name.into(),
            goods,
            factions,
            volatility: DEFAULT_VOLATILITY,
            health: DEFAULT_HEALTH,
            events: Vec::new(),
        };
        market.update_prices();
        market
    }

    pub fn good(&self, resource: &str) -> Option<&MarketEntry> {
        self.goods.iter().find(|g| g.resource == resource)
    }

    /// Recomputes prices and applies active event multipliers.
    pub fn update_prices(&mut self) {
        for good in &mut self.goods {
            let mut price = calculate_price(good.base_price, good.supply, good.demand);
            for event in &self.events {
                if event.resource == good.resource || event.resource == "all" {
                    price *= event.impact;
                }
            }
            good.current_price = round_price(price);
        }
    }

    /// One day of random drift, event decay and health update.
    pub fn simulate_day<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let factor = self.volatility / 100.0;
        for good in &mut self.goods {
            let supply_change = rng.gen_range(-1.0..=1.0) * factor * good.supply;
            let demand_change = rng.gen_range(-1.0..=1.0) * factor * good.demand;
            good.supply = (good.supply + supply_change).max(0.0);
            good.demand = (good.demand + demand_change).max(0.0);
        }

        for event in &mut self.events {
            event.duration = event.duration.saturating_sub(1);
        }
        self.events.retain(|e| e.duration > 0);

        self.update_prices();

        if !self.goods.is_empty() {
            let avg_price = self.goods.iter().map(|g| g.current_price).sum::<f64>() / self.goods.len() as f64;
            let stability = 1.0 - (avg_price - 100.0).abs() / 100.0;
            self.health = (self.health * 0.9 + stability * 10.0).clamp(0.0, 100.0);
        }
    }

    /// Adds an event and reprices.
    pub fn create_event(&mut self, kind: MarketEventKind, resource: &str, duration: u32) -> MarketEvent {
        let event = MarketEvent {
            id: generate_record_id("market_event"),
            kind,
            resource: resource.to_string(),
            impact: kind.impact(),
            duration,
            description: kind.describe(resource, &self.name),
        };
        tracing::info!(market = %self.name, event = %event.description, "Market event");
        self.events.push(event.clone());
        self.update_prices();
        event
    }

    /// Rolls for a random event; more volatile markets see more events.
    pub fn roll_random_event<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<MarketEvent> {
        if self.goods.is_empty() {
            return None;
        }
        let chance = BASE_EVENT_CHANCE + self.volatility / 1000.0;
        if rng.gen::<f64>() > chance {
            return None;
        }
        let kind = MarketEventKind::ALL[rng.gen_range(0..MarketEventKind::ALL.len())];
        let resource = self.goods[rng.gen_range(0..self.goods.len())].resource.clone();
        let duration = rng.gen_range(3..10);
        Some(self.create_event(kind, &resource, duration))
    }

    fn good_mut(&mut self, resource: &str) -> Result<&mut MarketEntry, SimError> {
        let name = self.name.clone();
        self.goods
            .iter_mut()
            .find(|g| g.resource == resource)
            .ok_or_else(|| SimError::not_found("Market good", format!("{} in {}", resource, name)))
    }

    /// Buys from the market at the current price.
    pub fn buy(&mut self, buyer: &str, resource: &str, quantity: f64) -> Result<MarketTrade, SimError> {
        let seller = self.name.clone();
        let good = self.good_mut(resource)?;
        if good.supply < quantity {
            return Err(SimError::InsufficientSupply {
                resource: resource.to_string(),
                requested: quantity,
                available: good.supply,
            });
        }
        let price = good.current_price;
        good.supply -= quantity;
        good.demand += quantity * DEMAND_SIGNAL;
        self.update_prices();

        Ok(MarketTrade {
            buyer: buyer.to_string(),
            seller,
            resource: resource.to_string(),
            quantity,
            price,
            total: round_price(price * quantity),
        })
    }

    /// Sells into the market at the current price.
    pub fn sell(&mut self, seller: &str, resource: &str, quantity: f64) -> Result<MarketTrade, SimError> {
        let buyer = self.name.clone();
        let good = self.good_mut(resource)?;
        let price = good.current_price;
        good.supply += quantity;
        good.demand = (good.demand - quantity * DEMAND_SIGNAL).max(0.0);
        self.update_prices();

        Ok(MarketTrade {
            buyer,
            seller: seller.to_string(),
            resource: resource.to_string(),
            quantity,
            price,
            total: round_price(price * quantity),
        })
    }
}

/// Direction of recent prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Rising,
    Falling,
    #[default]
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

/// Rolling price record for one good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub resource: String,
    pub prices: Vec<PricePoint>,
    #[serde(default)]
    pub trend: PriceTrend,
    /// Points kept before the oldest are dropped.
    #[serde(default = "default_history_length")]
    pub capacity: usize,
}

fn default_history_length() -> usize {
    HISTORY_LENGTH
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// Standard deviation relative to the mean.
    pub volatility: f64,
}

impl PriceHistory {
    pub fn new(resource: impl Into<String>) -> Self {
        Self::with_capacity(resource, HISTORY_LENGTH)
    }

    pub fn with_capacity(resource: impl Into<String>, capacity: usize) -> Self {
        Self {
            resource: resource.into(),
            prices: Vec::new(),
            trend: PriceTrend::Stable,
            capacity: capacity.max(1),
        }
    }

    /// Appends a price point, keeping the most recent `capacity`.
    pub fn push(&mut self, date: impl Into<String>, price: f64) {
        self.prices.push(PricePoint {
            date: date.into(),
            price,
        });
        if self.prices.len() > self.capacity {
            let excess = self.prices.len() - self.capacity;
            self.prices.drain(..excess);
        }
        self.trend = self.calculate_trend();
    }

    /// Records the market's current price for this good, if traded there.
    pub fn record(&mut self, market: &RegionalMarket, date: impl Into<String>) {
        if let Some(good) = market.good(&self.resource) {
            self.push(date, good.current_price);
        }
    }

    fn window(&self) -> Option<&[PricePoint]> {
        (self.prices.len() >= TREND_WINDOW).then(|| &self.prices[self.prices.len() - TREND_WINDOW..])
    }

    /// ±10% over the last 7 points; stable with fewer points.
    pub fn calculate_trend(&self) -> PriceTrend {
        let Some(window) = self.window() else {
            return PriceTrend::Stable;
        };
        let first = window[0].price;
        let last = window[window.len() - 1].price;
        if first <= 0.0 {
            return PriceTrend::Stable;
        }
        let change = (last - first) / first;
        if change > TREND_THRESHOLD {
            PriceTrend::Rising
        } else if change < -TREND_THRESHOLD {
            PriceTrend::Falling
        } else {
            PriceTrend::Stable
        }
    }

    pub fn statistics(&self) -> Option<PriceStatistics> {
        let prices: Vec<f64> = self.prices.iter().map(|p| p.price).collect();
        let current = *prices.last()?;
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = prices.iter().sum::<f64>() / prices.len() as f64;
        let variance = prices.iter().map(|p| (p - average).powi(2)).sum::<f64>() / prices.len() as f64;
        let volatility = if average > 0.0 { variance.sqrt() / average } else { 0.0 };

        Some(PriceStatistics {
            current: round_price(current),
            min: round_price(min),
            max: round_price(max),
            average: round_price(average),
            volatility: round_price(volatility),
        })
    }

    /// Projects the 7-point average forward along the recent slope.
    pub fn predict(&self, days_ahead: u32) -> Option<f64> {
        let window = self.window()?;
        let average = window.iter().map(|p| p.price).sum::<f64>() / window.len() as f64;
        let slope = (window[window.len() - 1].price - window[0].price) / TREND_WINDOW as f64;
        Some(round_price((average + slope * days_ahead as f64).max(0.0)))
    }
}

/// Buy/sell/hold advice for one good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRecommendation {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAdvice {
    pub resource: String,
    pub recommendation: MarketRecommendation,
    pub confidence: u8,
    pub reason: String,
}

impl RegionalMarket {
    /// Advice for every good with at least 7 days of history, most confident first.
    pub fn analyze(&self, histories: &[PriceHistory]) -> Vec<TradeAdvice> {
        let mut advice = Vec::new();

        for good in &self.goods {
            let Some(history) = histories.iter().find(|h| h.resource == good.resource) else {
                continue;
            };
            if history.prices.len() < TREND_WINDOW {
                continue;
            }
            let Some(stats) = history.statistics() else {
                continue;
            };
            let price = good.current_price;

            let (mut recommendation, mut confidence, mut reason) =
                (MarketRecommendation::Hold, 50, "Market stable".to_string());

            if price < stats.average * 0.8 {
                (recommendation, confidence, reason) = (MarketRecommendation::Buy, 70, "Price 20% below average".into());
            } else if history.trend == PriceTrend::Falling && price < stats.average * 0.9 {
                (recommendation, confidence, reason) =
                    (MarketRecommendation::Buy, 60, "Falling trend nearing bottom".into());
            }

            if price > stats.average * 1.2 {
                (recommendation, confidence, reason) = (MarketRecommendation::Sell, 70, "Price 20% above average".into());
            } else if history.trend == PriceTrend::Rising && price > stats.average * 1.1 {
                (recommendation, confidence, reason) =
                    (MarketRecommendation::Sell, 60, "Rising trend may be peaking".into());
            }

            for event in self.events.iter().filter(|e| e.resource == good.resource) {
                match event.kind {
                    MarketEventKind::Shortage | MarketEventKind::Embargo => {
                        (recommendation, confidence) = (MarketRecommendation::Buy, 80);
                        reason = format!("Market event: {}", event.description);
                    }
                    MarketEventKind::Surplus | MarketEventKind::Innovation => {
                        (recommendation, confidence) = (MarketRecommendation::Sell, 80);
                        reason = format!("Market event: {}", event.description);
                    }
                    _ => {}
                }
            }

            advice.push(TradeAdvice {
                resource: good.resource.clone(),
                recommendation,
                confidence,
                reason,
            });
        }

        advice.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        advice
    }
}

/// Phase of the regional business cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicPhase {
    Expansion,
    Peak,
    Contraction,
    Trough,
}

impl EconomicPhase {
    const ORDER: [EconomicPhase; 4] = [
        EconomicPhase::Expansion,
        EconomicPhase::Peak,
        EconomicPhase::Contraction,
        EconomicPhase::Trough,
    ];

    /// (demand multiplier, market volatility) while in this phase.
    pub fn effect(&self) -> (f64, f64) {
        match self {
            EconomicPhase::Expansion => (1.2, 40.0),
            EconomicPhase::Peak => (1.5, 60.0),
            EconomicPhase::Contraction => (0.8, 50.0),
            EconomicPhase::Trough => (0.5, 30.0),
        }
    }
}

/// Four equal phases over `cycle_length` days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicCycle {
    pub phase: EconomicPhase,
    /// Percent through the current phase.
    pub progress: f64,
    pub cycle_length: u32,
    pub day: u32,
}

impl EconomicCycle {
    pub fn new(cycle_length: u32) -> Self {
        Self {
            phase: EconomicPhase::Expansion,
            progress: 0.0,
            cycle_length: cycle_length.max(4),
            day: 0,
        }
    }

    pub fn advance(&mut self) {
        self.day += 1;
        let phase_length = self.cycle_length as f64 / 4.0;
        let day = self.day as f64;
        let index = (day / phase_length).floor() as usize % 4;
        self.phase = EconomicPhase::ORDER[index];
        self.progress = (day % phase_length) / phase_length * 100.0;
    }

    /// Scales every good's demand and sets market volatility for the phase.
    pub fn apply(&self, market: &mut RegionalMarket) {
        let (demand_multiplier, volatility) = self.phase.effect();
        for good in &mut market.goods {
            good.demand *= demand_multiplier;
        }
        market.volatility = volatility;
        market.update_prices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn crossroads() -> RegionalMarket {
        RegionalMarket::new(
            "Crossroads",
            vec!["Thornwood".into(), "Ironmere".into()],
            vec![
                MarketEntry::new("grain", 10.0, 100.0, 100.0),
                MarketEntry::new("iron", 40.0, 50.0, 100.0),
            ],
        )
    }

    #[test]
    fn test_new_market_prices_goods() {
        let market = crossroads();
        assert_eq!(market.good("grain").unwrap().current_price, 10.0);
        assert_eq!(market.good("iron").unwrap().current_price, 80.0);
    }

    #[test]
    fn test_event_multiplies_price() {
        let mut market = crossroads();
        let event = market.create_event(MarketEventKind::Shortage, "grain", 5);
        assert_eq!(event.impact, 2.0);
        assert!(event.description.contains("Crossroads"));
        assert_eq!(market.good("grain").unwrap().current_price, 20.0);
        assert_eq!(market.good("iron").unwrap().current_price, 80.0);
    }

    #[test]
    fn test_events_expire() {
        let mut market = crossroads();
        market.volatility = 0.0;
        market.create_event(MarketEventKind::Embargo, "all", 1);
        let mut rng = SmallRng::seed_from_u64(1);
        market.simulate_day(&mut rng);
        assert!(market.events.is_empty());
        assert_eq!(market.good("grain").unwrap().current_price, 10.0);
    }

    #[test]
    fn test_buy_and_sell() {
        let mut market = crossroads();
        let trade = market.buy("Thornwood", "grain", 20.0).unwrap();
        assert_eq!(trade.total, 200.0);
        assert_eq!(market.good("grain").unwrap().supply, 80.0);
        assert_eq!(market.good("grain").unwrap().demand, 102.0);

        let trade = market.sell("Ironmere", "iron", 10.0).unwrap();
        assert_eq!(trade.price, 80.0);
        assert_eq!(market.good("iron").unwrap().supply, 60.0);

        assert!(market.buy("Thornwood", "grain", 1000.0).is_err());
        assert!(market.sell("Thornwood", "silk", 1.0).is_err());
    }

    #[test]
    fn test_history_capped_and_trend() {
        let mut history = PriceHistory::new("grain");
        for day in 0..40 {
            history.push(format!("day_{}", day), 10.0 + day as f64);
        }
        assert_eq!(history.prices.len(), 30);
        assert_eq!(history.prices[0].price, 20.0);
        assert_eq!(history.trend, PriceTrend::Rising);
    }

    #[test]
    fn test_short_history_is_stable() {
        let mut history = PriceHistory::new("grain");
        history.push("d1", 10.0);
        history.push("d2", 50.0);
        assert_eq!(history.trend, PriceTrend::Stable);
        assert_eq!(history.predict(7), None);
    }

    #[test]
    fn test_statistics() {
        let mut history = PriceHistory::new("grain");
        for price in [10.0, 20.0, 30.0] {
            history.push("d", price);
        }
        let stats = history.statistics().unwrap();
        assert_eq!(stats.current, 30.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.average, 20.0);
        assert!(stats.volatility > 0.0);
        assert!(PriceHistory::new("x").statistics().is_none());
    }

    #[test]
    fn test_prediction_follows_slope() {
        let mut history = PriceHistory::new("grain");
        for price in [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0] {
            history.push("d", price);
        }
        assert_eq!(history.predict(7), Some(10.0));

        history.push("d", 17.0);
        assert!(history.predict(7).unwrap() > 11.0);
    }

    #[test]
    fn test_analyze_event_override() {
        let mut market = crossroads();
        let mut history = PriceHistory::new("grain");
        for _ in 0..7 {
            history.record(&market, "d");
        }
        market.create_event(MarketEventKind::Surplus, "grain", 3);

        let advice = market.analyze(&[history]);
        assert_eq!(advice.len(), 1);
        assert_eq!(advice[0].recommendation, MarketRecommendation::Sell);
        assert_eq!(advice[0].confidence, 80);
    }

    #[test]
    fn test_economic_cycle_phases() {
        let mut cycle = EconomicCycle::new(40);
        for _ in 0..10 {
            cycle.advance();
        }
        assert_eq!(cycle.phase, EconomicPhase::Peak);
        for _ in 0..20 {
            cycle.advance();
        }
        assert_eq!(cycle.phase, EconomicPhase::Trough);

        let mut market = crossroads();
        cycle.apply(&mut market);
        assert_eq!(market.volatility, 30.0);
        assert_eq!(market.good("grain").unwrap().demand, 50.0);
    }

    #[test]
    fn test_simulate_day_keeps_quantities_non_negative() {
        let mut market = crossroads();
        market.volatility = 100.0;
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..50 {
            market.simulate_day(&mut rng);
        }
        assert!(market.goods.iter().all(|g| g.supply >= 0.0 && g.demand >= 0.0));
        assert!(market.health >= 0.0 && market.health <= 100.0);
    }
}
