//! Resource Economy
//!
//! Market pricing, trade routes, production chains, daily consumption and
//! regional markets.

pub mod consumption;
pub mod market;
pub mod production;
pub mod regional;
pub mod trade;

pub use consumption::{
    apply_consumption_with, apply_daily_consumption, daily_consumption, daily_consumption_with,
    ConsumptionItem, ConsumptionRates, ConsumptionReport,
};
pub use market::{
    buy_resource, calculate_price, find_market, fluctuate_markets, refresh_price, sell_resource,
    update_market, update_market_prices, Transaction,
};
pub use production::{
    advance_production_chains, chain_template, process_production_chains,
    start_production_chain, ChainTemplate, CHAIN_TEMPLATES,
};
pub use regional::{
    EconomicCycle, EconomicPhase, MarketEvent, MarketEventKind, MarketRecommendation,
    PriceHistory, PriceStatistics, PriceTrend, RegionalMarket, TradeAdvice,
};
pub use trade::{
    active_trade_routes, apply_trade_income, calculate_trade_income, establish_trade_route,
    resume_trade_route, sever_trade_route, suspend_trade_route, trade_income_at,
};

/// Rounds a price to two decimal places.
pub(crate) fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
