//! Trade Routes
//!
//! Routes move between `Active` and `Suspended` freely; `Severed` is terminal.

use faction_records::resources::keys;
use faction_records::{generate_record_id, Faction, TradeRoute, TradeRouteStatus};

use super::round_price;
use crate::SimError;

pub mod trade_constants {
    /// Share of active route value earned as gold per cycle.
    pub const TRADE_INCOME_SHARE: f64 = 0.10;
}

/// Opens an active route with `partner`. Returns the route id.
pub fn establish_trade_route(
    faction: &mut Faction,
    partner: impl Into<String>,
    goods: Vec<String>,
    value: f64,
) -> String {
    let id = generate_record_id("route");
    let partner = partner.into();
    tracing::info!(faction = %faction.name, partner = %partner, value, "Trade route established");
    faction.trade_routes.push(TradeRoute {
        id: id.clone(),
        partner,
        goods,
        value: value.max(0.0),
        status: TradeRouteStatus::Active,
    });
    id
}

fn route_mut<'a>(faction: &'a mut Faction, route_id: &str) -> Result<&'a mut TradeRoute, SimError> {
    faction
        .trade_routes
        .iter_mut()
        .find(|r| r.id == route_id)
        .ok_or_else(|| SimError::not_found("Trade route", route_id))
}

fn transition(
    faction: &mut Faction,
    route_id: &str,
    from: &[TradeRouteStatus],
    to: TradeRouteStatus,
    operation: &'static str,
) -> Result<(), SimError> {
    let route = route_mut(faction, route_id)?;
    if !from.contains(&route.status) {
        return Err(SimError::InvalidState {
            entity: format!("trade route {}", route_id),
            status: format!("{:?}", route.status).to_lowercase(),
            operation,
        });
    }
    route.status = to;
    Ok(())
}

pub fn suspend_trade_route(faction: &mut Faction, route_id: &str) -> Result<(), SimError> {
    transition(faction, route_id, &[TradeRouteStatus::Active], TradeRouteStatus::Suspended, "suspend")
}

pub fn resume_trade_route(faction: &mut Faction, route_id: &str) -> Result<(), SimError> {
    transition(faction, route_id, &[TradeRouteStatus::Suspended], TradeRouteStatus::Active, "resume")
}

pub fn sever_trade_route(faction: &mut Faction, route_id: &str) -> Result<(), SimError> {
    transition(
        faction,
        route_id,
        &[TradeRouteStatus::Active, TradeRouteStatus::Suspended],
        TradeRouteStatus::Severed,
        "sever",
    )?;
    tracing::info!(faction = %faction.name, route_id, "Trade route severed");
    Ok(())
}

pub fn active_trade_routes(faction: &Faction) -> Vec<&TradeRoute> {
    faction
        .trade_routes
        .iter()
        .filter(|r| r.status == TradeRouteStatus::Active)
        .collect()
}

/// Gold earned per cycle: 10% of the summed value of active routes.
pub fn calculate_trade_income(faction: &Faction) -> f64 {
    trade_income_at(faction, trade_constants::TRADE_INCOME_SHARE)
}

/// Gold earned per cycle at an arbitrary share of active route value.
pub fn trade_income_at(faction: &Faction, share: f64) -> f64 {
    let total: f64 = active_trade_routes(faction).iter().map(|r| r.value).sum();
    round_price(total * share)
}

/// Credits one cycle of trade income. Returns the amount credited.
pub fn apply_trade_income(faction: &mut Faction) -> f64 {
    let income = calculate_trade_income(faction);
    if income > 0.0 {
        faction.resources_mut().add(keys::GOLD, income);
    }
    income
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_counts_only_active_routes() {
        let mut faction = Faction::new("Thornwood");
        establish_trade_route(&mut faction, "Ironmere", vec!["grain".into()], 500.0);
        let suspended = establish_trade_route(&mut faction, "Ashen Court", vec![], 300.0);
        establish_trade_route(&mut faction, "Saltmarsh", vec![], 200.0);
        suspend_trade_route(&mut faction, &suspended).unwrap();

        assert_eq!(calculate_trade_income(&faction), 70.0);
        assert_eq!(apply_trade_income(&mut faction), 70.0);
        assert_eq!(faction.resource("gold"), 70.0);
    }

    #[test]
    fn test_suspend_and_resume() {
        let mut faction = Faction::new("Thornwood");
        let id = establish_trade_route(&mut faction, "Ironmere", vec![], 100.0);

        suspend_trade_route(&mut faction, &id).unwrap();
        assert!(active_trade_routes(&faction).is_empty());
        assert!(suspend_trade_route(&mut faction, &id).is_err());

        resume_trade_route(&mut faction, &id).unwrap();
        assert_eq!(active_trade_routes(&faction).len(), 1);
    }

    #[test]
    fn test_severed_is_terminal() {
        let mut faction = Faction::new("Thornwood");
        let id = establish_trade_route(&mut faction, "Ironmere", vec![], 100.0);
        sever_trade_route(&mut faction, &id).unwrap();

        let err = resume_trade_route(&mut faction, &id).unwrap_err();
        assert!(matches!(err, SimError::InvalidState { .. }));
        assert!(sever_trade_route(&mut faction, &id).is_err());
        assert_eq!(faction.trade_routes[0].status, TradeRouteStatus::Severed);
    }

    #[test]
    fn test_missing_route() {
        let mut faction = Faction::new("Thornwood");
        let err = suspend_trade_route(&mut faction, "route_missing").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
