//! NPC Personality
//!
//! Quirks, loyalties and secrets for named members, plus the trust and
//! ambition scores that drive betrayal.

use faction_records::{Faction, NpcPersonality};
use rand::seq::SliceRandom;
use rand::Rng;

use super::names::pick;

/// Personality tuning
pub mod personality_constants {
    pub const QUIRK_COUNT: usize = 3;
    pub const LOYALTY_COUNT: usize = 2;
    pub const TRUST_JITTER: i32 = 15;
    pub const AMBITION_JITTER: i32 = 20;
    /// Below this trust a member without secrets acquires a dangerous one
    pub const DISLOYALTY_TRUST: u8 = 30;
    pub const MAX_BETRAYAL_PROBABILITY: f64 = 0.95;
    pub const DISLOYAL_SECRET_BONUS: f64 = 0.2;
}

use personality_constants::*;

const QUIRKS: &[&str] = &[
    "Always quotes poetry",
    "Speaks in third person",
    "Has a nervous stutter",
    "Uses elaborate metaphors",
    "Punctuates sentences with proverbs",
    "Whispers dramatically",
    "Constantly polishes weapons",
    "Fidgets with jewelry",
    "Collects strange trinkets",
    "Writes everything in a journal",
    "Hums old battle hymns",
    "Counts things obsessively",
    "Superstitious about omens",
    "Trusts only written contracts",
    "Convinced they are cursed",
    "Afraid of heights",
    "Paranoid about poison",
    "Scared of the dark",
    "Tells bad jokes constantly",
    "Brags about past victories",
    "Questions every order",
    "Always late to meetings",
];

const IDEALS: &[&str] = &[
    "Loyal to honor above all",
    "Dedicated to justice",
    "Serves only the greater good",
    "Believes in freedom for all",
    "Faithful to ancient traditions",
    "Committed to knowledge",
];

const CONDITIONAL_LOYALTIES: &[&str] = &[
    "Loyal only while paid well",
    "Serves out of fear",
    "Stays for personal gain",
    "Loyalty fades without victories",
];

const PERSONAL_SECRETS: &[&str] = &[
    "Has a hidden family",
    "Suffers from an addiction",
    "Hiding noble heritage",
    "Failed an important mission",
    "Secretly doubts the cause",
];

const DARK_SECRETS: &[&str] = &[
    "Murdered an innocent person",
    "Betrayed a previous faction",
    "Secretly worships a dark god",
    "Has killed a fellow member",
];

/// Secrets that mark a member as a danger to the faction.
pub const DANGEROUS_SECRETS: &[&str] = &[
    "Planning to overthrow leadership",
    "Spying for an enemy faction",
    "Plans to seize power someday",
    "Stole from the faction treasury",
    "Collecting leverage on rivals",
];

const DISLOYAL_MARKERS: &[&str] = &["overthrow", "spying", "seize power"];

/// Baseline trust before jitter.
pub fn base_trust(role: &str) -> i32 {
    match role {
        "Leader" => 80,
        "Guard" | "Warrior" => 70,
        "Scout" => 60,
        _ => 50,
    }
}

/// Baseline ambition before jitter.
pub fn base_ambition(role: &str) -> i32 {
    match role {
        "Leader" => 70,
        "Warrior" | "Scout" => 60,
        "Worker" => 30,
        _ => 50,
    }
}

fn jitter<R: Rng + ?Sized>(base: i32, spread: i32, rng: &mut R) -> u8 {
    (base + rng.gen_range(-spread..=spread)).clamp(0, 100) as u8
}

/// Builds a personality for a member of `faction` in `role`. `companions`
/// are other named members an individual loyalty may attach to.
pub fn generate_personality<R: Rng + ?Sized>(
    faction: &Faction,
    role: &str,
    companions: &[&str],
    rng: &mut R,
) -> NpcPersonality {
    let quirks = QUIRKS
        .choose_multiple(rng, QUIRK_COUNT)
        .map(|q| q.to_string())
        .collect();

    let mut loyalties = vec![match rng.gen_range(0..3) {
        0 => format!("Unwavering loyalty to {}", faction.name),
        1 => format!("Would die for the cause of {}", faction.name),
        _ => format!("Devoted to the ideals of {}", faction.name),
    }];
    while loyalties.len() < LOYALTY_COUNT {
        let second = match rng.gen_range(0..3) {
            0 if !companions.is_empty() => format!("Owes a life debt to {}", pick(rng, companions)),
            0 | 1 => pick(rng, IDEALS).to_string(),
            _ => pick(rng, CONDITIONAL_LOYALTIES).to_string(),
        };
        loyalties.push(second);
    }

    let secret_chance = if role == "Leader" { 0.6 } else { 0.4 };
    let mut secrets = Vec::new();
    if rng.gen_bool(secret_chance) {
        let pool = match rng.gen_range(0..3) {
            0 => PERSONAL_SECRETS,
            1 => DARK_SECRETS,
            _ => DANGEROUS_SECRETS,
        };
        secrets.push(pick(rng, pool).to_string());
    }

    NpcPersonality {
        quirks,
        loyalties,
        secrets,
        trust: jitter(base_trust(role), TRUST_JITTER, rng),
        ambition: jitter(base_ambition(role), AMBITION_JITTER, rng),
    }
}

/// Shifts trust by `change`, noting the reason. A member whose trust falls
/// below 30 with nothing to hide acquires a dangerous secret.
pub fn update_loyalty<R: Rng + ?Sized>(
    personality: &mut NpcPersonality,
    change: i32,
    reason: Option<&str>,
    rng: &mut R,
) {
    personality.trust = (i32::from(personality.trust) + change).clamp(0, 100) as u8;

    if personality.trust < DISLOYALTY_TRUST && personality.secrets.is_empty() {
        personality.secrets.push(pick(rng, DANGEROUS_SECRETS).to_string());
    }

    if let Some(reason) = reason {
        if change > 0 {
            personality.loyalties.push(format!("Grateful for: {}", reason));
        } else if change < 0 {
            personality.loyalties.push(format!("Resentful about: {}", reason));
        }
    }
}

pub fn has_disloyal_secret(personality: &NpcPersonality) -> bool {
    personality.secrets.iter().any(|secret| {
        let secret = secret.to_lowercase();
        DISLOYAL_MARKERS.iter().any(|m| secret.contains(m))
    })
}

/// Probability of betrayal. Grows with distrust (quadratically), scales
/// with ambition and rises further with a disloyal secret.
pub fn betrayal_probability(personality: &NpcPersonality) -> f64 {
    let distrust = (100.0 - f64::from(personality.trust)) / 100.0;
    let drive = 0.3 + 0.7 * f64::from(personality.ambition) / 100.0;
    let secret = if has_disloyal_secret(personality) {
        DISLOYAL_SECRET_BONUS
    } else {
        0.0
    };
    (distrust * distrust * drive + secret).min(MAX_BETRAYAL_PROBABILITY)
}

pub fn is_likely_to_betray<R: Rng + ?Sized>(personality: &NpcPersonality, rng: &mut R) -> bool {
    rng.gen_bool(betrayal_probability(personality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn personality(trust: u8, ambition: u8) -> NpcPersonality {
        NpcPersonality {
            trust,
            ambition,
            ..Default::default()
        }
    }

    fn betrayal_rate(p: &NpcPersonality, seed: u64) -> f64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let hits = (0..2000).filter(|_| is_likely_to_betray(p, &mut rng)).count();
        hits as f64 / 2000.0
    }

    #[test]
    fn test_generated_shape() {
        let faction = Faction::new("Thornwood");
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let p = generate_personality(&faction, "Guard", &["Mira"], &mut rng);
            assert_eq!(p.quirks.len(), 3);
            assert_eq!(p.loyalties.len(), 2);
            assert!(p.loyalties[0].contains("Thornwood"));
            assert!(p.secrets.len() <= 1);
            assert!((55..=85).contains(&p.trust));
            assert!((30..=70).contains(&p.ambition));
        }
    }

    #[test]
    fn test_role_baselines() {
        assert_eq!(base_trust("Leader"), 80);
        assert_eq!(base_trust("Warrior"), 70);
        assert_eq!(base_trust("Scout"), 60);
        assert_eq!(base_trust("Cook"), 50);
        assert_eq!(base_ambition("Scout"), 60);
        assert_eq!(base_ambition("Worker"), 30);
    }

    #[test]
    fn test_loyalty_notes() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut p = personality(60, 50);
        p.secrets.push("Hiding noble heritage".into());

        update_loyalty(&mut p, 10, Some("a fair share of the spoils"), &mut rng);
        update_loyalty(&mut p, -5, Some("a missed payday"), &mut rng);

        assert_eq!(p.trust, 65);
        assert_eq!(p.loyalties[0], "Grateful for: a fair share of the spoils");
        assert_eq!(p.loyalties[1], "Resentful about: a missed payday");
    }

    #[test]
    fn test_trust_clamps() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut p = personality(95, 50);
        update_loyalty(&mut p, 40, None, &mut rng);
        assert_eq!(p.trust, 100);
        update_loyalty(&mut p, -250, None, &mut rng);
        assert_eq!(p.trust, 0);
    }

    #[test]
    fn test_low_trust_breeds_dangerous_secret() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut p = personality(35, 50);
        update_loyalty(&mut p, -10, Some("passed over for command"), &mut rng);

        assert_eq!(p.secrets.len(), 1);
        assert!(DANGEROUS_SECRETS.contains(&p.secrets[0].as_str()));

        update_loyalty(&mut p, -10, None, &mut rng);
        assert_eq!(p.secrets.len(), 1);
    }

    #[test]
    fn test_disloyal_secret_detection() {
        let mut p = personality(50, 50);
        assert!(!has_disloyal_secret(&p));
        p.secrets.push("Is spying for the Ashen Court".into());
        assert!(has_disloyal_secret(&p));
    }

    #[test]
    fn test_probability_is_monotonic() {
        let loyal = betrayal_probability(&personality(90, 50));
        let wavering = betrayal_probability(&personality(50, 50));
        let bitter = betrayal_probability(&personality(10, 50));
        assert!(loyal < wavering && wavering < bitter);

        let content = betrayal_probability(&personality(40, 10));
        let hungry = betrayal_probability(&personality(40, 90));
        assert!(content < hungry);

        let mut plotting = personality(40, 90);
        plotting.secrets.push("Plans to seize power someday".into());
        assert!(betrayal_probability(&plotting) > hungry);
        assert!(betrayal_probability(&personality(0, 100)) <= MAX_BETRAYAL_PROBABILITY);
    }

    #[test]
    fn test_loyal_members_almost_never_betray() {
        let rate = betrayal_rate(&personality(90, 10), 17);
        assert!(rate < 0.02, "rate {rate}");
    }

    #[test]
    fn test_bitter_ambitious_members_often_betray() {
        let rate = betrayal_rate(&personality(20, 80), 23);
        assert!(rate > 0.3, "rate {rate}");
    }
}
