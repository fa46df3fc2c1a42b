//! NPC Names and Profiles
//!
//! Names are composed from culture syllable tables: prefix, optional middle
//! syllable and suffix, with an optional title and role epithet.

use faction_records::Faction;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Syllable and title tables for one culture.
#[derive(Debug, Clone, Copy)]
pub struct CultureTemplate {
    pub culture: &'static str,
    pub prefixes: &'static [&'static str],
    pub middles: &'static [&'static str],
    pub suffixes: &'static [&'static str],
    pub titles: &'static [&'static str],
}

pub const CULTURES: &[CultureTemplate] = &[
    CultureTemplate {
        culture: "elven",
        prefixes: &["Ara", "Eld", "Gal", "Hal", "Ival", "Lass", "Nim", "Sil", "Thal", "Vara"],
        middles: &["adri", "bri", "dor", "lan", "mir", "nor", "ril", "than", "vel"],
        suffixes: &["an", "ara", "dir", "drel", "eth", "las", "lis", "reth", "wen"],
        titles: &["Master", "Lady", "Lord", "Sage", "Guardian"],
    },
    CultureTemplate {
        culture: "human",
        prefixes: &["Al", "Bren", "Car", "Dar", "Ed", "Gar", "Hal", "Jon", "Mar", "Sar"],
        middles: &["and", "der", "dor", "eth", "gar", "len", "mar", "ric", "wyn"],
        suffixes: &["a", "an", "en", "er", "is", "on", "yn"],
        titles: &["Captain", "Ser", "Lady", "Lord", "Master"],
    },
    CultureTemplate {
        culture: "dwarven",
        prefixes: &["Bar", "Dor", "Dur", "Gor", "Kil", "Mor", "Thar", "Thor", "Ul", "Var"],
        middles: &["ak", "dek", "grim", "kal", "mek", "nak", "rak", "tor"],
        suffixes: &["dar", "gar", "grim", "kal", "rek", "rik", "thane", "var"],
        titles: &["Thane", "Clan Chief", "Master Smith", "Keeper"],
    },
    CultureTemplate {
        culture: "orcish",
        prefixes: &["Gra", "Gro", "Gru", "Kra", "Mog", "Nar", "Rak", "Sha", "Ugh", "Zog"],
        middles: &["bash", "gar", "gash", "gul", "kak", "nak", "ruk", "zak"],
        suffixes: &["ak", "bash", "gul", "kur", "mak", "nar", "ruk", "zog"],
        titles: &["Warchief", "Chieftain", "Raider", "Butcher"],
    },
    CultureTemplate {
        culture: "goblinoid",
        prefixes: &["Biz", "Gik", "Kra", "Nar", "Nix", "Rag", "Snik", "Vex", "Zik"],
        middles: &["fiz", "gak", "kek", "nak", "rak", "zik"],
        suffixes: &["ak", "ek", "ik", "nix", "uk", "zik"],
        titles: &["Boss", "Skulker", "Chief", "Sneak"],
    },
    CultureTemplate {
        culture: "undead",
        prefixes: &["Mor", "Nec", "Sha", "Ske", "Spec", "Wraith", "Zom"],
        middles: &["ban", "dar", "grim", "mort", "nox", "umbra"],
        suffixes: &["death", "doom", "grimm", "mortis", "shade", "wraith"],
        titles: &["Lord", "King", "Prince", "Baron", "Master"],
    },
    CultureTemplate {
        culture: "mixed",
        prefixes: &["Ash", "Bren", "Cor", "Dax", "Eth", "Fen", "Kael", "Mor", "Ryn", "Zara"],
        middles: &["al", "dar", "dor", "eth", "len", "mor", "ren", "var"],
        suffixes: &["a", "an", "el", "en", "is", "or", "yn"],
        titles: &["Master", "Captain", "Leader", "Chief"],
    },
];

const HUMAN: usize = 1;

/// Template for a culture name, case-insensitive. Unknown cultures use the
/// human tables.
pub fn culture_template(culture: &str) -> &'static CultureTemplate {
    CULTURES
        .iter()
        .find(|t| t.culture.eq_ignore_ascii_case(culture))
        .unwrap_or(&CULTURES[HUMAN])
}

fn role_epithets(role: &str) -> &'static [&'static str] {
    match role {
        "Leader" => &["the Wise", "the Mighty", "the Just", "the Fierce", "the Cunning"],
        "Scout" => &["the Swift", "the Silent", "the Keen", "the Tracker"],
        "Guard" => &["the Vigilant", "the Steadfast", "the Warden", "the Shield"],
        "Worker" => &["the Industrious", "the Skilled", "the Builder", "the Crafter"],
        "Mage" => &["the Arcane", "the Mystic", "the Learned", "the Enchanter"],
        "Priest" => &["the Devout", "the Blessed", "the Holy", "the Chosen"],
        "Warrior" => &["the Bold", "the Strong", "the Fearless", "the Veteran"],
        "Merchant" => &["the Wealthy", "the Shrewd", "the Prosperous", "the Trader"],
        _ => &[],
    }
}

/// Chance of a title for `role`.
pub fn title_chance(role: &str) -> f64 {
    if role == "Leader" {
        0.5
    } else {
        0.2
    }
}

pub(crate) fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Generates a name such as "Ser Bren Maron the Bold".
pub fn generate_name<R: Rng + ?Sized>(culture: &str, role: &str, rng: &mut R) -> String {
    let template = culture_template(culture);
    let mut name = String::from(pick(rng, template.prefixes));
    if rng.gen_bool(0.5) {
        name.push_str(pick(rng, template.middles));
    }
    name.push_str(pick(rng, template.suffixes));

    if rng.gen_bool(title_chance(role)) {
        name = format!("{} {}", pick(rng, template.titles), name);
    }

    let epithets = role_epithets(role);
    if !epithets.is_empty() && rng.gen_bool(0.3) {
        name = format!("{} {}", name, pick(rng, epithets));
    }
    name
}

const GENERAL_TRAITS: &[&str] = &[
    "Loyal",
    "Skeptical",
    "Friendly",
    "Reserved",
    "Brave",
    "Cowardly",
    "Honest",
    "Cunning",
    "Compassionate",
    "Callous",
];

/// Three traits: first from the faction's goals and culture, then padded
/// from the general pool without repeats.
pub fn generate_traits<R: Rng + ?Sized>(faction: &Faction, rng: &mut R) -> Vec<String> {
    let mut traits: Vec<&'static str> = Vec::new();

    for goal in &faction.goal_tags {
        let goal = goal.to_lowercase();
        let pool: &[&str] = if goal.contains("conquest") {
            &["Aggressive", "Ambitious", "Ruthless"]
        } else if goal.contains("defense") {
            &["Cautious", "Protective", "Vigilant"]
        } else if goal.contains("trade") {
            &["Shrewd", "Greedy", "Diplomatic"]
        } else if goal.contains("knowledge") {
            &["Curious", "Studious", "Wise"]
        } else {
            continue;
        };
        traits.push(pick(rng, pool));
    }

    for culture in &faction.culture_tags {
        let culture = culture.to_lowercase();
        let pool: &[&str] = if culture.contains("elven") {
            &["Graceful", "Patient", "Aloof"]
        } else if culture.contains("dwarven") {
            &["Stubborn", "Honorable", "Hardy"]
        } else if culture.contains("orcish") {
            &["Fierce", "Direct", "Prideful"]
        } else if culture.contains("human") {
            &["Adaptable", "Resourceful", "Determined"]
        } else {
            continue;
        };
        traits.push(pick(rng, pool));
    }

    traits.truncate(3);
    let mut pool: Vec<&'static str> = GENERAL_TRAITS
        .iter()
        .copied()
        .filter(|t| !traits.contains(t))
        .collect();
    pool.shuffle(rng);
    let missing = 3usize.saturating_sub(traits.len());
    traits.extend(pool.into_iter().take(missing));

    traits.into_iter().map(String::from).collect()
}

fn appearance<R: Rng + ?Sized>(species: &str, culture: &str, rng: &mut R) -> String {
    let species = species.to_lowercase();
    let pool: &[&str] = if species.contains("elf") || species.contains("elven") {
        &[
            "tall and slender with pointed ears",
            "graceful build with silver hair",
            "angular features and piercing eyes",
        ]
    } else if species.contains("dwar") {
        &[
            "stocky and muscular with a braided beard",
            "sturdy build with calloused hands",
            "broad-shouldered with weathered features",
        ]
    } else if species.contains("orc") {
        &[
            "powerfully built with green skin",
            "muscular frame with prominent tusks",
            "imposing stature with scarred features",
        ]
    } else if species.contains("goblin") {
        &[
            "small and wiry with sharp features",
            "nimble build with oversized ears",
            "quick movements and beady eyes",
        ]
    } else {
        &[
            "average build with weathered features",
            "lean and athletic",
            "sturdy frame with confident bearing",
        ]
    };

    let mut text = pick(rng, pool).to_string();
    let culture = culture.to_lowercase();
    if culture.contains("military") {
        text.push_str(", wearing well-maintained armor");
    } else if culture.contains("religious") {
        text.push_str(", adorned with religious symbols");
    } else if culture.contains("scholarly") {
        text.push_str(", carrying scrolls and books");
    }
    text
}

fn background<R: Rng + ?Sized>(faction: &Faction, role: &str, rng: &mut R) -> String {
    let name = &faction.name;
    match rng.gen_range(0..4) {
        0 => format!("A devoted member of {}, serving as {}.", name, role),
        1 => format!("Rose through the ranks of {} to become {}.", name, role),
        2 => format!("A trusted {} who has served {} for many years.", role, name),
        _ => format!("Recently appointed as {} within {}.", role, name),
    }
}

/// A generated character sheet for a named member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcProfile {
    pub name: String,
    pub role: String,
    pub culture: String,
    pub traits: Vec<String>,
    pub appearance: String,
    pub background: String,
}

pub fn generate_profile<R: Rng + ?Sized>(
    faction: &Faction,
    culture: &str,
    species: &str,
    role: &str,
    rng: &mut R,
) -> NpcProfile {
    NpcProfile {
        name: generate_name(culture, role, rng),
        role: role.to_string(),
        culture: culture.to_string(),
        traits: generate_traits(faction, rng),
        appearance: appearance(species, culture, rng),
        background: background(faction, role, rng),
    }
}

pub const DEFAULT_ROLES: &[&str] = &["Leader", "Scout", "Guard", "Worker", "Mage", "Warrior"];

/// Generates `count` profiles using the faction's first culture tag.
/// Without explicit roles the first profile is the leader and the rest are
/// drawn from [`DEFAULT_ROLES`]; explicit roles are cycled.
pub fn generate_faction_npcs<R: Rng + ?Sized>(
    faction: &Faction,
    count: usize,
    roles: Option<&[&str]>,
    rng: &mut R,
) -> Vec<NpcProfile> {
    let culture = faction
        .culture_tags
        .first()
        .map(String::as_str)
        .unwrap_or("human");

    (0..count)
        .map(|i| {
            let role = match roles {
                Some(roles) if !roles.is_empty() => roles[i % roles.len()],
                _ if i == 0 => "Leader",
                _ => pick(rng, &DEFAULT_ROLES[1..]),
            };
            generate_profile(faction, culture, culture, role, rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_unknown_culture_falls_back_to_human() {
        assert_eq!(culture_template("lizardfolk").culture, "human");
        assert_eq!(culture_template("Dwarven").culture, "dwarven");
    }

    #[test]
    fn test_name_uses_culture_syllables() {
        let mut rng = SmallRng::seed_from_u64(11);
        let template = culture_template("orcish");
        for _ in 0..50 {
            let name = generate_name("orcish", "Worker", &mut rng);
            assert!(
                template.prefixes.iter().any(|p| name.contains(p)),
                "unexpected name {name}"
            );
        }
    }

    #[test]
    fn test_leaders_titled_more_often() {
        let mut rng = SmallRng::seed_from_u64(3);
        let titled = |role: &str, rng: &mut SmallRng| {
            (0..1000)
                .filter(|_| {
                    let name = generate_name("dwarven", role, rng);
                    culture_template("dwarven").titles.iter().any(|t| name.starts_with(t))
                })
                .count()
        };
        let leaders = titled("Leader", &mut rng);
        let others = titled("Cook", &mut rng);
        assert!(leaders > 400 && leaders < 600, "leaders titled {leaders}");
        assert!(others > 120 && others < 280, "others titled {others}");
    }

    #[test]
    fn test_traits_prefer_faction_tags() {
        let faction = Faction::new("Deepforge")
            .with_goals(["conquest"])
            .with_culture(["dwarven"]);
        let mut rng = SmallRng::seed_from_u64(5);
        let traits = generate_traits(&faction, &mut rng);

        assert_eq!(traits.len(), 3);
        assert!(["Aggressive", "Ambitious", "Ruthless"].contains(&traits[0].as_str()));
        assert!(["Stubborn", "Honorable", "Hardy"].contains(&traits[1].as_str()));
        assert!(GENERAL_TRAITS.contains(&traits[2].as_str()));
    }

    #[test]
    fn test_traits_padded_without_repeats() {
        let mut rng = SmallRng::seed_from_u64(8);
        let traits = generate_traits(&Faction::new("Nobody"), &mut rng);
        assert_eq!(traits.len(), 3);
        assert_ne!(traits[0], traits[1]);
        assert_ne!(traits[1], traits[2]);
        assert_ne!(traits[0], traits[2]);
    }

    #[test]
    fn test_faction_npcs_start_with_leader() {
        let faction = Faction::new("Silverleaf").with_culture(["elven"]);
        let mut rng = SmallRng::seed_from_u64(21);
        let npcs = generate_faction_npcs(&faction, 5, None, &mut rng);

        assert_eq!(npcs.len(), 5);
        assert_eq!(npcs[0].role, "Leader");
        assert!(npcs.iter().all(|n| n.culture == "elven"));
        assert!(npcs[1..].iter().all(|n| n.role != "Leader"));
        assert!(npcs[0].background.contains("Silverleaf"));
    }

    #[test]
    fn test_explicit_roles_cycle() {
        let mut rng = SmallRng::seed_from_u64(2);
        let npcs = generate_faction_npcs(&Faction::new("F"), 3, Some(&["Mage", "Priest"]), &mut rng);
        let roles: Vec<&str> = npcs.iter().map(|n| n.role.as_str()).collect();
        assert_eq!(roles, vec!["Mage", "Priest", "Mage"]);
        assert_eq!(npcs[0].culture, "human");
    }

    #[test]
    fn test_generation_is_seed_deterministic() {
        let faction = Faction::new("F").with_culture(["undead"]);
        let a = generate_faction_npcs(&faction, 4, None, &mut SmallRng::seed_from_u64(99));
        let b = generate_faction_npcs(&faction, 4, None, &mut SmallRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
