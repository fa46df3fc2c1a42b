//! NPC Personality & Social Network

pub mod names;
pub mod network;
pub mod personality;

pub use names::{
    culture_template, generate_faction_npcs, generate_name, generate_profile, generate_traits,
    CultureTemplate, NpcProfile,
};
pub use network::{
    BondKind, ClusterKind, CrossFactionLink, NetworkEvent, NetworkEventKind, NpcBond, NpcCluster,
    SocialNetwork,
};
pub use personality::{
    betrayal_probability, generate_personality, has_disloyal_secret, is_likely_to_betray,
    update_loyalty,
};
