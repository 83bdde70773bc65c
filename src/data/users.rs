//! Synthetic user profiles and profile search

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ADJECTIVES: &[&str] = &[
    "Ancient", "Apex", "Arcane", "Atomic", "Binary", "Blazing", "Blue", "Brave",
    "Bright", "Burning", "Chaotic", "Clever", "Cosmic", "Cracked", "Crimson",
    "Cyber", "Darkened", "Deathless", "Desert", "Dire", "Dusty", "Electric",
    "Emerald", "Encrypted", "Eternal", "Faint", "Fatal", "Feral", "Frozen",
    "Fractured", "Fuzzy", "Galactic", "Gentle", "Glacial", "Golden", "Grim",
    "Hardcore", "Hollow", "Infernal", "Iron", "Legendary", "Lucky", "Majestic",
    "Metallic", "Mystic", "Mythic", "Neon", "Nimble", "Nocturnal", "Nuclear",
    "Obliterated", "Obsidian", "Oceanic", "Omega", "Overclocked", "Phantom",
    "Pixelated", "Prime", "Quantum", "Radiant", "Radiated", "Rapid", "Rogue",
    "Royal", "Ruthless", "Savage", "Scarlet", "Shadow", "Shadowed", "Shiny",
    "Silent", "Silver", "Sinister", "Solar", "Spectral", "Stealth", "Stealthy",
    "Stormforged", "Stormy", "Swift", "Thunderous", "Toxic", "Turbocharged",
    "Ultra", "Undead", "Vibrant", "Viral", "Vortex", "Wild",
];

const NOUNS: &[&str] = &[
    "Runner", "Jumper", "Walker", "Coder", "Rider", "Charger", "Hunter", "Thinker",
    "Builder", "Wanderer", "Pilot", "Striker", "Wizard", "Guardian", "Dancer",
    "Breaker", "Seeker", "Reader", "Fighter", "Crafter", "Smasher", "Painter", "Gamer",
    "Singer", "Climber", "Ranger", "Tinkerer", "Shaper", "Warrior", "Ravager",
    "Scholar", "Explorer", "Miner", "Diver", "Sailor", "Hacker", "Lurker", "Keeper",
    "Maker", "Founder", "Invoker", "Caster", "Ripper", "Drifter", "Nomad", "Harvester",
    "Sprinter", "Glider", "Brawler", "Crusher", "Slicer", "Sharpshooter", "Defender",
    "Artist", "Prowler", "Sculptor", "Prodigy", "Champion", "Overseer", "Scout",
    "Stormbringer", "Tamer", "Reaper", "Reaver", "Voyager", "Navigator", "Fletcher",
    "Tensor", "Bruiser", "Laser", "Tracker", "Handler", "Pioneer", "Spinner", "Forger",
    "Wielder", "Operator", "Chaser", "Stalker", "Warden", "Lancer", "Monitor",
    "Scrapper", "Sniper", "Recycler", "Commander", "Architect", "Sentry", "Observer",
    "Herald",
];

/// One row of the user table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub bio: String,

    /// Opaque credential string, passed through untouched
    pub password_hash: String,
}

/// Zero-padded id of the `n`-th user, counting from 1
pub fn user_id(n: usize) -> String {
    format!("{:04}", n)
}

fn username<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Silent");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Observer");
    let number = rng.gen_range(1000..=9999);
    format!("{}{}{}", adjective, noun, number)
}

/// Create `count` users with ids `0001`, `0002`, ...
///
/// Every user carries the same `password_hash`.
pub fn generate_users(count: usize, seed: u64, password_hash: &str) -> Vec<UserProfile> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut users = Vec::with_capacity(count);

    for n in 1..=count {
        let id = user_id(n);
        let username = username(&mut rng);

        users.push(UserProfile {
            email: format!("{}@example.com", username.to_lowercase()),
            name: format!("User {}", id),
            bio: format!("This is user {}", id),
            password_hash: password_hash.to_string(),
            user_id: id,
            username,
        });

        if n % 100 == 0 {
            log::debug!("Created {} users so far", n);
        }
    }

    log::info!("Generated {} users", users.len());
    users
}

/// Users whose username or display name contains `query`, ignoring case.
///
/// Returns at most `limit` hits, in table order.
pub fn search_users<'u>(users: &'u [UserProfile], query: &str, limit: usize) -> Vec<&'u UserProfile> {
    let needle = query.to_lowercase();

    users
        .iter()
        .filter(|u| {
            u.username.to_lowercase().contains(&needle) || u.name.to_lowercase().contains(&needle)
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_are_reproducible_and_padded() {
        let a = generate_users(150, 42, "x");
        let b = generate_users(150, 42, "x");
        assert_eq!(a, b);

        assert_eq!(a[0].user_id, "0001");
        assert_eq!(a[149].user_id, "0150");
        assert_eq!(a[9].name, "User 0010");
        assert_eq!(a[9].bio, "This is user 0010");
        assert_eq!(a[0].email, format!("{}@example.com", a[0].username.to_lowercase()));
        assert!(a.iter().all(|u| u.password_hash == "x"));
    }

    #[test]
    fn usernames_combine_words_and_number() {
        let users = generate_users(20, 7, "");
        for user in &users {
            let digits: String = user.username.chars().rev().take(4).collect();
            assert!(digits.chars().all(|c| c.is_ascii_digit()), "{}", user.username);
            assert!(ADJECTIVES.iter().any(|a| user.username.starts_with(a)));
        }
    }

    #[test]
    fn search_matches_username_or_name_case_insensitively() {
        let users = generate_users(30, 1, "");
        let target = users[12].username.to_uppercase();

        let hits = search_users(&users, &target, 50);
        assert!(hits.iter().any(|u| u.user_id == "0013"));

        let by_name = search_users(&users, "user 002", 50);
        let ids: Vec<_> = by_name.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "0020");

        assert_eq!(search_users(&users, "user", 5).len(), 5);
    }
}
