//! Enemy manifest population
//!
//! Rolls the list of enemy archetypes each room hands to the spawner on first
//! entry. Start and Shop rooms stay peaceful.

use rand::Rng;

use crate::data::EncounterRules;
use crate::world::RoomGraphDirectory;

/// Fill every room's enemy manifest. Returns the total enemy count.
pub fn populate_encounters(directory: &mut RoomGraphDirectory, rules: &EncounterRules, rng: &mut impl Rng) -> usize {
    let coords = directory.coords().to_vec();
    let mut total = 0;

    for coord in coords {
        let Some(room) = directory.room_at_mut(coord) else {
            continue;
        };
        let room_type = room.room_type();
        if !room_type.has_hostile_manifest() {
            room.set_enemy_manifest(Vec::new());
            continue;
        }
        let Some(rule) = rules.for_room(room_type) else {
            room.set_enemy_manifest(Vec::new());
            continue;
        };
        if rule.pool.is_empty() {
            room.set_enemy_manifest(Vec::new());
            continue;
        }

        let (min, max) = rule.count;
        let count = rng.gen_range(min..=max.max(min));
        let manifest: Vec<String> = (0..count)
            .map(|_| rule.pool[rng.gen_range(0..rule.pool.len())].clone())
            .collect();

        total += manifest.len();
        room.set_enemy_manifest(manifest);
    }

    log::debug!("Populated {} enemies across {} rooms", total, directory.len());
    total
}
