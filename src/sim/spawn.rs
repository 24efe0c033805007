//! Spawn policy for hostiles and pickups
//!
//! Both policies are gated on the simulation clock. A closed gate leaves the
//! state untouched, timers included.

use glam::Vec2;
use rand::Rng;

use super::entities::{Hostile, Pickup, PickupKind};
use super::state::GameState;
use crate::platform::SpriteKind;

/// Hostiles present when a session starts, regardless of the spawn timer
pub fn initial_batch(state: &mut GameState) {
    for _ in 0..state.tuning.hostile.initial_batch {
        push_hostile(state);
    }
}

/// Spawn one hostile if the spawn interval has passed. Returns true on spawn.
pub fn spawn_hostiles(state: &mut GameState) -> bool {
    let now = state.clock_ms;
    if now - state.last_enemy_spawn_ms <= state.difficulty.spawn_interval_ms {
        return false;
    }
    if state.hostiles.len() >= state.tuning.hostile.max_alive {
        return false;
    }

    push_hostile(state);
    state.last_enemy_spawn_ms = now;
    true
}

/// Roll for a pickup once the pickup interval has passed. A failed roll
/// keeps the gate open so the next step rolls again.
pub fn spawn_pickups(state: &mut GameState) -> Option<PickupKind> {
    let now = state.clock_ms;
    let tuning = &state.tuning.pickup;
    if now - state.last_pickup_spawn_ms < tuning.spawn_interval_ms {
        return None;
    }
    if !state.rng.random_bool(tuning.spawn_chance) {
        return None;
    }

    let size = tuning.size;
    let kind = PickupKind::ALL[state.rng.random_range(0..PickupKind::ALL.len())];
    let x = state.rng.random_range(0.0..state.tuning.playfield.width - size.x);
    let pickup = Pickup::new(
        Vec2::new(x, -size.y),
        kind,
        &state.tuning.pickup,
        state.visual(SpriteKind::Pickup(kind)),
    );
    log::debug!(target: "powerups", "create {} at ({x:.0}, {:.0})", kind.as_str(), -size.y);

    state.pickups.push(pickup);
    state.last_pickup_spawn_ms = now;
    Some(kind)
}

fn push_hostile(state: &mut GameState) {
    let visual = state.visual(SpriteKind::Hostile);
    let hostile = Hostile::spawn(
        &mut state.rng,
        state.tuning.hostile.size,
        state.tuning.playfield,
        state.difficulty.speed_range(),
        visual,
    );
    state.hostiles.push(hostile);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::AssetCatalog;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        GameState::new(Tuning::default(), AssetCatalog::default(), 1234)
    }

    #[test]
    fn test_hostile_gate_closed_is_noop() {
        let mut s = state();
        s.clock_ms = 2000.0;
        let before = s.hostiles.len();
        assert!(!spawn_hostiles(&mut s));
        assert_eq!(s.hostiles.len(), before);
        assert_eq!(s.last_enemy_spawn_ms, 0.0);
    }

    #[test]
    fn test_hostile_spawns_after_interval() {
        let mut s = state();
        s.clock_ms = 2000.5;
        assert!(spawn_hostiles(&mut s));
        assert_eq!(s.hostiles.len(), 4);
        assert_eq!(s.last_enemy_spawn_ms, 2000.5);

        let spawned = s.hostiles.last().unwrap();
        assert_eq!(spawned.body.pos.y, -50.0);
        assert!(spawned.body.pos.x >= 0.0 && spawned.body.pos.x < 750.0);
        assert!((1.0..=2.0).contains(&spawned.speed));

        // Timer restarted
        assert!(!spawn_hostiles(&mut s));
    }

    #[test]
    fn test_hostile_cap() {
        let mut s = state();
        s.tuning.hostile.max_alive = 3;
        s.clock_ms = 10_000.0;
        assert!(!spawn_hostiles(&mut s));
        assert_eq!(s.last_enemy_spawn_ms, 0.0);
    }

    #[test]
    fn test_pickup_gate_closed_is_noop() {
        let mut s = state();
        s.tuning.pickup.spawn_chance = 1.0;
        s.clock_ms = 14_999.0;
        let rng_before = s.rng.clone();
        assert_eq!(spawn_pickups(&mut s), None);
        assert!(s.pickups.is_empty());
        assert_eq!(s.last_pickup_spawn_ms, 0.0);
        assert_eq!(s.rng, rng_before, "closed gate must not consume randomness");
    }

    #[test]
    fn test_pickup_failed_roll_keeps_gate_open() {
        let mut s = state();
        s.tuning.pickup.spawn_chance = 0.0;
        s.clock_ms = 20_000.0;
        assert_eq!(spawn_pickups(&mut s), None);
        assert_eq!(s.last_pickup_spawn_ms, 0.0);

        s.tuning.pickup.spawn_chance = 1.0;
        let kind = spawn_pickups(&mut s).expect("certain roll spawns");
        assert_eq!(s.pickups.len(), 1);
        assert_eq!(s.pickups[0].kind, kind);
        assert_eq!(s.pickups[0].body.pos.y, -30.0);
        assert_eq!(s.last_pickup_spawn_ms, 20_000.0);
    }

    #[test]
    fn test_pickup_kinds_are_all_reachable() {
        let mut s = state();
        s.tuning.pickup.spawn_chance = 1.0;
        let mut seen = std::collections::HashSet::new();
        for i in 1..=200 {
            s.clock_ms = i as f64 * 15_000.0;
            if let Some(kind) = spawn_pickups(&mut s) {
                seen.insert(kind);
            }
        }
        assert_eq!(seen.len(), PickupKind::ALL.len());
    }
}
