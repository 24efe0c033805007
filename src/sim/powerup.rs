//! Timed power-up effects on the player
//!
//! One slot per player. Effects are looked up in a static table of
//! apply/revert pairs and expire through a countdown advanced by the step,
//! so expiry follows the simulation clock rather than wall time.

use serde::{Deserialize, Serialize};

use super::entities::{PickupKind, Player};

/// The effect currently occupying the player's slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PickupKind,
    /// Time left before the effect reverts (ms)
    pub remaining_ms: f32,
}

/// Apply/revert pair for one pickup kind
pub struct Effect {
    pub apply: fn(&mut Player),
    pub revert: fn(&mut Player),
}

const RAPID_FIRE_COOLDOWN: f32 = 0.5;

fn shield_on(p: &mut Player) {
    p.invulnerable = true;
}

fn shield_off(p: &mut Player) {
    p.invulnerable = false;
}

fn rapid_fire_on(p: &mut Player) {
    p.cooldown_reduction = RAPID_FIRE_COOLDOWN;
}

fn rapid_fire_off(p: &mut Player) {
    p.cooldown_reduction = 1.0;
}

fn multi_shot_on(p: &mut Player) {
    p.multi_shot = true;
}

fn multi_shot_off(p: &mut Player) {
    p.multi_shot = false;
}

static SHIELD: Effect = Effect {
    apply: shield_on,
    revert: shield_off,
};

static RAPID_FIRE: Effect = Effect {
    apply: rapid_fire_on,
    revert: rapid_fire_off,
};

static MULTI_SHOT: Effect = Effect {
    apply: multi_shot_on,
    revert: multi_shot_off,
};

/// Effect table entry for a kind
pub fn effect(kind: PickupKind) -> &'static Effect {
    match kind {
        PickupKind::Shield => &SHIELD,
        PickupKind::RapidFire => &RAPID_FIRE,
        PickupKind::MultiShot => &MULTI_SHOT,
    }
}

/// Put `kind` into the slot, reverting whatever was there first
pub fn activate(player: &mut Player, kind: PickupKind, duration_ms: f32) {
    if let Some(previous) = player.power_up.take() {
        (effect(previous.kind).revert)(player);
        log::debug!(target: "powerups", "replace {}", previous.kind.as_str());
    }

    (effect(kind).apply)(player);
    player.power_up = Some(ActivePowerUp {
        kind,
        remaining_ms: duration_ms,
    });

    log::debug!(
        target: "powerups",
        "activate {} at ({:.0}, {:.0}) for {}ms",
        kind.as_str(),
        player.body.pos.x,
        player.body.pos.y,
        duration_ms
    );
}

/// Advance the countdown. Returns the kind that expired this tick, if any.
pub fn tick(player: &mut Player, dt_ms: f32) -> Option<PickupKind> {
    let active = player.power_up.as_mut()?;
    active.remaining_ms -= dt_ms;
    if active.remaining_ms > 0.0 {
        return None;
    }

    let kind = active.kind;
    player.power_up = None;
    (effect(kind).revert)(player);
    log::debug!(target: "powerups", "deactivate {}", kind.as_str());
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{PlayerTuning, Playfield};

    fn player() -> Player {
        Player::new(&PlayerTuning::default(), Playfield::default(), None)
    }

    #[test]
    fn test_rapid_fire_expires_on_countdown() {
        let mut p = player();
        activate(&mut p, PickupKind::RapidFire, 5000.0);
        assert_eq!(p.cooldown_reduction, 0.5);
        assert_eq!(p.power_up.map(|a| a.kind), Some(PickupKind::RapidFire));

        assert_eq!(tick(&mut p, 4999.0), None);
        assert_eq!(p.cooldown_reduction, 0.5);

        assert_eq!(tick(&mut p, 1.0), Some(PickupKind::RapidFire));
        assert_eq!(p.cooldown_reduction, 1.0);
        assert!(p.power_up.is_none());

        // Nothing left to expire
        assert_eq!(tick(&mut p, 1000.0), None);
    }

    #[test]
    fn test_each_kind_applies_and_reverts() {
        for kind in PickupKind::ALL {
            let mut p = player();
            activate(&mut p, kind, 100.0);
            match kind {
                PickupKind::Shield => assert!(p.invulnerable),
                PickupKind::RapidFire => assert_eq!(p.cooldown_reduction, 0.5),
                PickupKind::MultiShot => assert!(p.multi_shot),
            }
            tick(&mut p, 100.0);
            assert!(!p.invulnerable);
            assert!(!p.multi_shot);
            assert_eq!(p.cooldown_reduction, 1.0);
        }
    }

    #[test]
    fn test_new_pickup_replaces_slot() {
        let mut p = player();
        activate(&mut p, PickupKind::Shield, 5000.0);
        tick(&mut p, 3000.0);

        activate(&mut p, PickupKind::MultiShot, 5000.0);
        assert!(!p.invulnerable, "replaced effect is reverted");
        assert!(p.multi_shot);

        // Full duration restarts from the new activation
        assert_eq!(tick(&mut p, 4000.0), None);
        assert!(p.multi_shot);
        assert_eq!(tick(&mut p, 1000.0), Some(PickupKind::MultiShot));
        assert!(!p.multi_shot);
    }

    #[test]
    fn test_same_kind_refreshes_duration() {
        let mut p = player();
        activate(&mut p, PickupKind::Shield, 5000.0);
        tick(&mut p, 4000.0);
        activate(&mut p, PickupKind::Shield, 5000.0);
        assert_eq!(tick(&mut p, 4000.0), None);
        assert!(p.invulnerable);
    }
}
