//! Simulation step
//!
//! Core game loop that advances the state by one frame. Stage order is
//! fixed: input, fire, projectiles, hostiles and pickups, collisions,
//! explosions, spawning, difficulty, timers.

use super::collision::collide;
use super::entities::{Explosion, Projectile};
use super::powerup;
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::error::StepError;
use crate::platform::{InputSnapshot, SpriteKind};

/// Advance the game state by `dt_ms` of simulation time
pub fn tick(state: &mut GameState, input: &InputSnapshot, dt_ms: f32) -> Result<(), StepError> {
    if !dt_ms.is_finite() || dt_ms < 0.0 {
        return Err(StepError::InvalidDelta(dt_ms));
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused(true));
                return Ok(());
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Paused(false));
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    state.clock_ms += dt_ms as f64;

    let field = state.tuning.playfield;
    state.player.steer(input, dt_ms, field);

    if input.shoot {
        try_fire(state);
    }

    for shot in &mut state.projectiles {
        shot.advance(dt_ms);
        if shot.is_outside(field) {
            shot.active = false;
        }
    }
    state.projectiles.retain(|p| p.active);

    advance_hostiles(state, dt_ms);
    if state.is_over() {
        return Ok(());
    }

    for pickup in &mut state.pickups {
        pickup.advance(dt_ms);
    }
    state.pickups.retain(|p| !p.has_fallen_out(field));

    let kills = resolve_shots(state);
    resolve_rams(state);
    if state.is_over() {
        return Ok(());
    }
    let collected = resolve_pickups(state);

    for explosion in &mut state.explosions {
        explosion.update(dt_ms);
    }
    state.explosions.retain(|e| !e.is_finished());

    spawn::spawn_hostiles(state);
    spawn::spawn_pickups(state);

    if state.difficulty.update(state.clock_ms, &state.tuning.difficulty) {
        state.events.push(GameEvent::LevelUp(state.difficulty.level));
    }

    // A window opened during this step starts full; dt elapsed before it
    if !collected {
        if let Some(kind) = powerup::tick(&mut state.player, dt_ms) {
            state.events.push(GameEvent::PowerUpExpired(kind));
        }
    }
    if kills == 0 {
        state.score.tick(dt_ms);
    }

    check_integrity(state)
}

/// Fire if the cooldown allows. Returns the number of projectiles created.
pub fn try_fire(state: &mut GameState) -> usize {
    let now = state.clock_ms;
    let cooldown = state.tuning.player.shot_cooldown_ms * state.player.cooldown_reduction as f64;
    if now - state.last_shot_ms < cooldown {
        return 0;
    }

    let tuning = &state.tuning.projectile;
    let origin = state.player.muzzle(tuning.size);
    let visual = state.assets.get(SpriteKind::Projectile);
    let before = state.projectiles.len();
    if state.player.multi_shot {
        for &angle in &tuning.spread_degrees {
            state
                .projectiles
                .push(Projectile::new(origin, angle, tuning, visual));
        }
    } else {
        state
            .projectiles
            .push(Projectile::new(origin, 0.0, tuning, visual));
    }
    let count = state.projectiles.len() - before;

    state.last_shot_ms = now;
    state.events.push(GameEvent::ShotFired { count });
    log::debug!(
        "shoot x{count} from ({:.1}, {:.1}) at {now}ms",
        origin.x,
        origin.y
    );
    count
}

/// Move hostiles; any that slip past the bottom recycle and cost health
fn advance_hostiles(state: &mut GameState, dt_ms: f32) {
    let field = state.tuning.playfield;
    let penalty = state.tuning.hostile.escape_penalty;
    for i in 0..state.hostiles.len() {
        state.hostiles[i].advance(dt_ms);
        if !state.hostiles[i].has_escaped(field) {
            continue;
        }

        let speed = state.difficulty.speed_range();
        state.hostiles[i].reset(&mut state.rng, field, speed);
        state.player.lose_health(penalty);
        state.events.push(GameEvent::HostileEscaped {
            health: state.player.health,
        });
        log::debug!("hostile escaped, health {}", state.player.health);

        if state.player.is_dead() {
            state.game_over();
            return;
        }
    }
}

/// Projectile × hostile. Returns the number of hostiles destroyed.
fn resolve_shots(state: &mut GameState) -> usize {
    let field = state.tuning.playfield;
    let mut kills = 0;
    let mut i = 0;
    while i < state.projectiles.len() {
        let hit = state
            .hostiles
            .iter()
            .position(|h| collide(&state.projectiles[i], h));
        let Some(h) = hit else {
            i += 1;
            continue;
        };

        let at = state.hostiles[h].body.center();
        spawn_explosion(state, at);
        let speed = state.difficulty.speed_range();
        state.hostiles[h].reset(&mut state.rng, field, speed);
        state.projectiles.remove(i);

        let points = state.score.award_points(state.tuning.hostile.points);
        state.events.push(GameEvent::HostileDestroyed { at, points });
        kills += 1;
    }
    kills
}

/// Player × hostile
fn resolve_rams(state: &mut GameState) {
    let field = state.tuning.playfield;
    let damage = state.tuning.hostile.contact_damage;
    for h in 0..state.hostiles.len() {
        if !collide(&state.player, &state.hostiles[h]) {
            continue;
        }

        if state.player.take_damage(damage) {
            state.events.push(GameEvent::PlayerHit {
                health: state.player.health,
            });
        }
        let at = state.hostiles[h].body.center();
        spawn_explosion(state, at);
        let speed = state.difficulty.speed_range();
        state.hostiles[h].reset(&mut state.rng, field, speed);

        if state.player.is_dead() {
            state.game_over();
            return;
        }
    }
}

/// Player × pickup. Returns whether anything was collected.
fn resolve_pickups(state: &mut GameState) -> bool {
    let mut collected = false;
    let mut i = 0;
    while i < state.pickups.len() {
        if !collide(&state.player, &state.pickups[i]) {
            i += 1;
            continue;
        }
        let pickup = state.pickups.remove(i);
        powerup::activate(&mut state.player, pickup.kind, pickup.duration_ms);
        state.events.push(GameEvent::PowerUpCollected(pickup.kind));
        collected = true;
    }
    collected
}

fn spawn_explosion(state: &mut GameState, at: glam::Vec2) {
    log::debug!(target: "explosions", "create at ({:.0}, {:.0})", at.x, at.y);
    let visual = state.assets.get(SpriteKind::Explosion);
    state
        .explosions
        .push(Explosion::new(at, &state.tuning.explosion, visual));
}

fn check_integrity(state: &GameState) -> Result<(), StepError> {
    match state.drawables().find(|e| !e.body().is_finite()) {
        Some(entity) => Err(StepError::CorruptEntity(entity.kind())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::AssetCatalog;
    use crate::sim::entities::{Body, Hostile, Pickup, PickupKind};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn empty_state() -> GameState {
        let mut state = GameState::new(Tuning::default(), AssetCatalog::default(), 12345);
        state.hostiles.clear();
        // Keep the spawn policies quiet unless a test opens them
        state.tuning.hostile.max_alive = 0;
        state.tuning.pickup.spawn_chance = 0.0;
        state
    }

    fn hostile_at(x: f32, y: f32, speed: f32) -> Hostile {
        Hostile {
            body: Body::new(Vec2::new(x, y), Vec2::new(50.0, 50.0)),
            speed,
            visual: None,
        }
    }

    fn shoot() -> InputSnapshot {
        InputSnapshot {
            shoot: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_fire_creates_centered_projectile() {
        let mut state = empty_state();
        assert_eq!(state.player.body.pos, Vec2::new(375.0, 500.0));
        state.last_shot_ms = 0.0;
        state.clock_ms = 1000.0;

        assert_eq!(try_fire(&mut state), 1);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].body.pos, Vec2::new(397.5, 500.0));
        assert_eq!(state.last_shot_ms, 1000.0);
        assert_eq!(state.drain_events(), vec![GameEvent::ShotFired { count: 1 }]);
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = empty_state();
        state.clock_ms = 1000.0;
        try_fire(&mut state);
        state.clock_ms = 1149.0;
        assert_eq!(try_fire(&mut state), 0);
        assert_eq!(state.last_shot_ms, 1000.0);
        state.clock_ms = 1150.0;
        assert_eq!(try_fire(&mut state), 1);
    }

    #[test]
    fn test_rapid_fire_halves_cooldown() {
        let mut state = empty_state();
        powerup::activate(&mut state.player, PickupKind::RapidFire, 5000.0);
        state.clock_ms = 1000.0;
        try_fire(&mut state);
        state.clock_ms = 1075.0;
        assert_eq!(try_fire(&mut state), 1);
    }

    #[test]
    fn test_multi_shot_fires_spread() {
        let mut state = empty_state();
        powerup::activate(&mut state.player, PickupKind::MultiShot, 5000.0);
        state.clock_ms = 1000.0;
        assert_eq!(try_fire(&mut state), 3);
        let angles: Vec<f32> = state.projectiles.iter().map(|p| p.angle).collect();
        assert_eq!(angles, vec![-15.0, 0.0, 15.0]);
    }

    #[test]
    fn test_hostile_near_bottom_not_yet_reset() {
        let mut state = empty_state();
        state.hostiles.push(hostile_at(100.0, 590.0, 5.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert_eq!(state.hostiles[0].body.pos, Vec2::new(100.0, 595.0));
        assert_eq!(state.player.health, 3);
    }

    #[test]
    fn test_escaped_hostile_resets_and_costs_health() {
        let mut state = empty_state();
        state.hostiles.push(hostile_at(100.0, 598.0, 5.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();

        let hostile = &state.hostiles[0];
        assert_eq!(hostile.body.pos.y, -50.0);
        assert!(hostile.body.pos.x >= 0.0 && hostile.body.pos.x < 750.0);
        assert_eq!(state.player.health, 2);
        assert!(state
            .drain_events()
            .contains(&GameEvent::HostileEscaped { health: 2 }));
    }

    #[test]
    fn test_last_escape_ends_the_game() {
        let mut state = empty_state();
        state.player.health = 1;
        state.hostiles.push(hostile_at(100.0, 598.0, 5.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert_eq!(state.phase, GamePhase::GameOver);

        // Nothing moves after game over
        let clock = state.clock_ms;
        let y = state.hostiles[0].body.pos.y;
        tick(&mut state, &shoot(), 16.0).unwrap();
        assert_eq!(state.clock_ms, clock);
        assert_eq!(state.hostiles[0].body.pos.y, y);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_shot_destroys_hostile() {
        let mut state = empty_state();
        // Directly above the muzzle, close enough to be hit this frame
        state.hostiles.push(hostile_at(375.0, 450.0, 0.0));
        state.clock_ms = 1000.0;
        tick(&mut state, &shoot(), 16.0).unwrap();

        assert!(state.projectiles.is_empty());
        assert_eq!(state.hostiles[0].body.pos.y, -50.0);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].body.center(), Vec2::new(400.0, 475.0));
        assert_eq!(state.score.score, 110);
        assert_eq!(state.score.combo, 1);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::HostileDestroyed {
            at: Vec2::new(400.0, 475.0),
            points: 110
        }));
    }

    #[test]
    fn test_ram_damages_player() {
        let mut state = empty_state();
        state.hostiles.push(hostile_at(375.0, 480.0, 0.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert_eq!(state.player.health, 2);
        assert_eq!(state.hostiles[0].body.pos.y, -50.0);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.score.score, 0);
    }

    #[test]
    fn test_shield_absorbs_ram() {
        let mut state = empty_state();
        powerup::activate(&mut state.player, PickupKind::Shield, 5000.0);
        state.hostiles.push(hostile_at(375.0, 480.0, 0.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert_eq!(state.player.health, 3);
        // The hostile is still consumed
        assert_eq!(state.hostiles[0].body.pos.y, -50.0);
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_ram_on_last_health_ends_game() {
        let mut state = empty_state();
        state.player.health = 1;
        state.hostiles.push(hostile_at(375.0, 480.0, 0.0));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert!(state.is_over());
        assert!(state
            .drain_events()
            .contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_collect_pickup_activates_effect() {
        let mut state = empty_state();
        let tuning = state.tuning.pickup.clone();
        state
            .pickups
            .push(Pickup::new(Vec2::new(385.0, 500.0), PickupKind::RapidFire, &tuning, None));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();

        assert!(state.pickups.is_empty());
        assert_eq!(state.player.cooldown_reduction, 0.5);
        assert!(state
            .drain_events()
            .contains(&GameEvent::PowerUpCollected(PickupKind::RapidFire)));

        // Expires on the simulation clock
        for _ in 0..400 {
            tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        }
        assert_eq!(state.player.cooldown_reduction, 1.0);
        assert!(state.player.power_up.is_none());
        assert!(state
            .drain_events()
            .contains(&GameEvent::PowerUpExpired(PickupKind::RapidFire)));
    }

    #[test]
    fn test_power_up_lasts_full_duration_after_collection() {
        let mut state = empty_state();
        let tuning = state.tuning.pickup.clone();
        state
            .pickups
            .push(Pickup::new(Vec2::new(385.0, 500.0), PickupKind::RapidFire, &tuning, None));
        tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        assert!(state.pickups.is_empty());
        let collected_at = state.clock_ms;

        for _ in 0..49 {
            tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        }
        assert_eq!(state.clock_ms - collected_at, 4900.0);
        assert_eq!(state.player.cooldown_reduction, 0.5);
        assert_eq!(state.player.power_up.map(|a| a.remaining_ms), Some(100.0));

        tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        assert_eq!(state.clock_ms - collected_at, 5000.0);
        assert_eq!(state.player.cooldown_reduction, 1.0);
        assert!(state.player.power_up.is_none());
    }

    #[test]
    fn test_combo_window_starts_after_the_kill() {
        let mut state = empty_state();
        state.hostiles.push(hostile_at(375.0, 450.0, 0.0));
        tick(&mut state, &shoot(), 100.0).unwrap();
        assert_eq!(state.score.combo, 1);
        assert_eq!(state.score.combo_timer_ms, 2000.0);

        for _ in 0..19 {
            tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        }
        assert_eq!(state.score.combo, 1);

        tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        assert_eq!(state.score.combo, 0);
    }

    #[test]
    fn test_first_frame_can_fire() {
        let mut state = empty_state();
        tick(&mut state, &shoot(), 16.0).unwrap();
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.last_shot_ms, 16.0);
    }

    #[test]
    fn test_missed_pickup_falls_out() {
        let mut state = empty_state();
        let tuning = state.tuning.pickup.clone();
        state
            .pickups
            .push(Pickup::new(Vec2::new(10.0, 599.0), PickupKind::Shield, &tuning, None));
        tick(&mut state, &InputSnapshot::default(), 16.0).unwrap();
        assert!(state.pickups.is_empty());
        assert!(!state.player.invulnerable);
    }

    #[test]
    fn test_explosions_expire() {
        let mut state = empty_state();
        spawn_explosion(&mut state, Vec2::new(100.0, 100.0));
        for _ in 0..8 {
            tick(&mut state, &InputSnapshot::default(), 50.0).unwrap();
        }
        assert!(state.explosions.is_empty());
    }

    #[test]
    fn test_tick_pause() {
        let mut state = empty_state();
        let pause = InputSnapshot {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, 16.0).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);

        let clock = state.clock_ms;
        tick(&mut state, &shoot(), 16.0).unwrap();
        assert_eq!(state.clock_ms, clock);
        assert!(state.projectiles.is_empty());

        // Unpause
        tick(&mut state, &pause, 16.0).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.clock_ms, clock + 16.0);
    }

    #[test]
    fn test_difficulty_ramps_with_clock() {
        let mut state = empty_state();
        for _ in 0..300 {
            tick(&mut state, &InputSnapshot::default(), 100.0).unwrap();
        }
        assert_eq!(state.difficulty.level, 2);
        assert!(state.drain_events().contains(&GameEvent::LevelUp(2)));
    }

    #[test]
    fn test_invalid_delta_is_rejected() {
        let mut state = empty_state();
        assert!(matches!(
            tick(&mut state, &InputSnapshot::default(), f32::NAN),
            Err(StepError::InvalidDelta(_))
        ));
        assert_eq!(
            tick(&mut state, &InputSnapshot::default(), -1.0),
            Err(StepError::InvalidDelta(-1.0))
        );
        assert_eq!(state.clock_ms, 0.0);
    }

    #[test]
    fn test_corrupt_entity_is_reported() {
        let mut state = empty_state();
        state.hostiles.push(hostile_at(100.0, 100.0, f32::NAN));
        assert_eq!(
            tick(&mut state, &InputSnapshot::default(), 16.0),
            Err(StepError::CorruptEntity(crate::sim::EntityKind::Hostile))
        );
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut a = GameState::new(Tuning::default(), AssetCatalog::default(), 99999);
        let mut b = GameState::new(Tuning::default(), AssetCatalog::default(), 99999);
        let inputs = [
            InputSnapshot { left: true, shoot: true, ..Default::default() },
            InputSnapshot { shoot: true, ..Default::default() },
            InputSnapshot { right: true, up: true, ..Default::default() },
            InputSnapshot::default(),
        ];
        for frame in 0..2000 {
            let input = &inputs[frame % inputs.len()];
            let _ = tick(&mut a, input, 16.0);
            let _ = tick(&mut b, input, 16.0);
        }
        assert_eq!(a.clock_ms, b.clock_ms);
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.body, b.player.body);
        assert_eq!(a.hostiles.len(), b.hostiles.len());
        for (ha, hb) in a.hostiles.iter().zip(&b.hostiles) {
            assert_eq!(ha.body, hb.body);
        }
    }
}
