//! Entity records and their per-type movement rules
//!
//! Every entity is a `Body` (axis-aligned box, top-left origin, y grows
//! downward) plus whatever state its variant needs. Shared behaviour goes
//! through the `Spatial` capability; variant rules are plain methods.

use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::check_bounds;
use super::powerup::ActivePowerUp;
use crate::frame_scale;
use crate::consts::DIAGONAL_FACTOR;
use crate::platform::{InputSnapshot, VisualHandle};
use crate::tuning::{ExplosionTuning, PickupTuning, PlayerTuning, Playfield, ProjectileTuning};

/// Variant tag used for logging and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Projectile,
    Hostile,
    Pickup,
    Explosion,
}

/// Position and extent of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.size.is_finite()
    }
}

/// Common capability of everything the simulation moves and the renderer draws
pub trait Spatial {
    fn kind(&self) -> EntityKind;
    fn body(&self) -> &Body;
    fn visual(&self) -> Option<VisualHandle>;
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    /// Pixels per baseline frame
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    /// Shield effect: contact damage is ignored
    pub invulnerable: bool,
    /// Fire a three-way spread instead of a single shot
    pub multi_shot: bool,
    /// Multiplier on the base shot cooldown, in (0, 1]
    pub cooldown_reduction: f32,
    /// The single active power-up slot
    pub power_up: Option<ActivePowerUp>,
    pub visual: Option<VisualHandle>,
}

impl Player {
    /// Place a fresh ship centred near the bottom of the playfield
    pub fn new(tuning: &PlayerTuning, field: Playfield, visual: Option<VisualHandle>) -> Self {
        let pos = Vec2::new(
            field.width / 2.0 - tuning.size.x / 2.0,
            field.height - tuning.spawn_bottom_margin,
        );
        Self {
            body: Body::new(pos, tuning.size),
            speed: tuning.speed,
            health: tuning.max_health,
            max_health: tuning.max_health,
            invulnerable: false,
            multi_shot: false,
            cooldown_reduction: 1.0,
            power_up: None,
            visual,
        }
    }

    /// Apply directional input and keep the ship inside the playfield
    pub fn steer(&mut self, input: &InputSnapshot, dt_ms: f32, field: Playfield) {
        let mut dir = Vec2::ZERO;
        if input.left {
            dir.x -= 1.0;
        }
        if input.right {
            dir.x += 1.0;
        }
        if input.up {
            dir.y -= 1.0;
        }
        if input.down {
            dir.y += 1.0;
        }
        if dir.x != 0.0 && dir.y != 0.0 {
            dir *= DIAGONAL_FACTOR;
        }

        // Drop the push into any edge the ship is already flush with
        let bounds = check_bounds(&self.body, field);
        if (dir.x < 0.0 && !bounds.left) || (dir.x > 0.0 && !bounds.right) {
            dir.x = 0.0;
        }
        if (dir.y < 0.0 && !bounds.top) || (dir.y > 0.0 && !bounds.bottom) {
            dir.y = 0.0;
        }

        self.body.pos += dir * self.speed * frame_scale(dt_ms);
        self.clamp_to(field);
    }

    pub fn clamp_to(&mut self, field: Playfield) {
        let max = Vec2::new(field.width, field.height) - self.body.size;
        self.body.pos = self.body.pos.clamp(Vec2::ZERO, max.max(Vec2::ZERO));
    }

    /// Contact damage; ignored while invulnerable. Returns whether it landed.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.invulnerable {
            return false;
        }
        self.lose_health(amount);
        true
    }

    /// Unconditional health loss (hostile slipped past the bottom edge)
    pub fn lose_health(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Top-left of a projectile leaving the nose of the ship
    pub fn muzzle(&self, projectile_size: Vec2) -> Vec2 {
        Vec2::new(
            self.body.pos.x + self.body.size.x / 2.0 - projectile_size.x / 2.0,
            self.body.pos.y,
        )
    }
}

/// A shot fired by the player
#[derive(Debug, Clone)]
pub struct Projectile {
    pub body: Body,
    pub speed: f32,
    /// Degrees from straight up, positive leans right
    pub angle: f32,
    pub active: bool,
    pub visual: Option<VisualHandle>,
}

impl Projectile {
    pub fn new(
        pos: Vec2,
        angle: f32,
        tuning: &ProjectileTuning,
        visual: Option<VisualHandle>,
    ) -> Self {
        Self {
            body: Body::new(pos, tuning.size),
            speed: tuning.speed,
            angle,
            active: true,
            visual,
        }
    }

    pub fn advance(&mut self, dt_ms: f32) {
        let step = self.speed * frame_scale(dt_ms);
        let radians = self.angle.to_radians();
        self.body.pos.x += radians.sin() * step;
        self.body.pos.y -= radians.cos() * step;
    }

    /// Fully outside the playfield on either axis
    pub fn is_outside(&self, field: Playfield) -> bool {
        self.body.bottom() < 0.0
            || self.body.pos.y > field.height
            || self.body.right() < 0.0
            || self.body.pos.x > field.width
    }
}

/// A descending enemy. Hostiles are never removed; they recycle to the top.
#[derive(Debug, Clone)]
pub struct Hostile {
    pub body: Body,
    pub speed: f32,
    pub visual: Option<VisualHandle>,
}

impl Hostile {
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        size: Vec2,
        field: Playfield,
        speed: RangeInclusive<f32>,
        visual: Option<VisualHandle>,
    ) -> Self {
        let mut hostile = Self {
            body: Body::new(Vec2::ZERO, size),
            speed: 0.0,
            visual,
        };
        hostile.reset(rng, field, speed);
        hostile
    }

    /// Back above the top edge at a random column with a fresh speed
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        field: Playfield,
        speed: RangeInclusive<f32>,
    ) {
        self.body.pos.y = -self.body.size.y;
        self.body.pos.x = rng.random_range(0.0..field.width - self.body.size.x);
        self.speed = rng.random_range(speed);
    }

    pub fn advance(&mut self, dt_ms: f32) {
        self.body.pos.y += self.speed * frame_scale(dt_ms);
    }

    pub fn has_escaped(&self, field: Playfield) -> bool {
        self.body.pos.y > field.height
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Shield,
    RapidFire,
    MultiShot,
}

impl PickupKind {
    pub const ALL: [PickupKind; 3] = [PickupKind::Shield, PickupKind::RapidFire, PickupKind::MultiShot];

    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::Shield => "shield",
            PickupKind::RapidFire => "rapidfire",
            PickupKind::MultiShot => "multishot",
        }
    }

    /// Lenient lookup by name. Unknown names fall back to `Shield`.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "shield" => PickupKind::Shield,
            "rapidfire" | "rapid_fire" => PickupKind::RapidFire,
            "multishot" | "multi_shot" => PickupKind::MultiShot,
            _ => {
                log::warn!(target: "powerups", "Invalid powerup type: {name}, defaulting to shield");
                PickupKind::Shield
            }
        }
    }

    /// Glow colour drawn around the pickup
    pub fn css_color(&self) -> &'static str {
        match self {
            PickupKind::Shield => "rgba(0, 255, 255, 0.7)",
            PickupKind::RapidFire => "rgba(255, 0, 0, 0.7)",
            PickupKind::MultiShot => "rgba(0, 255, 0, 0.7)",
        }
    }
}

/// A falling power-up waiting to be collected
#[derive(Debug, Clone)]
pub struct Pickup {
    pub body: Body,
    pub kind: PickupKind,
    pub speed: f32,
    /// Effect duration once collected (ms)
    pub duration_ms: f32,
    pub visual: Option<VisualHandle>,
}

impl Pickup {
    pub fn new(pos: Vec2, kind: PickupKind, tuning: &PickupTuning, visual: Option<VisualHandle>) -> Self {
        Self {
            body: Body::new(pos, tuning.size),
            kind,
            speed: tuning.speed,
            duration_ms: tuning.duration_ms,
            visual,
        }
    }

    pub fn advance(&mut self, dt_ms: f32) {
        self.body.pos.y += self.speed * frame_scale(dt_ms);
    }

    pub fn has_fallen_out(&self, field: Playfield) -> bool {
        self.body.pos.y > field.height
    }
}

/// Self-terminating explosion animation
#[derive(Debug, Clone)]
pub struct Explosion {
    pub body: Body,
    pub frame_index: u32,
    /// Time spent on the current frame (ms)
    pub frame_time: f32,
    pub frame_duration_ms: f32,
    pub total_frames: u32,
    pub visual: Option<VisualHandle>,
}

impl Explosion {
    /// Centre a new explosion on `origin`
    pub fn new(origin: Vec2, tuning: &ExplosionTuning, visual: Option<VisualHandle>) -> Self {
        Self {
            body: Body::new(origin - tuning.size / 2.0, tuning.size),
            frame_index: 0,
            frame_time: 0.0,
            frame_duration_ms: tuning.frame_duration_ms,
            total_frames: tuning.total_frames,
            visual,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.frame_time += dt_ms;
        if self.frame_time >= self.frame_duration_ms {
            self.frame_index += 1;
            self.frame_time = 0.0;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frame_index >= self.total_frames
    }

    /// Animation progress in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.frame_index as f32 / self.total_frames as f32).min(1.0)
    }
}

impl Spatial for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }
    fn body(&self) -> &Body {
        &self.body
    }
    fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

impl Spatial for Projectile {
    fn kind(&self) -> EntityKind {
        EntityKind::Projectile
    }
    fn body(&self) -> &Body {
        &self.body
    }
    fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

impl Spatial for Hostile {
    fn kind(&self) -> EntityKind {
        EntityKind::Hostile
    }
    fn body(&self) -> &Body {
        &self.body
    }
    fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

impl Spatial for Pickup {
    fn kind(&self) -> EntityKind {
        EntityKind::Pickup
    }
    fn body(&self) -> &Body {
        &self.body
    }
    fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

impl Spatial for Explosion {
    fn kind(&self) -> EntityKind {
        EntityKind::Explosion
    }
    fn body(&self) -> &Body {
        &self.body
    }
    fn visual(&self) -> Option<VisualHandle> {
        self.visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> Playfield {
        Playfield::default()
    }

    #[test]
    fn test_hostile_advance_normalized_to_delta() {
        let mut hostile = Hostile {
            body: Body::new(Vec2::new(100.0, 590.0), Vec2::new(50.0, 50.0)),
            speed: 5.0,
            visual: None,
        };
        hostile.advance(16.0);
        assert_eq!(hostile.body.pos.y, 595.0);
        assert!(!hostile.has_escaped(field()));

        // Level with the bottom edge is still on the field
        hostile.advance(16.0);
        assert_eq!(hostile.body.pos.y, 600.0);
        assert!(!hostile.has_escaped(field()));

        hostile.advance(16.0);
        assert!(hostile.has_escaped(field()));
    }

    #[test]
    fn test_hostile_reset_above_top_edge() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut hostile = Hostile::spawn(&mut rng, Vec2::new(50.0, 50.0), field(), 1.0..=2.0, None);
        for _ in 0..200 {
            hostile.body.pos.y = 700.0;
            hostile.reset(&mut rng, field(), 1.0..=2.0);
            assert_eq!(hostile.body.pos.y, -50.0);
            assert!(hostile.body.pos.x >= 0.0 && hostile.body.pos.x < 750.0);
            assert!((1.0..=2.0).contains(&hostile.speed));
        }
    }

    #[test]
    fn test_player_clamped_to_playfield() {
        let mut player = Player::new(&PlayerTuning::default(), field(), None);
        let input = InputSnapshot {
            right: true,
            down: true,
            ..Default::default()
        };
        for _ in 0..500 {
            player.steer(&input, 16.0, field());
        }
        assert_eq!(player.body.pos, Vec2::new(750.0, 550.0));

        let input = InputSnapshot {
            left: true,
            up: true,
            ..Default::default()
        };
        for _ in 0..500 {
            player.steer(&input, 16.0, field());
        }
        assert_eq!(player.body.pos, Vec2::ZERO);
    }

    #[test]
    fn test_player_diagonal_is_slower_per_axis() {
        let mut player = Player::new(&PlayerTuning::default(), field(), None);
        let start = player.body.pos;
        let input = InputSnapshot {
            left: true,
            up: true,
            ..Default::default()
        };
        player.steer(&input, 16.0, field());
        let moved = start - player.body.pos;
        assert!((moved.x - 5.0 * DIAGONAL_FACTOR).abs() < 1e-4);
        assert!((moved.y - 5.0 * DIAGONAL_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_flush_edge_blocks_only_that_axis() {
        let mut player = Player::new(&PlayerTuning::default(), field(), None);
        player.body.pos = Vec2::new(0.0, 300.0);
        let input = InputSnapshot {
            left: true,
            up: true,
            ..Default::default()
        };
        player.steer(&input, 16.0, field());
        assert_eq!(player.body.pos.x, 0.0);
        assert!((player.body.pos.y - (300.0 - 5.0 * DIAGONAL_FACTOR)).abs() < 1e-4);
    }

    #[test]
    fn test_shield_blocks_contact_damage() {
        let mut player = Player::new(&PlayerTuning::default(), field(), None);
        player.invulnerable = true;
        assert!(!player.take_damage(1));
        assert_eq!(player.health, 3);

        player.invulnerable = false;
        assert!(player.take_damage(5));
        assert_eq!(player.health, 0);
        assert!(player.is_dead());
    }

    #[test]
    fn test_angled_projectile_drifts_sideways() {
        let mut shot = Projectile::new(Vec2::new(400.0, 300.0), 15.0, &ProjectileTuning::default(), None);
        shot.advance(16.0);
        assert!(shot.body.pos.x > 400.0);
        assert!(shot.body.pos.y < 300.0);

        let mut straight = Projectile::new(Vec2::new(400.0, 300.0), 0.0, &ProjectileTuning::default(), None);
        straight.advance(16.0);
        assert_eq!(straight.body.pos.x, 400.0);
        assert_eq!(straight.body.pos.y, 293.0);
    }

    #[test]
    fn test_projectile_leaves_playfield() {
        let mut shot = Projectile::new(Vec2::new(400.0, -9.0), 0.0, &ProjectileTuning::default(), None);
        assert!(!shot.is_outside(field()));
        shot.advance(16.0);
        assert!(shot.is_outside(field()));
    }

    #[test]
    fn test_explosion_runs_to_completion() {
        let tuning = ExplosionTuning::default();
        let mut explosion = Explosion::new(Vec2::new(100.0, 100.0), &tuning, None);
        assert_eq!(explosion.body.pos, Vec2::new(68.0, 68.0));
        for _ in 0..7 {
            explosion.update(50.0);
        }
        assert!(!explosion.is_finished());
        explosion.update(50.0);
        assert!(explosion.is_finished());
        assert_eq!(explosion.progress(), 1.0);
    }

    #[test]
    fn test_pickup_kind_from_name() {
        assert_eq!(PickupKind::from_name("RapidFire"), PickupKind::RapidFire);
        assert_eq!(PickupKind::from_name("MULTISHOT"), PickupKind::MultiShot);
        assert_eq!(PickupKind::from_name("laser"), PickupKind::Shield);
        for kind in PickupKind::ALL {
            assert_eq!(PickupKind::from_name(kind.as_str()), kind);
        }
    }
}
