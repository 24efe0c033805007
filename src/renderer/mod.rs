//! Canvas 2D rendering
//!
//! Draws each entity with its sprite when one was loaded, otherwise with a
//! flat fallback shape. Paint order is back to front: shots, player,
//! hostiles, pickups, explosions.

use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::error::AssetError;
use crate::platform::web::ImageBank;
use crate::platform::{Renderer, SpriteKind};
use crate::sim::{Body, Explosion, GameState, Pickup, Spatial};

const PROJECTILE_COLOR: &str = "yellow";
const SHIELD_OUTLINE: &str = "rgba(0, 255, 255, 0.5)";
const HITBOX_COLOR: &str = "rgba(255, 255, 0, 0.5)";

pub struct Canvas2dRenderer {
    ctx: CanvasRenderingContext2d,
    images: Rc<ImageBank>,
    /// Outline every collision box
    pub show_hitboxes: bool,
}

impl Canvas2dRenderer {
    pub fn new(canvas: &HtmlCanvasElement, images: Rc<ImageBank>) -> Result<Self, AssetError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| AssetError::Missing("2d canvas context".to_string()))?;
        Ok(Self {
            ctx,
            images,
            show_hitboxes: false,
        })
    }

    fn image(&self, entity: &dyn Spatial) -> Option<&HtmlImageElement> {
        entity.visual().and_then(|handle| self.images.get(handle))
    }

    fn draw_image(&self, image: &HtmlImageElement, body: &Body) {
        let _ = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            body.pos.x as f64,
            body.pos.y as f64,
            body.size.x as f64,
            body.size.y as f64,
        );
    }

    fn draw_circle(&self, body: &Body, radius: f64) {
        let c = body.center();
        self.ctx.begin_path();
        let _ = self.ctx.arc(c.x as f64, c.y as f64, radius.max(0.0), 0.0, TAU);
    }

    fn draw_pickup(&self, pickup: &Pickup) {
        if let Some(image) = self.image(pickup) {
            self.draw_image(image, &pickup.body);
        }
        // Glow ring on top of the sprite
        self.ctx.save();
        self.ctx.set_fill_style_str(pickup.kind.css_color());
        self.ctx.set_stroke_style_str("white");
        self.ctx.set_line_width(2.0);
        self.draw_circle(&pickup.body, pickup.body.size.x as f64 / 2.0);
        self.ctx.fill();
        self.ctx.stroke();
        self.ctx.restore();
    }

    fn draw_explosion(&self, explosion: &Explosion) {
        if explosion.is_finished() {
            return;
        }
        if let Some(sheet) = self.image(explosion) {
            // Frames are laid out left to right, wrapping by row
            let (fw, fh) = (explosion.body.size.x as f64, explosion.body.size.y as f64);
            let cols = ((sheet.natural_width() as f64 / fw).floor() as u32).max(1);
            let sx = (explosion.frame_index % cols) as f64 * fw;
            let sy = (explosion.frame_index / cols) as f64 * fh;
            let _ = self
                .ctx
                .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    sheet,
                    sx,
                    sy,
                    fw,
                    fh,
                    explosion.body.pos.x as f64,
                    explosion.body.pos.y as f64,
                    fw,
                    fh,
                );
            return;
        }

        let fade = 1.0 - explosion.progress() as f64;
        self.ctx.save();
        self.ctx
            .set_fill_style_str(&format!("rgba(255, 165, 0, {fade:.3})"));
        self.draw_circle(&explosion.body, explosion.body.size.x as f64 / 2.0 * fade);
        self.ctx.fill();
        self.ctx.restore();
    }

    fn fill_body(&self, body: &Body) {
        self.ctx.fill_rect(
            body.pos.x as f64,
            body.pos.y as f64,
            body.size.x as f64,
            body.size.y as f64,
        );
    }

    fn draw_ship(&self, ship: &dyn Spatial, fallback: &str) {
        match self.image(ship) {
            Some(image) => self.draw_image(image, ship.body()),
            None => {
                self.ctx.set_fill_style_str(fallback);
                self.fill_body(ship.body());
            }
        }
    }

    fn stroke_body(&self, body: &Body) {
        self.ctx.stroke_rect(
            body.pos.x as f64,
            body.pos.y as f64,
            body.size.x as f64,
            body.size.y as f64,
        );
    }

    /// Remaining time of the active power-up as a shrinking bar
    fn draw_power_up_indicator(&self, state: &GameState) {
        let Some(active) = state.player.power_up else {
            return;
        };
        let total = state.tuning.pickup.duration_ms.max(1.0);
        let fraction = (active.remaining_ms / total).clamp(0.0, 1.0) as f64;
        let (x, y, w, h) = (20.0, state.tuning.playfield.height as f64 - 30.0, 120.0, 8.0);

        self.ctx.save();
        self.ctx.set_font("bold 12px Arial");
        self.ctx.set_fill_style_str("#ffffff");
        let _ = self.ctx.fill_text(active.kind.as_str(), x, y - 6.0);
        self.ctx.set_fill_style_str("rgba(255, 255, 255, 0.2)");
        self.ctx.fill_rect(x, y, w, h);
        self.ctx.set_fill_style_str(active.kind.css_color());
        self.ctx.fill_rect(x, y, w * fraction, h);
        self.ctx.restore();
    }
}

impl Renderer for Canvas2dRenderer {
    fn render(&mut self, state: &GameState) {
        let field = state.tuning.playfield;
        let (w, h) = (field.width as f64, field.height as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);

        match state
            .visual(SpriteKind::Background)
            .and_then(|handle| self.images.get(handle))
        {
            Some(bg) => {
                let _ = self
                    .ctx
                    .draw_image_with_html_image_element_and_dw_and_dh(bg, 0.0, 0.0, w, h);
            }
            None => {
                self.ctx.set_fill_style_str("#000010");
                self.ctx.fill_rect(0.0, 0.0, w, h);
            }
        }

        self.ctx.set_fill_style_str(PROJECTILE_COLOR);
        for shot in &state.projectiles {
            self.fill_body(&shot.body);
        }

        self.draw_ship(&state.player, "#4af");
        if state.player.invulnerable {
            self.ctx.save();
            self.ctx.set_stroke_style_str(SHIELD_OUTLINE);
            self.ctx.set_line_width(2.0);
            self.stroke_body(&state.player.body);
            self.ctx.restore();
        }
        for hostile in &state.hostiles {
            self.draw_ship(hostile, "#f44");
        }
        for pickup in &state.pickups {
            self.draw_pickup(pickup);
        }
        for explosion in &state.explosions {
            self.draw_explosion(explosion);
        }

        if self.show_hitboxes {
            self.ctx.save();
            self.ctx.set_stroke_style_str(HITBOX_COLOR);
            self.ctx.set_line_width(1.0);
            for entity in state.drawables() {
                self.stroke_body(entity.body());
            }
            self.ctx.restore();
        }

        self.draw_power_up_indicator(state);
    }
}
