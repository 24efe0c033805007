//! Browser collaborators: DOM HUD, keyboard state and image loading

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, HtmlImageElement, KeyboardEvent};

use super::{AssetCatalog, AssetLoader, InputSnapshot, Screen, SpriteKind, UiSink, VisualHandle};
use crate::error::AssetError;
use crate::sim::PickupKind;

/// Image file for each sprite slot. Projectiles are drawn as plain rects.
pub const SPRITE_PATHS: [(SpriteKind, &str); 7] = [
    (SpriteKind::Background, "img/space-background.png"),
    (SpriteKind::Player, "img/player-ship.png"),
    (SpriteKind::Hostile, "img/enemy-ship.png"),
    (SpriteKind::Explosion, "img/explosion-sheet.png"),
    (SpriteKind::Pickup(PickupKind::Shield), "img/shield-powerup.png"),
    (SpriteKind::Pickup(PickupKind::RapidFire), "img/rapid-fire-powerup.png"),
    (SpriteKind::Pickup(PickupKind::MultiShot), "img/multi-shot-powerup.png"),
];

/// Decoded images, indexed by [`VisualHandle`]
#[derive(Debug, Default)]
pub struct ImageBank {
    images: Vec<HtmlImageElement>,
}

impl ImageBank {
    pub fn get(&self, handle: VisualHandle) -> Option<&HtmlImageElement> {
        self.images.get(handle.0 as usize)
    }
}

/// Images fetched ahead of `Session::init`
pub struct PreloadedAssets {
    catalog: AssetCatalog,
    pub images: Rc<ImageBank>,
}

impl AssetLoader for PreloadedAssets {
    fn load(&mut self) -> Result<AssetCatalog, AssetError> {
        if self.catalog.len() != SPRITE_PATHS.len() {
            return Err(AssetError::Missing(format!(
                "{} of {} sprites",
                SPRITE_PATHS.len() - self.catalog.len(),
                SPRITE_PATHS.len()
            )));
        }
        Ok(self.catalog.clone())
    }
}

/// Fetch and decode every sprite. The first failure aborts the batch.
pub async fn preload_images() -> Result<PreloadedAssets, AssetError> {
    let mut catalog = AssetCatalog::default();
    let mut images = Vec::with_capacity(SPRITE_PATHS.len());

    for (sprite, path) in SPRITE_PATHS {
        let image = load_image(path).await?;
        catalog.insert(sprite, VisualHandle(images.len() as u32));
        images.push(image);
        log::debug!(target: "assets", "loaded {path}");
    }

    Ok(PreloadedAssets {
        catalog,
        images: Rc::new(ImageBank { images }),
    })
}

async fn load_image(path: &str) -> Result<HtmlImageElement, AssetError> {
    let image = HtmlImageElement::new().map_err(|_| AssetError::LoadFailed(path.to_string()))?;

    let loaded = image.clone();
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        loaded.set_onload(Some(&resolve));
        loaded.set_onerror(Some(&reject));
    });
    image.set_src(path);

    JsFuture::from(promise).await.map_err(|_| {
        log::error!(target: "assets", "Failed to load image: {path}");
        AssetError::LoadFailed(path.to_string())
    })?;
    image.set_onload(None);
    image.set_onerror(None);
    Ok(image)
}

/// Writes HUD values into the page and toggles screen containers
pub struct DomUi {
    document: Document,
}

impl DomUi {
    const SCREENS: [(Screen, &'static str); 4] = [
        (Screen::Start, "start-screen"),
        (Screen::Game, "game-container"),
        (Screen::Paused, "pause-screen"),
        (Screen::GameOver, "game-over-screen"),
    ];

    pub fn new(document: Document) -> Self {
        let missing: Vec<&str> = Self::SCREENS
            .iter()
            .map(|(_, id)| *id)
            .chain(["scoreValue", "livesValue", "levelValue", "finalScoreValue"])
            .filter(|id| document.get_element_by_id(id).is_none())
            .collect();
        if !missing.is_empty() {
            log::warn!("Missing UI elements: {}", missing.join(", "));
        }
        Self { document }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_display(&self, id: &str, display: &str) {
        if let Some(el) = self
            .document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el.style().set_property("display", display);
        }
    }
}

impl UiSink for DomUi {
    fn update_score(&mut self, score: u64) {
        self.set_text("scoreValue", &score.to_string());
        self.set_text("finalScoreValue", &score.to_string());
    }

    fn update_lives(&mut self, lives: u32) {
        self.set_text("livesValue", &lives.to_string());
    }

    fn update_level(&mut self, level: u32) {
        self.set_text("levelValue", &level.to_string());
    }

    fn show_screen(&mut self, screen: Screen) {
        for (s, id) in Self::SCREENS {
            // The playfield stays visible behind the overlays
            let visible = s == screen || (s == Screen::Game && screen != Screen::Start);
            self.set_display(id, if visible { "flex" } else { "none" });
        }
    }
}

/// Held-key state, fed by keydown/keyup listeners
#[derive(Debug, Default)]
pub struct KeyboardInput {
    left: Cell<bool>,
    right: Cell<bool>,
    up: Cell<bool>,
    down: Cell<bool>,
    shoot: Cell<bool>,
    pause: Cell<bool>,
}

impl KeyboardInput {
    /// Install listeners on `document`
    pub fn attach(document: &Document) -> Rc<Self> {
        let input = Rc::new(Self::default());

        for (name, pressed) in [("keydown", true), ("keyup", false)] {
            let input = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if input.set_key(&event.code(), pressed) {
                    event.prevent_default();
                }
            });
            let _ = document
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        input
    }

    /// Returns true if the key belongs to the game
    fn set_key(&self, code: &str, pressed: bool) -> bool {
        let slot = match code {
            "ArrowLeft" | "KeyA" => &self.left,
            "ArrowRight" | "KeyD" => &self.right,
            "ArrowUp" | "KeyW" => &self.up,
            "ArrowDown" | "KeyS" => &self.down,
            "Space" => &self.shoot,
            "Escape" | "KeyP" => {
                if pressed {
                    self.pause.set(true);
                }
                return true;
            }
            _ => return false,
        };
        slot.set(pressed);
        true
    }

    /// Current state; the pause toggle is consumed
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.left.get(),
            right: self.right.get(),
            up: self.up.get(),
            down: self.down.get(),
            shoot: self.shoot.get(),
            pause: self.pause.replace(false),
        }
    }

    /// Drop held keys (focus lost)
    pub fn release_all(&self) {
        for key in [&self.left, &self.right, &self.up, &self.down, &self.shoot] {
            key.set(false);
        }
    }
}
