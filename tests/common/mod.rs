#![allow(dead_code)]

use std::rc::Rc;

use flak::assets::{Sprite, SpriteSet};
use flak::config::GameConfig;
use flak::entities::{AmmoSpec, Rect, VerticalDir};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const FIELD_W: f32 = 800.0;
pub const FIELD_H: f32 = 450.0;

pub fn field() -> Rect {
    Rect::new(0.0, 0.0, FIELD_W, FIELD_H)
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// A solid `cols` × `rows` sprite.
pub fn block(cols: usize, rows: usize) -> Rc<Sprite> {
    Rc::new(Sprite::from_rows(vec!["#".repeat(cols); rows]))
}

pub fn ammo_spec(direction: VerticalDir, speed: f32) -> Rc<AmmoSpec> {
    Rc::new(AmmoSpec {
        field: field(),
        sprite: block(1, 1),
        direction,
        speed,
    })
}

/// Player 5×2 cells, enemy 5×2, ammo 1×1, buildings 6×3.
pub fn sprite_set(with_razed: bool) -> SpriteSet {
    SpriteSet {
        player: block(5, 2),
        missile: block(1, 1),
        enemy: block(5, 2),
        bomb: block(1, 1),
        building: block(6, 3),
        building_razed: with_razed.then(|| block(6, 1)),
        splash: None,
        background: None,
    }
}

/// Defaults, minus the enemies, so rounds start deterministic.
pub fn quiet_config() -> GameConfig {
    GameConfig {
        enemy_count: 0,
        ..GameConfig::default()
    }
}
