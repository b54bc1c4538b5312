use std::rc::Rc;

use crate::assets::Sprite;
use crate::entities::{AmmoSpec, Entity, Rect, VerticalDir};

/// Something thrown at an opponent: a player's missile or an enemy's bomb.
#[derive(Clone, Debug)]
pub struct Ammo {
    pub rect: Rect,
    direction: VerticalDir,
    speed: f32,
    field_bottom: f32,
    sprite: Rc<Sprite>,
    alive: bool,
}

impl Ammo {
    /// Create a projectile centred on `center`, travelling in `direction`.
    pub fn new(spec: &AmmoSpec, center: (f32, f32), direction: VerticalDir) -> Self {
        let (w, h) = spec.sprite.size();
        let mut rect = Rect::new(0.0, 0.0, w, h);
        rect.set_center(center);
        Ammo {
            rect,
            direction,
            speed: spec.speed,
            field_bottom: spec.field.bottom(),
            sprite: Rc::clone(&spec.sprite),
            alive: true,
        }
    }

    /// Move along the fixed direction, or die once fully off the field.
    pub fn update(&mut self, delta_time: f32) {
        let still_inside = match self.direction {
            VerticalDir::Up => self.rect.bottom() > 0.0,
            VerticalDir::Down => self.rect.top() < self.field_bottom,
        };
        if still_inside {
            self.rect.advance((0.0, self.direction.sign() * self.speed), delta_time);
        } else {
            self.alive = false;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn direction(&self) -> VerticalDir {
        self.direction
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl Entity for Ammo {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
