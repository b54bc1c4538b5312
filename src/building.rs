use std::rc::Rc;

use crate::assets::Sprite;
use crate::entities::{Entity, Rect};

/// An immobile ground structure the player defends.
#[derive(Clone, Debug)]
pub struct Building {
    pub rect: Rect,
    is_razed: bool,
    removed: bool,
    sprite: Rc<Sprite>,
    razed_sprite: Option<Rc<Sprite>>,
}

impl Building {
    pub fn new(pos: (f32, f32), sprite: Rc<Sprite>, razed_sprite: Option<Rc<Sprite>>) -> Self {
        let (w, h) = sprite.size();
        Building {
            rect: Rect::new(pos.0, pos.1, w, h),
            is_razed: false,
            removed: false,
            sprite,
            razed_sprite,
        }
    }

    /// Mark the building as destroyed.  Returns `true` only the first time.
    pub fn raze(&mut self) -> bool {
        if self.is_razed {
            return false;
        }
        self.is_razed = true;
        true
    }

    /// Swap in the razed look, or drop out of play when there is none.
    pub fn update(&mut self) {
        if !self.is_razed {
            return;
        }
        match &self.razed_sprite {
            Some(razed) => self.sprite = Rc::clone(razed),
            None => self.removed = true,
        }
    }

    pub fn is_razed(&self) -> bool {
        self.is_razed
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl Entity for Building {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
