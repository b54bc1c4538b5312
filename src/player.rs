use std::rc::Rc;

use crate::ammo::Ammo;
use crate::assets::Sprite;
use crate::entities::{AmmoSpec, Entity, HorizontalDir, Rect};

/// Floor for the player's horizontal speed (units per second).
pub const MIN_PLAYER_SPEED: f32 = 100.0;

/// Construction parameters for [`Player`].
#[derive(Clone, Debug)]
pub struct PlayerSettings {
    /// Starting x of the player's left edge; `None` centres the player.
    pub initial_x: Option<f32>,
    pub y: f32,
    pub speed: f32,
    /// 0 makes the player invincible.
    pub num_lives: u32,
    /// Shots per reload; 0 means unlimited ammo.
    pub max_shots: u32,
    /// Mirror the sprite to face the direction of travel.
    pub has_sprite_dir: bool,
}

/// The anti-aircraft gun on the ground.
#[derive(Clone, Debug)]
pub struct Player {
    pub rect: Rect,
    pub is_moving_left: bool,
    pub is_moving_right: bool,
    pub lives: u32,
    pub shots_left: u32,
    pub is_alive: bool,
    max_shots: u32,
    speed: f32,
    field: Rect,
    initial_x: Option<f32>,
    has_sprite_dir: bool,
    current_dir: HorizontalDir,
    previous_dir: HorizontalDir,
    flipped: bool,
    missile_spec: Rc<AmmoSpec>,
    sprite: Rc<Sprite>,
}

impl Player {
    pub fn new(
        missile_spec: Rc<AmmoSpec>,
        field: Rect,
        sprite: Rc<Sprite>,
        settings: &PlayerSettings,
    ) -> Self {
        let (w, h) = sprite.size();
        let mut player = Player {
            rect: Rect::new(0.0, settings.y, w, h),
            is_moving_left: false,
            is_moving_right: false,
            lives: settings.num_lives,
            // Unlimited ammo still needs a shot in the chamber
            shots_left: if settings.max_shots > 0 { settings.max_shots } else { 1 },
            is_alive: true,
            max_shots: settings.max_shots,
            speed: if settings.speed > MIN_PLAYER_SPEED {
                settings.speed
            } else {
                MIN_PLAYER_SPEED
            },
            field,
            initial_x: settings.initial_x,
            has_sprite_dir: settings.has_sprite_dir,
            current_dir: HorizontalDir::Right,
            previous_dir: HorizontalDir::Right,
            flipped: false,
            missile_spec,
            sprite,
        };
        player.reset();
        player
    }

    /// Translate held movement keys into intent.  Movement toward an edge the
    /// player is already touching is dropped, and so is a left+right chord.
    pub fn set_intent(&mut self, left: bool, right: bool) {
        self.is_moving_left = left && self.rect.left() > self.field.left();
        self.is_moving_right = right && self.rect.right() < self.field.right();

        if self.is_moving_left && self.is_moving_right {
            self.is_moving_left = false;
            self.is_moving_right = false;
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        if !self.is_alive {
            return;
        }

        if self.has_sprite_dir {
            if self.is_moving_right {
                self.current_dir = HorizontalDir::Right;
            } else if self.is_moving_left {
                self.current_dir = HorizontalDir::Left;
            }
            if self.current_dir != self.previous_dir {
                self.flipped = !self.flipped;
            }
            self.previous_dir = self.current_dir;
        }

        if self.is_moving_right {
            self.rect.advance((self.speed, 0.0), delta_time);
        } else if self.is_moving_left {
            self.rect.advance((-self.speed, 0.0), delta_time);
        }
    }

    /// Fire a missile from the player's centre, if there is a shot left.
    pub fn shoot(&mut self) -> Option<Ammo> {
        if self.shots_left == 0 {
            return None;
        }
        let direction = self.missile_spec.direction;
        let missile = Ammo::new(&self.missile_spec, self.rect.center(), direction);
        if self.max_shots > 0 {
            self.shots_left -= 1;
        }
        Some(missile)
    }

    /// Refill the ammo.  Never goes above the configured maximum.
    pub fn reload(&mut self) {
        if self.shots_left < self.max_shots {
            self.shots_left = self.max_shots;
        }
    }

    /// Lose a life and go back to the starting position.
    pub fn knock_out(&mut self) {
        if self.lives == 0 {
            return;
        }
        self.lives -= 1;
        if self.lives == 0 {
            self.is_alive = false;
            return;
        }
        self.reset();
    }

    fn reset(&mut self) {
        match self.initial_x {
            Some(x) => self.rect.x = x,
            None => self.rect.set_center_x(self.field.center_x()),
        }
    }

    pub fn max_shots(&self) -> u32 {
        self.max_shots
    }

    pub fn has_unlimited_ammo(&self) -> bool {
        self.max_shots == 0
    }

    pub fn is_invincible(&self) -> bool {
        self.lives == 0 && self.is_alive
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn facing(&self) -> HorizontalDir {
        self.current_dir
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl Entity for Player {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
