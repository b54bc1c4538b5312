/// The flying bad guys.
///
/// A hit enemy is never removed from play.  It is knocked out: parked just
/// off the left edge of the field and kept asleep for a few seconds, then
/// woken up on a random side of the field with a fresh bombing target.

use std::rc::Rc;

use rand::Rng;
use tracing::debug;

use crate::ammo::Ammo;
use crate::assets::Sprite;
use crate::entities::{AmmoSpec, Entity, HorizontalDir, Rect};

/// Enemies never fly slower than this many units per second.
pub const MIN_ENEMY_SPEED: f32 = 100.0;

/// Bomb targets keep at least this far from the field's side edges.
const TARGET_MARGIN: i32 = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyState {
    /// Out of play until `countdown` (seconds) runs out.
    Asleep { countdown: f32 },
    /// Crossing the field; drops one bomb when passing over `target`.
    Awake { target: (f32, f32), bomb_dropped: bool },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub rect: Rect,
    state: EnemyState,
    direction: HorizontalDir,
    previous_direction: HorizontalDir,
    speed: f32,
    field: Rect,
    top_boundary: f32,
    bottom_boundary: f32,
    bomb_spec: Rc<AmmoSpec>,
    sprite: Rc<Sprite>,
    /// Whether the sprite is drawn mirrored.
    flipped: bool,
}

impl Enemy {
    /// Create an enemy that starts either awake or asleep (50/50).
    ///
    /// `boundaries` is the `(top, bottom)` corridor the enemy may fly in.
    pub fn new(
        bomb_spec: Rc<AmmoSpec>,
        field: Rect,
        boundaries: (f32, f32),
        sprite: Rc<Sprite>,
        speed: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let (w, h) = sprite.size();
        let mut enemy = Enemy {
            rect: Rect::new(0.0, 0.0, w, h),
            state: EnemyState::Asleep { countdown: 0.0 },
            direction: HorizontalDir::Right,
            previous_direction: HorizontalDir::Right,
            speed: if speed >= MIN_ENEMY_SPEED { speed } else { MIN_ENEMY_SPEED },
            field,
            top_boundary: boundaries.0,
            bottom_boundary: boundaries.1,
            bomb_spec,
            sprite,
            flipped: false,
        };

        if rng.gen_bool(0.5) {
            enemy.wake_up(rng);
        } else {
            enemy.knock_out(rng);
        }
        enemy
    }

    /// Advance one tick.  Returns the bomb dropped this tick, if any.
    pub fn update(&mut self, delta_time: f32, rng: &mut impl Rng) -> Option<Ammo> {
        match self.state {
            EnemyState::Awake { target, bomb_dropped } => {
                self.rect.advance((self.direction.sign() * self.speed, 0.0), delta_time);

                if self.rect.right() < 0.0 || self.rect.left() > self.field.right() {
                    self.knock_out(rng);
                    return None;
                }

                if !bomb_dropped && self.rect.contains_point(target) {
                    self.state = EnemyState::Awake { target, bomb_dropped: true };
                    return Some(self.drop_bomb());
                }
                None
            }
            EnemyState::Asleep { countdown } if countdown > 0.0 => {
                self.state = EnemyState::Asleep {
                    countdown: countdown - delta_time,
                };
                None
            }
            EnemyState::Asleep { .. } => {
                self.wake_up(rng);
                None
            }
        }
    }

    /// Put the enemy to sleep off-field for 1-5 seconds.
    pub fn knock_out(&mut self, rng: &mut impl Rng) {
        self.previous_direction = self.direction;
        self.rect.set_right(-1.0);
        let countdown = rng.gen_range(1..=5) as f32;
        self.state = EnemyState::Asleep { countdown };
        debug!(countdown, "enemy knocked out");
    }

    fn wake_up(&mut self, rng: &mut impl Rng) {
        self.direction = if rng.gen_bool(0.5) {
            HorizontalDir::Right
        } else {
            HorizontalDir::Left
        };

        // Enter from the side opposite the direction of travel
        match self.direction {
            HorizontalDir::Right => self.rect.set_right(-1.0),
            HorizontalDir::Left => self.rect.x = self.field.right() + 1.0,
        }

        if self.direction != self.previous_direction {
            self.flipped = !self.flipped;
        }

        let top = self.top_boundary as i32;
        let lowest = (self.bottom_boundary - self.rect.h) as i32;
        self.rect.y = if lowest >= top {
            rng.gen_range(top..=lowest) as f32
        } else {
            0.0
        };

        let max_x = self.field.w as i32 - TARGET_MARGIN;
        let target_x = if max_x >= TARGET_MARGIN {
            rng.gen_range(TARGET_MARGIN..=max_x) as f32
        } else {
            self.field.center_x()
        };
        let target = (target_x, self.rect.center_y());

        self.state = EnemyState::Awake {
            target,
            bomb_dropped: false,
        };
        debug!(direction = ?self.direction, y = self.rect.y, target_x, "enemy woke up");
    }

    fn drop_bomb(&self) -> Ammo {
        // Bomb specs carry the launcher's facing; bombs fall the other way
        Ammo::new(
            &self.bomb_spec,
            self.rect.center(),
            self.bomb_spec.direction.opposite(),
        )
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_awake(&self) -> bool {
        matches!(self.state, EnemyState::Awake { .. })
    }

    pub fn direction(&self) -> HorizontalDir {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }
}

impl Entity for Enemy {
    fn bounds(&self) -> Rect {
        self.rect
    }
}
