/// Shared entity vocabulary: bounding boxes, directions and spawn specs.
///
/// The concrete entity kinds live in their own modules (`ammo`, `enemy`,
/// `player`, `building`); this module only holds what they have in common.

use std::rc::Rc;

use crate::assets::Sprite;

/// World units covered by one terminal column.
pub const CELL_WIDTH: f32 = 10.0;
/// World units covered by one terminal row.
pub const CELL_HEIGHT: f32 = 20.0;

// ── Bounding box ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in world units.  `x`/`y` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.center_x(), self.center_y())
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_center(&mut self, (cx, cy): (f32, f32)) {
        self.x = cx - self.w / 2.0;
        self.y = cy - self.h / 2.0;
    }

    pub fn set_center_x(&mut self, cx: f32) {
        self.x = cx - self.w / 2.0;
    }

    /// Straight-line motion: shift by `velocity × dt` on both axes.
    pub fn advance(&mut self, (vx, vy): (f32, f32), dt: f32) {
        self.x += vx * dt;
        self.y += vy * dt;
    }

    /// Strict overlap; boxes that merely touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains_point(&self, (px, py): (f32, f32)) -> bool {
        px >= self.left() && px < self.right() && py >= self.top() && py < self.bottom()
    }
}

// ── Directions ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalDir {
    Left,
    Right,
}

impl HorizontalDir {
    /// Unit velocity sign along x.
    pub fn sign(self) -> f32 {
        match self {
            HorizontalDir::Left => -1.0,
            HorizontalDir::Right => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalDir {
    /// Toward the top edge of the field.
    Up,
    /// Toward the bottom edge of the field.
    Down,
}

impl VerticalDir {
    pub fn from_upward(is_upward: bool) -> Self {
        if is_upward {
            VerticalDir::Up
        } else {
            VerticalDir::Down
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            VerticalDir::Up => VerticalDir::Down,
            VerticalDir::Down => VerticalDir::Up,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            VerticalDir::Up => -1.0,
            VerticalDir::Down => 1.0,
        }
    }
}

// ── Shared capability ─────────────────────────────────────────────────────────

/// Anything that occupies space on the field.
pub trait Entity {
    fn bounds(&self) -> Rect;
}

// ── Spawn configuration ───────────────────────────────────────────────────────

/// Everything a launcher needs to create a projectile.  Shared (not owned)
/// by the player for missiles and by every enemy for bombs.
#[derive(Clone, Debug)]
pub struct AmmoSpec {
    pub field: Rect,
    pub sprite: Rc<Sprite>,
    pub direction: VerticalDir,
    pub speed: f32,
}
