/// Sprite loading.
///
/// Sprites are plain-text ASCII art, one file per image.  A sprite that
/// cannot be loaded is replaced by a red placeholder block with a `?` in it,
/// so a typo in a file name shows up on screen instead of stopping the game.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crossterm::style::Color;
use tracing::warn;

use crate::config::GameConfig;
use crate::entities::{CELL_HEIGHT, CELL_WIDTH};

const PLACEHOLDER_COLS: usize = 6;
const PLACEHOLDER_ROWS: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    rows: Vec<String>,
    cols: usize,
    /// Colour override; `None` uses the configured font colour.
    pub color: Option<Color>,
    placeholder: bool,
}

impl Sprite {
    /// Build a sprite from rows of text.  Trailing whitespace is kept so
    /// mirrored sprites stay aligned.
    pub fn from_rows<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        let rows: Vec<String> = rows.into_iter().map(Into::into).collect();
        let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        Sprite {
            rows,
            cols,
            color: None,
            placeholder: false,
        }
    }

    /// The "square of doom": a solid red block with a question mark.
    pub fn placeholder() -> Self {
        let mut rows = vec![" ".repeat(PLACEHOLDER_COLS); PLACEHOLDER_ROWS];
        let mid = PLACEHOLDER_ROWS / 2;
        let mut centre: Vec<char> = rows[mid].chars().collect();
        centre[PLACEHOLDER_COLS / 2] = '?';
        rows[mid] = centre.into_iter().collect();
        Sprite {
            rows,
            cols: PLACEHOLDER_COLS,
            color: Some(Color::Red),
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Size of the sprite's bounding box in world units.
    pub fn size(&self) -> (f32, f32) {
        (self.cols as f32 * CELL_WIDTH, self.rows.len() as f32 * CELL_HEIGHT)
    }

    /// Horizontally flipped copy of one row, padded to the sprite width.
    /// Glyphs with an obvious handedness are swapped for their mirror image.
    pub fn mirrored_row(&self, index: usize) -> String {
        let Some(row) = self.rows.get(index) else {
            return String::new();
        };
        let pad = self.cols.saturating_sub(row.chars().count());
        row.chars()
            .chain(std::iter::repeat(' ').take(pad))
            .rev()
            .map(mirror_glyph)
            .collect()
    }
}

fn mirror_glyph(c: char) -> char {
    match c {
        '/' => '\\',
        '\\' => '/',
        '<' => '>',
        '>' => '<',
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '▶' => '◀',
        '◀' => '▶',
        other => other,
    }
}

/// Resolve `file_name` against an optional directory.
pub fn sprite_path(file_name: &str, directory: Option<&Path>) -> PathBuf {
    match directory {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Load a sprite, or the placeholder if anything goes wrong.
///
/// `dest` names the object the sprite is for ("the player", "a ground
/// object") and only shows up in the log line.
pub fn load_sprite(file_name: Option<&str>, directory: Option<&Path>, dest: &str) -> Sprite {
    match try_load(file_name, directory) {
        Ok(sprite) => sprite,
        Err(reason) => {
            warn!(%reason, dest, "loaded the placeholder sprite instead");
            Sprite::placeholder()
        }
    }
}

fn try_load(file_name: Option<&str>, directory: Option<&Path>) -> Result<Sprite, String> {
    let file_name = file_name.ok_or_else(|| "an image file wasn't specified".to_string())?;
    let path = sprite_path(file_name, directory);
    let text = fs::read_to_string(&path).map_err(|e| format!("read {}: {e}", path.display()))?;

    // Blank lines at the end of the file are an editor artefact, not art.
    let mut rows: Vec<&str> = text.lines().collect();
    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(format!("{} is empty", path.display()));
    }
    Ok(Sprite::from_rows(rows.into_iter().map(|r| r.trim_end_matches('\r'))))
}

/// Every sprite a session needs, loaded once at start-up.
#[derive(Clone, Debug)]
pub struct SpriteSet {
    pub player: Rc<Sprite>,
    pub missile: Rc<Sprite>,
    pub enemy: Rc<Sprite>,
    pub bomb: Rc<Sprite>,
    pub building: Rc<Sprite>,
    /// `None` means razed buildings disappear.
    pub building_razed: Option<Rc<Sprite>>,
    pub splash: Option<Rc<Sprite>>,
    pub background: Option<Rc<Sprite>>,
}

impl SpriteSet {
    pub fn load(config: &GameConfig) -> Self {
        let dir = config.images_dir.as_deref();
        let required =
            |file: &Option<String>, dest: &str| Rc::new(load_sprite(file.as_deref(), dir, dest));
        let optional = |file: &Option<String>, dest: &str| {
            file.as_deref().map(|f| Rc::new(load_sprite(Some(f), dir, dest)))
        };

        SpriteSet {
            player: required(&config.player_image, "the player"),
            missile: required(&config.missile_image, "the missile"),
            enemy: required(&config.enemy_image, "the enemy"),
            bomb: required(&config.bomb_image, "the bomb"),
            building: required(&config.building_image, "the building"),
            building_razed: optional(&config.building_razed_image, "a razed ground object"),
            splash: optional(&config.splash_image, "the splash screen"),
            background: optional(&config.background_image, "the background"),
        }
    }
}
