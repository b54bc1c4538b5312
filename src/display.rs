/// Rendering layer: all terminal drawing for the game screens lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// session.  No game logic is performed; this module only translates state
/// into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Attribute, Color, Print},
    terminal,
    QueueableCommand,
};
use flak::assets::Sprite;
use flak::entities::{Rect, CELL_HEIGHT, CELL_WIDTH};
use flak::session::Session;

const C_SHADOW: Color = Color::DarkGrey;
const C_PLACEHOLDER: Color = Color::Red;
const C_LIVES: Color = Color::Red;
const C_SHOTS: Color = Color::Cyan;

const LIFE_GLYPH: &str = "♥";
const SHOT_GLYPH: &str = "|";

/// Rows between the centre of the field and the play-again prompt.
const PROMPT_OFFSET_ROWS: u16 = 2;

/// Size of the field in terminal cells.
pub fn field_cells(field: Rect) -> (u16, u16) {
    (
        (field.w / CELL_WIDTH).floor().max(0.0) as u16,
        (field.h / CELL_HEIGHT).floor().max(0.0) as u16,
    )
}

fn to_cell((x, y): (f32, f32)) -> (i32, i32) {
    ((x / CELL_WIDTH).round() as i32, (y / CELL_HEIGHT).round() as i32)
}

// ── HUD cache ─────────────────────────────────────────────────────────────────

/// Text that only needs re-formatting when the underlying value changes.
#[derive(Debug, Default)]
pub struct Hud {
    score_text: Option<String>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    fn score_text(&mut self, score: i64, has_changed: bool) -> &str {
        if has_changed || self.score_text.is_none() {
            self.score_text = Some(format!("Score: {score}"));
        }
        self.score_text.as_deref().unwrap_or_default()
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame of play.
pub fn render<W: Write>(
    out: &mut W,
    session: &Session,
    hud: &mut Hud,
    score_changed: bool,
    fps: f32,
) -> std::io::Result<()> {
    let state = &session.state;
    let fg = session.config.font_color();
    let cells = field_cells(session.field);

    clear(out, session.config.background_color())?;

    if let Some(background) = &session.sprites.background {
        draw_centered_sprite(out, background, cells, fg)?;
    }

    for bomb in &state.bombs {
        draw_sprite(out, bomb.sprite(), bomb.rect, false, fg, cells)?;
    }
    for missile in &state.missiles {
        draw_sprite(out, missile.sprite(), missile.rect, false, fg, cells)?;
    }
    for enemy in &state.enemies {
        draw_sprite(out, enemy.sprite(), enemy.rect, enemy.is_flipped(), fg, cells)?;
    }
    for building in &state.buildings {
        draw_sprite(out, building.sprite(), building.rect, false, fg, cells)?;
    }
    if state.player.is_alive {
        let player = &state.player;
        draw_sprite(out, player.sprite(), player.rect, player.is_flipped(), fg, cells)?;
    }

    let score = hud.score_text(state.score, score_changed);
    draw_text(out, to_cell(session.config.score_pos), score, fg, cells)?;
    draw_high_score(out, session, fg, cells)?;

    let lives = LIFE_GLYPH.repeat(state.lives_indicators as usize);
    draw_text(out, to_cell(session.config.num_lives_pos), &lives, C_LIVES, cells)?;
    if !state.player.has_unlimited_ammo() {
        let shots = SHOT_GLYPH.repeat(state.shot_indicators as usize);
        draw_text(out, to_cell(session.config.num_shots_pos), &shots, C_SHOTS, cells)?;
    }

    if state.is_screen_info_shown {
        draw_screen_info(out, session.field, fps, fg, cells)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, cells.1.saturating_sub(1)))?;
    out.flush()
}

/// Full-screen splash image on the background colour.
pub fn draw_splash<W: Write>(
    out: &mut W,
    session: &Session,
    splash: &Sprite,
) -> std::io::Result<()> {
    clear(out, session.config.background_color())?;
    draw_centered_sprite(out, splash, field_cells(session.field), session.config.font_color())?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// A message centred on the field, with a drop shadow.
pub fn draw_modal_text<W: Write>(
    out: &mut W,
    field: Rect,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let cells = field_cells(field);
    let (col, row) = centered_origin(text, cells, 0);

    draw_text(out, (col + 1, row + 1), text, C_SHADOW, cells)?;
    draw_text(out, (col, row), text, color, cells)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

/// The "play again" line just below the modal message.
pub fn draw_prompt<W: Write>(
    out: &mut W,
    field: Rect,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let cells = field_cells(field);
    let origin = centered_origin(text, cells, PROMPT_OFFSET_ROWS);
    draw_text(out, origin, text, color, cells)?;
    out.queue(style::ResetColor)?;
    out.flush()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn clear<W: Write>(out: &mut W, background: Color) -> std::io::Result<()> {
    out.queue(style::SetBackgroundColor(background))?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    Ok(())
}

fn centered_origin(text: &str, (cols, rows): (u16, u16), row_offset: u16) -> (i32, i32) {
    let width = text.chars().count() as i32;
    (
        (i32::from(cols) - width) / 2,
        i32::from(rows / 2 + row_offset),
    )
}

/// Print `text` at a cell position, clipped to the field.
fn draw_text<W: Write>(
    out: &mut W,
    (col, row): (i32, i32),
    text: &str,
    color: Color,
    (cols, rows): (u16, u16),
) -> std::io::Result<()> {
    if row < 0 || row >= i32::from(rows) {
        return Ok(());
    }
    let chars: Vec<char> = text.chars().collect();
    let start = (-col).max(0) as usize;
    let end = (i32::from(cols) - col).clamp(0, chars.len() as i32) as usize;
    if start >= end {
        return Ok(());
    }
    let visible: String = chars[start..end].iter().collect();
    out.queue(cursor::MoveTo((col + start as i32) as u16, row as u16))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(visible))?;
    Ok(())
}

fn draw_sprite<W: Write>(
    out: &mut W,
    sprite: &Sprite,
    rect: Rect,
    flipped: bool,
    default_color: Color,
    cells: (u16, u16),
) -> std::io::Result<()> {
    // The placeholder is drawn in reverse video: a solid block with a `?` cut out
    if sprite.is_placeholder() {
        out.queue(style::SetAttribute(Attribute::Reverse))?;
    }
    let color = if sprite.is_placeholder() {
        C_PLACEHOLDER
    } else {
        sprite.color.unwrap_or(default_color)
    };

    let (col, row) = to_cell((rect.x, rect.y));
    for i in 0..sprite.row_count() {
        let line = if flipped {
            sprite.mirrored_row(i)
        } else {
            sprite.rows()[i].clone()
        };
        draw_text(out, (col, row + i as i32), &line, color, cells)?;
    }

    if sprite.is_placeholder() {
        out.queue(style::SetAttribute(Attribute::NoReverse))?;
    }
    Ok(())
}

fn draw_centered_sprite<W: Write>(
    out: &mut W,
    sprite: &Sprite,
    cells: (u16, u16),
    default_color: Color,
) -> std::io::Result<()> {
    let col = (i32::from(cells.0) - sprite.cols() as i32) / 2;
    let row = (i32::from(cells.1) - sprite.row_count() as i32) / 2;
    let rect = Rect::new(col as f32 * CELL_WIDTH, row as f32 * CELL_HEIGHT, 0.0, 0.0);
    draw_sprite(out, sprite, rect, false, default_color, cells)
}

fn draw_high_score<W: Write>(
    out: &mut W,
    session: &Session,
    color: Color,
    cells: (u16, u16),
) -> std::io::Result<()> {
    let text = format!("High score: {}", session.high_score);
    let origin = match session.config.high_score_pos {
        Some(pos) => to_cell(pos),
        None => {
            let (col, _) = centered_origin(&text, cells, 0);
            (col, to_cell(session.config.score_pos).1)
        }
    };
    draw_text(out, origin, &text, color, cells)
}

fn draw_screen_info<W: Write>(
    out: &mut W,
    field: Rect,
    fps: f32,
    color: Color,
    cells: (u16, u16),
) -> std::io::Result<()> {
    let bottom = i32::from(cells.1);
    draw_text(out, (1, bottom - 3), &format!("FPS: {fps:.1}"), color, cells)?;
    draw_text(
        out,
        (1, bottom - 2),
        &format!("Screen size: {}x{}", field.w, field.h),
        color,
        cells,
    )
}
