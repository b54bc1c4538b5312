/// Modal yes/no ("polar") dialog box.
///
/// The answer can be picked with the mouse, with the Y/N keys, or by moving
/// the focus with the arrow keys (or Tab) and pressing Enter.  Esc answers
/// "no".  Opening the dialog captures the mouse; dropping it releases the
/// mouse again, whichever way the dialog is left.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    style::{self, Color, Print},
    ExecutableCommand, QueueableCommand,
};

use crate::clock::FrameClock;
use crate::input::EventSource;

const BOX_COLS: u16 = 40;
const BOX_ROWS: u16 = 9;
const BUTTON_COLS: u16 = 9;
/// Horizontal distance from the box centre to each button's centre.
const BUTTON_CENTER_OFFSET: u16 = 8;
/// Poll rate while waiting for an answer.
const DIALOG_FPS: u32 = 30;

const C_BOX: Color = Color::Grey;
const C_SHADOW: Color = Color::Black;
const C_PROMPT: Color = Color::DarkGrey;
const C_BUTTON: Color = Color::DarkGrey;
const C_BUTTON_FOCUSED: Color = Color::Blue;
const C_BUTTON_TEXT: Color = Color::White;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Yes,
    No,
}

/// A rectangle of terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub col: u16,
    pub row: u16,
    pub cols: u16,
    pub rows: u16,
}

impl CellRect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.col
            && col < self.col + self.cols
            && row >= self.row
            && row < self.row + self.rows
    }
}

/// Where the box and its buttons sit on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogLayout {
    pub frame: CellRect,
    pub yes: CellRect,
    pub no: CellRect,
}

impl DialogLayout {
    /// Centre the box in a `cols` × `rows` cell area.
    pub fn centered(cols: u16, rows: u16) -> Self {
        let frame = CellRect {
            col: cols.saturating_sub(BOX_COLS) / 2,
            row: rows.saturating_sub(BOX_ROWS) / 2,
            cols: BOX_COLS,
            rows: BOX_ROWS,
        };
        let centre = frame.col + BOX_COLS / 2;
        let button_row = frame.row + BOX_ROWS - 3;
        let button = |centre_col: u16| CellRect {
            col: centre_col.saturating_sub(BUTTON_COLS / 2),
            row: button_row,
            cols: BUTTON_COLS,
            rows: 1,
        };
        DialogLayout {
            frame,
            yes: button(centre.saturating_sub(BUTTON_CENTER_OFFSET)),
            no: button(centre + BUTTON_CENTER_OFFSET),
        }
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<Button> {
        if self.yes.contains(col, row) {
            Some(Button::Yes)
        } else if self.no.contains(col, row) {
            Some(Button::No)
        } else {
            None
        }
    }
}

// ── Answer logic ──────────────────────────────────────────────────────────────

/// Focus tracking and event interpretation, independent of any terminal.
#[derive(Clone, Debug)]
pub struct DialogState {
    layout: DialogLayout,
    focused: Button,
    /// Button the left mouse button went down on.
    pressed: Option<Button>,
}

impl DialogState {
    pub fn new(layout: DialogLayout) -> Self {
        DialogState {
            layout,
            focused: Button::Yes,
            pressed: None,
        }
    }

    pub fn focused(&self) -> Button {
        self.focused
    }

    pub fn layout(&self) -> &DialogLayout {
        &self.layout
    }

    /// Feed one event.  Returns `Some(answer)` once the user has decided.
    pub fn handle_event(&mut self, event: &Event) -> Option<bool> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(*code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => None,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Option<bool> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
            KeyCode::Enter => Some(self.focused == Button::Yes),
            KeyCode::Left => {
                self.focused = Button::Yes;
                None
            }
            KeyCode::Right => {
                self.focused = Button::No;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.focused = match self.focused {
                    Button::Yes => Button::No,
                    Button::No => Button::Yes,
                };
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Option<bool> {
        let over = self.layout.button_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(button) = over {
                    self.focused = button;
                }
                None
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = over;
                if let Some(button) = over {
                    self.focused = button;
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let pressed = self.pressed.take();
                match over {
                    // A press that started elsewhere doesn't count
                    Some(button) if pressed.is_none() || pressed == Some(button) => {
                        Some(button == Button::Yes)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

// ── Terminal dialog ───────────────────────────────────────────────────────────

/// The on-screen dialog.  Holds the mouse capture for as long as it lives.
pub struct PolarDialog<'a, W: Write> {
    out: &'a mut W,
    state: DialogState,
}

impl<'a, W: Write> PolarDialog<'a, W> {
    /// Open a dialog centred in a `cols` × `rows` cell area.
    pub fn open(out: &'a mut W, cols: u16, rows: u16) -> io::Result<Self> {
        out.execute(EnableMouseCapture)?;
        Ok(PolarDialog {
            out,
            state: DialogState::new(DialogLayout::centered(cols, rows)),
        })
    }

    /// Show `prompt` and wait for an answer: `true` for yes.
    pub fn get_answer(&mut self, prompt: &str, events: &mut impl EventSource) -> io::Result<bool> {
        let mut clock = FrameClock::new();
        self.render_box(prompt)?;

        loop {
            self.render_buttons()?;
            while let Some(event) = events.next_event()? {
                if let Some(answer) = self.state.handle_event(&event) {
                    return Ok(answer);
                }
            }
            clock.tick(DIALOG_FPS);
        }
    }

    fn render_box(&mut self, prompt: &str) -> io::Result<()> {
        let frame = self.state.layout().frame;
        let blank = " ".repeat(frame.cols as usize);

        // Shadow first, one cell down and to the right
        self.out.queue(style::SetBackgroundColor(C_SHADOW))?;
        for r in 1..=frame.rows {
            self.out.queue(cursor::MoveTo(frame.col + 1, frame.row + r))?;
            self.out.queue(Print(&blank))?;
        }

        self.out.queue(style::SetBackgroundColor(C_BOX))?;
        for r in 0..frame.rows {
            self.out.queue(cursor::MoveTo(frame.col, frame.row + r))?;
            self.out.queue(Print(&blank))?;
        }

        let inner = frame.cols.saturating_sub(4) as usize;
        let text: String = prompt.chars().take(inner).collect();
        let col = frame.col + (frame.cols - text.chars().count() as u16) / 2;
        self.out.queue(cursor::MoveTo(col, frame.row + 2))?;
        self.out.queue(style::SetForegroundColor(C_PROMPT))?;
        self.out.queue(Print(text))?;
        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }

    fn render_buttons(&mut self) -> io::Result<()> {
        let layout = *self.state.layout();
        let buttons = [(Button::Yes, layout.yes, "Yes"), (Button::No, layout.no, "No")];
        for (button, rect, label) in buttons {
            let bg = if self.state.focused() == button {
                C_BUTTON_FOCUSED
            } else {
                C_BUTTON
            };
            self.out.queue(cursor::MoveTo(rect.col, rect.row))?;
            self.out.queue(style::SetBackgroundColor(bg))?;
            self.out.queue(style::SetForegroundColor(C_BUTTON_TEXT))?;
            self.out.queue(Print(format!("{:^width$}", label, width = rect.cols as usize)))?;
        }
        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> Drop for PolarDialog<'_, W> {
    fn drop(&mut self) {
        let _ = self.out.execute(DisableMouseCapture);
    }
}
