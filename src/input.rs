/// Input plumbing: key names, held-key tracking and event sources.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

/// A key counts as held if its last press/repeat event arrived within this
/// many frames (about 133 ms at 60 FPS).  Terminals without key-release
/// events re-send presses at the OS repeat rate, which keeps a held key
/// alive once repeating starts.  The initial repeat delay (250-660 ms) is
/// longer than the window, so there the first press moves briefly and the
/// key resumes when the repeats begin.
pub const HOLD_WINDOW: u64 = 8;

/// Parse a configuration key name ("Left", "Space", "LeftCtrl", "F1", "p").
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c.to_ascii_lowercase()));
    }

    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "insert" => KeyCode::Insert,
        "delete" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "pause" => KeyCode::Pause,
        "leftctrl" | "lctrl" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
        "rightctrl" | "rctrl" => KeyCode::Modifier(ModifierKeyCode::RightControl),
        "leftshift" | "lshift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
        "rightshift" | "rshift" => KeyCode::Modifier(ModifierKeyCode::RightShift),
        "leftalt" | "lalt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        "rightalt" | "ralt" => KeyCode::Modifier(ModifierKeyCode::RightAlt),
        other => {
            let n: u8 = other.strip_prefix('f')?.parse().ok()?;
            if (1..=24).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
    };
    Some(key)
}

/// Letters compare case-insensitively so Shift doesn't break bindings.
pub fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

pub fn key_matches(bindings: &[KeyCode], code: KeyCode) -> bool {
    bindings.contains(&normalize_key(code))
}

/// Esc, Alt+F4 or Ctrl+C ask to leave the game.
pub fn is_quit_event(event: &Event) -> bool {
    match event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Esc => true,
            KeyCode::F(4) => modifiers.contains(KeyModifiers::ALT),
            KeyCode::Char('c') | KeyCode::Char('C') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        },
        _ => false,
    }
}

// ── Held keys ─────────────────────────────────────────────────────────────────

/// Tracks which keys are currently held down.
///
/// Records the frame of the last press/repeat event per key.  Release
/// events (terminals with keyboard enhancement) drop the key immediately;
/// elsewhere keys expire after `HOLD_WINDOW` frames of silence.
#[derive(Debug, Default)]
pub struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, code: KeyCode, frame: u64) {
        self.last_seen.insert(normalize_key(code), frame);
    }

    pub fn release(&mut self, code: KeyCode) {
        self.last_seen.remove(&normalize_key(code));
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }

    pub fn is_held(&self, code: KeyCode, frame: u64) -> bool {
        self.last_seen
            .get(&normalize_key(code))
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// True if any of `bindings` is held.
    pub fn is_active(&self, bindings: &[KeyCode], frame: u64) -> bool {
        bindings.iter().any(|&code| self.is_held(code, frame))
    }
}

// ── Event sources ─────────────────────────────────────────────────────────────

/// Non-blocking supply of input events.
pub trait EventSource {
    /// The next pending event, or `None` if nothing is waiting.
    fn next_event(&mut self) -> io::Result<Option<Event>>;
}

/// Reads the real terminal without ever blocking.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn next_event(&mut self) -> io::Result<Option<Event>> {
        if event::poll(Duration::ZERO)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Scripted events, handy for tests and replays.
impl EventSource for VecDeque<Event> {
    fn next_event(&mut self) -> io::Result<Option<Event>> {
        Ok(self.pop_front())
    }
}
