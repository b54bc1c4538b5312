mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::{thread_rng, Rng};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flak::assets::Sprite;
use flak::clock::FrameClock;
use flak::compute::{player_reload, player_shoot, steer_player, tick, toggle_pause};
use flak::config::{GameConfig, CONFIG_FILE};
use flak::dialog::PolarDialog;
use flak::entities::{Rect, CELL_HEIGHT, CELL_WIDTH};
use flak::high_score::HighScoreStore;
use flak::input::{is_quit_event, key_matches, EventSource, HeldKeys, TerminalEvents};
use flak::session::{EndMessage, Session};

use display::Hud;

const LOG_FILE: &str = "flak.log";
const QUIT_PROMPT: &str = "Are you sure you want to quit?";
const PLAY_AGAIN_PROMPT: &str = "Press Enter to play again";
const PAUSE_TEXT: &str = "Pause";

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to a file.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match File::create(LOG_FILE) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        error!(%info, ?backtrace, "panic");
    }));
}

// ── Terminal setup ────────────────────────────────────────────────────────────

/// Puts the terminal into game mode and restores it when dropped, including
/// when only part of the setup succeeded.
struct TerminalGuard {
    raw_mode: bool,
    alternate_screen: bool,
    /// The terminal reports key repeats and releases.
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn new(title: &str) -> std::io::Result<Self> {
        let mut guard = TerminalGuard {
            raw_mode: false,
            alternate_screen: false,
            keyboard_enhanced: false,
        };
        let mut out = stdout();

        terminal::enable_raw_mode()?;
        guard.raw_mode = true;
        out.execute(terminal::EnterAlternateScreen)?;
        guard.alternate_screen = true;
        out.execute(cursor::Hide)?;
        out.execute(terminal::SetTitle(title))?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            out.execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES,
            ))?;
            guard.keyboard_enhanced = true;
        }
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(cursor::Show);
        if self.alternate_screen {
            let _ = out.execute(terminal::LeaveAlternateScreen);
        }
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// The field in world units: the whole terminal when fullscreen, otherwise
/// the configured width at the configured aspect ratio.
fn field_rect(config: &GameConfig) -> std::io::Result<Rect> {
    if config.is_fullscreen {
        let (cols, rows) = terminal::size()?;
        Ok(Rect::new(0.0, 0.0, f32::from(cols) * CELL_WIDTH, f32::from(rows) * CELL_HEIGHT))
    } else {
        Ok(Rect::new(0.0, 0.0, config.screen_width, config.screen_height()))
    }
}

// ── Quit handling ─────────────────────────────────────────────────────────────

/// Ask for confirmation before leaving the game.
fn handle_quit<W: Write>(
    out: &mut W,
    session: &mut Session,
    events: &mut impl EventSource,
) -> std::io::Result<()> {
    let (cols, rows) = display::field_cells(session.field);
    let is_sure_quit = {
        let mut dialog = PolarDialog::open(out, cols, rows)?;
        dialog.get_answer(QUIT_PROMPT, events)?
    };
    session.resolve_quit(is_sure_quit);
    Ok(())
}

// ── Splash & prompts ──────────────────────────────────────────────────────────

/// Show the splash image until a key goes down or comes back up.
fn display_splash_screen<W: Write>(
    out: &mut W,
    session: &mut Session,
    splash: &Sprite,
    events: &mut impl EventSource,
) -> std::io::Result<()> {
    display::draw_splash(out, session, splash)?;
    let mut clock = FrameClock::new();

    loop {
        while let Some(event) = events.next_event()? {
            if is_quit_event(&event) {
                return handle_quit(out, session, events);
            }
            if let Event::Key(KeyEvent { kind, .. }) = event {
                if kind != KeyEventKind::Repeat {
                    return Ok(());
                }
            }
        }
        clock.tick(session.config.target_fps);
    }
}

/// Show the end-of-round message and wait for Enter.  Answering the quit
/// dialog ends the wait too: "no" goes on to the next round.
fn prompt_play_again<W: Write>(
    out: &mut W,
    session: &mut Session,
    message: EndMessage,
    events: &mut impl EventSource,
) -> std::io::Result<()> {
    let color = session.config.font_color();
    display::draw_modal_text(out, session.field, session.message_text(message), color)?;
    display::draw_prompt(out, session.field, PLAY_AGAIN_PROMPT, color)?;

    let mut clock = FrameClock::new();
    loop {
        while let Some(event) = events.next_event()? {
            if is_quit_event(&event) {
                return handle_quit(out, session, events);
            }
            if let Event::Key(KeyEvent {
                code: KeyCode::Enter,
                kind: KeyEventKind::Press,
                ..
            }) = event
            {
                return Ok(());
            }
        }
        clock.tick(session.config.target_fps);
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Per-round input bookkeeping.
struct InputState {
    held: HeldKeys,
    frame: u64,
    /// Reload fires on key release when the terminal reports releases.
    reload_on_release: bool,
}

/// React to the player's input.
///
/// One-shot actions (shoot, pause, reload, screen info) act on individual
/// events; movement looks at which keys are currently held.
fn handle_input<W: Write>(
    out: &mut W,
    session: &mut Session,
    events: &mut impl EventSource,
    input: &mut InputState,
    delta_time: f32,
) -> std::io::Result<()> {
    let bindings = session.bindings.clone();

    while let Some(event) = events.next_event()? {
        if is_quit_event(&event) {
            handle_quit(out, session, events)?;
            input.held.clear();
            return Ok(());
        }

        let Event::Key(KeyEvent { code, kind, .. }) = event else {
            continue;
        };
        let state = &mut session.state;
        match kind {
            KeyEventKind::Press => {
                input.held.press(code, input.frame);
                if key_matches(&bindings.shoot, code) {
                    player_shoot(state);
                } else if key_matches(&bindings.pause, code) {
                    toggle_pause(state);
                } else if code == KeyCode::F(1) {
                    state.is_screen_info_shown = !state.is_screen_info_shown;
                } else if !input.reload_on_release && key_matches(&bindings.reload, code) {
                    player_reload(state);
                }
            }
            KeyEventKind::Repeat => input.held.press(code, input.frame),
            KeyEventKind::Release => {
                input.held.release(code);
                if key_matches(&bindings.reload, code) {
                    player_reload(state);
                }
            }
        }
    }

    let left = input.held.is_active(&bindings.move_left, input.frame);
    let right = input.held.is_active(&bindings.move_right, input.frame);
    steer_player(&mut session.state, left, right, delta_time);
    Ok(())
}

/// Run one round: collisions, movement, rendering and input, frame after
/// frame, until the player dies, the last building falls, or the player quits.
fn run_main_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    events: &mut impl EventSource,
    rng: &mut impl Rng,
    reload_on_release: bool,
) -> std::io::Result<()> {
    let mut clock = FrameClock::new();
    let mut hud = Hud::new();
    let mut input = InputState {
        held: HeldKeys::new(),
        frame: 0,
        reload_on_release,
    };
    let mut delta_time = 0.0;

    while session.round_should_continue() {
        input.frame += 1;

        if !session.state.is_paused {
            let score_changed = tick(&mut session.state, delta_time, rng);
            display::render(out, session, &mut hud, score_changed, clock.fps())?;
        } else if !session.state.is_pause_displayed {
            display::draw_modal_text(out, session.field, PAUSE_TEXT, session.config.font_color())?;
            session.state.is_pause_displayed = true;
        }

        handle_input(out, session, events, &mut input, delta_time)?;

        // Don't go above the target frame rate
        delta_time = clock.tick(session.config.target_fps);
    }
    Ok(())
}

fn run<W: Write>(out: &mut W, config: GameConfig, reload_on_release: bool) -> anyhow::Result<()> {
    let mut rng = thread_rng();
    let mut events = TerminalEvents;
    let field = field_rect(&config).context("read the terminal size")?;
    let mut session = Session::new(config, HighScoreStore::default(), field, &mut rng);

    if let Some(splash) = session.sprites.splash.clone() {
        display_splash_screen(out, &mut session, &splash, &mut events)
            .context("show the splash screen")?;
    }

    while session.is_still_playing {
        session.start_round(&mut rng);
        run_main_loop(out, &mut session, &mut events, &mut rng, reload_on_release)
            .context("run the game loop")?;

        let outcome = session.conclude_round();
        if let Some(message) = outcome.message {
            prompt_play_again(out, &mut session, message, &mut events)
                .context("prompt to play again")?;
        }
    }
    info!("bye");
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    init_tracing();

    let (config, config_error) = GameConfig::load_or_default(CONFIG_FILE);
    if let Some(e) = config_error {
        warn!(error = %e, "using the default configuration");
    }

    let guard = match TerminalGuard::new(&config.name) {
        Ok(guard) => guard,
        Err(e) => {
            error!(error = %e, "couldn't prepare the terminal");
            eprintln!("flak: couldn't prepare the terminal: {e}");
            return ExitCode::from(1);
        }
    };

    let mut out = BufWriter::new(stdout());
    let result = run(&mut out, config, guard.keyboard_enhanced);
    let _ = out.flush();
    drop(out);

    // Always restore the terminal before reporting
    drop(guard);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "game aborted");
            eprintln!("flak: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::rc::Rc;

    use crossterm::event::KeyModifiers;
    use flak::assets::SpriteSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    use super::*;

    fn block(cols: usize, rows: usize) -> Rc<Sprite> {
        Rc::new(Sprite::from_rows(vec!["#".repeat(cols); rows]))
    }

    /// No enemies and no frame cap, so loops run deterministically and fast.
    fn make_session(dir: &TempDir) -> Session {
        let sprites = SpriteSet {
            player: block(5, 2),
            missile: block(1, 1),
            enemy: block(5, 2),
            bomb: block(1, 1),
            building: block(6, 3),
            building_razed: None,
            splash: None,
            background: None,
        };
        let config = GameConfig {
            enemy_count: 0,
            target_fps: 0,
            ..GameConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let field = Rect::new(0.0, 0.0, 800.0, 450.0);
        Session::with_sprites(config, sprites, HighScoreStore::new(dir.path()), field, &mut rng)
    }

    fn make_input(reload_on_release: bool) -> InputState {
        InputState {
            held: HeldKeys::new(),
            frame: 1,
            reload_on_release,
        }
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release))
    }

    /// Events handed out frame by frame: each inner list is what is pending
    /// during one frame.
    struct FrameScript {
        frames: VecDeque<VecDeque<Event>>,
    }

    impl FrameScript {
        fn new<const N: usize>(frames: [Vec<Event>; N]) -> Self {
            FrameScript {
                frames: frames.into_iter().map(VecDeque::from).collect(),
            }
        }
    }

    impl EventSource for FrameScript {
        fn next_event(&mut self) -> io::Result<Option<Event>> {
            let Some(frame) = self.frames.front_mut() else {
                panic!("the loop outlived its scripted frames");
            };
            match frame.pop_front() {
                Some(event) => Ok(Some(event)),
                None => {
                    self.frames.pop_front();
                    Ok(None)
                }
            }
        }
    }

    // ── Play-again prompt ─────────────────────────────────────────────────────

    #[test]
    fn prompt_waits_for_enter_only() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([
            press(KeyCode::Char('x')),
            press(KeyCode::Enter),
            press(KeyCode::Char('z')),
        ]);

        prompt_play_again(&mut out, &mut session, EndMessage::GameOver, &mut events).unwrap();
        assert_eq!(events, VecDeque::from([press(KeyCode::Char('z'))]));
        assert!(session.is_still_playing);
        assert!(String::from_utf8_lossy(&out).contains(PLAY_AGAIN_PROMPT));
    }

    #[test]
    fn declined_quit_at_prompt_starts_the_next_round() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([
            press(KeyCode::Esc),
            press(KeyCode::Char('n')),
            press(KeyCode::Enter),
            press(KeyCode::Char('z')),
        ]);

        prompt_play_again(&mut out, &mut session, EndMessage::GameOver, &mut events).unwrap();
        assert_eq!(
            events,
            VecDeque::from([press(KeyCode::Enter), press(KeyCode::Char('z'))])
        );
        assert!(session.is_still_playing);
    }

    #[test]
    fn confirmed_quit_at_prompt_ends_the_game() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([press(KeyCode::Esc), press(KeyCode::Char('y'))]);

        prompt_play_again(&mut out, &mut session, EndMessage::HighScore, &mut events).unwrap();
        assert!(!session.is_still_playing);
    }

    // ── Splash screen ─────────────────────────────────────────────────────────

    #[test]
    fn splash_ends_on_any_key() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([press(KeyCode::Char('q')), press(KeyCode::Char('z'))]);

        display_splash_screen(&mut out, &mut session, &block(4, 2), &mut events).unwrap();
        assert_eq!(events.len(), 1);
        assert!(session.is_still_playing);
    }

    // ── Round loop ────────────────────────────────────────────────────────────

    #[test]
    fn confirmed_quit_stops_both_loops() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut rng = StdRng::seed_from_u64(42);
        let mut out: Vec<u8> = Vec::new();
        let mut events = FrameScript::new([
            vec![],
            vec![press(KeyCode::Esc), press(KeyCode::Char('y'))],
        ]);

        run_main_loop(&mut out, &mut session, &mut events, &mut rng, false).unwrap();
        assert!(!session.is_still_playing);
        assert!(!session.is_round_running);
    }

    #[test]
    fn pause_overlay_is_drawn_once_per_pause() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut rng = StdRng::seed_from_u64(42);
        let mut out: Vec<u8> = Vec::new();
        let mut events = FrameScript::new([
            vec![press(KeyCode::Char('p'))],
            vec![],
            vec![],
            vec![press(KeyCode::Char('p'))],
            vec![press(KeyCode::Char('p'))],
            vec![],
            vec![press(KeyCode::Esc), press(KeyCode::Char('y'))],
        ]);

        run_main_loop(&mut out, &mut session, &mut events, &mut rng, false).unwrap();
        // Two pauses; each overlay prints the text and its shadow
        let drawn = String::from_utf8_lossy(&out).matches(PAUSE_TEXT).count();
        assert_eq!(drawn, 2 * 2);
    }

    // ── Input handling ────────────────────────────────────────────────────────

    #[test]
    fn pause_blocks_shooting_and_reloading_only() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut input = make_input(false);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([
            press(KeyCode::Char(' ')),
            press(KeyCode::Char(' ')),
            press(KeyCode::Char('p')),
            press(KeyCode::Char(' ')),
            press(KeyCode::Char('r')),
            press(KeyCode::F(1)),
            press(KeyCode::Char('p')),
            press(KeyCode::Char(' ')),
        ]);

        handle_input(&mut out, &mut session, &mut events, &mut input, 0.0).unwrap();
        let state = &session.state;
        assert_eq!(state.missiles.len(), 3);
        assert_eq!(state.player.shots_left, 7);
        assert!(state.is_screen_info_shown);
        assert!(!state.is_paused);
    }

    #[test]
    fn reload_fires_on_release_with_keyboard_enhancement() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut input = make_input(true);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([
            press(KeyCode::Char(' ')),
            press(KeyCode::Char(' ')),
            press(KeyCode::Char('r')),
        ]);

        handle_input(&mut out, &mut session, &mut events, &mut input, 0.0).unwrap();
        assert_eq!(session.state.player.shots_left, 8);

        let mut events = VecDeque::from([release(KeyCode::Char('r'))]);
        handle_input(&mut out, &mut session, &mut events, &mut input, 0.0).unwrap();
        assert_eq!(session.state.player.shots_left, 10);
        assert_eq!(session.state.shot_indicators, 10);
    }

    #[test]
    fn reload_fires_on_press_without_keyboard_enhancement() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut input = make_input(false);
        let mut out: Vec<u8> = Vec::new();
        let mut events = VecDeque::from([
            press(KeyCode::Char(' ')),
            press(KeyCode::Char(' ')),
            press(KeyCode::Char('r')),
        ]);

        handle_input(&mut out, &mut session, &mut events, &mut input, 0.0).unwrap();
        assert_eq!(session.state.player.shots_left, 10);
    }

    #[test]
    fn held_move_key_steers_the_player() {
        let dir = TempDir::new().unwrap();
        let mut session = make_session(&dir);
        let mut input = make_input(false);
        let mut out: Vec<u8> = Vec::new();
        let x = session.state.player.rect.x;
        let mut events = VecDeque::from([press(KeyCode::Left)]);

        handle_input(&mut out, &mut session, &mut events, &mut input, 0.1).unwrap();
        assert!(session.state.player.rect.x < x);
    }
}
