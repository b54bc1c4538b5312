/// Game configuration.
///
/// Every knob of the game is a flat, named option.  The values below are
/// the defaults; any subset can be overridden from `flak.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use serde::Deserialize;
use tracing::warn;

use crate::input::parse_key;

/// Where the game looks for its configuration file.
pub const CONFIG_FILE: &str = "flak.toml";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Shown in the terminal title.
    pub name: String,
    pub images_dir: Option<PathBuf>,
    pub splash_image: Option<String>,
    /// Field width in world units when not fullscreen.
    pub screen_width: f32,
    pub aspect_ratio: f32,
    /// Use the whole terminal as the field.
    pub is_fullscreen: bool,
    pub target_fps: u32,
    pub font_color: String,
    pub background_color: String,
    pub background_image: Option<String>,

    pub player_image: Option<String>,
    /// 0 makes the player invincible.
    pub player_num_lives: u32,
    /// Shots per reload; 0 means unlimited ammo.
    pub player_num_shots: u32,
    pub player_speed: f32,
    pub player_x_pos: Option<f32>,
    pub player_y_pos: Option<f32>,
    pub has_player_sprite_dir: bool,

    pub missile_image: Option<String>,
    pub missile_speed: f32,
    pub is_missile_upward: bool,

    pub enemy_image: Option<String>,
    pub enemy_speed: f32,
    pub enemy_count: u32,
    pub enemy_top_edge: Option<f32>,
    pub enemy_bottom_edge: Option<f32>,

    pub bomb_image: Option<String>,
    pub bomb_speed: f32,
    pub is_bomb_downward: bool,

    pub building_image: Option<String>,
    pub building_razed_image: Option<String>,
    pub building_count: u32,
    pub building_y_pos: Option<f32>,

    pub score_pos: (f32, f32),
    pub score_factor: i64,
    pub score_loss_factor: i64,
    /// `None` centres the high score at the top of the field.
    pub high_score_pos: Option<(f32, f32)>,
    pub num_lives_pos: (f32, f32),
    pub num_shots_pos: (f32, f32),

    pub message_high_score: String,
    pub message_game_over: String,

    pub keys_move_left: Vec<String>,
    pub keys_move_right: Vec<String>,
    pub keys_shoot: Vec<String>,
    pub keys_reload_ammo: Vec<String>,
    pub keys_pause: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Flak".into(),
            images_dir: Some(PathBuf::from("sprites")),
            splash_image: Some("splash.txt".into()),
            screen_width: 800.0,
            aspect_ratio: 1.7778,
            is_fullscreen: false,
            target_fps: 60,
            font_color: "white".into(),
            background_color: "black".into(),
            background_image: None,
            player_image: Some("player.txt".into()),
            player_num_lives: 3,
            player_num_shots: 10,
            player_speed: 800.0,
            player_x_pos: None,
            player_y_pos: None,
            has_player_sprite_dir: true,
            missile_image: Some("missile.txt".into()),
            missile_speed: 2000.0,
            is_missile_upward: true,
            enemy_image: Some("enemy.txt".into()),
            enemy_speed: 600.0,
            enemy_count: 5,
            enemy_top_edge: None,
            enemy_bottom_edge: None,
            bomb_image: Some("bomb.txt".into()),
            bomb_speed: 800.0,
            is_bomb_downward: true,
            building_image: Some("building.txt".into()),
            building_razed_image: Some("building_razed.txt".into()),
            building_count: 4,
            building_y_pos: None,
            score_pos: (10.0, 10.0),
            score_factor: 1,
            score_loss_factor: 10,
            high_score_pos: None,
            num_lives_pos: (10.0, 40.0),
            num_shots_pos: (10.0, 74.0),
            message_high_score: "You beat the high score!".into(),
            message_game_over: "Game over".into(),
            keys_move_left: vec!["Left".into()],
            keys_move_right: vec!["Right".into()],
            keys_shoot: vec!["Space".into()],
            keys_reload_ammo: vec!["LeftCtrl".into(), "RightCtrl".into(), "r".into()],
            keys_pause: vec!["p".into(), "Pause".into()],
        }
    }
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(data: &str) -> anyhow::Result<Self> {
        let config: GameConfig = toml::from_str(data)?;
        Ok(config.normalized())
    }

    /// Load `path`, falling back to the defaults.  A missing file is not an
    /// error; anything else comes back as the second tuple element.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        let path = path.as_ref();
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from_file(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(format!("{e:#}"))),
        }
    }

    /// Clamp values the game can't work with.
    fn normalized(mut self) -> Self {
        if self.building_count == 0 {
            warn!("building_count must be at least 1; using 1");
            self.building_count = 1;
        }
        if self.aspect_ratio <= 0.0 {
            warn!(
                aspect_ratio = self.aspect_ratio,
                "aspect_ratio must be positive; using the default"
            );
            self.aspect_ratio = Self::default().aspect_ratio;
        }
        self
    }

    pub fn font_color(&self) -> Color {
        parse_color(&self.font_color, Color::White)
    }

    pub fn background_color(&self) -> Color {
        parse_color(&self.background_color, Color::Black)
    }

    /// Field height in world units for windowed mode.
    pub fn screen_height(&self) -> f32 {
        (self.screen_width / self.aspect_ratio).round()
    }

    pub fn key_bindings(&self) -> KeyBindings {
        KeyBindings {
            move_left: parse_keys(&self.keys_move_left),
            move_right: parse_keys(&self.keys_move_right),
            shoot: parse_keys(&self.keys_shoot),
            reload: parse_keys(&self.keys_reload_ammo),
            pause: parse_keys(&self.keys_pause),
        }
    }
}

/// Parsed key bindings, one list per action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub shoot: Vec<KeyCode>,
    pub reload: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
}

fn parse_keys(names: &[String]) -> Vec<KeyCode> {
    names
        .iter()
        .filter_map(|name| {
            let key = parse_key(name);
            if key.is_none() {
                warn!(key = %name, "unknown key name in configuration; ignored");
            }
            key
        })
        .collect()
}

fn parse_color(name: &str, fallback: Color) -> Color {
    Color::try_from(name).unwrap_or_else(|_| {
        warn!(color = %name, "unknown colour name in configuration");
        fallback
    })
}
