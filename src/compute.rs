/// Per-round game state and the per-frame simulation.
///
/// Functions here take the round's `GameState` by mutable reference (plus,
/// where needed, an RNG handle).  All randomness comes through the injected
/// RNG, so tests can drive the simulation with a seeded one.

use std::rc::Rc;

use rand::Rng;
use tracing::{debug, info};

use crate::ammo::Ammo;
use crate::assets::SpriteSet;
use crate::building::Building;
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::entities::{AmmoSpec, Entity, Rect, VerticalDir};
use crate::player::{Player, PlayerSettings};

/// Gap between the buildings' bottoms and the bottom of the field.
const BUILDING_BOTTOM_MARGIN: f32 = 10.0;

// ── Round state ──────────────────────────────────────────────────────────────

/// Everything that lives for exactly one round.
#[derive(Debug)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub missiles: Vec<Ammo>,
    pub bombs: Vec<Ammo>,
    pub buildings: Vec<Building>,
    /// Buildings not yet razed.
    pub buildings_left: u32,
    /// Building losses can drive the score below zero.
    pub score: i64,
    score_factor: i64,
    score_loss_factor: i64,
    /// Lives still shown in the lives panel.
    pub lives_indicators: u32,
    /// Shots still shown in the ammo panel (0 with unlimited ammo).
    pub shot_indicators: u32,
    pub is_paused: bool,
    /// The pause overlay has been drawn for the current pause.
    pub is_pause_displayed: bool,
    pub is_screen_info_shown: bool,
    pub field: Rect,
}

/// Build a fresh round: player, enemies, evenly spaced buildings.
pub fn init_state(
    config: &GameConfig,
    sprites: &SpriteSet,
    field: Rect,
    rng: &mut impl Rng,
) -> GameState {
    let missile_spec = Rc::new(AmmoSpec {
        field,
        sprite: Rc::clone(&sprites.missile),
        direction: VerticalDir::from_upward(config.is_missile_upward),
        speed: config.missile_speed,
    });

    let player = Player::new(
        missile_spec,
        field,
        Rc::clone(&sprites.player),
        &PlayerSettings {
            initial_x: config.player_x_pos,
            y: config.player_y_pos.unwrap_or(field.h * 0.75),
            speed: config.player_speed,
            num_lives: config.player_num_lives,
            max_shots: config.player_num_shots,
            has_sprite_dir: config.has_player_sprite_dir,
        },
    );

    // Enemies stay in the top half unless told otherwise
    let boundaries = (
        config.enemy_top_edge.unwrap_or(0.0),
        config.enemy_bottom_edge.unwrap_or((field.h / 2.0).round()),
    );

    // `is_bomb_downward` becomes the launcher's facing; bombs fall the other way
    let bomb_spec = Rc::new(AmmoSpec {
        field,
        sprite: Rc::clone(&sprites.bomb),
        direction: VerticalDir::from_upward(config.is_bomb_downward),
        speed: config.bomb_speed,
    });

    let enemies = (0..config.enemy_count)
        .map(|_| {
            Enemy::new(
                Rc::clone(&bomb_spec),
                field,
                boundaries,
                Rc::clone(&sprites.enemy),
                config.enemy_speed,
                rng,
            )
        })
        .collect();

    let buildings = layout_buildings(config, sprites, field);
    let shot_indicators = if player.has_unlimited_ammo() { 0 } else { player.shots_left };

    info!(
        enemies = config.enemy_count,
        buildings = buildings.len(),
        "new round"
    );

    GameState {
        lives_indicators: config.player_num_lives,
        shot_indicators,
        player,
        enemies,
        missiles: Vec::new(),
        bombs: Vec::new(),
        buildings_left: config.building_count,
        buildings,
        score: 0,
        score_factor: config.score_factor,
        score_loss_factor: config.score_loss_factor,
        is_paused: false,
        is_pause_displayed: false,
        is_screen_info_shown: false,
        field,
    }
}

/// Spread the buildings across the field at regular intervals.
fn layout_buildings(config: &GameConfig, sprites: &SpriteSet, field: Rect) -> Vec<Building> {
    let (width, height) = sprites.building.size();
    let count = config.building_count.max(1) as f32;
    let interval = (field.w - width * count) / count;
    let y = config
        .building_y_pos
        .unwrap_or(field.h - height - BUILDING_BOTTOM_MARGIN);

    let mut x = interval / 2.0;
    (0..config.building_count)
        .map(|_| {
            let building = Building::new(
                (x, y),
                Rc::clone(&sprites.building),
                sprites.building_razed.as_ref().map(Rc::clone),
            );
            x += interval + width;
            building
        })
        .collect()
}

// ── Round status ─────────────────────────────────────────────────────────────

/// The round ends when the player is dead or every building is razed.
pub fn is_round_over(state: &GameState) -> bool {
    !state.player.is_alive || state.buildings_left == 0
}

// ── Collision & scoring ──────────────────────────────────────────────────────

/// For every item of `hitters`, the indices of the not-yet-consumed items of
/// `targets` it overlaps.  Each target is consumed by the first hitter that
/// reaches it.
fn collide<A: Entity, B: Entity>(hitters: &[A], targets: &[B]) -> (Vec<usize>, Vec<bool>) {
    let mut consumed = vec![false; targets.len()];
    let mut hit = Vec::new();

    for (ai, a) in hitters.iter().enumerate() {
        let bounds = a.bounds();
        let mut was_hit = false;
        for (bi, b) in targets.iter().enumerate() {
            if !consumed[bi] && bounds.intersects(&b.bounds()) {
                consumed[bi] = true;
                was_hit = true;
            }
        }
        if was_hit {
            hit.push(ai);
        }
    }
    (hit, consumed)
}

/// Drop every element whose flag is set.
fn remove_flagged<T>(items: &mut Vec<T>, flags: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !flags.get(index).copied().unwrap_or(false);
        index += 1;
        keep
    });
}

/// Resolve one frame of collisions.  Returns `true` if the score changed.
///
/// Order matters: player vs bombs, buildings vs bombs, enemies vs missiles,
/// then bombs vs missiles.
pub fn resolve_collisions(state: &mut GameState, rng: &mut impl Rng) -> bool {
    let mut score_changed = false;

    // 1. Bombs hitting the player
    let (player_hit, used_bombs) = collide(std::slice::from_ref(&state.player), &state.bombs);
    remove_flagged(&mut state.bombs, &used_bombs);
    if !player_hit.is_empty() {
        state.player.knock_out();
        state.lives_indicators = state.lives_indicators.saturating_sub(1);
        debug!(lives = state.player.lives, "player hit");
    }

    // 2. Bombs hitting buildings
    let (hit_buildings, used_bombs) = collide(&state.buildings, &state.bombs);
    remove_flagged(&mut state.bombs, &used_bombs);
    for &bi in &hit_buildings {
        if state.buildings[bi].raze() {
            state.buildings_left = state.buildings_left.saturating_sub(1);
            state.score -= state.score_loss_factor;
            debug!(buildings_left = state.buildings_left, "building razed");
        }
        score_changed = true;
    }

    // 3. Missiles hitting enemies
    let (hit_enemies, used_missiles) = collide(&state.enemies, &state.missiles);
    remove_flagged(&mut state.missiles, &used_missiles);
    for &ei in &hit_enemies {
        state.enemies[ei].knock_out(rng);
        state.score += state.score_factor;
        score_changed = true;
    }

    // 4. Missiles hitting bombs
    let (hit_bombs, used_missiles) = collide(&state.bombs, &state.missiles);
    remove_flagged(&mut state.missiles, &used_missiles);
    let mut shot_down = vec![false; state.bombs.len()];
    for &bi in &hit_bombs {
        shot_down[bi] = true;
        state.score += state.score_factor;
        score_changed = true;
    }
    remove_flagged(&mut state.bombs, &shot_down);

    score_changed
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Move every projectile, enemy and building by one tick and sweep out the
/// ones that died.
pub fn advance(state: &mut GameState, delta_time: f32, rng: &mut impl Rng) {
    for bomb in &mut state.bombs {
        bomb.update(delta_time);
    }
    for missile in &mut state.missiles {
        missile.update(delta_time);
    }

    for enemy in &mut state.enemies {
        if let Some(bomb) = enemy.update(delta_time, rng) {
            state.bombs.push(bomb);
        }
    }

    for building in &mut state.buildings {
        building.update();
    }

    state.bombs.retain(Ammo::is_alive);
    state.missiles.retain(Ammo::is_alive);
    state.buildings.retain(|b| !b.is_removed());
}

/// One unpaused frame of simulation: collisions, then movement.
/// Returns whether the score changed.
pub fn tick(state: &mut GameState, delta_time: f32, rng: &mut impl Rng) -> bool {
    if state.is_paused {
        return false;
    }
    let score_changed = resolve_collisions(state, rng);
    advance(state, delta_time, rng);
    score_changed
}

// ── Player actions ───────────────────────────────────────────────────────────

/// Apply held movement keys and move the player.
pub fn steer_player(state: &mut GameState, left: bool, right: bool, delta_time: f32) {
    if state.is_paused {
        return;
    }
    state.player.set_intent(left, right);
    if state.player.is_moving_left || state.player.is_moving_right {
        state.player.update(delta_time);
    }
}

pub fn player_shoot(state: &mut GameState) {
    if state.is_paused {
        return;
    }
    if let Some(missile) = state.player.shoot() {
        state.missiles.push(missile);
    }
    state.shot_indicators = state.shot_indicators.saturating_sub(1);
}

pub fn player_reload(state: &mut GameState) {
    if state.is_paused {
        return;
    }
    state.player.reload();
    if !state.player.has_unlimited_ammo() {
        state.shot_indicators = state.player.shots_left;
    }
}

/// Flip the pause flag and re-arm the one-shot pause overlay.
pub fn toggle_pause(state: &mut GameState) {
    state.is_paused = !state.is_paused;
    state.is_pause_displayed = false;
}
