mod common;

use flak::ammo::*;
use flak::compute::*;
use flak::config::GameConfig;
use flak::enemy::*;
use flak::entities::*;

use rand::rngs::StdRng;

use common::{ammo_spec, block, field, quiet_config, seeded_rng, sprite_set, FIELD_H};

fn make_state(config: &GameConfig, rng: &mut StdRng) -> GameState {
    init_state(config, &sprite_set(false), field(), rng)
}

fn bomb_at(center: (f32, f32)) -> Ammo {
    Ammo::new(&ammo_spec(VerticalDir::Up, 800.0), center, VerticalDir::Down)
}

fn missile_at(center: (f32, f32)) -> Ammo {
    Ammo::new(&ammo_spec(VerticalDir::Up, 2000.0), center, VerticalDir::Up)
}

/// An enemy that is awake and parked with its top-left corner at `pos`.
fn awake_enemy_at(pos: (f32, f32), rng: &mut StdRng) -> Enemy {
    let bomb_spec = ammo_spec(VerticalDir::Up, 800.0);
    let mut enemy = Enemy::new(bomb_spec, field(), (0.0, 225.0), block(5, 2), 600.0, rng);
    while !enemy.is_awake() {
        enemy.update(10.0, rng);
    }
    enemy.rect.x = pos.0;
    enemy.rect.y = pos.1;
    enemy
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_player_position() {
    let mut rng = seeded_rng();
    let s = make_state(&quiet_config(), &mut rng);
    assert_eq!(s.player.rect.center_x(), 400.0);
    assert_eq!(s.player.rect.y, FIELD_H * 0.75);
    assert_eq!(s.player.lives, 3);
}

#[test]
fn init_state_counters() {
    let mut rng = seeded_rng();
    let s = make_state(&quiet_config(), &mut rng);
    assert_eq!(s.score, 0);
    assert_eq!(s.buildings_left, 4);
    assert_eq!(s.lives_indicators, 3);
    assert_eq!(s.shot_indicators, 10);
    assert!(s.missiles.is_empty());
    assert!(s.bombs.is_empty());
    assert!(!s.is_paused);
    assert!(!is_round_over(&s));
}

#[test]
fn init_state_spawns_configured_enemies() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        enemy_count: 7,
        ..GameConfig::default()
    };
    let s = make_state(&config, &mut rng);
    assert_eq!(s.enemies.len(), 7);
}

#[test]
fn buildings_are_spread_evenly_along_the_ground() {
    let mut rng = seeded_rng();
    let s = make_state(&quiet_config(), &mut rng);
    // 60-wide buildings: (800 - 4 * 60) / 4 = 140 between them
    let xs: Vec<f32> = s.buildings.iter().map(|b| b.rect.x).collect();
    assert_eq!(xs, vec![70.0, 270.0, 470.0, 670.0]);
    for b in &s.buildings {
        assert_eq!(b.rect.bottom(), FIELD_H - 10.0);
    }
}

#[test]
fn unlimited_ammo_shows_no_shot_indicators() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        player_num_shots: 0,
        ..quiet_config()
    };
    let s = make_state(&config, &mut rng);
    assert_eq!(s.shot_indicators, 0);
}

// ── Player vs bombs ───────────────────────────────────────────────────────────

#[test]
fn three_hits_end_the_round() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);

    for lives in (0..3).rev() {
        s.bombs.push(bomb_at(s.player.rect.center()));
        resolve_collisions(&mut s, &mut rng);
        assert!(s.bombs.is_empty());
        assert_eq!(s.player.lives, lives);
        assert_eq!(s.lives_indicators, lives);
        assert_eq!(s.player.is_alive, lives > 0);
    }
    assert!(is_round_over(&s));
}

#[test]
fn two_bombs_on_the_player_cost_one_life() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    let (cx, cy) = s.player.rect.center();
    s.bombs.push(bomb_at((cx - 5.0, cy)));
    s.bombs.push(bomb_at((cx + 5.0, cy)));
    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.player.lives, 2);
    assert!(s.bombs.is_empty());
}

// ── Buildings vs bombs ────────────────────────────────────────────────────────

#[test]
fn each_razed_building_costs_the_loss_factor() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.bombs.push(bomb_at((90.0, 400.0)));
    s.bombs.push(bomb_at((110.0, 400.0)));
    s.bombs.push(bomb_at((300.0, 400.0)));

    let changed = resolve_collisions(&mut s, &mut rng);
    assert!(changed);
    assert_eq!(s.buildings_left, 2);
    assert_eq!(s.score, -20);
    assert!(s.bombs.is_empty());
    assert!(s.buildings[0].is_razed());
    assert!(s.buildings[1].is_razed());
    assert!(!s.buildings[2].is_razed());
}

#[test]
fn razed_building_is_not_counted_twice() {
    let mut rng = seeded_rng();
    let mut s = init_state(&quiet_config(), &sprite_set(true), field(), &mut rng);
    s.bombs.push(bomb_at((100.0, 400.0)));
    resolve_collisions(&mut s, &mut rng);
    advance(&mut s, 0.0, &mut rng);
    assert_eq!(s.buildings.len(), 4);

    s.bombs.push(bomb_at((100.0, 420.0)));
    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.buildings_left, 3);
    assert_eq!(s.score, -10);
    assert!(s.bombs.is_empty());
}

#[test]
fn razed_building_without_razed_sprite_leaves_play() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.bombs.push(bomb_at((100.0, 400.0)));
    resolve_collisions(&mut s, &mut rng);
    advance(&mut s, 0.0, &mut rng);
    assert_eq!(s.buildings.len(), 3);
    assert_eq!(s.buildings_left, 3);
}

#[test]
fn last_building_ends_the_round() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        building_count: 1,
        ..quiet_config()
    };
    let mut s = make_state(&config, &mut rng);
    let target = s.buildings[0].rect.center();
    s.bombs.push(bomb_at(target));
    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.buildings_left, 0);
    assert!(is_round_over(&s));
}

#[test]
fn player_shields_the_building_behind_it() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    // Drop the player onto the first building; one bomb overlaps both
    s.player.rect.x = 70.0;
    s.player.rect.y = 380.0;
    s.bombs.push(bomb_at((100.0, 400.0)));
    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.player.lives, 2);
    assert_eq!(s.buildings_left, 4);
    assert_eq!(s.score, 0);
}

// ── Enemies vs missiles ───────────────────────────────────────────────────────

#[test]
fn shooting_an_enemy_scores_and_knocks_it_out() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.enemies.push(awake_enemy_at((100.0, 100.0), &mut rng));
    s.missiles.push(missile_at((125.0, 120.0)));

    let changed = resolve_collisions(&mut s, &mut rng);
    assert!(changed);
    assert_eq!(s.score, 1);
    assert!(s.missiles.is_empty());
    assert!(!s.enemies[0].is_awake());
    assert_eq!(s.enemies[0].rect.right(), -1.0);
}

#[test]
fn one_missile_hits_one_enemy() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.enemies.push(awake_enemy_at((100.0, 100.0), &mut rng));
    s.enemies.push(awake_enemy_at((110.0, 100.0), &mut rng));
    s.missiles.push(missile_at((130.0, 120.0)));

    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.score, 1);
    assert!(!s.enemies[0].is_awake());
    assert!(s.enemies[1].is_awake());
}

#[test]
fn score_factor_is_configurable() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        score_factor: 5,
        ..quiet_config()
    };
    let mut s = make_state(&config, &mut rng);
    s.enemies.push(awake_enemy_at((100.0, 100.0), &mut rng));
    s.missiles.push(missile_at((125.0, 120.0)));
    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.score, 5);
}

// ── Bombs vs missiles ─────────────────────────────────────────────────────────

#[test]
fn shooting_down_a_bomb_scores() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.bombs.push(bomb_at((600.0, 150.0)));
    s.missiles.push(missile_at((600.0, 155.0)));

    let changed = resolve_collisions(&mut s, &mut rng);
    assert!(changed);
    assert_eq!(s.score, 1);
    assert!(s.bombs.is_empty());
    assert!(s.missiles.is_empty());
}

#[test]
fn missile_spent_on_an_enemy_cannot_hit_a_bomb() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.enemies.push(awake_enemy_at((100.0, 100.0), &mut rng));
    s.bombs.push(bomb_at((125.0, 130.0)));
    s.missiles.push(missile_at((125.0, 125.0)));

    resolve_collisions(&mut s, &mut rng);
    assert_eq!(s.score, 1);
    assert_eq!(s.bombs.len(), 1);
    assert!(s.missiles.is_empty());
}

#[test]
fn quiet_frame_leaves_the_score_alone() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.missiles.push(missile_at((600.0, 100.0)));
    assert!(!resolve_collisions(&mut s, &mut rng));
    assert_eq!(s.missiles.len(), 1);
}

// ── tick / advance ────────────────────────────────────────────────────────────

#[test]
fn advance_sweeps_spent_ammo() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.missiles.push(missile_at((600.0, -100.0)));
    s.missiles.push(missile_at((600.0, 100.0)));
    s.bombs.push(bomb_at((600.0, FIELD_H + 100.0)));

    advance(&mut s, 1.0 / 60.0, &mut rng);
    assert_eq!(s.missiles.len(), 1);
    assert!(s.bombs.is_empty());
}

#[test]
fn every_missile_is_removed_exactly_once() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    for i in 0..5 {
        s.missiles.push(missile_at((100.0 + 100.0 * i as f32, 300.0)));
    }
    let mut removed = 0;
    for _ in 0..120 {
        let before = s.missiles.len();
        tick(&mut s, 1.0 / 60.0, &mut rng);
        removed += before - s.missiles.len();
    }
    assert_eq!(removed, 5);
    assert!(s.missiles.is_empty());
}

#[test]
fn enemies_bomb_the_ground_during_play() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        enemy_count: 5,
        player_num_lives: 0,
        ..GameConfig::default()
    };
    let mut s = make_state(&config, &mut rng);
    let mut bombs_seen = 0;
    for _ in 0..600 {
        let before = s.bombs.len();
        tick(&mut s, 1.0 / 60.0, &mut rng);
        bombs_seen += s.bombs.len().saturating_sub(before);
    }
    assert!(bombs_seen > 0);
}

#[test]
fn paused_tick_freezes_the_world() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    s.missiles.push(missile_at((600.0, 100.0)));
    toggle_pause(&mut s);
    let y = s.missiles[0].rect.y;
    assert!(!tick(&mut s, 0.5, &mut rng));
    assert_eq!(s.missiles[0].rect.y, y);
}

// ── Player actions ────────────────────────────────────────────────────────────

#[test]
fn shooting_updates_the_ammo_panel() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    player_shoot(&mut s);
    player_shoot(&mut s);
    assert_eq!(s.missiles.len(), 2);
    assert_eq!(s.shot_indicators, 8);
    player_reload(&mut s);
    assert_eq!(s.shot_indicators, 10);
    assert_eq!(s.player.shots_left, 10);
}

#[test]
fn empty_gun_fires_nothing() {
    let mut rng = seeded_rng();
    let config = GameConfig {
        player_num_shots: 1,
        ..quiet_config()
    };
    let mut s = make_state(&config, &mut rng);
    player_shoot(&mut s);
    player_shoot(&mut s);
    assert_eq!(s.missiles.len(), 1);
    assert_eq!(s.shot_indicators, 0);
}

#[test]
fn steering_moves_the_player() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    let x = s.player.rect.x;
    steer_player(&mut s, true, false, 0.1);
    assert!(s.player.rect.x < x);
    let x = s.player.rect.x;
    steer_player(&mut s, true, true, 0.1);
    assert_eq!(s.player.rect.x, x);
}

#[test]
fn pause_blocks_player_actions() {
    let mut rng = seeded_rng();
    let mut s = make_state(&quiet_config(), &mut rng);
    toggle_pause(&mut s);
    let x = s.player.rect.x;
    steer_player(&mut s, false, true, 0.1);
    player_shoot(&mut s);
    assert_eq!(s.player.rect.x, x);
    assert!(s.missiles.is_empty());

    toggle_pause(&mut s);
    assert!(!s.is_paused);
    assert!(!s.is_pause_displayed);
}
