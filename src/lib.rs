pub mod ammo;
pub mod assets;
pub mod building;
pub mod clock;
pub mod compute;
pub mod config;
pub mod dialog;
pub mod enemy;
pub mod entities;
pub mod high_score;
pub mod input;
pub mod player;
pub mod session;
