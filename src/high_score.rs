/// High score persistence: one little-endian `u32` in `gamedata/game.dat`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub const DATA_DIR: &str = "gamedata";
pub const DATA_FILE: &str = "game.dat";

#[derive(Clone, Debug)]
pub struct HighScoreStore {
    dir: PathBuf,
    file: PathBuf,
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(DATA_DIR)
    }
}

impl HighScoreStore {
    /// A store keeping its file inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let file = dir.join(DATA_FILE);
        HighScoreStore { dir, file }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Read the stored high score.  No file yet means 0.
    pub fn load(&self) -> u32 {
        let bytes = match fs::read(&self.file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return 0,
            Err(e) => {
                warn!(path = %self.file.display(), error = %e, "couldn't read the high score");
                return 0;
            }
        };

        match bytes.get(..4).and_then(|b| <[u8; 4]>::try_from(b).ok()) {
            Some(raw) => u32::from_le_bytes(raw),
            None => {
                warn!(
                    path = %self.file.display(),
                    len = bytes.len(),
                    "high score file is truncated"
                );
                0
            }
        }
    }

    /// Overwrite the stored high score, creating the data folder if needed.
    pub fn save(&self, score: u32) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(&self.file, score.to_le_bytes())?;
        info!(score, path = %self.file.display(), "high score saved");
        Ok(())
    }
}
