use std::path::PathBuf;

use boxoban_rs::{build_room, load_records, select_file, select_record, ArchiveCache, ArchiveFetcher, HttpFetcher, LevelError, Room};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Unfiltered,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self { Difficulty::Unfiltered => "unfiltered", Difficulty::Medium => "medium", Difficulty::Hard => "hard" }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    #[default]
    Train,
    Valid,
    Test,
}

impl Split {
    pub fn as_str(self) -> &'static str {
        match self { Split::Train => "train", Split::Valid => "valid", Split::Test => "test" }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub split: Split,
    /// Where the archive is extracted. Always explicit; nothing here reads the environment.
    pub cache_root: PathBuf,
    /// Seed for file/record selection; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Step limit handed to the engine with each reset.
    pub max_steps: u32,
    /// Expected `(height, width)` of every room.
    pub dim_room: (usize, usize),
    pub num_boxes: usize,
    /// Log download progress and the chosen level file at info level.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Unfiltered,
            split: Split::Train,
            cache_root: PathBuf::from(".sokoban_cache"),
            seed: None,
            max_steps: 120,
            dim_room: (10, 10),
            num_boxes: 4,
            verbose: false,
        }
    }
}

impl Config {
    /// Build from an optional JSON object; missing fields keep their defaults.
    pub fn from_json(cfg: Option<Json>) -> Result<Self, EnvError> {
        match cfg {
            Some(v) => Ok(serde_json::from_value(v)?),
            None => Ok(Config::default()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("bad config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Everything the engine needs to start an episode.
#[derive(Clone, Debug, Serialize)]
pub struct Reset {
    pub room: Room,
    pub source_file: PathBuf,
    pub num_env_steps: u32,
    pub max_steps: u32,
    pub reward_last: f64,
    pub boxes_on_target: usize,
}

/// Supplies a fresh pre-generated room on every episode reset.
pub struct BoxobanLevels<F = HttpFetcher> {
    config: Config,
    cache: ArchiveCache<F>,
    rng: ChaCha8Rng,
}

impl BoxobanLevels<HttpFetcher> {
    pub fn new(config: Config) -> Self { Self::with_fetcher(config, HttpFetcher::new()) }

    pub fn from_json(cfg: Option<Json>) -> Result<Self, EnvError> { Ok(Self::new(Config::from_json(cfg)?)) }
}

impl<F: ArchiveFetcher> BoxobanLevels<F> {
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let cache = ArchiveCache::new(&config.cache_root, fetcher).with_verbose(config.verbose);
        Self { config, cache, rng }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn cache(&self) -> &ArchiveCache<F> { &self.cache }

    pub fn levels_dir(&self) -> PathBuf {
        self.cache.levels_dir(self.config.difficulty.as_str(), self.config.split.as_str())
    }

    /// Make sure the archive is cached, then pick and build one room.
    pub fn reset(&mut self) -> Result<Reset, EnvError> {
        if self.config.verbose && !self.cache.cache_root().exists() {
            info!("Boxoban: levels not cached at {}, downloading", self.cache.cache_root().display());
        }
        self.cache.ensure_cached()?;

        let source_file = select_file(&self.levels_dir(), &mut self.rng)?;
        let records = load_records(&source_file)?;
        let room = build_room(select_record(&records, &mut self.rng)?)?;
        if self.config.verbose {
            info!("Selected level from file {}", source_file.display());
        } else {
            debug!("Selected level from file {}", source_file.display());
        }

        if (room.height, room.width) != self.config.dim_room {
            warn!(
                "room from {} is {}x{}, expected {}x{}",
                source_file.display(), room.height, room.width, self.config.dim_room.0, self.config.dim_room.1
            );
        }
        if room.num_boxes() != self.config.num_boxes {
            warn!("room from {} has {} boxes, expected {}", source_file.display(), room.num_boxes(), self.config.num_boxes);
        }

        Ok(Reset {
            room,
            source_file,
            num_env_steps: 0,
            max_steps: self.config.max_steps,
            reward_last: 0.0,
            boxes_on_target: 0,
        })
    }
}
