//! One-time download and extraction of the Boxoban level archive.
//!
//! The cache root directory only ever appears fully populated: the archive is
//! streamed and extracted into a staging directory beside it, then renamed into
//! place. An advisory lock on `<cache_root>.lock` keeps concurrent initializers
//! (threads or processes) from fetching twice. The lock file is removed once the
//! root is in place; a failed download leaves it behind for the next attempt.
//!
//! Download progress is logged every 4 MiB, at info level when the cache is
//! verbose and at debug level otherwise.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, log, warn, Level};
use ureq::config::Config;
use ureq::http::StatusCode;
use ureq::Agent;
use zip::ZipArchive;

use crate::error::LevelError;

pub const ARCHIVE_URL: &str = "https://github.com/deepmind/boxoban-levels/archive/master.zip";
/// Top-level directory inside the archive.
pub const ARCHIVE_DIR: &str = "boxoban-levels-master";
const ARCHIVE_FILE: &str = "boxoban_levels-master.zip";

const CHUNK_SIZE: usize = 64 * 1024;
const PROGRESS_STEP: u64 = 4 * 1024 * 1024;

/// Source of the archive bytes.
pub trait ArchiveFetcher {
    /// Open a streaming body for `url`. Non-200 responses fail with [`LevelError::Download`].
    fn open(&self, url: &str) -> Result<Box<dyn Read>, LevelError>;
}

/// Blocking HTTP fetcher. No timeout and no retries.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_agent(Config::builder().http_status_as_error(false).build().into())
    }

    /// Use a preconfigured agent. It must have `http_status_as_error` disabled
    /// so the status can be reported.
    pub fn with_agent(agent: Agent) -> Self { Self { agent } }
}

impl Default for HttpFetcher {
    fn default() -> Self { Self::new() }
}

impl ArchiveFetcher for HttpFetcher {
    fn open(&self, url: &str) -> Result<Box<dyn Read>, LevelError> {
        let response = self.agent.get(url).call()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LevelError::Download { url: url.to_string(), status: status.as_u16() });
        }
        Ok(Box::new(response.into_body().into_reader()))
    }
}

/// Local cache of the extracted level archive.
pub struct ArchiveCache<F = HttpFetcher> {
    cache_root: PathBuf,
    url: String,
    fetcher: F,
    progress_level: Level,
}

impl<F: ArchiveFetcher> ArchiveCache<F> {
    pub fn new(cache_root: impl AsRef<Path>, fetcher: F) -> Self {
        // drop trailing separators so the lock file lands beside the root, not inside it
        let cache_root = cache_root.as_ref().components().collect();
        Self { cache_root, url: ARCHIVE_URL.to_string(), fetcher, progress_level: Level::Debug }
    }

    /// Report download progress at info level instead of debug.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.progress_level = if verbose { Level::Info } else { Level::Debug };
        self
    }

    /// Fetch from a mirror instead of [`ARCHIVE_URL`].
    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn cache_root(&self) -> &Path { &self.cache_root }

    pub fn archive_url(&self) -> &str { &self.url }

    pub fn progress_level(&self) -> Level { self.progress_level }

    /// `<cache_root>/boxoban-levels-master/<difficulty>/<split>`
    pub fn levels_dir(&self, difficulty: &str, split: &str) -> PathBuf {
        self.cache_root.join(ARCHIVE_DIR).join(difficulty).join(split)
    }

    fn lock_path(&self) -> PathBuf {
        let mut path = self.cache_root.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.cache_root.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Download and extract the archive unless the cache root already exists.
    ///
    /// Existence is the only check; the contents of an existing root are trusted.
    pub fn ensure_cached(&self) -> Result<(), LevelError> {
        if self.cache_root.exists() {
            return Ok(());
        }
        let parent = self.parent_dir();
        fs::create_dir_all(&parent).map_err(LevelError::fs(&parent))?;

        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(LevelError::fs(&lock_path))?;
        lock.lock().map_err(LevelError::fs(&lock_path))?;
        if self.cache_root.exists() {
            debug!("level cache at {} was populated while waiting for the lock", self.cache_root.display());
            return Ok(());
        }
        self.download_and_extract(&parent)?;
        // anyone still waiting on the unlinked file re-checks the root after locking
        if let Err(e) = fs::remove_file(&lock_path) {
            debug!("could not remove {}: {e}", lock_path.display());
        }
        Ok(())
    }

    fn download_and_extract(&self, parent: &Path) -> Result<(), LevelError> {
        info!("Boxoban: pregenerated levels not downloaded, starting download from {}", self.url);
        let staging = tempfile::Builder::new()
            .prefix(".boxoban-staging-")
            .tempdir_in(parent)
            .map_err(LevelError::fs(parent))?;

        let archive_path = staging.path().join(ARCHIVE_FILE);
        let mut body = self.fetcher.open(&self.url)?;
        let mut file = File::create(&archive_path).map_err(LevelError::fs(&archive_path))?;
        let (total, _) = copy_with_progress(&mut body, &mut file, &archive_path, self.progress_level)?;
        drop(file);
        drop(body);
        info!("Boxoban: downloaded {total} bytes, extracting");

        let file = File::open(&archive_path).map_err(LevelError::fs(&archive_path))?;
        ZipArchive::new(file)?.extract(staging.path())?;
        fs::remove_file(&archive_path).map_err(LevelError::fs(&archive_path))?;

        match fs::rename(staging.path(), &self.cache_root) {
            Ok(()) => {
                info!("Boxoban: levels cached at {}", self.cache_root.display());
                Ok(())
            }
            Err(_) if self.cache_root.exists() => {
                warn!("level cache at {} was created concurrently, discarding staged copy", self.cache_root.display());
                Ok(())
            }
            Err(source) => Err(LevelError::Filesystem { path: self.cache_root.clone(), source }),
        }
    }
}

/// Returns bytes copied and the number of progress lines logged.
fn copy_with_progress(reader: &mut dyn Read, writer: &mut File, path: &Path, level: Level) -> Result<(u64, usize), LevelError> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    let mut reports = 0;
    let mut next_report = PROGRESS_STEP;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LevelError::Http(ureq::Error::Io(e))),
        };
        writer.write_all(&buf[..n]).map_err(LevelError::fs(path))?;
        total += n as u64;
        if total >= next_report {
            log!(level, "Boxoban: {} MiB downloaded", total / (1024 * 1024));
            reports += 1;
            next_report += PROGRESS_STEP;
        }
    }
    writer.flush().map_err(LevelError::fs(path))?;
    Ok((total, reports))
}
