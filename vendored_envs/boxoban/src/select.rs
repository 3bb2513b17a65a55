use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::LevelError;
use crate::level::LevelRecord;

/// Pick one regular file directly under `dir`, uniformly at random.
///
/// Candidates are sorted by name first so a seeded `rng` always reproduces the same pick.
pub fn select_file<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Result<PathBuf, LevelError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(LevelError::fs(dir))? {
        let entry = entry.map_err(LevelError::fs(dir))?;
        let path = entry.path();
        // follows symlinks, so linked level files count; dangling links are skipped
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(LevelError::Filesystem { path, source: e }),
        };
        if metadata.is_file() {
            files.push(path);
        }
    }
    files.sort();
    files.choose(rng).cloned().ok_or_else(|| LevelError::EmptyDirectory { path: dir.to_path_buf() })
}

/// Pick one non-empty record uniformly at random.
pub fn select_record<'a, R: Rng + ?Sized>(records: &'a [LevelRecord], rng: &mut R) -> Result<&'a LevelRecord, LevelError> {
    let candidates: Vec<&LevelRecord> = records.iter().filter(|r| !r.is_empty()).collect();
    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| LevelError::MalformedLevel("level file contains no maps".into()))
}
