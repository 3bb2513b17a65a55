use std::io;
use std::path::{Path, PathBuf};

/// Failures while acquiring, selecting, or building a level. None are recovered locally.
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("could not download levels from {url}: HTTP status {status}")]
    Download { url: String, status: u16 },
    #[error("http error: {0}")]
    Http(#[from] ureq::Error),
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem { path: PathBuf, source: io::Error },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("no level files in {}", path.display())]
    EmptyDirectory { path: PathBuf },
    #[error("malformed level: {0}")]
    MalformedLevel(String),
}

impl LevelError {
    pub(crate) fn fs(path: &Path) -> impl FnOnce(io::Error) -> LevelError + '_ {
        move |source| LevelError::Filesystem { path: path.to_path_buf(), source }
    }
}
