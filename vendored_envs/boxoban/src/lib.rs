//! Boxoban level supply for the Sokoban engine.
//! - One-time archive download and cache
//! - Level file and record selection with an injected RNG
//! - Level text parsing and room building (fixed/state layers, entity coordinates)

mod board;
mod cache;
mod error;
mod level;
mod select;

pub use board::{Coord, Room, Tile};
pub use cache::{ArchiveCache, ArchiveFetcher, HttpFetcher, ARCHIVE_DIR, ARCHIVE_URL};
pub use error::LevelError;
pub use level::{build_room, load_records, parse_records, LevelRecord, RECORD_MARKER, WALL_SYMBOL};
pub use select::{select_file, select_record};
