use std::{fmt, io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("cannot read {}: {source}", path.display())]
	Io { path: PathBuf, source: io::Error },
	#[error("malformed level data: {0}")]
	Format(#[from] gex_reader::Error),
	#[error("{count} textures do not fit in the largest atlas")]
	AtlasPacking { count: usize },
	#[error("invalid catalog: {0}")]
	Catalog(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;

pub(crate) fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> LoadError {
	let path = path.into();
	move |source| LoadError::Io { path, source }
}

/// A reference that could not be resolved. The decode falls back to a default and carries on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupMiss {
	LevelName { id: String, checksum: u32 },
	Material { model: String, id: u32 },
	Sprite { model: String, id: u32 },
	TextureFormat { index: usize, tag: u32 },
}

impl fmt::Display for LookupMiss {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::LevelName { id, checksum } => write!(f, "no name for level {:?} with checksum {:#x}", id, checksum),
			Self::Material { model, id } => write!(f, "{}: no atlas placement for material {:#x}", model, id),
			Self::Sprite { model, id } => write!(f, "{}: sprite {:#x} is not loaded", model, id),
			Self::TextureFormat { index, tag } => write!(f, "texture {} has unsupported format {:#x}", index, tag),
		}
	}
}
