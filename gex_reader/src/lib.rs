extern crate self as gex_reader;

mod cursor;
pub(crate) mod impls;
pub mod map;
pub mod sprite;
pub mod texture;

use thiserror::Error;
pub use cursor::{ByteCursor, Primitive};
pub use gex_derive::Readable;

#[derive(Debug, Error)]
pub enum Error {
	#[error("read of {size} bytes at {offset:#x} crosses the end of the buffer ({len:#x} bytes)")]
	OutOfBounds { offset: usize, size: usize, len: usize },
	#[error("run-length data expands to {produced} pixels, expected {expected}")]
	RunLength { expected: usize, produced: usize },
	#[error("unknown sprite compression {0}")]
	UnknownCompression(u8),
	#[error("palette index {index} out of range for {len} colors")]
	PaletteIndex { index: u8, len: usize },
	#[error("pixel data holds {available} bytes, {needed} needed")]
	PixelStream { needed: usize, available: usize },
	#[error("terrain has {count} vertices, at least {min} required")]
	TooFewVertices { count: usize, min: usize },
	#[error("polygon references vertex {index} of {count}")]
	VertexIndex { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A fixed-layout little-endian record, read field by field from the cursor base.
/// Reading advances the cursor past the record.
pub trait Readable: Sized {
	/// Bytes consumed by one read.
	const SIZE: usize;
	fn read(cursor: &mut ByteCursor<'_>) -> Result<Self>;
}

/// Reads `count` records laid out `stride` bytes apart, starting at absolute offset `base`.
/// The cursor itself is left where it was.
pub fn read_table<T: Readable>(cursor: &ByteCursor, base: usize, count: usize, stride: usize) -> Result<Vec<T>> {
	(0..count)
		.map(|index| T::read(&mut cursor.at(base.saturating_add(index.saturating_mul(stride)))))
		.collect()
}

/// Names are stored as fixed 8-byte fields, NUL-padded when shorter.
pub fn fixed_str(bytes: &[u8]) -> String {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	String::from_utf8_lossy(&bytes[..end]).into_owned()
}
