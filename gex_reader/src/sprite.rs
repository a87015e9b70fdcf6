//! Palette images used for overlay sprites (spawn point, markers).
//!
//! Layout: u32 width, u32 height, u16 palette length, palette entries as A, B, G, R bytes,
//! a compression byte, then either one palette index per pixel or a u32 byte length
//! followed by `(count, index)` pairs.

use crate::{ByteCursor, Error, Result, texture::Texture};

const RAW: u8 = 0;
const RUN_LENGTH: u8 = 1;

/// Expands `(count, index)` pairs, which must cover exactly `expected` pixels.
pub fn expand_runs(runs: &[u8], expected: usize) -> Result<Vec<u8>> {
	let mut indices = Vec::with_capacity(expected.min(runs.len() / 2 * 255));
	for run in runs.chunks_exact(2) {
		let [count, index] = [run[0], run[1]];
		let produced = indices.len() + count as usize;
		if produced > expected {
			return Err(Error::RunLength { expected, produced });
		}
		indices.resize(produced, index);
	}
	if indices.len() != expected {
		return Err(Error::RunLength { expected, produced: indices.len() });
	}
	Ok(indices)
}

pub fn decode_sprite(data: &[u8]) -> Result<Texture> {
	let mut cursor = ByteCursor::new(data);
	let width = cursor.read_advance::<u32>(0)?;
	let height = cursor.read_advance::<u32>(0)?;
	let palette_len = cursor.read_advance::<u16>(0)? as usize;
	let palette = cursor
		.take_bytes(palette_len * 4)?
		.chunks_exact(4)
		.map(|abgr| [abgr[3], abgr[2], abgr[1], abgr[0]])
		.collect::<Vec<_>>();
	let count = width as usize * height as usize;
	let indices = match cursor.read_advance::<u8>(0)? {
		RAW => cursor.take_bytes(count)?.to_vec(),
		RUN_LENGTH => {
			let len = cursor.read_advance::<u32>(0)? as usize;
			expand_runs(cursor.take_bytes(len)?, count)?
		},
		compression => return Err(Error::UnknownCompression(compression)),
	};
	let rgba = indices
		.into_iter()
		.map(|index| palette.get(index as usize).copied().ok_or(Error::PaletteIndex { index, len: palette.len() }))
		.collect::<Result<Vec<_>>>()?;
	Ok(Texture::from_rgba8(width, height, rgba))
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::Vec4;

	/// Run-length encoder matching the asset converter: runs break at 255.
	fn encode_runs(indices: &[u8]) -> Vec<u8> {
		let mut out = Vec::new();
		let mut iter = indices.iter().peekable();
		while let Some(&index) = iter.next() {
			let mut count = 1u8;
			while count < 255 && iter.peek() == Some(&&index) {
				iter.next();
				count += 1;
			}
			out.extend([count, index]);
		}
		out
	}

	fn sprite_bytes(width: u32, height: u32, palette: &[[u8; 4]], compression: u8, body: &[u8]) -> Vec<u8> {
		let mut data = Vec::new();
		data.extend(width.to_le_bytes());
		data.extend(height.to_le_bytes());
		data.extend((palette.len() as u16).to_le_bytes());
		for &[r, g, b, a] in palette {
			data.extend([a, b, g, r]);
		}
		data.push(compression);
		if compression == RUN_LENGTH {
			data.extend((body.len() as u32).to_le_bytes());
		}
		data.extend(body);
		data
	}

	#[test]
	fn runs_reproduce_indices() {
		let mut indices = vec![3u8; 600];
		indices.extend([0, 1, 1, 2]);
		indices.extend(vec![0u8; 255]);
		let runs = encode_runs(&indices);
		assert_eq!(runs[0..2], [255, 3]);
		assert_eq!(expand_runs(&runs, indices.len()).unwrap(), indices);
	}

	#[test]
	fn run_overrun_and_underrun_fail() {
		let runs = [4, 0, 4, 1];
		assert!(matches!(expand_runs(&runs, 6), Err(Error::RunLength { expected: 6, produced: 8 })));
		assert!(matches!(expand_runs(&runs, 10), Err(Error::RunLength { expected: 10, produced: 8 })));
		assert_eq!(expand_runs(&runs, 8).unwrap().len(), 8);
	}

	#[test]
	fn raw_sprite() {
		let palette = [[255, 0, 0, 255], [0, 0, 255, 0]];
		let data = sprite_bytes(2, 2, &palette, RAW, &[0, 1, 1, 0]);
		let sprite = decode_sprite(&data).unwrap();
		assert_eq!(sprite.pixels.len(), 4);
		assert_eq!(sprite.pixel(0, 0), Vec4::new(1.0, 0.0, 0.0, 1.0));
		assert_eq!(sprite.pixel(1, 0), Vec4::new(0.0, 0.0, 1.0, 0.0));
	}

	#[test]
	fn run_length_sprite() {
		let palette = [[0, 255, 0, 255], [255, 255, 255, 255]];
		let indices = [0, 0, 0, 1, 1, 0, 0, 0, 0];
		let data = sprite_bytes(3, 3, &palette, RUN_LENGTH, &encode_runs(&indices));
		let sprite = decode_sprite(&data).unwrap();
		assert_eq!(sprite.pixels.len(), 9);
		assert_eq!(sprite.pixel(0, 1), Vec4::ONE);
		assert_eq!(sprite.pixel(2, 2), Vec4::new(0.0, 1.0, 0.0, 1.0));
	}

	#[test]
	fn corrupted_sprites_fail() {
		let palette = [[0, 0, 0, 255]];
		let short = sprite_bytes(3, 3, &palette, RUN_LENGTH, &[8, 0]);
		assert!(matches!(decode_sprite(&short), Err(Error::RunLength { .. })));
		let bad_index = sprite_bytes(1, 1, &palette, RAW, &[1]);
		assert!(matches!(decode_sprite(&bad_index), Err(Error::PaletteIndex { index: 1, len: 1 })));
		let unknown = sprite_bytes(1, 1, &palette, 7, &[0]);
		assert!(matches!(decode_sprite(&unknown), Err(Error::UnknownCompression(7))));
		let truncated = sprite_bytes(4, 4, &palette, RAW, &[0; 3]);
		assert!(matches!(decode_sprite(&truncated), Err(Error::OutOfBounds { .. })));
	}
}
