//! Textures of the companion texture file, stored in 3dfx Glide hardware formats.

use bitfield::bitfield;
use glam::{UVec2, Vec4};
use crate::{ByteCursor, Error, Readable, Result};

/// Decoded image, channels normalized to 0..1.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
	pub width: u32,
	pub height: u32,
	pub pixels: Box<[Vec4]>,
}

impl Texture {
	pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
		Self {
			width,
			height,
			pixels: vec![color; width as usize * height as usize].into_boxed_slice(),
		}
	}

	pub fn size(&self) -> UVec2 {
		UVec2::new(self.width, self.height)
	}

	pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
		self.pixels[(y * self.width + x) as usize]
	}

	pub(crate) fn from_rgba8<I: IntoIterator<Item = [u8; 4]>>(width: u32, height: u32, rgba: I) -> Self {
		let pixels = rgba
			.into_iter()
			.map(|color| Vec4::from_array(std::array::from_fn(|c| color[c] as f32 / 255.0)))
			.collect();
		Self { width, height, pixels }
	}
}

#[derive(Readable, Clone, Debug)]
pub struct NccTable {
	pub y: [u8; 16],
	pub i: [[i16; 3]; 4],
	pub q: [[i16; 3]; 4],
	pub packed: [u32; 12],
}

#[derive(Readable, Clone, Debug)]
pub struct TextureHeader {
	pub small_lod: u32,
	pub large_lod: u32,
	pub aspect: u32,
	pub format: u32,
	#[skip(4)]
	pub ncc: NccTable,
	pub small_lod_bytes: u32,
	pub large_lod_bytes: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
	Yiq422,
	Argb1555,
	Argb4444,
	Unsupported(u32),
}

impl From<u32> for TextureFormat {
	fn from(tag: u32) -> Self {
		match tag {
			0x1 => Self::Yiq422,
			0xB => Self::Argb1555,
			0xC => Self::Argb4444,
			tag => Self::Unsupported(tag),
		}
	}
}

/// Pixel dimensions of a mip level: the long side is `256 >> lod`, the short side is reduced by the aspect class.
pub fn texture_size(lod: u32, aspect: u32) -> UVec2 {
	let side = 256u32.checked_shr(lod).unwrap_or(0);
	let (w, h) = match aspect {
		0 => (side, side >> 3),
		1 => (side, side >> 2),
		2 => (side, side >> 1),
		4 => (side >> 1, side),
		5 => (side >> 2, side),
		6 => (side >> 3, side),
		_ => (side, side),
	};
	UVec2::new(w, h).max(UVec2::ONE)
}

pub trait PixelFormat<const N: usize> {
	fn to_rgba(&self, pixel: [u8; N]) -> [u8; 4];
}

bitfield! {
	#[derive(Clone, Copy)]
	struct Color4444(u16);
	u8;
	a, _: 15, 12;
	r, _: 11, 8;
	g, _: 7, 4;
	b, _: 3, 0;
}

bitfield! {
	#[derive(Clone, Copy)]
	struct Color1555(u16);
	u8;
	a, _: 15;
	r, _: 14, 10;
	g, _: 9, 5;
	b, _: 4, 0;
}

pub struct Argb4444;

impl PixelFormat<2> for Argb4444 {
	fn to_rgba(&self, pixel: [u8; 2]) -> [u8; 4] {
		let c = Color4444(u16::from_le_bytes(pixel));
		[c.r(), c.g(), c.b(), c.a()].map(|n| n * 17)
	}
}

pub struct Argb1555;

impl PixelFormat<2> for Argb1555 {
	fn to_rgba(&self, pixel: [u8; 2]) -> [u8; 4] {
		let c = Color1555(u16::from_le_bytes(pixel));
		[c.r() * 8, c.g() * 8, c.b() * 8, if c.a() { 255 } else { 0 }]
	}
}

/// Luma/chroma palette built from an NCC table.
pub struct Yiq422 {
	y: [i32; 16],
	i: [[i32; 3]; 4],
	q: [[i32; 3]; 4],
}

/// Chroma entries are 9-bit two's complement.
fn sign_extend_9(v: i16) -> i32 {
	let v = v as u16;
	(if v & 0x100 != 0 { v | 0xFF00 } else { v }) as i16 as i32
}

impl Yiq422 {
	pub fn new(ncc: &NccTable) -> Self {
		Self {
			y: ncc.y.map(|y| y as i32),
			i: ncc.i.map(|row| row.map(sign_extend_9)),
			q: ncc.q.map(|row| row.map(sign_extend_9)),
		}
	}
}

impl PixelFormat<1> for Yiq422 {
	fn to_rgba(&self, [pixel]: [u8; 1]) -> [u8; 4] {
		let y = self.y[(pixel >> 4) as usize];
		let i = &self.i[((pixel >> 2) & 3) as usize];
		let q = &self.q[(pixel & 3) as usize];
		let [r, g, b] = std::array::from_fn(|c| (y + i[c] + q[c]).clamp(0, 255) as u8);
		[r, g, b, 255]
	}
}

/// Decodes exactly `width * height` samples from the front of `raw`.
pub fn decode_pixels<const N: usize, P: PixelFormat<N>>(format: &P, size: UVec2, raw: &[u8]) -> Result<Texture> {
	let count = size.x as usize * size.y as usize;
	let needed = count * N;
	if raw.len() < needed {
		return Err(Error::PixelStream { needed, available: raw.len() });
	}
	let rgba = raw[..needed].chunks_exact(N).map(|pixel| {
		let mut sample = [0; N];
		sample.copy_from_slice(pixel);
		format.to_rgba(sample)
	});
	Ok(Texture::from_rgba8(size.x, size.y, rgba))
}

/// One texture of the texture file: its header and undecoded pixel stream.
pub struct TextureEntry<'a> {
	pub header: TextureHeader,
	pub data: &'a [u8],
}

impl<'a> TextureEntry<'a> {
	pub fn size(&self) -> UVec2 {
		texture_size(self.header.large_lod, self.header.aspect)
	}

	pub fn format(&self) -> TextureFormat {
		self.header.format.into()
	}

	/// `None` when the format has no decoder.
	pub fn decode(&self) -> Result<Option<Texture>> {
		let size = self.size();
		let texture = match self.format() {
			TextureFormat::Argb4444 => decode_pixels(&Argb4444, size, self.data)?,
			TextureFormat::Argb1555 => decode_pixels(&Argb1555, size, self.data)?,
			TextureFormat::Yiq422 => decode_pixels(&Yiq422::new(&self.header.ncc), size, self.data)?,
			TextureFormat::Unsupported(_) => return Ok(None),
		};
		Ok(Some(texture))
	}
}

/// Scans the texture file: a u32 count, then per texture a header followed by its large mip level.
pub fn read_entries(data: &[u8]) -> Result<Vec<TextureEntry<'_>>> {
	let mut cursor = ByteCursor::new(data);
	let count = cursor.read_advance::<u32>(0)?;
	let mut entries = Vec::new();
	for _ in 0..count {
		let header = TextureHeader::read(&mut cursor)?;
		let data = cursor.take_bytes(header.large_lod_bytes as usize)?;
		entries.push(TextureEntry { header, data });
	}
	Ok(entries)
}
