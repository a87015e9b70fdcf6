use std::{fs, io::ErrorKind, path::Path};
use gex_reader::{sprite::decode_sprite, texture::Texture};
use log::{info, warn};
use serde::Deserialize;
use crate::{catalog::Catalog, error::{io_error, Result}, packer::{CornerPacker, Packer}};

/// First logical id of the overlay sprites, above any material id.
pub const SPRITE_ID_BASE: u32 = 0x100000;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
	Spawn,
	Proxsig,
	Unknown,
	Point,
	Cold,
}

impl SpriteKind {
	pub const ALL: [Self; 5] = [Self::Spawn, Self::Proxsig, Self::Unknown, Self::Point, Self::Cold];

	/// Atlas id, the same whether or not the other sprite files were found.
	pub fn id(self) -> u32 {
		SPRITE_ID_BASE + self as u32
	}

	pub fn file_name(self) -> &'static str {
		match self {
			Self::Spawn => "spawn.bin",
			Self::Proxsig => "proxsig.bin",
			Self::Unknown => "unknown.bin",
			Self::Point => "point.bin",
			Self::Cold => "cold.bin",
		}
	}
}

/// Overlay sprite images, loaded once and shared by every decode.
#[derive(Clone, Debug, Default)]
pub struct SpriteSet {
	sprites: Vec<(SpriteKind, Texture)>,
}

impl SpriteSet {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Missing files are skipped; quads for those sprites get full-rectangle UVs.
	pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
		let dir = dir.as_ref();
		let mut sprites = vec![];
		for kind in SpriteKind::ALL {
			let path = dir.join(kind.file_name());
			let data = match fs::read(&path) {
				Ok(data) => data,
				Err(e) if e.kind() == ErrorKind::NotFound => {
					warn!("sprite {} not found, skipping", path.display());
					continue;
				},
				Err(e) => return Err(io_error(path)(e)),
			};
			sprites.push((kind, decode_sprite(&data)?));
		}
		info!("loaded {} of {} sprites from {}", sprites.len(), SpriteKind::ALL.len(), dir.display());
		Ok(Self { sprites })
	}

	pub fn insert(&mut self, kind: SpriteKind, texture: Texture) {
		match self.sprites.iter_mut().find(|(k, _)| *k == kind) {
			Some((_, slot)) => *slot = texture,
			None => self.sprites.push((kind, texture)),
		}
	}

	pub fn get(&self, kind: SpriteKind) -> Option<&Texture> {
		self.sprites.iter().find(|(k, _)| *k == kind).map(|(_, texture)| texture)
	}

	pub fn iter(&self) -> impl Iterator<Item = (SpriteKind, &Texture)> {
		self.sprites.iter().map(|(kind, texture)| (*kind, texture))
	}

	pub fn len(&self) -> usize {
		self.sprites.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sprites.is_empty()
	}
}

/// Built once by the caller and borrowed by every level decode.
pub struct DecodeContext {
	pub catalog: Catalog,
	pub sprites: SpriteSet,
	pub packer: Box<dyn Packer>,
}

impl Default for DecodeContext {
	fn default() -> Self {
		Self::new(Catalog::builtin(), SpriteSet::empty())
	}
}

impl DecodeContext {
	pub fn new(catalog: Catalog, sprites: SpriteSet) -> Self {
		Self { catalog, sprites, packer: Box::new(CornerPacker::default()) }
	}

	pub fn with_packer<P: Packer + 'static>(mut self, packer: P) -> Self {
		self.packer = Box::new(packer);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// 2x1 raw sprite with a two-colour palette.
	fn sprite_bytes() -> Vec<u8> {
		let mut bytes = vec![];
		bytes.extend(2u32.to_le_bytes());
		bytes.extend(1u32.to_le_bytes());
		bytes.extend(2u16.to_le_bytes());
		bytes.extend([255, 0, 0, 255, 255, 255, 0, 0]);
		bytes.extend([0, 0, 1]);
		bytes
	}

	#[test]
	fn sprite_ids_are_stable() {
		assert_eq!(SpriteKind::Spawn.id(), 0x100000);
		assert_eq!(SpriteKind::Unknown.id(), 0x100002);
		assert_eq!(SpriteKind::Cold.id(), 0x100004);
		assert_eq!(SpriteKind::Proxsig.file_name(), "proxsig.bin");
	}

	#[test]
	fn missing_sprites_are_skipped() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("point.bin"), sprite_bytes()).unwrap();
		let sprites = SpriteSet::load(dir.path()).unwrap();
		assert_eq!(sprites.len(), 1);
		let point = sprites.get(SpriteKind::Point).unwrap();
		assert_eq!((point.width, point.height), (2, 1));
		assert!(sprites.get(SpriteKind::Spawn).is_none());
	}

	#[test]
	fn malformed_sprite_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let mut bytes = sprite_bytes();
		bytes.truncate(bytes.len() - 1);
		fs::write(dir.path().join("spawn.bin"), bytes).unwrap();
		assert!(matches!(SpriteSet::load(dir.path()), Err(crate::error::LoadError::Format(_))));
	}

	#[test]
	fn insert_replaces() {
		let mut sprites = SpriteSet::empty();
		sprites.insert(SpriteKind::Cold, Texture::filled(1, 1, glam::Vec4::ONE));
		sprites.insert(SpriteKind::Cold, Texture::filled(2, 2, glam::Vec4::ONE));
		assert_eq!(sprites.len(), 1);
		assert_eq!(sprites.get(SpriteKind::Cold).map(|t| t.width), Some(2));
	}
}
