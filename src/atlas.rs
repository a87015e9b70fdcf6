use std::collections::HashMap;
use gex_reader::texture::Texture;
use glam::{UVec2, Vec2, Vec4};
use log::info;
use shared::PosSize;
use crate::{error::{LoadError, Result}, packer::Packer};

const CHECKER_CELL: u32 = 64;
const CHECKER_LIGHT: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
const CHECKER_DARK: Vec4 = Vec4::new(0.5, 0.0, 0.5, 1.0);

/// Shared texture sheet that every image of a level is blitted into.
#[derive(Clone, Debug)]
pub struct Atlas {
	pub texture: Texture,
	/// Area of each image, keyed by logical id (material id or sprite id).
	pub placements: HashMap<u32, PosSize<UVec2>>,
}

fn checker(x: u32, y: u32) -> Vec4 {
	let odd_x = (x / CHECKER_CELL) % 2 == 1;
	let odd_y = (y / CHECKER_CELL) % 2 == 1;
	if odd_x == odd_y { CHECKER_LIGHT } else { CHECKER_DARK }
}

impl Atlas {
	/// Checkerboard sheet with no placements.
	pub fn blank(side: u32) -> Self {
		let pixels = (0..side * side).map(|i| checker(i % side, i / side)).collect();
		Self {
			texture: Texture { width: side, height: side, pixels },
			placements: HashMap::new(),
		}
	}

	pub fn side(&self) -> u32 {
		self.texture.width
	}

	/// Copies `image` into the sheet with its top-left corner at `pos`.
	/// The caller guarantees the image lies within the sheet.
	pub fn blit(&mut self, image: &Texture, pos: UVec2) {
		let side = self.side() as usize;
		let width = image.width as usize;
		for (row, src) in image.pixels.chunks_exact(width.max(1)).enumerate() {
			let start = (pos.y as usize + row) * side + pos.x as usize;
			self.texture.pixels[start..start + width].copy_from_slice(src);
		}
	}

	pub fn place(&mut self, id: u32, area: PosSize<UVec2>) {
		self.placements.insert(id, area);
	}

	pub fn placement(&self, id: u32) -> Option<PosSize<UVec2>> {
		self.placements.get(&id).copied()
	}

	/// Maps a 0..1 coordinate within image `id` into 0..1 atlas space.
	pub fn remap(&self, id: u32, uv: Vec2) -> Option<Vec2> {
		let PosSize { pos, size } = self.placement(id)?;
		Some((uv * size.as_vec2() + pos.as_vec2()) / self.side() as f32)
	}

	pub fn remap_all<const N: usize>(&self, id: u32, uvs: [Vec2; N]) -> Option<[Vec2; N]> {
		let PosSize { pos, size } = self.placement(id)?;
		let side = self.side() as f32;
		Some(uvs.map(|uv| (uv * size.as_vec2() + pos.as_vec2()) / side))
	}
}

/// An image destined for the atlas, identified by its logical id.
pub struct AtlasImage<'a> {
	pub id: u32,
	pub size: UVec2,
	pub texture: Option<&'a Texture>,
}

/// Packs the images and blits each decoded one into a fresh sheet.
/// Fails when the packer cannot fit them.
pub fn assemble(images: &[AtlasImage], packer: &dyn Packer) -> Result<Atlas> {
	let sizes = images.iter().map(|image| image.size).collect::<Vec<_>>();
	let packing = packer.pack(&sizes);
	if !packing.is_ok() || packing.positions.len() != images.len() {
		return Err(LoadError::AtlasPacking { count: images.len() });
	}
	info!("atlas is {0}x{0} for {1} images", packing.side, images.len());
	let mut atlas = Atlas::blank(packing.side);
	for (image, &pos) in images.iter().zip(&packing.positions) {
		if let Some(texture) = image.texture {
			atlas.blit(texture, pos);
		}
		atlas.place(image.id, PosSize { pos, size: image.size });
	}
	Ok(atlas)
}

/// Area of the sheet not covered by any placement, for diagnostics.
pub fn free_area(atlas: &Atlas) -> u64 {
	let used = atlas.placements.values().map(|PosSize { size, .. }| size.x as u64 * size.y as u64).sum::<u64>();
	(atlas.side() as u64).pow(2).saturating_sub(used)
}

#[cfg(test)]
mod tests {
	use glam::{uvec2, vec2};
	use crate::packer::CornerPacker;
	use super::*;

	#[test]
	fn blank_sheet_is_checkered() {
		let atlas = Atlas::blank(256);
		assert_eq!(atlas.texture.pixel(0, 0), CHECKER_LIGHT);
		assert_eq!(atlas.texture.pixel(63, 63), CHECKER_LIGHT);
		assert_eq!(atlas.texture.pixel(64, 0), CHECKER_DARK);
		assert_eq!(atlas.texture.pixel(0, 64), CHECKER_DARK);
		assert_eq!(atlas.texture.pixel(64, 64), CHECKER_LIGHT);
		assert_eq!(atlas.texture.pixel(200, 200), CHECKER_LIGHT);
	}

	#[test]
	fn blit_copies_rows() {
		let mut atlas = Atlas::blank(256);
		let image = Texture::filled(3, 2, Vec4::ONE);
		atlas.blit(&image, uvec2(10, 20));
		assert_eq!(atlas.texture.pixel(10, 20), Vec4::ONE);
		assert_eq!(atlas.texture.pixel(12, 21), Vec4::ONE);
		assert_eq!(atlas.texture.pixel(13, 21), CHECKER_LIGHT);
		assert_eq!(atlas.texture.pixel(10, 22), CHECKER_LIGHT);
	}

	#[test]
	fn remap_into_placement() {
		let mut atlas = Atlas::blank(256);
		atlas.place(5, PosSize { pos: uvec2(128, 64), size: uvec2(64, 32) });
		assert_eq!(atlas.remap(5, vec2(0.0, 0.0)), Some(vec2(0.5, 0.25)));
		assert_eq!(atlas.remap(5, vec2(1.0, 1.0)), Some(vec2(0.75, 0.375)));
		assert_eq!(atlas.remap(6, Vec2::ZERO), None);
	}

	#[test]
	fn assemble_places_every_image() {
		let red = Texture::filled(4, 4, Vec4::new(1.0, 0.0, 0.0, 1.0));
		let images = [
			AtlasImage { id: 0, size: red.size(), texture: Some(&red) },
			AtlasImage { id: 1, size: uvec2(8, 2), texture: None },
		];
		let atlas = assemble(&images, &CornerPacker::default()).unwrap();
		assert_eq!(atlas.side(), 256);
		let area = atlas.placement(0).unwrap();
		assert_eq!(atlas.texture.pixel(area.pos.x, area.pos.y), red.pixels[0]);
		assert!(atlas.placement(1).is_some());
		assert_eq!(free_area(&atlas), 256 * 256 - 16 - 16);
	}

	#[test]
	fn packing_failure_is_an_error() {
		let images = [AtlasImage { id: 0, size: uvec2(1024, 1024), texture: None }];
		let packer = CornerPacker { min_side: 256, max_side: 512 };
		assert!(matches!(assemble(&images, &packer), Err(LoadError::AtlasPacking { count: 1 })));
	}
}
