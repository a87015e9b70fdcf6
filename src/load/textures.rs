use gex_reader::texture::{read_entries, Texture};
use glam::Vec4;
use log::{debug, warn};
use crate::{atlas::{self, Atlas, AtlasImage}, context::DecodeContext, error::{LookupMiss, Result}};

pub(super) struct DecodedTextures {
	/// File textures in file order, then the loaded sprites.
	pub textures: Vec<Texture>,
	pub atlas: Atlas,
	pub misses: Vec<LookupMiss>,
}

/// Decodes the texture file and packs it, together with the sprites, into the atlas.
/// File textures are keyed by their index, sprites by their sprite id.
pub(super) fn decode(data: &[u8], ctx: &DecodeContext) -> Result<DecodedTextures> {
	let entries = read_entries(data)?;
	let mut textures = Vec::with_capacity(entries.len() + ctx.sprites.len());
	let mut ids = Vec::with_capacity(textures.capacity());
	let mut blit = Vec::with_capacity(textures.capacity());
	let mut misses = vec![];
	for (index, entry) in entries.iter().enumerate() {
		let (texture, decoded) = match entry.decode()? {
			Some(texture) => (texture, true),
			None => {
				let miss = LookupMiss::TextureFormat { index, tag: entry.header.format };
				warn!("{}", miss);
				misses.push(miss);
				let size = entry.size();
				(Texture::filled(size.x, size.y, Vec4::ZERO), false)
			},
		};
		blit.push(decoded);
		ids.push(index as u32);
		textures.push(texture);
	}
	debug!("decoded {} file textures", textures.len());
	for (kind, sprite) in ctx.sprites.iter() {
		ids.push(kind.id());
		blit.push(true);
		textures.push(sprite.clone());
	}
	let images = textures
		.iter()
		.zip(&ids)
		.zip(&blit)
		.map(|((texture, &id), &blit)| AtlasImage { id, size: texture.size(), texture: blit.then_some(texture) })
		.collect::<Vec<_>>();
	let atlas = atlas::assemble(&images, &*ctx.packer)?;
	debug!("atlas free area: {} pixels", atlas::free_area(&atlas));
	Ok(DecodedTextures { textures, atlas, misses })
}
