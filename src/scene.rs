use std::collections::HashMap;
use gex_reader::{map::TextureAnimEntry, texture::Texture};
use glam::{I16Vec3, IVec3, Vec2, Vec3, Vec4};
use nonmax::NonMaxU32;
use crate::{atlas::Atlas, error::LookupMiss};

/// Model address of the level terrain.
pub const TERRAIN_ADDRESS: u32 = 0xFFFF_FFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
	pub pos: IVec3,
	/// Position before any scaling.
	pub original: IVec3,
	pub normal_id: u16,
	pub color: [u8; 4],
}

impl Vertex {
	pub const GREY: [u8; 4] = [128, 128, 128, 255];

	pub fn new(pos: IVec3, color: [u8; 4]) -> Self {
		Self { pos, original: pos, normal_id: 0, color }
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Polygon {
	pub indices: [u32; 3],
	/// `None` when no texture is bound.
	pub material: Option<NonMaxU32>,
	pub flags: u16,
	/// Atlas space.
	pub uvs: [Vec2; 3],
	/// Texture-animation table of the mesh, set on animated polygons.
	pub texture_anim: Option<u32>,
}

impl Polygon {
	pub fn untextured(indices: [u32; 3]) -> Self {
		Self { indices, material: None, flags: 0, uvs: [Vec2::ZERO; 3], texture_anim: None }
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InstanceKind {
	#[default]
	Plain,
	/// Drawn as a camera-facing quad.
	Sprite,
	/// Moving platform, with the address of its path if it has one.
	Platform { path: Option<u32> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
	pub position: Vec3,
	/// Euler angles in radians.
	pub rotation: Vec3,
	pub visible: bool,
	/// File offset of the instance record, 0 for instances not backed by one.
	pub address: u32,
	pub payload: [u32; 4],
	pub kind: InstanceKind,
}

impl Default for Instance {
	fn default() -> Self {
		Self {
			position: Vec3::ZERO,
			rotation: Vec3::ZERO,
			visible: true,
			address: 0,
			payload: [0; 4],
			kind: InstanceKind::Plain,
		}
	}
}

impl Instance {
	pub fn at(position: Vec3) -> Self {
		Self { position, ..Default::default() }
	}
}

#[derive(Clone, Debug, Default)]
pub struct Model {
	pub address: u32,
	pub name: String,
	pub vertices: Vec<Vertex>,
	pub polygons: Vec<Polygon>,
	pub instances: Vec<Instance>,
	pub has_no_textures: bool,
	pub texture_anims: Vec<TextureAnimEntry>,
}

impl Model {
	pub fn new(address: u32, name: impl Into<String>) -> Self {
		Self { address, name: name.into(), ..Default::default() }
	}

	pub fn is_synthetic(&self) -> bool {
		self.name.starts_with(['@', '$'])
	}

	pub(crate) fn update_has_no_textures(&mut self) {
		self.has_no_textures = self.polygons.iter().all(|polygon| polygon.material.is_none());
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathPoint {
	pub speed: u16,
	pub pos: I16Vec3,
}

impl PathPoint {
	/// Position with y up, as used by the meshes.
	pub fn scene_pos(&self) -> Vec3 {
		let pos = self.pos.as_vec3();
		Vec3::new(pos.x, pos.z, -pos.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathRotation {
	pub speed: u16,
	/// x, y, z, w
	pub quat: Vec4,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
	/// File offset of the path header.
	pub address: u32,
	/// File offset of the instance that follows the path.
	pub owner: u32,
	pub points: Vec<PathPoint>,
	pub rotations: Vec<PathRotation>,
}

/// Everything decoded from one level.
#[derive(Clone, Debug)]
pub struct Scene {
	pub models: Vec<Model>,
	/// File textures in file order, then the overlay sprites.
	pub textures: Vec<Texture>,
	pub paths: Vec<Path>,
	pub atlas: Atlas,
	pub name: String,
	pub background: Vec3,
	pub pickup_names: [String; 3],
	pub base_data_offset: usize,
	pub lookup_misses: Vec<LookupMiss>,
	by_address: HashMap<u32, usize>,
}

impl Scene {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn new(
		models: Vec<Model>,
		textures: Vec<Texture>,
		paths: Vec<Path>,
		atlas: Atlas,
		name: String,
		background: Vec3,
		pickup_names: [String; 3],
		base_data_offset: usize,
		lookup_misses: Vec<LookupMiss>,
	) -> Self {
		let by_address = models.iter().enumerate().map(|(index, model)| (model.address, index)).collect();
		Self {
			models,
			textures,
			paths,
			atlas,
			name,
			background,
			pickup_names,
			base_data_offset,
			lookup_misses,
			by_address,
		}
	}

	pub fn model(&self, address: u32) -> Option<&Model> {
		self.by_address.get(&address).map(|&index| &self.models[index])
	}

	pub fn terrain(&self) -> Option<&Model> {
		self.model(TERRAIN_ADDRESS)
	}

	pub fn address_to_file_offset(&self, address: u32) -> usize {
		address as usize + self.base_data_offset
	}

	pub fn file_offset_to_address(&self, offset: usize) -> Option<u32> {
		offset.checked_sub(self.base_data_offset)?.try_into().ok()
	}

	pub fn instance_count(&self) -> usize {
		self.models.iter().map(|model| model.instances.len()).sum()
	}
}
