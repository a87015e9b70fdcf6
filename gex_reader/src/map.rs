//! Record layouts of the map file. Addresses inside records are relative to the data offset.

use bitfield::bitfield;
use glam::{I16Vec3, I16Vec4, U16Vec3};
use crate::Readable;

/// Material address meaning "no material", as stored in 16-bit and 32-bit fields.
pub const NO_MATERIAL: [u32; 2] = [0xFFFF, 0xFFFF_FFFF];

/// Offset of the level header within the file, derived from the first word of the file.
pub fn data_offset(raw: u32) -> usize {
	(((raw as usize) + 0x200) >> 9) << 11
}

pub fn is_material(address: u32) -> bool {
	!NO_MATERIAL.contains(&address)
}

bitfield! {
	#[derive(Clone, Copy, PartialEq, Eq, Default)]
	pub struct PolygonFlags(u16);
	impl Debug;
	pub textured, _: 1;
	pub animated, _: 3;
	pub transparent, _: 7;
}

impl From<u8> for PolygonFlags {
	fn from(flags: u8) -> Self {
		Self(flags as u16)
	}
}

#[derive(Readable, Clone, Debug)]
pub struct LevelHeader {
	pub geometry_address: u32,
	#[skip(28)]
	pub skybox_count: u32,
	pub skybox_address: u32,
	/// Stored as x, y, z with z up.
	pub spawn: I16Vec3,
	#[skip(14)]
	pub model_address: u32,
	#[skip(4)]
	pub background: [u8; 3],
	#[skip(49)]
	pub object_count: u32,
	pub object_address: u32,
	#[skip(96)]
	pub level_id: [u8; 8],
	#[skip(4)]
	pub pickup0: [u8; 8],
	#[skip(4)]
	pub pickup1: [u8; 8],
	#[skip(4)]
	pub pickup2: [u8; 8],
}

impl LevelHeader {
	pub const SPAWN_OFFSET: u32 = 0x28;

	pub fn pickup_names(&self) -> [[u8; 8]; 3] {
		[self.pickup0, self.pickup1, self.pickup2]
	}
}

#[derive(Readable, Clone, Debug)]
pub struct TerrainHeader {
	pub bsp_address: u32,
	#[skip(20)]
	pub vertex_count: u32,
	pub polygon_count: u32,
	pub vertex_color_count: u32,
	pub vertex_address: u32,
	pub polygon_address: u32,
	pub vertex_color_address: u32,
	pub material_address: u32,
}

/// Shared by terrain and object meshes.
#[derive(Readable, Clone, Copy, Debug)]
pub struct MeshVertex {
	pub pos: I16Vec3,
	pub normal: u16,
	pub color: [u8; 4],
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct TerrainPolygon {
	pub indices: U16Vec3,
	#[skip(1)]
	pub flags: u8,
	#[skip(8)]
	pub material_address: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct ObjectPolygon {
	pub indices: U16Vec3,
	#[skip(1)]
	pub flags: u8,
	pub material_address: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct SkyboxChunk {
	#[skip(2)]
	pub polygon_count: u16,
	pub vertex_address: u32,
	pub polygon_address: u32,
	#[skip(8)]
	pub vertex_count: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct SkyboxVertex {
	pub pos: I16Vec3,
	pub normal: u16,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct SkyboxPolygon {
	pub indices: U16Vec3,
	pub flags: u16,
	pub material_address: u32,
}

/// Texture coordinates of one face, as byte pairs, plus the texture page they refer to.
#[derive(Readable, Clone, Copy, Debug)]
pub struct MaterialRecord {
	pub uv0: [u8; 2],
	#[skip(2)]
	pub uv1: [u8; 2],
	pub texture_page: u16,
	pub uv2: [u8; 2],
}

impl MaterialRecord {
	pub fn material_id(&self) -> u32 {
		(self.texture_page % 0x1000) as u32
	}

	pub fn uvs(&self) -> [[u8; 2]; 3] {
		[self.uv0, self.uv1, self.uv2]
	}
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct ObjectModelHeader {
	#[skip(8)]
	pub mesh_count: u16,
	#[skip(2)]
	pub mesh_table_address: u32,
	#[skip(20)]
	pub name_address: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct ObjectMeshHeader {
	pub vertex_count: u16,
	#[skip(2)]
	pub vertex_address: u32,
	#[skip(8)]
	pub polygon_count: u16,
	#[skip(2)]
	pub polygon_address: u32,
	pub bone_count: u16,
	#[skip(2)]
	pub bone_address: u32,
	pub texture_anim_address: u32,
}

/// Entry of a mesh's texture-animation table; entries are 12 bytes apart after a u32 count.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureAnimEntry {
	pub material_address: u32,
	pub subframe_count: u32,
}

impl TextureAnimEntry {
	pub const STRIDE: usize = 12;
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct InstanceRecord {
	pub model_address: u32,
	#[skip(6)]
	pub rotation: I16Vec3,
	pub position: I16Vec3,
	#[skip(10)]
	pub payload: [u32; 4],
}

impl InstanceRecord {
	pub const PLATFORM_WORD: usize = 2;
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct PlatformRecord {
	pub path_address: u32,
	pub rotation_address: u32,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct PathHeader {
	pub points_address: u32,
	pub point_count: u16,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct PathPointRecord {
	pub speed: u16,
	pub pos: I16Vec3,
}

impl PathPointRecord {
	pub const STRIDE: usize = 0x20;
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct RotationHeader {
	pub rotations_address: u32,
	pub rotation_count: u16,
}

#[derive(Readable, Clone, Copy, Debug)]
pub struct PathRotationRecord {
	pub speed: u16,
	pub quat: I16Vec4,
}
