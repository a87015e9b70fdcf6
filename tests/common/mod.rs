//! Minimal synthetic level: terrain, an empty skybox, three object models and four instances.
//!
//! Addresses below are relative to the data offset, 0x800.

#![allow(dead_code)]

pub const DATA_OFFSET: usize = 0x800;
pub const CHECKSUM: u32 = 0x100;
pub const SKYBOX: u32 = 0x300;
pub const MATERIAL: u32 = 0x2C0;
pub const CRATE: u32 = 0x400;
pub const PROXSIG: u32 = 0x500;
pub const PLATFORM_MODEL: u32 = 0x580;
pub const INSTANCES: u32 = 0x600;
pub const PLATFORM: u32 = 0x700;
pub const PATH: u32 = 0x710;

pub struct Bytes(pub Vec<u8>);

impl Bytes {
	pub fn put(&mut self, offset: usize, bytes: &[u8]) {
		if self.0.len() < offset + bytes.len() {
			self.0.resize(offset + bytes.len(), 0);
		}
		self.0[offset..offset + bytes.len()].copy_from_slice(bytes);
	}

	pub fn u16(&mut self, offset: usize, v: u16) {
		self.put(offset, &v.to_le_bytes());
	}

	pub fn u32(&mut self, offset: usize, v: u32) {
		self.put(offset, &v.to_le_bytes());
	}

	pub fn i16s(&mut self, offset: usize, values: [i16; 3]) {
		for (i, v) in values.into_iter().enumerate() {
			self.put(offset + i * 2, &v.to_le_bytes());
		}
	}
}

/// Writes into the map with data-relative addresses.
pub struct MapBuilder {
	pub file: Bytes,
}

impl MapBuilder {
	fn at(address: u32) -> usize {
		DATA_OFFSET + address as usize
	}

	pub fn put(&mut self, address: u32, bytes: &[u8]) {
		self.file.put(Self::at(address), bytes);
	}

	pub fn u16(&mut self, address: u32, v: u16) {
		self.file.u16(Self::at(address), v);
	}

	pub fn u32(&mut self, address: u32, v: u32) {
		self.file.u32(Self::at(address), v);
	}

	pub fn i16s(&mut self, address: u32, values: [i16; 3]) {
		self.file.i16s(Self::at(address), values);
	}

	/// 3 vertices, one textured triangle.
	fn mesh_vertices(&mut self, address: u32) {
		self.i16s(address, [0, 0, 0]);
		self.i16s(address + 12, [100, 0, 0]);
		self.i16s(address + 24, [0, 100, 50]);
		for i in 0..3 {
			self.put(address + 6 + i * 12, &[0, 0, 200, 100, 50, 255]);
		}
	}

	fn object_header(&mut self, address: u32, name: &[u8; 8], mesh_count: u16, mesh_table: u32) {
		self.u16(address + 0x8, mesh_count);
		self.u32(address + 0xC, mesh_table);
		self.u32(address + 0x24, address + 0x30);
		self.put(address + 0x30, name);
	}

	pub fn instance(&mut self, index: u32, model: u32, rotation: [i16; 3], position: [i16; 3], payload: [u32; 4]) {
		let address = INSTANCES + index * 0x30;
		self.u32(address, model);
		self.i16s(address + 0xA, rotation);
		self.i16s(address + 0x10, position);
		for (i, word) in payload.into_iter().enumerate() {
			self.u32(address + 0x20 + i as u32 * 4, word);
		}
	}

	pub fn terrain_vertex_count(&mut self, count: u32) {
		self.u32(0x218, count);
	}

	pub fn level_id(&mut self, id: &[u8; 8]) {
		self.put(0xE0, id);
	}

	pub fn build(self) -> Vec<u8> {
		self.file.0
	}
}

pub fn map() -> MapBuilder {
	let mut file = Bytes(vec![0; DATA_OFFSET * 2]);
	file.u32(0, CHECKSUM);
	let mut map = MapBuilder { file };
	// header
	map.u32(0x00, 0x200);
	map.u32(0x20, 0);
	map.u32(0x24, SKYBOX);
	map.i16s(0x28, [100, 200, 300]);
	map.put(0x44, &[255, 0, 51]);
	map.u32(0x78, 4);
	map.u32(0x7C, INSTANCES);
	map.level_id(b"spy_____");
	map.put(0xEC, b"fly_____");
	map.put(0xF8, b"paw_____");
	map.put(0x104, b"tv\0\0\0\0\0\0");
	// terrain
	map.terrain_vertex_count(3);
	map.u32(0x21C, 1);
	map.u32(0x224, 0x240);
	map.u32(0x228, 0x280);
	map.mesh_vertices(0x240);
	map.u16(0x282, 1);
	map.u16(0x284, 2);
	map.u32(0x290, MATERIAL);
	// material on texture 0
	map.put(MATERIAL, &[0, 0, 0, 0, 255, 0, 0, 0, 0, 255]);
	// crate: one mesh, one textured polygon
	map.object_header(CRATE, b"crate___", 1, CRATE + 0x40);
	map.u32(CRATE + 0x40, CRATE + 0x50);
	map.u16(CRATE + 0x50, 3);
	map.u32(CRATE + 0x54, CRATE + 0x80);
	map.u16(CRATE + 0x60, 1);
	map.u32(CRATE + 0x64, CRATE + 0xC0);
	map.mesh_vertices(CRATE + 0x80);
	map.u16(CRATE + 0xC2, 1);
	map.u16(CRATE + 0xC4, 2);
	map.put(CRATE + 0xC7, &[0x02]);
	map.u32(CRATE + 0xC8, MATERIAL);
	map.object_header(PROXSIG, b"proxsig_", 0, 0);
	map.object_header(PLATFORM_MODEL, b"mplat___", 0, 0);
	// instances: the crate twice, the sprite, the platform
	map.instance(0, CRATE, [1024, 1024, 0], [1000, 2000, 3000], [1, 2, 3, 4]);
	map.instance(1, CRATE, [0, 0, 0], [0, 0, 0], [0; 4]);
	map.instance(2, PROXSIG, [0, 0, 0], [500, 0, 0], [0; 4]);
	map.instance(3, PLATFORM_MODEL, [0, 0, 0], [0, 0, 0], [0, 0, PLATFORM, 0]);
	// platform with a path of no points
	map.u32(PLATFORM, PATH);
	map.u32(PATH, PATH + 0x10);
	map
}

/// One 4x4 ARGB4444 texture, or one of an undecodable format.
pub fn textures(format: u32) -> Vec<u8> {
	let mut bytes = vec![];
	bytes.extend(1u32.to_le_bytes());
	for word in [6, 6, 3, format, 0] {
		bytes.extend(u32::to_le_bytes(word));
	}
	bytes.extend([0; 112]);
	bytes.extend(0u32.to_le_bytes());
	bytes.extend(32u32.to_le_bytes());
	for _ in 0..16 {
		bytes.extend(0xF0F0u16.to_le_bytes());
	}
	bytes
}

pub const ARGB4444: u32 = 0xC;
