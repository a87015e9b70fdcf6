//! Mesh decoding for the three geometry layouts: level terrain, object meshes and skybox chunks.

use gex_reader::{
	fixed_str, read_table, ByteCursor, Error as FormatError, Readable,
	map::{self, LevelHeader, MaterialRecord, MeshVertex, ObjectMeshHeader, ObjectModelHeader, ObjectPolygon, PolygonFlags, SkyboxChunk, SkyboxPolygon, SkyboxVertex, TerrainHeader, TerrainPolygon, TextureAnimEntry},
};
use glam::{I16Vec3, IVec3, Vec2};
use log::debug;
use nonmax::NonMaxU32;
use crate::{atlas::Atlas, error::LookupMiss, scene::{Instance, Model, Polygon, Vertex, TERRAIN_ADDRESS}};

pub const MIN_TERRAIN_VERTICES: usize = 3;
const SKYBOX_SCALE: i32 = 20;

/// Stored with z up; scene space has y up.
fn y_up(pos: I16Vec3) -> IVec3 {
	let pos = pos.as_ivec3();
	IVec3::new(pos.x, pos.z, -pos.y)
}

fn check_indices(indices: [u16; 3], count: usize) -> gex_reader::Result<[u32; 3]> {
	for index in indices {
		if index as usize >= count {
			return Err(FormatError::VertexIndex { index: index as usize, count });
		}
	}
	Ok(indices.map(|index| index as u32))
}

/// Reads meshes out of the map file, binding material UVs to the atlas as it goes.
pub struct GeometryDecoder<'a> {
	file: ByteCursor<'a>,
	data_offset: usize,
	atlas: &'a Atlas,
	pub misses: Vec<LookupMiss>,
}

impl<'a> GeometryDecoder<'a> {
	pub fn new(file: ByteCursor<'a>, data_offset: usize, atlas: &'a Atlas) -> Self {
		Self { file, data_offset, atlas, misses: vec![] }
	}

	fn abs(&self, address: u32) -> usize {
		self.data_offset.saturating_add(address as usize)
	}

	fn record<T: Readable>(&self, address: u32) -> gex_reader::Result<T> {
		T::read(&mut self.file.at(self.abs(address)))
	}

	fn table<T: Readable>(&self, address: u32, count: usize, stride: usize) -> gex_reader::Result<Vec<T>> {
		read_table(&self.file, self.abs(address), count, stride)
	}

	/// Material id and atlas UVs of a material record. UVs are zero when the material has no placement.
	fn material(&mut self, model: &str, address: u32) -> gex_reader::Result<(Option<NonMaxU32>, [Vec2; 3])> {
		let record = self.record::<MaterialRecord>(address)?;
		let id = record.material_id();
		let uvs = record.uvs().map(|uv| Vec2::from_array(uv.map(|c| c as f32 / 255.0)));
		let uvs = match self.atlas.remap_all(id, uvs) {
			Some(uvs) => uvs,
			None => {
				self.misses.push(LookupMiss::Material { model: model.to_owned(), id });
				[Vec2::ZERO; 3]
			},
		};
		Ok((NonMaxU32::new(id), uvs))
	}

	pub fn terrain(&mut self, header: &LevelHeader) -> gex_reader::Result<Model> {
		let terrain = self.record::<TerrainHeader>(header.geometry_address)?;
		let vertex_count = terrain.vertex_count as usize;
		if vertex_count < MIN_TERRAIN_VERTICES {
			return Err(FormatError::TooFewVertices { count: vertex_count, min: MIN_TERRAIN_VERTICES });
		}
		let mut model = Model::new(TERRAIN_ADDRESS, "@Level");
		model.vertices = self
			.table::<MeshVertex>(terrain.vertex_address, vertex_count, MeshVertex::SIZE)?
			.into_iter()
			.map(|MeshVertex { pos, normal, color }| Vertex { normal_id: normal, ..Vertex::new(y_up(pos), color) })
			.collect();
		let polygons = self.table::<TerrainPolygon>(terrain.polygon_address, terrain.polygon_count as usize, TerrainPolygon::SIZE)?;
		for TerrainPolygon { indices, flags, material_address } in polygons {
			let mut polygon = Polygon::untextured(check_indices(indices.to_array(), vertex_count)?);
			polygon.flags = flags as u16;
			if map::is_material(material_address) && !PolygonFlags::from(flags).transparent() {
				(polygon.material, polygon.uvs) = self.material(&model.name, material_address)?;
			}
			model.polygons.push(polygon);
		}
		model.instances.push(Instance::default());
		model.update_has_no_textures();
		debug!("terrain: {} vertices, {} polygons", model.vertices.len(), model.polygons.len());
		Ok(model)
	}

	pub fn object_header(&self, address: u32) -> gex_reader::Result<ObjectModelHeader> {
		self.record(address)
	}

	pub fn object_name(&self, header: &ObjectModelHeader) -> gex_reader::Result<String> {
		Ok(fixed_str(self.file.bytes(self.abs(header.name_address), 8)?))
	}

	/// Decodes every sub-mesh of an object model into one vertex and polygon list.
	pub fn object(&mut self, address: u32, name: String, header: &ObjectModelHeader) -> gex_reader::Result<Model> {
		let mut model = Model::new(address, name);
		for mesh_index in 0..header.mesh_count as u32 {
			let mesh_address = self.record::<u32>(header.mesh_table_address.wrapping_add(mesh_index * 4))?;
			let mesh = self.record::<ObjectMeshHeader>(mesh_address)?;
			let base = model.vertices.len() as u32;
			let vertex_count = mesh.vertex_count as usize;
			let vertices = self.table::<MeshVertex>(mesh.vertex_address, vertex_count, MeshVertex::SIZE)?;
			model.vertices.extend(vertices.into_iter().map(|MeshVertex { pos, normal, .. }| Vertex {
				normal_id: normal,
				..Vertex::new(y_up(pos), Vertex::GREY)
			}));
			let polygons = self.table::<ObjectPolygon>(mesh.polygon_address, mesh.polygon_count as usize, ObjectPolygon::SIZE)?;
			for ObjectPolygon { indices, flags, material_address } in polygons {
				let indices = check_indices(indices.to_array(), vertex_count)?.map(|index| index + base);
				let mut polygon = Polygon::untextured(indices);
				polygon.flags = flags as u16;
				let flags = PolygonFlags::from(flags);
				if flags.textured() {
					(polygon.material, polygon.uvs) = self.material(&model.name, material_address)?;
					if flags.animated() {
						polygon.texture_anim = Some(mesh.texture_anim_address);
					}
				}
				model.polygons.push(polygon);
			}
			if mesh.texture_anim_address != 0 {
				model.texture_anims.extend(self.texture_anims(mesh.texture_anim_address)?);
			}
		}
		model.update_has_no_textures();
		debug!("model {:#x} {:?}: {} vertices, {} polygons", address, model.name, model.vertices.len(), model.polygons.len());
		Ok(model)
	}

	/// A u32 count followed by fixed-stride entries. Frames are kept as found, not resolved.
	fn texture_anims(&self, address: u32) -> gex_reader::Result<Vec<TextureAnimEntry>> {
		let count = self.record::<u32>(address)? as usize;
		self.table(address.wrapping_add(4), count, TextureAnimEntry::STRIDE)
	}

	/// Concatenates the skybox chunks into one model.
	pub fn skybox(&mut self, header: &LevelHeader) -> gex_reader::Result<Model> {
		let mut model = Model::new(header.skybox_address, "@Skybox");
		let chunks = self.table::<SkyboxChunk>(header.skybox_address, header.skybox_count as usize, SkyboxChunk::SIZE)?;
		for chunk in chunks {
			let base = model.vertices.len() as u32;
			let vertex_count = chunk.vertex_count as usize;
			let vertices = self.table::<SkyboxVertex>(chunk.vertex_address, vertex_count, SkyboxVertex::SIZE)?;
			model.vertices.extend(vertices.into_iter().map(|SkyboxVertex { pos, normal }| {
				let original = y_up(pos);
				Vertex { pos: original * SKYBOX_SCALE, original, normal_id: normal, color: Vertex::GREY }
			}));
			let polygons = self.table::<SkyboxPolygon>(chunk.polygon_address, chunk.polygon_count as usize, SkyboxPolygon::SIZE)?;
			for SkyboxPolygon { indices, flags, material_address } in polygons {
				let indices = check_indices(indices.to_array(), vertex_count)?.map(|index| index + base);
				let mut polygon = Polygon::untextured(indices);
				polygon.flags = flags;
				(polygon.material, polygon.uvs) = self.material(&model.name, material_address)?;
				model.polygons.push(polygon);
			}
		}
		model.instances.push(Instance::default());
		model.update_has_no_textures();
		debug!("skybox: {} vertices, {} polygons", model.vertices.len(), model.polygons.len());
		Ok(model)
	}
}
