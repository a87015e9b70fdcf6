//! Scene-graph builder: header, terrain and skybox, the instance walk, then the finishing touches.

mod textures;

use std::{collections::{HashMap, HashSet}, f32::consts::PI, fs, path::Path as FsPath};
use gex_reader::{fixed_str, ByteCursor, map::{self, InstanceRecord, LevelHeader}};
use glam::{I16Vec3, Vec3};
use log::{debug, info, warn};
use crate::{
	atlas::Atlas,
	catalog::UNKNOWN_LEVEL,
	context::{DecodeContext, SpriteKind},
	error::{io_error, LookupMiss, Result},
	geom::GeometryDecoder,
	path::PathAnimationReader,
	scene::{Instance, InstanceKind, Model, Path, Scene},
	synth,
};
use self::textures::DecodedTextures;

pub const INSTANCE_STRIDE: usize = 0x30;
const ROTATION_UNIT: f32 = PI / 2048.0;
const POSITION_UNIT: f32 = 0.001;
const SPAWN_SCALE: i32 = 5;

/// Stored position to scene units, with z up.
fn placement(pos: I16Vec3) -> Vec3 {
	let pos = pos.as_vec3();
	Vec3::new(-pos.x, -pos.z, pos.y) * POSITION_UNIT
}

/// Loads `path` and the texture file next to it (same stem, `vfx` extension).
pub fn load_level<P: AsRef<FsPath>>(path: P, ctx: &DecodeContext) -> Result<Scene> {
	let path = path.as_ref();
	let texture_path = path.with_extension("vfx");
	let map = fs::read(path).map_err(io_error(path))?;
	let textures = fs::read(&texture_path).map_err(io_error(&texture_path))?;
	info!("loading {}", path.display());
	decode_level(&map, &textures, ctx)
}

/// Decodes an in-memory map and texture file pair.
pub fn decode_level(map: &[u8], textures: &[u8], ctx: &DecodeContext) -> Result<Scene> {
	let DecodedTextures { textures, atlas, misses } = textures::decode(textures, ctx)?;
	let mut builder = SceneBuilder::new(map, &atlas, ctx)?;
	builder.misses = misses;
	builder.decode_terrain_and_skybox()?;
	builder.add_markers();
	builder.decode_instances()?;
	let level = builder.finish();
	let scene = Scene::new(
		level.models,
		textures,
		level.paths,
		atlas,
		level.name,
		level.background,
		level.pickup_names,
		level.data_offset,
		level.misses,
	);
	info!(
		"{}: {} models, {} instances, {} paths, {} lookup misses",
		scene.name,
		scene.models.len(),
		scene.instance_count(),
		scene.paths.len(),
		scene.lookup_misses.len(),
	);
	Ok(scene)
}

/// Everything but the textures and atlas, which the builder only borrows.
struct Level {
	models: Vec<Model>,
	paths: Vec<Path>,
	name: String,
	background: Vec3,
	pickup_names: [String; 3],
	data_offset: usize,
	misses: Vec<LookupMiss>,
}

struct SceneBuilder<'a> {
	ctx: &'a DecodeContext,
	atlas: &'a Atlas,
	file: ByteCursor<'a>,
	checksum: u32,
	data_offset: usize,
	header: LevelHeader,
	geometry: GeometryDecoder<'a>,
	models: Vec<Model>,
	by_address: HashMap<u32, usize>,
	/// Models drawn as sprite quads.
	sprites: HashSet<u32>,
	paths: Vec<Path>,
	/// Models before this index keep their order; the rest are sorted by name.
	prefix_len: usize,
	misses: Vec<LookupMiss>,
}

impl<'a> SceneBuilder<'a> {
	/// Reads the data offset and the level header.
	fn new(map: &'a [u8], atlas: &'a Atlas, ctx: &'a DecodeContext) -> Result<Self> {
		let file = ByteCursor::new(map);
		let checksum = file.read::<u32>(0)?;
		let data_offset = map::data_offset(checksum);
		let header = file.record::<LevelHeader>(data_offset)?;
		debug!(
			"data offset {:#x}, {} objects at {:#x}, {} skybox chunks",
			data_offset, header.object_count, header.object_address, header.skybox_count,
		);
		Ok(Self {
			ctx,
			atlas,
			file,
			checksum,
			data_offset,
			header,
			geometry: GeometryDecoder::new(file, data_offset, atlas),
			models: vec![],
			by_address: HashMap::new(),
			sprites: HashSet::new(),
			paths: vec![],
			prefix_len: 0,
			misses: vec![],
		})
	}

	fn abs(&self, address: u32) -> usize {
		self.data_offset.saturating_add(address as usize)
	}

	/// Registers a model under its address. The first model at an address wins.
	fn add_model(&mut self, model: Model) -> usize {
		if let Some(&index) = self.by_address.get(&model.address) {
			warn!("{:?} shares address {:#x} with {:?}, dropped", model.name, model.address, self.models[index].name);
			return index;
		}
		let index = self.models.len();
		self.by_address.insert(model.address, index);
		self.models.push(model);
		index
	}

	fn decode_terrain_and_skybox(&mut self) -> Result<()> {
		let terrain = self.geometry.terrain(&self.header)?;
		self.add_model(terrain);
		let skybox = self.geometry.skybox(&self.header)?;
		self.add_model(skybox);
		Ok(())
	}

	fn sprite_model(&mut self, address: u32, name: String, kind: SpriteKind, scale: i32) -> Model {
		let mut model = Model::new(address, name);
		if !synth::sprite_quad(&mut model, self.atlas, kind.id(), scale) {
			let miss = LookupMiss::Sprite { model: model.name.clone(), id: kind.id() };
			warn!("{}", miss);
			self.misses.push(miss);
		}
		model.update_has_no_textures();
		self.sprites.insert(address);
		model
	}

	/// The generic path marker at address 0 and the spawn point.
	fn add_markers(&mut self) {
		let marker = self.sprite_model(0, "@Path".into(), SpriteKind::Unknown, 1);
		self.add_model(marker);
		let spawn_address = self.abs(LevelHeader::SPAWN_OFFSET) as u32;
		let mut spawn = self.sprite_model(spawn_address, "$Spawn".into(), SpriteKind::Spawn, SPAWN_SCALE);
		spawn.instances.push(Instance {
			kind: InstanceKind::Sprite,
			..Instance::at(placement(self.header.spawn))
		});
		self.add_model(spawn);
		self.prefix_len = self.models.len();
	}

	/// Object model at `address`, as a sprite quad when the catalog says so.
	fn decode_model(&mut self, address: u32) -> Result<usize> {
		let header = self.geometry.object_header(address)?;
		let name = self.geometry.object_name(&header)?;
		let model = match self.ctx.catalog.sprite_model(&name) {
			Some(sprite) => {
				let (kind, scale) = (sprite.sprite, sprite.scale);
				self.sprite_model(address, name, kind, scale)
			},
			None => self.geometry.object(address, name, &header)?,
		};
		Ok(self.add_model(model))
	}

	fn decode_instances(&mut self) -> Result<()> {
		let table = self.abs(self.header.object_address);
		for index in 0..self.header.object_count as usize {
			let offset = table.saturating_add(index * INSTANCE_STRIDE);
			let record = self.file.record::<InstanceRecord>(offset)?;
			let model_index = match self.by_address.get(&record.model_address) {
				Some(&model_index) => model_index,
				None => self.decode_model(record.model_address)?,
			};
			let kind = if self.ctx.catalog.is_platform(&self.models[model_index].name) {
				InstanceKind::Platform { path: self.attach_path(&record, offset as u32)? }
			} else if self.sprites.contains(&record.model_address) {
				InstanceKind::Sprite
			} else {
				InstanceKind::Plain
			};
			let r = record.rotation.as_vec3();
			self.models[model_index].instances.push(Instance {
				position: placement(record.position),
				rotation: Vec3::new(r.x, -r.y, r.z) * ROTATION_UNIT,
				visible: true,
				address: offset as u32,
				payload: record.payload,
				kind,
			});
		}
		Ok(())
	}

	/// Reads the path of a platform instance. Instances sharing a path share one `Path`.
	fn attach_path(&mut self, record: &InstanceRecord, owner: u32) -> Result<Option<u32>> {
		let platform = record.payload[InstanceRecord::PLATFORM_WORD];
		if platform == 0 {
			return Ok(None);
		}
		let reader = PathAnimationReader::new(self.file, self.data_offset);
		let Some(path) = reader.read(platform, owner)? else {
			return Ok(None);
		};
		let address = path.address;
		match self.paths.iter().find(|existing| existing.address == address) {
			Some(existing) => warn!("path {:#x} of {:#x} already read for {:#x}", address, owner, existing.owner),
			None => self.paths.push(path),
		}
		Ok(Some(address))
	}

	fn level_name(&mut self) -> String {
		let id = fixed_str(&self.header.level_id);
		match self.ctx.catalog.level_name(&id, self.checksum) {
			Some(name) => name.to_owned(),
			None => {
				let miss = LookupMiss::LevelName { id, checksum: self.checksum };
				warn!("{}", miss);
				self.misses.push(miss);
				UNKNOWN_LEVEL.to_owned()
			},
		}
	}

	/// Adds path markers, sorts everything after the prefix by name and resolves the level name.
	fn finish(mut self) -> Level {
		for path in &self.paths {
			if let Some(model) = synth::path_model(path) {
				if self.by_address.contains_key(&model.address) {
					warn!("path marker {:?} collides with an existing model, dropped", model.name);
					continue;
				}
				self.by_address.insert(model.address, self.models.len());
				self.models.push(model);
			}
		}
		self.models[self.prefix_len..].sort_by(|a, b| a.name.cmp(&b.name));
		let name = self.level_name();
		let mut misses = self.misses;
		misses.append(&mut self.geometry.misses);
		Level {
			models: self.models,
			paths: self.paths,
			name,
			background: Vec3::from_array(self.header.background.map(|c| c as f32 / 255.0)),
			pickup_names: self.header.pickup_names().map(|name| fixed_str(&name)),
			data_offset: self.data_offset,
			misses,
		}
	}
}
