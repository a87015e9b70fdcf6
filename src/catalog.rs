//! Per-title name tables: which models are drawn as sprites, which ones ride paths, and what each level is called.

use std::{collections::HashSet, fs, path::Path};
use serde::Deserialize;
use crate::{context::SpriteKind, error::{io_error, Result}};

const BUILTIN: &str = include_str!("../data/catalog.json");

pub const UNKNOWN_LEVEL: &str = "Unknown Level";

/// Object model replaced by a sprite quad.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SpriteModel {
	pub name: String,
	pub sprite: SpriteKind,
	pub scale: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LevelEntry {
	/// 8-byte level id from the level header.
	pub id: String,
	/// First word of the map file, for ids shared by several levels.
	#[serde(default)]
	pub checksum: Option<u32>,
	pub name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
	pub version: u32,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub sprite_models: Vec<SpriteModel>,
	#[serde(default)]
	pub platform_models: HashSet<String>,
	#[serde(default)]
	pub billboard_models: HashSet<String>,
	#[serde(default)]
	pub levels: Vec<LevelEntry>,
}

impl Default for Catalog {
	fn default() -> Self {
		Self::builtin()
	}
}

impl Catalog {
	/// Tables for Gex: Enter the Gecko.
	pub fn builtin() -> Self {
		Self::parse(BUILTIN).expect("built-in catalog is valid")
	}

	pub fn parse(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let json = fs::read_to_string(path).map_err(io_error(path))?;
		Self::parse(&json)
	}

	pub fn sprite_model(&self, name: &str) -> Option<&SpriteModel> {
		self.sprite_models.iter().find(|model| model.name == name)
	}

	pub fn is_platform(&self, name: &str) -> bool {
		self.platform_models.contains(name)
	}

	/// Models a renderer should turn to face the camera.
	pub fn is_billboard(&self, name: &str) -> bool {
		name.starts_with('$') || self.billboard_models.contains(name)
	}

	/// Entries without a checksum match on the id alone and take precedence.
	pub fn level_name(&self, id: &str, checksum: u32) -> Option<&str> {
		let by_id = self.levels.iter().find(|level| level.checksum.is_none() && level.id == id);
		let by_checksum = || self.levels.iter().find(|level| level.checksum == Some(checksum) && level.id == id);
		by_id.or_else(by_checksum).map(|level| level.name.as_str())
	}
}
