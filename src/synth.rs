//! Procedural meshes for things the level stores no geometry for.

use glam::{vec2, IVec3, Vec2, Vec3};
use nonmax::NonMaxU32;
use crate::{atlas::Atlas, scene::{Instance, Model, Path, Polygon, Vertex}};

pub const DIAMOND_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const LINE_COLOR: [u8; 4] = [0, 255, 255, 255];
pub const PATH_DIAMOND_RADIUS: f32 = 50.0;
const LINE_HALF_WIDTH: f32 = 25.0;
const SPRITE_HALF_SIZE: i32 = 100;

fn push_vertex(model: &mut Model, pos: Vec3, color: [u8; 4]) {
	model.vertices.push(Vertex::new(pos.as_ivec3(), color));
}

/// Faces given as offsets back from the current vertex count.
fn push_faces(model: &mut Model, faces: &[[u32; 3]]) {
	let n = model.vertices.len() as u32;
	model.polygons.extend(faces.iter().map(|face| Polygon::untextured(face.map(|back| n - back))));
}

/// Fills `model` with a camera-facing square of half-size `100 * scale`.
/// UVs cover the atlas area of `sprite` if it is placed, the whole 0..1 range otherwise.
/// Returns false when the sprite has no placement.
pub fn sprite_quad(model: &mut Model, atlas: &Atlas, sprite: u32, scale: i32) -> bool {
	let s = SPRITE_HALF_SIZE * scale;
	for (x, y) in [(-s, s), (s, s), (s, -s), (-s, -s)] {
		model.vertices.push(Vertex::new(IVec3::new(x, y, 0), Vertex::GREY));
	}
	let faces: [([u32; 3], [Vec2; 3]); 2] = [
		([2, 1, 0], [vec2(1.0, 1.0), vec2(1.0, 0.0), vec2(0.0, 0.0)]),
		([3, 2, 0], [vec2(0.0, 1.0), vec2(1.0, 1.0), vec2(0.0, 0.0)]),
	];
	let placed = atlas.placement(sprite).is_some();
	for (indices, uvs) in faces {
		let mut polygon = Polygon::untextured(indices);
		polygon.uvs = atlas.remap_all(sprite, uvs).unwrap_or(uvs);
		if placed {
			polygon.material = NonMaxU32::new(sprite);
		}
		model.polygons.push(polygon);
	}
	placed
}

/// Octahedron around `pos`, 6 vertices and 8 faces.
pub fn add_diamond(model: &mut Model, pos: Vec3, radius: f32) {
	for offset in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
		push_vertex(model, pos + offset * radius, DIAMOND_COLOR);
	}
	push_faces(model, &[
		[2, 6, 4], [6, 1, 4], [1, 5, 4], [5, 2, 4],
		[2, 3, 6], [6, 3, 1], [1, 3, 5], [5, 3, 2],
	]);
}

/// Thin triangular prism from `start` to a point at `end`. Does nothing for a zero-length or non-finite segment.
pub fn add_line(model: &mut Model, start: Vec3, end: Vec3) -> bool {
	let direction = (end - start).normalize();
	if !direction.is_finite() || direction == Vec3::ZERO {
		return false;
	}
	let mut normal = direction.cross(Vec3::Y).normalize();
	if !normal.is_finite() {
		normal = Vec3::X;
	}
	let perp = direction.cross(normal).normalize();
	let (n, p) = (normal * LINE_HALF_WIDTH, perp * LINE_HALF_WIDTH);
	for point in [start + n, start - n + p, start - n - p, end] {
		push_vertex(model, point, LINE_COLOR);
	}
	push_faces(model, &[[3, 1, 4], [1, 2, 4], [1, 3, 2]]);
	true
}

/// Marker mesh for a path: a line between consecutive points and a diamond on every point.
/// `None` for a path without points.
pub fn path_model(path: &Path) -> Option<Model> {
	let points = path.points.iter().map(|point| point.scene_pos()).collect::<Vec<_>>();
	let last = *points.last()?;
	let mut model = Model::new(path.address, format!("@Path-{:x}", path.address));
	for pair in points.windows(2) {
		add_line(&mut model, pair[0], pair[1]);
		add_diamond(&mut model, pair[0], PATH_DIAMOND_RADIUS);
	}
	add_diamond(&mut model, last, PATH_DIAMOND_RADIUS);
	model.instances.push(Instance::default());
	model.has_no_textures = true;
	Some(model)
}
