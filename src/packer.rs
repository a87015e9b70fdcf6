use std::cmp::{Ordering, Reverse};
use glam::UVec2;
use glam_traits::IntVec2;
use itertools::Itertools;
use num_traits::{AsPrimitive, Zero};

/// Placement of a set of images in a square atlas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Packing {
	/// Atlas side length, 0 when the images did not fit.
	pub side: u32,
	/// Top-left corner of each image, in input order.
	pub positions: Vec<UVec2>,
}

impl Packing {
	pub fn failed() -> Self {
		Self::default()
	}

	pub fn is_ok(&self) -> bool {
		self.side != 0
	}
}

pub trait Packer {
	fn pack(&self, sizes: &[UVec2]) -> Packing;
}

/// Inserts a corner into the staircase of free corners, merging the ones it shadows.
fn insert<V>(spots: &mut Vec<V>, mut new_spot: V, other_dim: usize) where V: IntVec2, V::Scalar: Ord {
	let mut min_other_d = new_spot[other_dim];
	let mut index = spots.len();
	while index != 0 {
		index -= 1;
		if spots[index].element_sum() >= new_spot.element_sum() {
			break;
		}
		if spots[index].cmple(new_spot).all() {
			min_other_d = spots.remove(index)[other_dim].min(min_other_d);
		}
	}
	new_spot[other_dim] = min_other_d;
	while index < spots.len() {
		match spots[index].element_sum().cmp(&new_spot.element_sum()) {
			Ordering::Less => break,
			Ordering::Equal => if spots[index].element_product() >= new_spot.element_product() { break },
			Ordering::Greater => {},
		}
		index += 1
	}
	spots.insert(index, new_spot);
}

/// Fills two corners of a square from opposite ends, alternating between them, largest rects first.
/// Returns the positions in input order and the side of the square.
pub fn pack<V, I>(rects: I) -> (Vec<V>, V)
where
	V: IntVec2,
	V::Scalar: Ord + Zero,
	I: IntoIterator<Item = V>,
	usize: AsPrimitive<V::Scalar>,
{
	let mut rects = rects.into_iter().enumerate().collect::<Vec<_>>();
	rects.sort_by_key(|(.., r)| Reverse(r.element_sum()));
	let len1 = rects.len() / 2 + rects.len() % 2;
	let len2 = rects.len() - len1;
	let mut corners = [len1, len2].map(|len| (vec![V::ZERO], Vec::<(usize, V)>::with_capacity(len), V::Scalar::zero()));
	let mut corner_index = 0;
	for (index, size) in rects {
		let (spots, packed, corner_size) = &mut corners[corner_index];
		let Some(spot) = spots.pop() else {
			unreachable!("a placement always leaves a spot behind");
		};
		packed.push((index, spot + corner_index.as_() * size));
		insert(spots, spot + V::X * size, 1);
		insert(spots, spot + V::Y * size, 0);
		*corner_size = (spot + size).element_sum().max(*corner_size);
		corner_index ^= 1;
	}
	let [(.., pos1, size1), (.., pos2, size2)] = corners;
	let size = V::splat(size1.max(size2));
	let mut pos = pos1.into_iter().interleave(pos2.into_iter().map(|(index, pos)| (index, size - pos))).collect::<Vec<_>>();
	pos.sort_by_key(|&(index, ..)| index);
	(pos.into_iter().map(|(.., pos)| pos).collect(), size)
}

/// Square atlas packer: side is a power of two, at least `min_side`, fails above `max_side`.
#[derive(Clone, Copy, Debug)]
pub struct CornerPacker {
	pub min_side: u32,
	pub max_side: u32,
}

impl Default for CornerPacker {
	fn default() -> Self {
		Self { min_side: 256, max_side: 16384 }
	}
}

impl Packer for CornerPacker {
	fn pack(&self, sizes: &[UVec2]) -> Packing {
		let (positions, size) = pack(sizes.iter().copied());
		let side = size.x.max(self.min_side).checked_next_power_of_two();
		match side {
			Some(side) if side <= self.max_side => Packing { side, positions },
			_ => Packing::failed(),
		}
	}
}
