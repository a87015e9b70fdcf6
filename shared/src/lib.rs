use std::ops::{Add, Sub};
use glam_traits::{GBVec, GVec};

/// Some area defined by a minimum and maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMax<T> {
	pub min: T,
	pub max: T,
}

impl<T: Clone> MinMax<T> {
	pub fn new(a: T) -> Self {
		Self { min: a.clone(), max: a }
	}
}

pub trait VecMinMax<T> {
	fn update(&mut self, v: T);
	fn contains(&self, other: &Self) -> bool;
	fn intersects(&self, other: &Self) -> bool;
}

impl<T: GVec> VecMinMax<T> for MinMax<T> {
	fn update(&mut self, a: T) {
		self.min = self.min.min(a);
		self.max = self.max.max(a);
	}

	fn contains(&self, other: &Self) -> bool {
		self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
	}

	/// Shared edges do not count.
	fn intersects(&self, other: &Self) -> bool {
		self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
	}
}

pub trait VecMinMaxFromIterator: Iterator {
	fn min_max(self) -> Option<MinMax<Self::Item>>;
}

impl<T> VecMinMaxFromIterator for T where T: Iterator, T::Item: GVec {
	fn min_max(mut self) -> Option<MinMax<Self::Item>> {
		let mut min_max = MinMax::new(self.next()?);
		for a in self {
			min_max.update(a);
		}
		Some(min_max)
	}
}

/// Some area defined by a position and a size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PosSize<T> {
	pub pos: T,
	pub size: T,
}

impl<T: Copy + Add<Output = T>> From<PosSize<T>> for MinMax<T> {
	fn from(PosSize { pos, size }: PosSize<T>) -> Self {
		Self { min: pos, max: pos + size }
	}
}

impl<T: Copy + Sub<Output = T>> From<MinMax<T>> for PosSize<T> {
	fn from(MinMax { min, max }: MinMax<T>) -> Self {
		Self { pos: min, size: max - min }
	}
}
