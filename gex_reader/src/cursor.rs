use std::{mem::size_of, ops::Range};
use byteorder::{ByteOrder, LE};
use crate::{Error, Readable, Result};

/// Fixed-width value stored little-endian in the source files.
/// Decoding goes through `byteorder`, so big-endian hosts get the byte swap and 1-byte values are untouched.
pub trait Primitive: Sized + Copy {
	const SIZE: usize;
	fn from_le(bytes: &[u8]) -> Self;
}

impl Primitive for u8 {
	const SIZE: usize = 1;

	fn from_le(bytes: &[u8]) -> Self {
		bytes[0]
	}
}

impl Primitive for i8 {
	const SIZE: usize = 1;

	fn from_le(bytes: &[u8]) -> Self {
		bytes[0] as i8
	}
}

macro_rules! impl_primitive {
	($type:ty, $func:ident) => {
		impl Primitive for $type {
			const SIZE: usize = size_of::<$type>();

			fn from_le(bytes: &[u8]) -> Self {
				LE::$func(bytes)
			}
		}
	};
}

impl_primitive!(u16, read_u16);
impl_primitive!(i16, read_i16);
impl_primitive!(u32, read_u32);
impl_primitive!(i32, read_i32);
impl_primitive!(u64, read_u64);
impl_primitive!(i64, read_i64);
impl_primitive!(f32, read_f32);

/// Bounds-checked reader over an immutable buffer.
/// Every read is relative to a movable base offset.
#[derive(Clone, Copy)]
pub struct ByteCursor<'a> {
	data: &'a [u8],
	base: usize,
}

impl<'a> ByteCursor<'a> {
	pub fn new(data: &'a [u8]) -> Self {
		Self { data, base: 0 }
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	pub fn base(&self) -> usize {
		self.base
	}

	pub fn relocate(&mut self, base: usize) {
		self.base = base;
	}

	/// Copy of this cursor relocated to `base`.
	pub fn at(&self, base: usize) -> Self {
		Self { data: self.data, base }
	}

	/// Relocates for the duration of `f`, then restores the old base whatever `f` returned.
	pub fn with_base<T, F>(&mut self, base: usize, f: F) -> Result<T>
	where
		F: FnOnce(&mut Self) -> Result<T>,
	{
		let old_base = self.base;
		self.base = base;
		let result = f(self);
		self.base = old_base;
		result
	}

	fn range(&self, offset: usize, size: usize) -> Result<Range<usize>> {
		let start = self.base.checked_add(offset);
		match start.and_then(|start| Some(start..start.checked_add(size)?)) {
			Some(range) if range.end <= self.data.len() => Ok(range),
			_ => Err(Error::OutOfBounds {
				offset: self.base.saturating_add(offset),
				size,
				len: self.data.len(),
			}),
		}
	}

	pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
		let range = self.range(offset, len)?;
		Ok(&self.data[range])
	}

	pub fn read<T: Primitive>(&self, offset: usize) -> Result<T> {
		Ok(T::from_le(self.bytes(offset, T::SIZE)?))
	}

	/// Reads at `offset`, then moves the base just past the value read.
	pub fn read_advance<T: Primitive>(&mut self, offset: usize) -> Result<T> {
		let val = self.read(offset)?;
		self.base += offset + T::SIZE;
		Ok(val)
	}

	/// Reads a record at `offset` without moving the base.
	pub fn record<T: Readable>(&self, offset: usize) -> Result<T> {
		T::read(&mut self.at(self.base.saturating_add(offset)))
	}

	pub fn take_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
		let bytes = self.bytes(0, len)?;
		self.base += len;
		Ok(bytes)
	}

	pub fn skip(&mut self, num: usize) -> Result<()> {
		self.take_bytes(num).map(|_| ())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_little_endian() {
		let data = [0x01, 0x02, 0x03, 0x04];
		let cursor = ByteCursor::new(&data);
		assert_eq!(cursor.read::<u32>(0).unwrap(), u32::from_le_bytes(data));
		assert_eq!(cursor.read::<u16>(2).unwrap(), 0x0403);
		assert_eq!(cursor.read::<i8>(3).unwrap(), 4);
	}

	#[test]
	fn single_bytes_are_not_reordered() {
		let data = [0xAB];
		assert_eq!(ByteCursor::new(&data).read::<u8>(0).unwrap(), 0xAB);
	}

	#[test]
	fn byte_swap_is_involutive() {
		let data = [0x11, 0x22, 0x33, 0x44];
		let cursor = ByteCursor::new(&data);
		let first = cursor.read::<u32>(0).unwrap();
		let second = cursor.read::<u32>(0).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.swap_bytes().swap_bytes(), first);
		assert_eq!(first.swap_bytes(), u32::from_be_bytes(data));
	}

	#[test]
	fn advance_moves_past_value() {
		let data = [0, 0, 5, 0, 6, 0];
		let mut cursor = ByteCursor::new(&data);
		assert_eq!(cursor.read_advance::<u16>(2).unwrap(), 5);
		assert_eq!(cursor.base(), 4);
		assert_eq!(cursor.read_advance::<u16>(0).unwrap(), 6);
		assert_eq!(cursor.base(), 6);
	}

	#[test]
	fn out_of_bounds_is_an_error() {
		let data = [0; 4];
		let cursor = ByteCursor::new(&data);
		assert!(cursor.read::<u32>(0).is_ok());
		match cursor.read::<u32>(1) {
			Err(Error::OutOfBounds { offset, size, len }) => assert_eq!((offset, size, len), (1, 4, 4)),
			_ => panic!("expected out of bounds"),
		}
		assert!(cursor.at(usize::MAX).read::<u8>(1).is_err());
		assert!(cursor.bytes(4, 0).is_ok());
	}

	#[test]
	fn failed_advance_keeps_base() {
		let data = [0; 3];
		let mut cursor = ByteCursor::new(&data);
		assert!(cursor.read_advance::<u32>(0).is_err());
		assert_eq!(cursor.base(), 0);
		assert!(cursor.skip(4).is_err());
		assert_eq!(cursor.base(), 0);
	}

	#[test]
	fn with_base_restores_after_error() {
		let data = [1, 2, 3, 4];
		let mut cursor = ByteCursor::new(&data);
		cursor.relocate(1);
		let side = cursor.with_base(3, |cursor| cursor.read_advance::<u8>(0));
		assert_eq!(side.unwrap(), 4);
		assert_eq!(cursor.base(), 1);
		assert!(cursor.with_base(3, |cursor| cursor.read::<u16>(0)).is_err());
		assert_eq!(cursor.base(), 1);
	}
}
