use gex_reader::{read_table, ByteCursor, Readable, Result, map::{PathHeader, PathPointRecord, PathRotationRecord, PlatformRecord, RotationHeader}};
use glam::Vec4;
use crate::scene::{Path, PathPoint, PathRotation};

const ROTATION_SCALE: Vec4 = Vec4::new(1.0 / 4096.0, 1.0 / 4096.0, 1.0 / 4096.0, -1.0 / 4096.0);

/// Reads the position and rotation tracks of moving platforms.
pub struct PathAnimationReader<'a> {
	file: ByteCursor<'a>,
	data_offset: usize,
}

impl<'a> PathAnimationReader<'a> {
	pub fn new(file: ByteCursor<'a>, data_offset: usize) -> Self {
		Self { file, data_offset }
	}

	fn abs(&self, address: u32) -> usize {
		self.data_offset.saturating_add(address as usize)
	}

	fn record<T: Readable>(&self, address: u32) -> Result<T> {
		T::read(&mut self.file.at(self.abs(address)))
	}

	/// Follows a platform record to its path. `None` when the platform has no path.
	pub fn read(&self, platform_address: u32, owner: u32) -> Result<Option<Path>> {
		let platform = self.record::<PlatformRecord>(platform_address)?;
		if platform.path_address == 0 {
			return Ok(None);
		}
		let header = self.record::<PathHeader>(platform.path_address)?;
		let points = read_table::<PathPointRecord>(&self.file, self.abs(header.points_address), header.point_count as usize, PathPointRecord::STRIDE)?
			.into_iter()
			.map(|PathPointRecord { speed, pos }| PathPoint { speed, pos })
			.collect();
		let rotations = match platform.rotation_address {
			0 => vec![],
			address => self.rotations(address)?,
		};
		Ok(Some(Path {
			address: self.abs(platform.path_address) as u32,
			owner,
			points,
			rotations,
		}))
	}

	fn rotations(&self, address: u32) -> Result<Vec<PathRotation>> {
		let header = self.record::<RotationHeader>(address)?;
		let records = read_table::<PathRotationRecord>(
			&self.file,
			self.abs(header.rotations_address),
			header.rotation_count as usize,
			PathRotationRecord::SIZE,
		)?;
		Ok(records
			.into_iter()
			.map(|PathRotationRecord { speed, quat }| PathRotation { speed, quat: quat.as_vec4() * ROTATION_SCALE })
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use glam::i16vec3;
	use super::*;

	fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
		data[offset..offset + bytes.len()].copy_from_slice(bytes);
	}

	#[test]
	fn points_and_rotations() {
		let mut data = vec![0u8; 0x200];
		// platform at 0x10, data offset 0x100
		put(&mut data, 0x110, &0x20u32.to_le_bytes());
		put(&mut data, 0x114, &0x30u32.to_le_bytes());
		put(&mut data, 0x120, &0x40u32.to_le_bytes());
		put(&mut data, 0x124, &2u16.to_le_bytes());
		put(&mut data, 0x140, &[5, 0, 1, 0, 2, 0, 3, 0]);
		put(&mut data, 0x160, &[6, 0, 0xFF, 0xFF, 0, 0, 0, 0]);
		put(&mut data, 0x130, &0x80u32.to_le_bytes());
		put(&mut data, 0x134, &1u16.to_le_bytes());
		put(&mut data, 0x180, &[9, 0, 0x00, 0x10, 0x00, 0xF8, 0, 0, 0x00, 0x10]);
		let reader = PathAnimationReader::new(ByteCursor::new(&data), 0x100);
		let path = reader.read(0x10, 0x1234).unwrap().unwrap();
		assert_eq!(path.address, 0x120);
		assert_eq!(path.owner, 0x1234);
		assert_eq!(path.points, [
			PathPoint { speed: 5, pos: i16vec3(1, 2, 3) },
			PathPoint { speed: 6, pos: i16vec3(-1, 0, 0) },
		]);
		assert_eq!(path.rotations.len(), 1);
		assert_eq!(path.rotations[0].speed, 9);
		assert_eq!(path.rotations[0].quat, Vec4::new(1.0, -0.5, 0.0, -1.0));
	}

	#[test]
	fn zero_path_address_means_no_path() {
		let data = vec![0u8; 0x20];
		let reader = PathAnimationReader::new(ByteCursor::new(&data), 0);
		assert_eq!(reader.read(0x8, 0).unwrap(), None);
	}

	#[test]
	fn empty_path_without_rotations() {
		let mut data = vec![0u8; 0x40];
		put(&mut data, 0x00, &0x10u32.to_le_bytes());
		put(&mut data, 0x10, &0x30u32.to_le_bytes());
		let reader = PathAnimationReader::new(ByteCursor::new(&data), 0);
		let path = reader.read(0, 7).unwrap().unwrap();
		assert!(path.points.is_empty());
		assert!(path.rotations.is_empty());
	}

	#[test]
	fn truncated_points_fail() {
		let mut data = vec![0u8; 0x40];
		put(&mut data, 0x00, &0x10u32.to_le_bytes());
		put(&mut data, 0x10, &0x30u32.to_le_bytes());
		put(&mut data, 0x14, &3u16.to_le_bytes());
		let reader = PathAnimationReader::new(ByteCursor::new(&data), 0);
		assert!(reader.read(0, 7).is_err());
	}
}
