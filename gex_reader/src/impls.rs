use arrayvec::ArrayVec;
use glam::{I16Vec3, I16Vec4, U16Vec3, UVec2};
use crate::{ByteCursor, Readable, Result};

//primitive impls

macro_rules! impl_readable_prim {
	($($type:ty),*) => {
		$(
			impl Readable for $type {
				const SIZE: usize = <$type as crate::Primitive>::SIZE;

				fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
					cursor.read_advance(0)
				}
			}
		)*
	};
}

impl_readable_prim!(u8, i8, u16, i16, u32, i32, u64, i64, f32);

//array impls

impl<T: Readable, const N: usize> Readable for [T; N] {
	const SIZE: usize = T::SIZE * N;

	fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
		let mut array = ArrayVec::<T, N>::new();
		for _ in 0..N {
			array.push(T::read(cursor)?);
		}
		match array.into_inner() {
			Ok(array) => Ok(array),
			Err(_) => unreachable!("pushed exactly N items"),
		}
	}
}

//glam impls

macro_rules! impl_readable_glam {
	($type:ty, $array:ty) => {
		impl Readable for $type {
			const SIZE: usize = <$array as Readable>::SIZE;

			fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
				Ok(<$array>::read(cursor)?.into())
			}
		}
	};
}

impl_readable_glam!(I16Vec3, [i16; 3]);
impl_readable_glam!(I16Vec4, [i16; 4]);
impl_readable_glam!(U16Vec3, [u16; 3]);
impl_readable_glam!(UVec2, [u32; 2]);
