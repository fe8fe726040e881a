//! Fixed-layout packets and their wire representation.
//!
//! A packet is a `Copy` value whose bytes travel as-is, except that every
//! multi-byte number is put into network byte order (big-endian) on the way
//! out and back into host order on the way in.
//!
//! Layout is described explicitly rather than discovered: primitives, arrays
//! and structs declared with [`packet!`](crate::packet!) implement
//! [`WireField`], which lists the fields to convert and the size they add up
//! to. A struct whose size differs from that sum has implicit padding and is
//! rejected at compile time:
//!
//! ```compile_fail
//! wiregate::packet! {
//!     pub struct Padded {
//!         pub tag: u8,
//!         pub value: u32,
//!     }
//! }
//! ```

mod macros;
mod validated;
mod variant;

pub use self::validated::{ValidatedPacket, make_valid_packet};
pub use self::variant::{PacketVariant, decode_alternative};

use std::mem::size_of;

/// A value with a fixed, padding-free layout in which every bit pattern is a
/// distinct valid value.
///
/// # Safety
///
/// Implementors guarantee that:
/// - `size_of::<Self>() == Self::PACKED_SIZE` (no padding bytes),
/// - every byte sequence of that length is a valid `Self` (no `bool`, `char`,
///   enums, references or pointers anywhere inside),
/// - `convert_byte_order` visits every multi-byte numeric leaf exactly once.
///
/// Use [`packet!`](crate::packet!) instead of implementing this by hand.
pub unsafe trait WireField: Copy + Send + Sync + 'static {
	/// Sum of the sizes of all leaves.
	const PACKED_SIZE: usize;

	/// Swaps every numeric leaf between host and network byte order.
	///
	/// A no-op on big-endian hosts; applying it twice restores the value.
	fn convert_byte_order(&mut self);
}

/// A wire type with an application-defined validity predicate.
///
/// Bare numbers and arrays of packets accept every value.
pub trait Packet: WireField {
	/// Returns true if this value is acceptable to send or receive.
	fn is_valid(&self) -> bool;
}

macro_rules! impl_wire_int {
	($($ty:ty),*) => {
		$(
			unsafe impl WireField for $ty {
				const PACKED_SIZE: usize = size_of::<$ty>();

				#[inline]
				fn convert_byte_order(&mut self) {
					if cfg!(target_endian = "little") {
						*self = self.swap_bytes();
					}
				}
			}

			impl Packet for $ty {
				#[inline]
				fn is_valid(&self) -> bool {
					true
				}
			}
		)*
	};
}

macro_rules! impl_wire_float {
	($($ty:ty),*) => {
		$(
			unsafe impl WireField for $ty {
				const PACKED_SIZE: usize = size_of::<$ty>();

				#[inline]
				fn convert_byte_order(&mut self) {
					if cfg!(target_endian = "little") {
						*self = <$ty>::from_bits(self.to_bits().swap_bytes());
					}
				}
			}

			impl Packet for $ty {
				#[inline]
				fn is_valid(&self) -> bool {
					true
				}
			}
		)*
	};
}

impl_wire_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);
impl_wire_float!(f32, f64);

unsafe impl<T: WireField, const N: usize> WireField for [T; N] {
	const PACKED_SIZE: usize = N * T::PACKED_SIZE;

	#[inline]
	fn convert_byte_order(&mut self) {
		for item in self.iter_mut() {
			item.convert_byte_order();
		}
	}
}

impl<T: Packet, const N: usize> Packet for [T; N] {
	fn is_valid(&self) -> bool {
		self.iter().all(Packet::is_valid)
	}
}

/// Returns `value` with every numeric leaf byte-swapped (on little-endian hosts).
pub fn convert_byte_order<T: WireField>(mut value: T) -> T {
	value.convert_byte_order();
	value
}

/// Returns true if `T` is larger than the sum of its fields.
pub const fn has_padding<T: WireField>() -> bool {
	size_of::<T>() != T::PACKED_SIZE
}

/// Calls `f` with the wire bytes of `value`, converted to network order when
/// `convert` is set.
pub fn with_wire_bytes<T: WireField, R>(value: &T, convert: bool, f: impl FnOnce(&[u8]) -> R) -> R {
	const { assert!(!has_padding::<T>(), "wire type contains implicit padding") };

	let mut copy = *value;
	if convert {
		copy.convert_byte_order();
	}
	// No padding, so every byte of `copy` is initialized.
	let bytes = unsafe { std::slice::from_raw_parts(&copy as *const T as *const u8, size_of::<T>()) };
	f(bytes)
}

/// Returns the wire bytes of `value`.
pub fn to_wire_bytes<T: WireField>(value: &T, convert: bool) -> Vec<u8> {
	with_wire_bytes(value, convert, <[u8]>::to_vec)
}

/// Rebuilds a value from exactly `size_of::<T>()` wire bytes.
///
/// Returns `None` for any other length; never truncates or pads.
pub fn from_wire_bytes<T: WireField>(bytes: &[u8], convert: bool) -> Option<T> {
	const { assert!(!has_padding::<T>(), "wire type contains implicit padding") };

	if bytes.len() != size_of::<T>() {
		return None;
	}
	// Every bit pattern of a WireField is valid; the read tolerates misalignment.
	let mut value = unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) };
	if convert {
		value.convert_byte_order();
	}
	Some(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	crate::packet! {
		#[derive(Debug, PartialEq)]
		struct Header {
			kind: u16,
			flags: u16,
			length: u32,
		}
	}

	crate::packet! {
		#[derive(Debug, PartialEq)]
		struct Frame {
			header: Header,
			samples: [i16; 4],
			gain: f32,
		}
	}

	#[test]
	fn layout_sizes() {
		assert_eq!(<Header as WireField>::PACKED_SIZE, 8);
		assert_eq!(<Frame as WireField>::PACKED_SIZE, 20);
		assert!(!has_padding::<Frame>());
		assert_eq!(<[u64; 3] as WireField>::PACKED_SIZE, 24);
	}

	#[test]
	fn nested_fields_are_big_endian_on_the_wire() {
		let frame = Frame {
			header: Header { kind: 0x0102, flags: 0, length: 0x0A0B_0C0D },
			samples: [1, -1, 0, 0x0304],
			gain: 1.25,
		};
		let bytes = to_wire_bytes(&frame, true);
		assert_eq!(&bytes[..8], &[0x01, 0x02, 0, 0, 0x0A, 0x0B, 0x0C, 0x0D]);
		assert_eq!(&bytes[8..16], &[0, 1, 0xFF, 0xFF, 0, 0, 0x03, 0x04]);
		assert_eq!(&bytes[16..], &1.25f32.to_be_bytes());
		assert_eq!(from_wire_bytes::<Frame>(&bytes, true), Some(frame));
	}

	#[test]
	fn host_order_passes_bytes_through() {
		let value = 0x1122_3344u32;
		assert_eq!(to_wire_bytes(&value, false), value.to_ne_bytes());
		assert_eq!(from_wire_bytes::<u32>(&value.to_ne_bytes(), false), Some(value));
	}

	#[test]
	fn wrong_length_is_rejected() {
		assert_eq!(from_wire_bytes::<u32>(&[0; 3], true), None);
		assert_eq!(from_wire_bytes::<u32>(&[0; 5], true), None);
	}

	#[test]
	fn conversion_matches_to_be() {
		assert_eq!(convert_byte_order(0x1234u16), 0x1234u16.to_be());
		assert_eq!(convert_byte_order(-2i64), (-2i64).to_be());
		assert_eq!(convert_byte_order(7u8), 7);
	}
}
