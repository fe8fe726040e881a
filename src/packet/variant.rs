use crate::packet::{Packet, from_wire_bytes};

/// A closed set of packet alternatives sharing one datagram socket.
///
/// Implemented by [`packet_variant!`](crate::packet_variant!).
pub trait PacketVariant: Sized {
	/// Size of the largest alternative.
	const MAX_SIZE: usize;

	/// Decodes the single alternative matching `bytes`.
	///
	/// Returns `None` when no alternative matches or when several do.
	fn decode(bytes: &[u8], convert: bool) -> Option<Self>;

	/// Predicate of the held alternative.
	fn is_valid(&self) -> bool;

	/// Calls `f` with the wire bytes of the held alternative.
	fn with_wire_bytes<R>(&self, convert: bool, f: impl FnOnce(&[u8]) -> R) -> R;
}

/// Decodes `bytes` as `T` if the length matches and the predicate accepts it.
pub fn decode_alternative<T: Packet>(bytes: &[u8], convert: bool) -> Option<T> {
	let value = from_wire_bytes::<T>(bytes, convert)?;
	value.is_valid().then_some(value)
}
