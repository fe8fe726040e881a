use std::ops::Deref;

use crate::error::{Error, Result};
use crate::packet::Packet;

/// A packet together with proof that its predicate held when it was wrapped.
///
/// Every access checks the predicate again. A packet whose `is_valid` stops
/// holding for the same bits has an impure predicate, which is a bug in the
/// packet type, so the check panics instead of returning an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedPacket<T: Packet> {
	value: T,
}

impl<T: Packet> ValidatedPacket<T> {
	/// Wraps `value` if its predicate holds.
	pub fn new(value: T) -> Result<Self> {
		if !value.is_valid() {
			return Err(Error::InvalidArgument);
		}
		Ok(Self { value })
	}

	/// Returns the packet.
	pub fn get(&self) -> &T {
		self.check();
		&self.value
	}

	/// Unwraps the packet.
	pub fn into_inner(self) -> T {
		self.check();
		self.value
	}

	#[inline]
	fn check(&self) {
		assert!(self.value.is_valid(), "validated packet no longer satisfies its predicate");
	}
}

impl<T: Packet> Deref for ValidatedPacket<T> {
	type Target = T;

	fn deref(&self) -> &T {
		self.get()
	}
}

/// Checks `value` against its predicate.
///
/// Fails with [`Error::InvalidArgument`] and produces nothing when the
/// predicate rejects the value.
pub fn make_valid_packet<T: Packet>(value: T) -> Result<ValidatedPacket<T>> {
	ValidatedPacket::new(value)
}
