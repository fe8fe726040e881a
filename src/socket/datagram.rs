//! Datagram-only transfers: addressed sends and receives, and variant
//! packets.

use crate::addr::Domain;
use crate::error::{Error, Result};
use crate::packet::{Packet, PacketVariant, ValidatedPacket, from_wire_bytes, with_wire_bytes};

use super::io;
use super::state::{IsBound, IsConnected, State};
use super::{ByteOrderPolicy, Datagram, Socket};

impl<D: Domain, S: State, P: ByteOrderPolicy> Socket<'_, D, Datagram, S, P> {
	/// Sends one validated packet to `addr`.
	///
	/// Legal in every datagram state. Sending from an unbound socket makes
	/// the kernel pick an ephemeral local port.
	pub fn sendto<K: Packet>(&self, packet: &ValidatedPacket<K>, addr: &D::Addr) -> Result<()> {
		with_wire_bytes(packet.get(), self.convert(), |bytes| io::send_datagram_to(self.as_raw_fd(), bytes, addr))
	}

	/// Validates `packet`, then sends it to `addr`.
	pub fn sendto_packet<K: Packet>(&self, packet: K, addr: &D::Addr) -> Result<()> {
		self.sendto(&ValidatedPacket::new(packet)?, addr)
	}

	/// Sends whichever alternative `variant` holds to `addr`.
	pub fn sendto_variant<V: PacketVariant>(&self, variant: &V, addr: &D::Addr) -> Result<()> {
		if !variant.is_valid() {
			return Err(Error::InvalidArgument);
		}
		variant.with_wire_bytes(self.convert(), |bytes| io::send_datagram_to(self.as_raw_fd(), bytes, addr))
	}
}

impl<D: Domain, S: IsBound, P: ByteOrderPolicy> Socket<'_, D, Datagram, S, P> {
	/// Receives one packet and the address it came from.
	///
	/// A datagram of any other size is [`Error::WrongProtocolType`].
	pub fn recvfrom<K: Packet>(&self) -> Result<(K, D::Addr)> {
		let mut buf = vec![0u8; size_of::<K>()];
		let (n, addr) = io::recv_datagram_from::<D::Addr>(self.as_raw_fd(), &mut buf)?;
		io::expect_size(n, size_of::<K>())?;
		let packet = from_wire_bytes(&buf[..n], self.convert()).ok_or(Error::WrongProtocolType { received: n })?;
		Ok((packet, addr))
	}

	/// Receives one variant packet and the address it came from.
	pub fn recvfrom_variant<V: PacketVariant>(&self) -> Result<(V, D::Addr)> {
		let mut buf = vec![0u8; V::MAX_SIZE];
		let (n, addr) = io::recv_datagram_from::<D::Addr>(self.as_raw_fd(), &mut buf)?;
		io::expect_at_most(n, V::MAX_SIZE)?;
		let variant = decode_variant(&buf[..n], self.convert())?;
		Ok((variant, addr))
	}
}

impl<D: Domain, S: IsConnected, P: ByteOrderPolicy> Socket<'_, D, Datagram, S, P> {
	/// Sends whichever alternative `variant` holds to the connected peer.
	pub fn send_variant<V: PacketVariant>(&self, variant: &V) -> Result<()> {
		if !variant.is_valid() {
			return Err(Error::InvalidArgument);
		}
		variant.with_wire_bytes(self.convert(), |bytes| io::send_datagram(self.as_raw_fd(), bytes))
	}

	/// Receives one datagram from the connected peer as a variant packet.
	pub fn recv_variant<V: PacketVariant>(&self) -> Result<V> {
		let mut buf = vec![0u8; V::MAX_SIZE];
		let n = io::recv_datagram(self.as_raw_fd(), &mut buf)?;
		io::expect_at_most(n, V::MAX_SIZE)?;
		decode_variant(&buf[..n], self.convert())
	}
}

fn decode_variant<V: PacketVariant>(bytes: &[u8], convert: bool) -> Result<V> {
	V::decode(bytes, convert).ok_or_else(|| {
		tracing::warn!(received = bytes.len(), "datagram matches no single packet alternative");
		Error::WrongProtocolType { received: bytes.len() }
	})
}
