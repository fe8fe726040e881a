use crate::addr::{AddressError, Domain, from_storage};
use crate::error::{Error, Result, errno};
use crate::packet::{Packet, ValidatedPacket, from_wire_bytes, with_wire_bytes};

use super::state::IsConnected;
use super::{ByteOrderPolicy, SockType, Socket};

impl<D: Domain, T: SockType, S: IsConnected, P: ByteOrderPolicy> Socket<'_, D, T, S, P> {
	/// Sends one validated packet to the peer.
	///
	/// Stream sockets keep writing until the whole packet is out. Datagram
	/// sockets send it as a single datagram.
	pub fn send<K: Packet>(&self, packet: &ValidatedPacket<K>) -> Result<()> {
		with_wire_bytes(packet.get(), self.convert(), |bytes| T::send_bytes(self.as_raw_fd(), bytes))
	}

	/// Validates `packet`, then sends it.
	///
	/// A packet failing its predicate is [`Error::InvalidArgument`] and
	/// nothing is written.
	pub fn send_packet<K: Packet>(&self, packet: K) -> Result<()> {
		self.send(&ValidatedPacket::new(packet)?)
	}

	/// Receives exactly one packet.
	///
	/// On a stream socket this blocks until every byte has arrived; the peer
	/// closing first is [`Error::NotConnected`]. On a datagram socket one
	/// datagram is read, and any size other than the packet size is
	/// [`Error::WrongProtocolType`].
	pub fn recv<K: Packet>(&self) -> Result<K> {
		let mut buf = vec![0u8; size_of::<K>()];
		T::recv_bytes(self.as_raw_fd(), &mut buf)?;
		from_wire_bytes(&buf, self.convert()).ok_or(Error::WrongProtocolType { received: buf.len() })
	}

	/// Receives one packet and checks its predicate.
	///
	/// A packet that arrives intact but fails the predicate is treated as
	/// corruption ([`Error::WrongProtocolType`]).
	pub fn recv_valid<K: Packet>(&self) -> Result<ValidatedPacket<K>> {
		let packet = self.recv::<K>()?;
		ValidatedPacket::new(packet).map_err(|_| {
			tracing::warn!(fd = self.as_raw_fd(), "received packet failed its predicate");
			Error::WrongProtocolType { received: size_of::<K>() }
		})
	}

	/// Returns the remote address of this connection.
	pub fn peer_addr(&self) -> Result<D::Addr> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let result = unsafe {
			libc::getpeername(self.as_raw_fd(), &mut storage as *mut _ as *mut libc::sockaddr, &mut len)
		};

		if result == -1 {
			return Err(Error::PeerAddr { errno: errno() });
		}
		from_storage(&storage, len).ok_or(Error::Address(AddressError::Invalid))
	}
}
