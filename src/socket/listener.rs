use crate::addr::{Domain, from_storage};
use crate::error::{Error, Result, errno};

use super::handle::SocketHandle;
use super::state::{BoundListening, Connected};
use super::{ByteOrderPolicy, Socket, Stream};

/// An accepted connection and the address it came from.
#[derive(Debug)]
pub struct PeerConnection<'net, D: Domain, P: ByteOrderPolicy> {
	pub socket: Socket<'net, D, Stream, Connected, P>,
	pub addr: D::Addr,
}

impl<'net, D: Domain, P: ByteOrderPolicy> Socket<'net, D, Stream, BoundListening, P> {
	/// Accepts an incoming connection, blocking until one arrives.
	///
	/// The listener stays usable. The connection inherits the listener's
	/// byte-order policy.
	pub fn accept(&self) -> Result<PeerConnection<'net, D, P>> {
		self.accept_as::<P>()
	}

	/// Accepts an incoming connection with its own byte-order policy.
	pub fn accept_as<P2: ByteOrderPolicy>(&self) -> Result<PeerConnection<'net, D, P2>> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let fd = unsafe {
			libc::accept4(
				self.as_raw_fd(),
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
				libc::SOCK_CLOEXEC,
			)
		};

		if fd == -1 {
			return Err(Error::Accept { errno: errno() });
		}

		// Owned from here on, so an address failure below still closes it.
		let handle = unsafe { SocketHandle::from_raw(fd) };
		let addr = from_storage::<D::Addr>(&storage, len).ok_or(Error::Address(crate::addr::AddressError::Invalid))?;

		tracing::debug!(listener = self.as_raw_fd(), fd, peer = %addr, "accepted");
		Ok(PeerConnection { socket: Socket::from_handle(handle), addr })
	}
}
