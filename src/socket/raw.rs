use crate::addr::{Domain, ToSockAddr};
use crate::error::{Error, Result, errno};

use super::state::{Bound, Connectable, Unbound};
use super::{ByteOrderPolicy, SockType, Socket};

impl<'net, D: Domain, T: SockType, P: ByteOrderPolicy> Socket<'net, D, T, Unbound, P> {
	/// Binds the socket to a local address.
	///
	/// Consumes self. On failure the descriptor is closed and the error
	/// names the address.
	///
	/// ```no_run
	/// use wiregate::{Ipv4, Net, SocketAddrV4, Stream};
	///
	/// let net = Net::new()?;
	/// let bound = net.socket::<Ipv4, Stream>()?.bind(SocketAddrV4::any(8080))?;
	/// let listener = bound.listen(128)?;
	/// # drop(listener);
	/// # Ok::<(), wiregate::Error>(())
	/// ```
	pub fn bind(self, addr: D::Addr) -> Result<Socket<'net, D, T, Bound, P>> {
		let result = addr.with_raw(|ptr, len| unsafe { libc::bind(self.as_raw_fd(), ptr, len) });

		if result == -1 {
			return Err(Error::Bind { errno: errno(), addr: addr.to_string() });
		}
		tracing::debug!(fd = self.as_raw_fd(), %addr, "bound");
		Ok(self.transition())
	}
}

impl<'net, D: Domain, T: SockType, S: Connectable, P: ByteOrderPolicy> Socket<'net, D, T, S, P> {
	/// Connects to a remote address.
	///
	/// From `Unbound` this yields `Connected`; from `Bound` it yields
	/// `BoundConnected`. For datagram sockets it fixes the default peer
	/// and filters incoming datagrams to that peer.
	pub fn connect(self, addr: D::Addr) -> Result<Socket<'net, D, T, S::Next, P>> {
		let result = addr.with_raw(|ptr, len| unsafe { libc::connect(self.as_raw_fd(), ptr, len) });

		if result == -1 {
			return Err(Error::Connect { errno: errno(), addr: addr.to_string() });
		}
		tracing::debug!(fd = self.as_raw_fd(), %addr, "connected");
		Ok(self.transition())
	}
}
