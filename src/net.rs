//! Network stack scope and socket factory.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::addr::{Domain, SocketAddr};
use crate::error::Result;
use crate::socket::{
	Bound, BoundConnected, BoundListening, Connected, NetworkOrder, Protocol, SockType, Socket, SocketHandle, Stream,
	Unbound,
};

static LIVE: AtomicUsize = AtomicUsize::new(0);

/// Initialized network stack.
///
/// Every socket borrows the `Net` that created it, so no socket can outlive
/// it. On POSIX systems there is nothing to start or stop; the value only
/// scopes socket lifetimes and logs setup and teardown.
///
/// ```compile_fail
/// use wiregate::{Ipv4, Net, Stream};
///
/// let socket = {
///     let net = Net::new().unwrap();
///     net.socket::<Ipv4, Stream>().unwrap()
/// };
/// ```
#[derive(Debug)]
pub struct Net {
	_private: (),
}

impl Net {
	/// Initializes the network stack.
	pub fn new() -> Result<Self> {
		let live = LIVE.fetch_add(1, Ordering::AcqRel) + 1;
		if live == 1 {
			tracing::debug!("network stack initialized");
		}
		Ok(Self { _private: () })
	}

	/// Creates an unbound socket.
	pub fn socket<D: Domain, T: SockType>(&self) -> Result<Socket<'_, D, T, Unbound, NetworkOrder>> {
		let handle = SocketHandle::open(D::raw(), T::raw(), T::Protocol::raw())?;
		Ok(Socket::from_handle(handle))
	}

	/// Creates a socket bound to `addr`.
	pub fn bound_socket<T: SockType, A: SocketAddr>(
		&self,
		addr: A,
	) -> Result<Socket<'_, A::Domain, T, Bound, NetworkOrder>> {
		self.socket::<A::Domain, T>()?.bind(addr)
	}

	/// Creates a TCP socket listening on `addr`.
	pub fn server_socket<A: SocketAddr>(
		&self,
		addr: A,
		backlog: i32,
	) -> Result<Socket<'_, A::Domain, Stream, BoundListening, NetworkOrder>> {
		let socket = self.socket::<A::Domain, Stream>()?;
		socket.set_reuse_addr(true)?;
		socket.bind(addr)?.listen(backlog)
	}

	/// Creates a socket connected to `dest`.
	pub fn client_socket<T: SockType, A: SocketAddr>(
		&self,
		dest: A,
	) -> Result<Socket<'_, A::Domain, T, Connected, NetworkOrder>> {
		self.socket::<A::Domain, T>()?.connect(dest)
	}

	/// Creates a socket bound to `bind` and connected to `dest`.
	pub fn bound_client_socket<T: SockType, A: SocketAddr>(
		&self,
		dest: A,
		bind: A,
	) -> Result<Socket<'_, A::Domain, T, BoundConnected, NetworkOrder>> {
		self.bound_socket::<T, A>(bind)?.connect(dest)
	}
}

impl Drop for Net {
	fn drop(&mut self) {
		if LIVE.fetch_sub(1, Ordering::AcqRel) == 1 {
			tracing::debug!("network stack torn down");
		}
	}
}
