use crate::addr::Domain;
use crate::error::{Error, Result, errno};

use super::state::{Bound, BoundListening};
use super::{ByteOrderPolicy, Socket, Stream};

impl<'net, D: Domain, P: ByteOrderPolicy> Socket<'net, D, Stream, Bound, P> {
	/// Transitions to a listening socket.
	///
	/// `backlog` is the maximum pending connections queue size.
	///
	/// Only exists for bound stream sockets; a datagram socket has no
	/// `listen`.
	pub fn listen(self, backlog: i32) -> Result<Socket<'net, D, Stream, BoundListening, P>> {
		let result = unsafe { libc::listen(self.as_raw_fd(), backlog) };

		if result == -1 {
			return Err(Error::Listen { errno: errno(), backlog });
		}
		tracing::debug!(fd = self.as_raw_fd(), backlog, "listening");
		Ok(self.transition())
	}
}
