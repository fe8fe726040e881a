use crate::addr::Domain;
use crate::error::{Error, Result, errno};

use super::options::set_int_option;
use super::state::{IsConnected, State};
use super::{ByteOrderPolicy, Socket, Stream};

/// Which direction of a connection to shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	/// No more receives (`SHUT_RD`).
	Read,
	/// No more sends (`SHUT_WR`); the peer sees end of stream.
	Write,
	/// Both directions (`SHUT_RDWR`).
	Both,
}

impl Shutdown {
	fn raw(self) -> libc::c_int {
		match self {
			Shutdown::Read => libc::SHUT_RD,
			Shutdown::Write => libc::SHUT_WR,
			Shutdown::Both => libc::SHUT_RDWR,
		}
	}
}

impl<D: Domain, S: State, P: ByteOrderPolicy> Socket<'_, D, Stream, S, P> {
	/// Sets TCP_NODELAY.
	///
	/// Disables Nagle's algorithm, so small packets leave immediately.
	pub fn set_tcp_nodelay(&self, enable: bool) -> Result<()> {
		set_int_option(self.as_raw_fd(), libc::IPPROTO_TCP, libc::TCP_NODELAY, enable as libc::c_int, "TCP_NODELAY")
	}
}

impl<D: Domain, S: IsConnected, P: ByteOrderPolicy> Socket<'_, D, Stream, S, P> {
	/// Shuts down one or both directions without closing the descriptor.
	pub fn shutdown(&self, how: Shutdown) -> Result<()> {
		let result = unsafe { libc::shutdown(self.as_raw_fd(), how.raw()) };

		if result == -1 {
			return Err(Error::Shutdown { errno: errno() });
		}
		tracing::debug!(fd = self.as_raw_fd(), ?how, "shutdown");
		Ok(())
	}
}
