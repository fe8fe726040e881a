use std::ops::{BitOr, BitOrAssign};

use crate::addr::Domain;
use crate::error::{Error, Result, errno};

use super::state::State;
use super::{ByteOrderPolicy, SockType, Socket};

/// Readiness conditions to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollFlags(libc::c_short);

impl PollFlags {
	/// Data to read, or a connection to accept.
	pub const IN: Self = Self(libc::POLLIN);
	/// Room to write without blocking.
	pub const OUT: Self = Self(libc::POLLOUT);
	/// Urgent data.
	pub const PRI: Self = Self(libc::POLLPRI);

	#[inline]
	pub const fn bits(self) -> libc::c_short {
		self.0
	}

	#[inline]
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}
}

impl BitOr for PollFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for PollFlags {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

impl<D: Domain, T: SockType, S: State, P: ByteOrderPolicy> Socket<'_, D, T, S, P> {
	/// Waits up to `timeout_ms` milliseconds for any of `flags`.
	///
	/// `-1` waits indefinitely, `0` only checks. Returns `false` on timeout.
	/// Error and hang-up conditions count as ready, so the next transfer
	/// reports them. A signal interrupting the wait is [`Error::Poll`] with
	/// `EINTR`.
	pub fn poll(&self, flags: PollFlags, timeout_ms: i32) -> Result<bool> {
		let mut pfd = libc::pollfd { fd: self.as_raw_fd(), events: flags.bits(), revents: 0 };

		let n = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
		if n == -1 {
			return Err(Error::Poll { errno: errno() });
		}

		let ready = n > 0 && pfd.revents & (flags.bits() | libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0;
		tracing::trace!(fd = pfd.fd, events = flags.bits(), revents = pfd.revents, ready, "poll");
		Ok(ready)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_combine() {
		let both = PollFlags::IN | PollFlags::OUT;
		assert!(both.contains(PollFlags::IN));
		assert!(both.contains(PollFlags::OUT));
		assert!(!both.contains(PollFlags::PRI));

		let mut flags = PollFlags::IN;
		flags |= PollFlags::PRI;
		assert_eq!(flags.bits(), libc::POLLIN | libc::POLLPRI);
	}
}
