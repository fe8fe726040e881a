use crate::addr::AddressError;

/// Result alias used by every fallible operation in the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Socket, transfer and codec errors.
///
/// Syscall failures keep the raw `errno` so callers can inspect it with
/// [`Error::raw_os_error`] or map it with [`Error::kind`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Address(#[from] AddressError),

	#[error("socket() failed: {}", errno_to_str(*.errno))]
	Create { errno: i32 },

	#[error("bind({addr}) failed: {}", errno_to_str(*.errno))]
	Bind { errno: i32, addr: String },

	#[error("listen(backlog={backlog}) failed: {}", errno_to_str(*.errno))]
	Listen { errno: i32, backlog: i32 },

	#[error("connect({addr}) failed: {}", errno_to_str(*.errno))]
	Connect { errno: i32, addr: String },

	#[error("accept() failed: {}", errno_to_str(*.errno))]
	Accept { errno: i32 },

	#[error("send() failed: {}", errno_to_str(*.errno))]
	Send { errno: i32 },

	#[error("recv() failed: {}", errno_to_str(*.errno))]
	Recv { errno: i32 },

	#[error("poll() failed: {}", errno_to_str(*.errno))]
	Poll { errno: i32 },

	#[error("shutdown() failed: {}", errno_to_str(*.errno))]
	Shutdown { errno: i32 },

	#[error("setsockopt({option}) failed: {}", errno_to_str(*.errno))]
	SetOption { errno: i32, option: &'static str },

	#[error("getsockopt({option}) failed: {}", errno_to_str(*.errno))]
	GetOption { errno: i32, option: &'static str },

	#[error("getsockname() failed: {}", errno_to_str(*.errno))]
	LocalAddr { errno: i32 },

	#[error("getpeername() failed: {}", errno_to_str(*.errno))]
	PeerAddr { errno: i32 },

	/// The peer closed the connection before a whole packet arrived.
	#[error("connection closed by peer")]
	NotConnected,

	/// The received byte count or content matches no expected packet shape.
	#[error("received {received} bytes that match no expected packet")]
	WrongProtocolType { received: usize },

	/// A packet failed its own validity predicate.
	#[error("packet failed its validity predicate")]
	InvalidArgument,
}

impl Error {
	/// Returns the OS error number behind a syscall failure.
	pub fn raw_os_error(&self) -> Option<i32> {
		match self {
			Error::Create { errno }
			| Error::Bind { errno, .. }
			| Error::Listen { errno, .. }
			| Error::Connect { errno, .. }
			| Error::Accept { errno }
			| Error::Send { errno }
			| Error::Recv { errno }
			| Error::Poll { errno }
			| Error::Shutdown { errno }
			| Error::SetOption { errno, .. }
			| Error::GetOption { errno, .. }
			| Error::LocalAddr { errno }
			| Error::PeerAddr { errno } => Some(*errno),
			Error::Address(_)
			| Error::NotConnected
			| Error::WrongProtocolType { .. }
			| Error::InvalidArgument => None,
		}
	}

	/// Portable classification of this error.
	pub fn kind(&self) -> std::io::ErrorKind {
		match self {
			Error::Address(_) | Error::InvalidArgument => std::io::ErrorKind::InvalidInput,
			Error::NotConnected => std::io::ErrorKind::NotConnected,
			Error::WrongProtocolType { .. } => std::io::ErrorKind::InvalidData,
			_ => self
				.raw_os_error()
				.map(errno_to_kind)
				.unwrap_or(std::io::ErrorKind::Other),
		}
	}
}

/// Returns current errno value.
#[inline]
pub fn errno() -> i32 {
	std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Converts errno to human-readable string.
fn errno_to_str(errno: i32) -> String {
	match errno {
		libc::EACCES => "permission denied".into(),
		libc::EADDRINUSE => "address already in use".into(),
		libc::EADDRNOTAVAIL => "address not available".into(),
		libc::EAFNOSUPPORT => "address family not supported".into(),
		libc::EAGAIN => "resource temporarily unavailable".into(),
		libc::EBADF => "bad file descriptor".into(),
		libc::ECONNREFUSED => "connection refused".into(),
		libc::ECONNRESET => "connection reset by peer".into(),
		libc::EINTR => "interrupted by signal".into(),
		libc::EINVAL => "invalid argument".into(),
		libc::EMFILE => "too many open files".into(),
		libc::EMSGSIZE => "message too long".into(),
		libc::ENETUNREACH => "network unreachable".into(),
		libc::ENOBUFS => "no buffer space available".into(),
		libc::ENOTCONN => "not connected".into(),
		libc::EOPNOTSUPP => "operation not supported".into(),
		libc::EPIPE => "broken pipe".into(),
		libc::ETIMEDOUT => "connection timed out".into(),
		_ => format!("errno {}", errno),
	}
}

/// Maps errno to std::io::ErrorKind.
fn errno_to_kind(errno: i32) -> std::io::ErrorKind {
	match errno {
		libc::EACCES | libc::EPERM => std::io::ErrorKind::PermissionDenied,
		libc::EADDRINUSE => std::io::ErrorKind::AddrInUse,
		libc::EADDRNOTAVAIL => std::io::ErrorKind::AddrNotAvailable,
		libc::EAGAIN => std::io::ErrorKind::WouldBlock,
		libc::ECONNREFUSED => std::io::ErrorKind::ConnectionRefused,
		libc::ECONNRESET => std::io::ErrorKind::ConnectionReset,
		libc::ECONNABORTED => std::io::ErrorKind::ConnectionAborted,
		libc::EINTR => std::io::ErrorKind::Interrupted,
		libc::EINVAL => std::io::ErrorKind::InvalidInput,
		libc::ENOTCONN => std::io::ErrorKind::NotConnected,
		libc::EPIPE => std::io::ErrorKind::BrokenPipe,
		libc::ETIMEDOUT => std::io::ErrorKind::TimedOut,
		_ => std::io::ErrorKind::Other,
	}
}

impl From<Error> for std::io::Error {
	fn from(err: Error) -> Self {
		match err.raw_os_error() {
			Some(errno) => std::io::Error::new(errno_to_kind(errno), err),
			None => std::io::Error::new(err.kind(), err),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn syscall_errors_keep_errno() {
		let err = Error::Bind { errno: libc::EADDRINUSE, addr: "127.0.0.1:80".into() };
		assert_eq!(err.raw_os_error(), Some(libc::EADDRINUSE));
		assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
		assert_eq!(err.to_string(), "bind(127.0.0.1:80) failed: address already in use");
	}

	#[test]
	fn codec_errors_have_no_errno() {
		assert_eq!(Error::InvalidArgument.raw_os_error(), None);
		assert_eq!(Error::NotConnected.kind(), std::io::ErrorKind::NotConnected);
		let io: std::io::Error = Error::WrongProtocolType { received: 3 }.into();
		assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
	}

	#[test]
	fn address_lookups_name_their_syscall() {
		let err = Error::PeerAddr { errno: libc::ENOTCONN };
		assert_eq!(err.to_string(), "getpeername() failed: not connected");
		assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);

		let err = Error::LocalAddr { errno: libc::EBADF };
		assert_eq!(err.to_string(), "getsockname() failed: bad file descriptor");
		assert_eq!(err.raw_os_error(), Some(libc::EBADF));
	}

	#[test]
	fn unknown_errno_is_reported_numerically() {
		assert_eq!(errno_to_str(9999), "errno 9999");
	}
}
