//! Address-literal grammar.
//!
//! Every function here is a `const fn` over bytes: the same code runs when a
//! literal is evaluated in a `const` item and when text arrives at runtime,
//! so both paths produce bit-identical results.

use super::AddressError;

/// Parses IPv4 text using the POSIX `inet_aton` grammar.
///
/// Accepts one to four dot-separated parts, each decimal, octal (leading `0`)
/// or hexadecimal (`0x`). With four parts every part is a byte; with fewer the
/// last part fills the remaining low-order bytes (`127.1` is `127.0.0.1`).
///
/// Returns the address bytes in network order.
pub const fn parse_ipv4(text: &[u8]) -> Result<[u8; 4], AddressError> {
	let len = text.len();
	let mut parts = [0u64; 4];
	let mut count = 0;
	let mut start = 0;
	let mut i = 0;

	while i <= len {
		if i == len || text[i] == b'.' {
			if count == 4 {
				return Err(AddressError::Invalid);
			}
			parts[count] = match parse_number(text, start, i, u32::MAX as u64) {
				Some(part) => part,
				None => return Err(AddressError::Invalid),
			};
			count += 1;
			start = i + 1;
		}
		i += 1;
	}

	let value = match count {
		1 => parts[0],
		2 => {
			if parts[0] > 0xFF || parts[1] > 0xFF_FFFF {
				return Err(AddressError::Invalid);
			}
			(parts[0] << 24) | parts[1]
		}
		3 => {
			if parts[0] > 0xFF || parts[1] > 0xFF || parts[2] > 0xFFFF {
				return Err(AddressError::Invalid);
			}
			(parts[0] << 24) | (parts[1] << 16) | parts[2]
		}
		_ => {
			if parts[0] > 0xFF || parts[1] > 0xFF || parts[2] > 0xFF || parts[3] > 0xFF {
				return Err(AddressError::Invalid);
			}
			(parts[0] << 24) | (parts[1] << 16) | (parts[2] << 8) | parts[3]
		}
	};

	Ok((value as u32).to_be_bytes())
}

/// Parses IPv6 text: colon-separated hex groups, at most one `::`, and an
/// optional trailing dotted-decimal IPv4 in the last 32 bits.
///
/// Returns the address bytes in network order.
pub const fn parse_ipv6(text: &[u8]) -> Result<[u8; 16], AddressError> {
	let len = text.len();
	let mut groups = [0u16; 8];
	let mut count = 0;
	let mut ellipsis: Option<usize> = None;
	let mut i = 0;

	if len < 2 {
		return Err(AddressError::Invalid);
	}

	// A leading colon is only legal as the first half of "::".
	if text[0] == b':' {
		if text[1] != b':' {
			return Err(AddressError::Invalid);
		}
		ellipsis = Some(0);
		i = 2;
	}

	while i < len {
		if count == 8 {
			return Err(AddressError::Invalid);
		}

		if dot_before_colon(text, i) {
			if count > 6 {
				return Err(AddressError::Invalid);
			}
			let v4 = match parse_ipv4_canonical(text, i, len) {
				Some(v4) => v4,
				None => return Err(AddressError::Invalid),
			};
			groups[count] = (v4 >> 16) as u16;
			groups[count + 1] = v4 as u16;
			count += 2;
			break;
		}

		let start = i;
		let mut value: u32 = 0;
		while i < len {
			let digit = match digit_value(text[i], 16) {
				Some(digit) => digit,
				None => break,
			};
			if i - start == 4 {
				return Err(AddressError::Invalid);
			}
			value = value * 16 + digit as u32;
			i += 1;
		}
		if i == start {
			return Err(AddressError::Invalid);
		}
		groups[count] = value as u16;
		count += 1;

		if i == len {
			break;
		}
		if text[i] != b':' {
			return Err(AddressError::Invalid);
		}

		if i + 1 < len && text[i + 1] == b':' {
			if ellipsis.is_some() {
				return Err(AddressError::Invalid);
			}
			ellipsis = Some(count);
			i += 2;
		} else {
			i += 1;
			if i == len {
				return Err(AddressError::Invalid);
			}
		}
	}

	match ellipsis {
		Some(at) => {
			// "::" stands for at least one zero group.
			if count > 7 {
				return Err(AddressError::Invalid);
			}
			let shift = 8 - count;
			let mut k = count;
			while k > at {
				k -= 1;
				groups[k + shift] = groups[k];
				groups[k] = 0;
			}
		}
		None => {
			if count != 8 {
				return Err(AddressError::Invalid);
			}
		}
	}

	let mut bytes = [0u8; 16];
	let mut g = 0;
	while g < 8 {
		bytes[g * 2] = (groups[g] >> 8) as u8;
		bytes[g * 2 + 1] = groups[g] as u8;
		g += 1;
	}
	Ok(bytes)
}

/// Parses `text[start..end]` as one `inet_aton` number no larger than `max`.
const fn parse_number(text: &[u8], start: usize, end: usize, max: u64) -> Option<u64> {
	if start >= end {
		return None;
	}

	let width = end - start;
	let (base, mut i) = if width > 2 && text[start] == b'0' && (text[start + 1] == b'x' || text[start + 1] == b'X') {
		(16, start + 2)
	} else if width > 1 && text[start] == b'0' {
		(8, start + 1)
	} else {
		(10, start)
	};

	let mut value: u64 = 0;
	while i < end {
		let digit = match digit_value(text[i], base) {
			Some(digit) => digit,
			None => return None,
		};
		value = value * base + digit;
		if value > max {
			return None;
		}
		i += 1;
	}
	Some(value)
}

/// Dotted-decimal IPv4 in its strict form: four parts, decimal only, no
/// leading zeros. Used for the embedded IPv4 tail of an IPv6 address.
const fn parse_ipv4_canonical(text: &[u8], start: usize, end: usize) -> Option<u32> {
	let mut value: u32 = 0;
	let mut count = 0;
	let mut part_start = start;
	let mut i = start;

	while i <= end {
		if i == end || text[i] == b'.' {
			let width = i - part_start;
			if count == 4 || width == 0 || width > 3 {
				return None;
			}
			if width > 1 && text[part_start] == b'0' {
				return None;
			}
			let mut part: u32 = 0;
			let mut j = part_start;
			while j < i {
				match digit_value(text[j], 10) {
					Some(digit) => part = part * 10 + digit as u32,
					None => return None,
				}
				j += 1;
			}
			if part > 255 {
				return None;
			}
			value = (value << 8) | part;
			count += 1;
			part_start = i + 1;
		}
		i += 1;
	}

	if count == 4 { Some(value) } else { None }
}

const fn dot_before_colon(text: &[u8], from: usize) -> bool {
	let mut i = from;
	while i < text.len() {
		match text[i] {
			b'.' => return true,
			b':' => return false,
			_ => i += 1,
		}
	}
	false
}

const fn digit_value(c: u8, base: u64) -> Option<u64> {
	let digit = match c {
		b'0'..=b'9' => (c - b'0') as u64,
		b'a'..=b'f' => (c - b'a' + 10) as u64,
		b'A'..=b'F' => (c - b'A' + 10) as u64,
		_ => return None,
	};
	if digit < base { Some(digit) } else { None }
}
