/// Declares a `#[repr(C)]` packet struct and its field descriptor.
///
/// Every field must itself be a [`WireField`](crate::WireField): a primitive
/// integer, `f32`/`f64`, an array of wire fields, or another struct declared
/// with this macro. The struct gets `Clone` and `Copy`; further derives go in
/// the attribute list as usual. A layout with implicit padding fails to
/// compile.
///
/// The validity predicate is supplied separately by implementing
/// [`Packet`](crate::Packet):
///
/// ```
/// wiregate::packet! {
///     #[derive(Debug, PartialEq)]
///     pub struct Quad {
///         pub a: u32,
///         pub b: u32,
///         pub c: u32,
///         pub d: u32,
///     }
/// }
///
/// impl wiregate::Packet for Quad {
///     fn is_valid(&self) -> bool {
///         (self.a, self.b, self.c, self.d) == (1, 2, 3, 4)
///     }
/// }
///
/// assert!(wiregate::make_valid_packet(Quad { a: 1, b: 2, c: 3, d: 4 }).is_ok());
/// ```
#[macro_export]
macro_rules! packet {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$(
				$(#[$field_meta:meta])*
				$field_vis:vis $field:ident : $ty:ty
			),* $(,)?
		}
	) => {
		$(#[$meta])*
		#[repr(C)]
		#[derive(Clone, Copy)]
		$vis struct $name {
			$(
				$(#[$field_meta])*
				$field_vis $field: $ty,
			)*
		}

		unsafe impl $crate::WireField for $name {
			const PACKED_SIZE: usize = 0 $(+ <$ty as $crate::WireField>::PACKED_SIZE)*;

			#[inline]
			fn convert_byte_order(&mut self) {
				$( $crate::WireField::convert_byte_order(&mut self.$field); )*
			}
		}

		const _: () = ::core::assert!(
			::core::mem::size_of::<$name>() == <$name as $crate::WireField>::PACKED_SIZE,
			concat!("packet `", stringify!($name), "` contains implicit padding"),
		);
	};
}

/// Declares an enum over a closed set of packet alternatives.
///
/// A received datagram decodes to the one alternative whose size matches
/// the byte count and whose predicate accepts the content. No match, or more
/// than one, is treated as corruption.
///
/// ```
/// wiregate::packet! {
///     #[derive(Debug)]
///     pub struct Ping { pub seq: u32 }
/// }
/// wiregate::packet! {
///     #[derive(Debug)]
///     pub struct Ratio { pub value: f32, pub scale: u16, pub pad: u16 }
/// }
/// impl wiregate::Packet for Ping {
///     fn is_valid(&self) -> bool { self.seq != 0 }
/// }
/// impl wiregate::Packet for Ratio {
///     fn is_valid(&self) -> bool { self.value == 1.25 }
/// }
///
/// wiregate::packet_variant! {
///     #[derive(Debug)]
///     pub enum Message {
///         Ping(Ping),
///         Ratio(Ratio),
///     }
/// }
///
/// use wiregate::PacketVariant;
/// assert_eq!(Message::MAX_SIZE, 8);
/// let bytes = wiregate::packet::to_wire_bytes(&Ping { seq: 7 }, true);
/// assert!(matches!(Message::decode(&bytes, true), Some(Message::Ping(Ping { seq: 7 }))));
/// ```
#[macro_export]
macro_rules! packet_variant {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident {
			$(
				$(#[$variant_meta:meta])*
				$variant:ident($ty:ty)
			),+ $(,)?
		}
	) => {
		$(#[$meta])*
		$vis enum $name {
			$(
				$(#[$variant_meta])*
				$variant($ty),
			)+
		}

		impl $crate::PacketVariant for $name {
			const MAX_SIZE: usize = {
				let mut max = 0;
				$(
					if ::core::mem::size_of::<$ty>() > max {
						max = ::core::mem::size_of::<$ty>();
					}
				)+
				max
			};

			fn decode(bytes: &[u8], convert: bool) -> ::core::option::Option<Self> {
				let mut found = ::core::option::Option::None;
				let mut matches = 0usize;
				$(
					if let ::core::option::Option::Some(packet) =
						$crate::packet::decode_alternative::<$ty>(bytes, convert)
					{
						matches += 1;
						found = ::core::option::Option::Some($name::$variant(packet));
					}
				)+
				if matches == 1 { found } else { ::core::option::Option::None }
			}

			fn is_valid(&self) -> bool {
				match self {
					$( $name::$variant(packet) => $crate::Packet::is_valid(packet), )+
				}
			}

			fn with_wire_bytes<R>(&self, convert: bool, f: impl FnOnce(&[u8]) -> R) -> R {
				match self {
					$( $name::$variant(packet) => $crate::packet::with_wire_bytes(packet, convert, f), )+
				}
			}
		}
	};
}
