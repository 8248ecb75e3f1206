//! Fixed-length identifier types produced by the decoder as leaf values.

use alloc::string::String;
use alloy_primitives::{hex, FixedBytes};
use core::fmt;

/// Size of a single ABI slot in bytes.
pub const WORD_SIZE: usize = 32;

pub const IDENTITY_LENGTH: usize = 32;
pub const HASH_LENGTH: usize = 32;
/// Identity-sized target followed by a method selector, packed into one word.
pub const FUNCTION_SELECTOR_LENGTH: usize = 24;

macro_rules! impl_fixed_wrapper {
    ($(#[$attr:meta])* $name:ident, $len:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub FixedBytes<$len>);

        impl $name {
            pub const LEN: usize = $len;
            pub const ZERO: Self = Self(FixedBytes::ZERO);

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(FixedBytes(bytes))
            }

            /// Builds a value from `bytes`. Longer inputs are cropped from the left,
            /// shorter ones are left-padded with zeros.
            pub fn from_slice_truncated(bytes: &[u8]) -> Self {
                let bytes = if bytes.len() > $len {
                    &bytes[bytes.len() - $len..]
                } else {
                    bytes
                };
                Self(FixedBytes::left_padding_from(bytes))
            }

            pub fn as_slice(&self) -> &[u8] {
                self.0.as_slice()
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self::new(bytes)
            }
        }

        impl From<FixedBytes<$len>> for $name {
            fn from(bytes: FixedBytes<$len>) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for FixedBytes<$len> {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                self.as_slice()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }
    };
}

impl_fixed_wrapper!(
    /// Account identifier of the chain.
    Identity,
    IDENTITY_LENGTH
);
impl_fixed_wrapper!(Hash, HASH_LENGTH);
impl_fixed_wrapper!(
    /// External function reference: target identity prefix and method selector.
    FunctionSelector,
    FUNCTION_SELECTOR_LENGTH
);
