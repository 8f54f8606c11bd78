//! Fixed-length byte identifiers.
//!
//! Every identifier in the tangle (message, branch, conflict, output, keys)
//! is an opaque byte array with the same set of encodings: raw bytes on the
//! wire, base58 in logs and JSON, and `TypeName(base58)` for display. The
//! [`define_identifier!`](crate::define_identifier) macro generates that
//! surface so the types only differ in name and length.

use crate::error::ParseError;
use crate::marshal::MarshalReader;
use std::fmt;
use std::hash::Hash;

/// Common behaviour of identifiers generated by `define_identifier!`.
pub trait Identifier: Copy + Eq + Ord + Hash + fmt::Display + fmt::Debug {
    /// Encoded length in bytes.
    const LENGTH: usize;

    /// Type name used in text renderings, e.g. `MessageID`.
    const NAME: &'static str;

    /// Raw bytes of the identifier.
    fn as_slice(&self) -> &[u8];

    /// Read the identifier from the reader's current position.
    fn read_from(reader: &mut MarshalReader<'_>) -> Result<Self, ParseError>;
}

/// Define a fixed-length identifier newtype.
///
/// ```
/// tangle_core::define_identifier! {
///     /// Identifies a widget.
///     pub struct WidgetID([u8; 16]) as "widget ID";
/// }
///
/// let id = WidgetID::random();
/// assert_eq!(WidgetID::from_base58(&id.base58()).unwrap(), id);
/// assert!(id.to_string().starts_with("WidgetID("));
/// ```
#[macro_export]
macro_rules! define_identifier {
    ($(#[$meta:meta])* $vis:vis struct $name:ident([u8; $len:expr]) as $label:literal;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name([u8; $len]);

        impl $name {
            /// Encoded length in bytes.
            pub const LENGTH: usize = $len;

            /// The all-zero identifier.
            pub const EMPTY: Self = $name([0u8; $len]);

            pub const fn new(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_vec(&self) -> Vec<u8> {
                self.0.to_vec()
            }

            /// Whether this is the all-zero identifier.
            pub fn is_empty(&self) -> bool {
                self.0 == [0u8; $len]
            }

            /// Read the identifier from the start of `bytes`, returning it
            /// together with the number of bytes consumed. Bytes beyond the
            /// identifier are left for the caller.
            pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), $crate::ParseError> {
                let mut reader = $crate::MarshalReader::new(bytes);
                let id = Self::from_marshal(&mut reader)?;
                Ok((id, reader.offset()))
            }

            pub fn from_marshal(reader: &mut $crate::MarshalReader<'_>) -> Result<Self, $crate::ParseError> {
                reader.read_array::<$len>($label).map($name)
            }

            /// Parse the base58 text form.
            pub fn from_base58(encoded: &str) -> Result<Self, $crate::IdentifierError> {
                let decoded = $crate::__private::bs58::decode(encoded)
                    .into_vec()
                    .map_err(|err| $crate::IdentifierError::InvalidBase58 {
                        kind: $label,
                        reason: err.to_string(),
                    })?;
                Self::try_from(decoded.as_slice())
            }

            pub fn base58(&self) -> String {
                $crate::__private::bs58::encode(&self.0).into_string()
            }

            /// Random identifier, for tests and tooling.
            pub fn random() -> Self {
                let mut bytes = [0u8; $len];
                $crate::__private::rand::RngCore::fill_bytes(
                    &mut $crate::__private::rand::thread_rng(),
                    &mut bytes,
                );
                $name(bytes)
            }
        }

        impl $crate::Identifier for $name {
            const LENGTH: usize = $len;
            const NAME: &'static str = stringify!($name);

            fn as_slice(&self) -> &[u8] {
                &self.0
            }

            fn read_from(reader: &mut $crate::MarshalReader<'_>) -> Result<Self, $crate::ParseError> {
                Self::from_marshal(reader)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::EMPTY
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = $crate::IdentifierError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| $crate::IdentifierError::WrongLength {
                            kind: $label,
                            expected: $len,
                            actual: bytes.len(),
                        })?;
                Ok($name(array))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_base58(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.base58())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(self, f)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str(&self.base58())
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let encoded = <String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                Self::from_base58(&encoded).map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
