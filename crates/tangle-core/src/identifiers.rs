//! Unordered identifier sets with a deterministic-length binary form.

use crate::error::ParseError;
use crate::identifier::Identifier;
use crate::marshal::{MarshalReader, MarshalWriter};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A set of identifiers.
///
/// Membership is all that matters: iteration order is unspecified and
/// callers that need an order must sort (see [`Identifiers::sorted`]).
///
/// Binary form: `count:u64` followed by `count` identifiers in ascending
/// order, so equal sets encode to equal bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Identifiers<T: Identifier> {
    set: HashSet<T>,
}

impl<T: Identifier> Identifiers<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Identifiers {
            set: HashSet::new(),
        }
    }

    /// Add an identifier, returning the set to allow chaining.
    pub fn add(&mut self, id: T) -> &mut Self {
        self.set.insert(id);
        self
    }

    /// Remove an identifier. Returns whether it was present.
    pub fn remove(&mut self, id: &T) -> bool {
        self.set.remove(id)
    }

    pub fn contains(&self, id: &T) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.set.iter()
    }

    /// Materialize the members in unspecified order.
    pub fn slice(&self) -> Vec<T> {
        self.set.iter().copied().collect()
    }

    /// Members sorted byte-lexicographically.
    pub fn sorted(&self) -> Vec<T> {
        let mut list = self.slice();
        list.sort();
        list
    }

    /// Encode as `count:u64` followed by the members in ascending order.
    pub fn bytes(&self) -> Vec<u8> {
        let mut writer = MarshalWriter::with_capacity(8 + self.set.len() * T::LENGTH);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn write_to(&self, writer: &mut MarshalWriter) {
        writer.write_u64(self.set.len() as u64);
        for id in self.sorted() {
            writer.write_bytes(id.as_slice());
        }
    }

    /// Decode from the start of `bytes`, returning the number of bytes consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), ParseError> {
        let mut reader = MarshalReader::new(bytes);
        let ids = Self::from_marshal(&mut reader)?;
        Ok((ids, reader.offset()))
    }

    pub fn from_marshal(reader: &mut MarshalReader<'_>) -> Result<Self, ParseError> {
        let count = reader.read_u64("identifier count")?;
        let needed = usize::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(T::LENGTH))
            .unwrap_or(usize::MAX);
        if needed > reader.remaining() {
            return Err(ParseError::NotEnoughBytes {
                field: "identifiers",
                needed,
                remaining: reader.remaining(),
            });
        }

        let mut set = HashSet::with_capacity(needed / T::LENGTH.max(1));
        for _ in 0..count {
            set.insert(T::read_from(reader)?);
        }
        Ok(Identifiers { set })
    }
}

impl<T: Identifier> Default for Identifiers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identifier> FromIterator<T> for Identifiers<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Identifiers {
            set: iter.into_iter().collect(),
        }
    }
}

impl<T: Identifier> Extend<T> for Identifiers<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.set.extend(iter);
    }
}

impl<T: Identifier> IntoIterator for Identifiers<T> {
    type Item = T;
    type IntoIter = std::collections::hash_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.into_iter()
    }
}

impl<'a, T: Identifier> IntoIterator for &'a Identifiers<T> {
    type Item = &'a T;
    type IntoIter = std::collections::hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.set.iter()
    }
}

impl<T: Identifier> fmt::Display for Identifiers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.set.is_empty() {
            return write!(f, "{}s{{}}", T::NAME);
        }
        writeln!(f, "{}s{{", T::NAME)?;
        for id in self.sorted() {
            writeln!(f, "    {},", id)?;
        }
        write!(f, "}}")
    }
}

impl<T: Identifier> fmt::Debug for Identifiers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted()).finish()
    }
}

impl<T: Identifier + Serialize> Serialize for Identifiers<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

impl<'de, T: Identifier + Deserialize<'de>> Deserialize<'de> for Identifiers<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<T>::deserialize(deserializer)?.into_iter().collect())
    }
}
