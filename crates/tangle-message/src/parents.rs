//! Typed parent references.
//!
//! A message approves or disapproves earlier messages through up to four
//! parents blocks, one per [`ParentsType`]. On the wire the blocks appear
//! in ascending type order and the references of each block in ascending
//! byte order, so every parent set has exactly one encoding.

use crate::error::{MessageError, ValidationError};
use crate::ids::MessageID;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tangle_core::{MarshalReader, MarshalWriter, ParseError};

/// Minimum number of references in a parents block.
pub const MIN_PARENTS_COUNT: usize = 1;

/// Maximum number of references in a parents block.
pub const MAX_PARENTS_COUNT: usize = 8;

/// Minimum number of parents blocks in a message.
pub const MIN_PARENTS_BLOCK_COUNT: usize = 1;

/// Maximum number of parents blocks in a message.
pub const MAX_PARENTS_BLOCK_COUNT: usize = 4;

/// Maximum number of distinct references across all blocks.
pub const MAX_REFERENCES: usize = MAX_PARENTS_BLOCK_COUNT * MAX_PARENTS_COUNT;

/// Kind of reference a parents block expresses. The discriminant is the
/// wire value and the declaration order is the required block order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ParentsType {
    /// Approves the parent and its entire past cone.
    Strong = 1,
    /// Approves the parent itself, not its past cone.
    Weak = 2,
    /// Likes the branch of the parent without approving its past cone.
    ShallowLike = 3,
    /// Dislikes the branch of the parent.
    ShallowDislike = 4,
}

impl ParentsType {
    /// All types in block order.
    pub const ALL: [ParentsType; 4] = [
        ParentsType::Strong,
        ParentsType::Weak,
        ParentsType::ShallowLike,
        ParentsType::ShallowDislike,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ParentsType {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ParentsType::Strong),
            2 => Ok(ParentsType::Weak),
            3 => Ok(ParentsType::ShallowLike),
            4 => Ok(ParentsType::ShallowDislike),
            unknown => Err(ValidationError::UnknownBlockType(unknown)),
        }
    }
}

impl fmt::Display for ParentsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParentsType::Strong => "strong",
            ParentsType::Weak => "weak",
            ParentsType::ShallowLike => "shallow like",
            ParentsType::ShallowDislike => "shallow dislike",
        };
        f.write_str(name)
    }
}

/// One block of references of a single type.
///
/// A block is plain data; whether it is well formed is decided by
/// [`validate_parents_blocks`] when a message is built or decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentsBlock {
    parents_type: ParentsType,
    references: Vec<MessageID>,
}

impl ParentsBlock {
    pub fn new(parents_type: ParentsType, references: Vec<MessageID>) -> Self {
        ParentsBlock {
            parents_type,
            references,
        }
    }

    pub fn parents_type(&self) -> ParentsType {
        self.parents_type
    }

    pub fn references(&self) -> &[MessageID] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Encoded size: type byte, count byte and the references.
    pub fn encoded_len(&self) -> usize {
        2 + self.references.len() * MessageID::LENGTH
    }

    pub(crate) fn write_to(&self, writer: &mut MarshalWriter) {
        writer.write_u8(self.parents_type.as_u8());
        // Lengths above u8 are rejected by validation before encoding.
        writer.write_u8(self.references.len() as u8);
        for reference in &self.references {
            writer.write_bytes(reference.as_bytes());
        }
    }

    pub(crate) fn from_marshal(reader: &mut MarshalReader<'_>) -> Result<Self, MessageError> {
        let parents_type = ParentsType::try_from(reader.read_u8("parents type")?)?;

        let count = reader.read_u8("parents count")? as usize;
        if !(MIN_PARENTS_COUNT..=MAX_PARENTS_COUNT).contains(&count) {
            return Err(ParseError::InvalidValue {
                field: "parents count",
                reason: format!("parents count {count} not allowed"),
            }
            .into());
        }

        let references = (0..count)
            .map(|_| reader.read_array::<{ MessageID::LENGTH }>("parent").map(MessageID::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParentsBlock::new(parents_type, references))
    }
}

/// Check the structural rules of a message's parents blocks.
///
/// The checks run in a fixed order and the first violation is returned:
/// the first block must hold strong parents; block types must strictly
/// increase; every block holds between [`MIN_PARENTS_COUNT`] and
/// [`MAX_PARENTS_COUNT`] references in strictly ascending byte order; at
/// most [`MAX_REFERENCES`] distinct messages are referenced; and no message
/// may be disliked while also being referenced by any other block.
pub fn validate_parents_blocks(blocks: &[ParentsBlock]) -> Result<(), ValidationError> {
    match blocks.first() {
        Some(first) if first.parents_type == ParentsType::Strong && !first.is_empty() => {}
        _ => return Err(ValidationError::NoStrongParents),
    }

    let mut previous: Option<ParentsType> = None;
    let mut distinct = BTreeSet::new();
    for block in blocks {
        if let Some(previous) = previous {
            match block.parents_type.cmp(&previous) {
                Ordering::Equal => return Err(ValidationError::RepeatingBlockType(previous)),
                Ordering::Less => {
                    return Err(ValidationError::BlocksNotOrderedByType {
                        previous,
                        current: block.parents_type,
                    })
                }
                Ordering::Greater => {}
            }
        }
        previous = Some(block.parents_type);

        if !(MIN_PARENTS_COUNT..=MAX_PARENTS_COUNT).contains(&block.len()) {
            return Err(ValidationError::ParentsCountOutOfRange {
                parents_type: block.parents_type,
                count: block.len(),
            });
        }

        for pair in block.references.windows(2) {
            match pair[0].cmp(&pair[1]) {
                Ordering::Less => {}
                Ordering::Equal => {
                    return Err(ValidationError::RepeatingReferenceInBlock {
                        parents_type: block.parents_type,
                        reference: pair[0],
                    })
                }
                Ordering::Greater => {
                    return Err(ValidationError::NotLexicographicallyOrdered {
                        parents_type: block.parents_type,
                    })
                }
            }
        }
        distinct.extend(block.references.iter().copied());
    }

    if distinct.len() > MAX_REFERENCES {
        return Err(ValidationError::TooManyReferences {
            count: distinct.len(),
            max: MAX_REFERENCES,
        });
    }

    check_dislikes(blocks)
}

/// A disliked message must not be approved, weakly referenced or liked by
/// the same message.
fn check_dislikes(blocks: &[ParentsBlock]) -> Result<(), ValidationError> {
    let Some(dislikes) = blocks
        .iter()
        .find(|block| block.parents_type == ParentsType::ShallowDislike)
    else {
        return Ok(());
    };

    for block in blocks.iter().filter(|block| block.parents_type != ParentsType::ShallowDislike) {
        // References are sorted at this point.
        if let Some(reference) = block
            .references
            .iter()
            .find(|reference| dislikes.references.binary_search(reference).is_ok())
        {
            return Err(ValidationError::ConflictingReferenceAcrossBlocks {
                reference: *reference,
                first: block.parents_type,
                second: ParentsType::ShallowDislike,
            });
        }
    }
    Ok(())
}

/// Parent references grouped by type.
///
/// Duplicates collapse and references are kept in ascending order, so the
/// blocks derived from this map are canonical by construction. Whether the
/// counts are acceptable is still checked when a message is built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParentMessageIDs {
    parents: BTreeMap<ParentsType, BTreeSet<MessageID>>,
}

impl ParentMessageIDs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference of the given type.
    pub fn add(&mut self, parents_type: ParentsType, id: MessageID) -> &mut Self {
        self.parents.entry(parents_type).or_default().insert(id);
        self
    }

    /// Add several references of the given type.
    pub fn add_all(
        &mut self,
        parents_type: ParentsType,
        ids: impl IntoIterator<Item = MessageID>,
    ) -> &mut Self {
        self.parents.entry(parents_type).or_default().extend(ids);
        self
    }

    pub fn add_strong(&mut self, id: MessageID) -> &mut Self {
        self.add(ParentsType::Strong, id)
    }

    pub fn add_weak(&mut self, id: MessageID) -> &mut Self {
        self.add(ParentsType::Weak, id)
    }

    pub fn add_shallow_like(&mut self, id: MessageID) -> &mut Self {
        self.add(ParentsType::ShallowLike, id)
    }

    pub fn add_shallow_dislike(&mut self, id: MessageID) -> &mut Self {
        self.add(ParentsType::ShallowDislike, id)
    }

    /// References of one type, in ascending order.
    pub fn get(&self, parents_type: ParentsType) -> Option<&BTreeSet<MessageID>> {
        self.parents.get(&parents_type)
    }

    /// Whether `id` is referenced with the given type.
    pub fn contains(&self, parents_type: ParentsType, id: &MessageID) -> bool {
        self.get(parents_type).is_some_and(|ids| ids.contains(id))
    }

    /// Total number of references over all types.
    pub fn len(&self) -> usize {
        self.parents.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Canonical blocks: one per non-empty type, in type order.
    pub fn to_blocks(&self) -> Vec<ParentsBlock> {
        self.parents
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(parents_type, ids)| ParentsBlock::new(*parents_type, ids.iter().copied().collect()))
            .collect()
    }
}

impl FromIterator<(ParentsType, MessageID)> for ParentMessageIDs {
    fn from_iter<I: IntoIterator<Item = (ParentsType, MessageID)>>(iter: I) -> Self {
        let mut parents = ParentMessageIDs::new();
        for (parents_type, id) in iter {
            parents.add(parents_type, id);
        }
        parents
    }
}

impl From<&[ParentsBlock]> for ParentMessageIDs {
    fn from(blocks: &[ParentsBlock]) -> Self {
        blocks
            .iter()
            .flat_map(|block| block.references.iter().map(|id| (block.parents_type, *id)))
            .collect()
    }
}
