//! The tangle message.
//!
//! A [`Message`] is validated when it is built or decoded and never changes
//! afterwards. It keeps its canonical encoding next to the decoded fields,
//! so hashing, signature checks and persistence work on the exact bytes
//! that were validated.

use crate::error::{MessageError, Result};
use crate::ids::MessageID;
use crate::parents::{
    validate_parents_blocks, ParentMessageIDs, ParentsBlock, ParentsType, MAX_PARENTS_BLOCK_COUNT,
    MAX_PARENTS_COUNT, MIN_PARENTS_BLOCK_COUNT,
};
use crate::payload::Payload;
use crate::signature::{Ed25519, PublicKey, Signature, SignatureVerifier};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::sync::OnceLock;
use tangle_core::{blake2b_256, MarshalReader, MarshalWriter, ParseError};
use tangle_storage::{ObjectFlags, StorableObject};
use tracing::{debug, trace};

/// Version written by this implementation.
pub const MESSAGE_VERSION: u8 = 1;

/// Upper bound on the encoded size of a message.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Size of everything but the payload in a message whose parents blocks
/// are all full.
pub const MESSAGE_OVERHEAD: usize = 1 // version
    + 1 // parents block count
    + MAX_PARENTS_BLOCK_COUNT * (1 + 1 + MAX_PARENTS_COUNT * MessageID::LENGTH)
    + 8 // issuing time
    + PublicKey::LENGTH
    + 8 // sequence number
    + 4 // payload length
    + 8 // nonce
    + Signature::LENGTH;

/// Largest payload, type tag included, that fits any valid parent set.
pub const MAX_PAYLOAD_SIZE: usize = MAX_MESSAGE_SIZE - MESSAGE_OVERHEAD;

/// A signed vertex of the tangle.
///
/// Layout (little endian):
///
/// ```text
/// version:u8 · blockCount:u8 · { type:u8 · count:u8 · parent:[32] × count } × blockCount
/// · issuingTime:i64 (unix nanoseconds) · issuerPublicKey:[32] · sequenceNumber:u64
/// · payloadLength:u32 · payload · nonce:u64 · signature:[64]
/// ```
///
/// The ID is the BLAKE2b-256 digest of all of these bytes, signature
/// included. The signature covers every byte before it.
#[derive(Clone)]
pub struct Message {
    version: u8,
    parents_blocks: Vec<ParentsBlock>,
    issuing_time: DateTime<Utc>,
    issuer_public_key: PublicKey,
    sequence_number: u64,
    payload: Payload,
    nonce: u64,
    signature: Signature,
    bytes: Vec<u8>,
    id: OnceLock<MessageID>,
    flags: ObjectFlags,
}

impl Message {
    /// Build a message of the current version from grouped parents.
    ///
    /// The parents are deduplicated and sorted per type before the blocks
    /// are validated.
    pub fn new(
        parents: &ParentMessageIDs,
        issuing_time: DateTime<Utc>,
        issuer_public_key: PublicKey,
        sequence_number: u64,
        payload: Payload,
        nonce: u64,
        signature: Signature,
    ) -> Result<Self> {
        Self::from_parents_blocks(
            MESSAGE_VERSION,
            parents.to_blocks(),
            issuing_time,
            issuer_public_key,
            sequence_number,
            payload,
            nonce,
            signature,
        )
    }

    /// Build a message from explicit parents blocks, which must already be
    /// in canonical form.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parents_blocks(
        version: u8,
        parents_blocks: Vec<ParentsBlock>,
        issuing_time: DateTime<Utc>,
        issuer_public_key: PublicKey,
        sequence_number: u64,
        payload: Payload,
        nonce: u64,
        signature: Signature,
    ) -> Result<Self> {
        validate_parents_blocks(&parents_blocks)?;
        if payload.size() > MAX_PAYLOAD_SIZE {
            return Err(MessageError::PayloadTooLarge {
                size: payload.size(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let issuing_time_nanos = issuing_time
            .timestamp_nanos_opt()
            .ok_or(MessageError::IssuingTimeOutOfRange)?;

        let mut message = Message {
            version,
            parents_blocks,
            issuing_time,
            issuer_public_key,
            sequence_number,
            payload,
            nonce,
            signature,
            bytes: Vec::new(),
            id: OnceLock::new(),
            flags: ObjectFlags::new(),
        };
        message.bytes = message.encode(issuing_time_nanos);
        check_size(message.bytes.len())?;
        Ok(message)
    }

    /// Decode a message that occupies all of `bytes`.
    ///
    /// Every structural rule is checked again; bytes left over after the
    /// signature are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = {
            let mut reader = MarshalReader::new(bytes);
            Self::from_marshal(&mut reader).and_then(|message| {
                reader.finish()?;
                Ok(message)
            })
        };

        match &decoded {
            Ok(message) => trace!(id = %message.id(), size = bytes.len(), "decoded message"),
            Err(err) => debug!(size = bytes.len(), error = %err, "rejected message bytes"),
        }
        decoded
    }

    /// Decode a message from the reader's current position, leaving any
    /// following bytes unread.
    pub fn from_marshal(reader: &mut MarshalReader<'_>) -> Result<Self> {
        let start = reader.offset();

        let version = reader.read_u8("message version")?;
        let block_count = reader.read_u8("parents block count")? as usize;
        if !(MIN_PARENTS_BLOCK_COUNT..=MAX_PARENTS_BLOCK_COUNT).contains(&block_count) {
            return Err(ParseError::InvalidValue {
                field: "parents block count",
                reason: format!("parents block count {block_count} not allowed"),
            }
            .into());
        }
        let parents_blocks = (0..block_count)
            .map(|_| ParentsBlock::from_marshal(reader))
            .collect::<Result<Vec<_>>>()?;
        validate_parents_blocks(&parents_blocks)?;

        let issuing_time = Utc.timestamp_nanos(reader.read_i64("issuing time")?);
        let issuer_public_key = reader.read_array("issuer public key").map(PublicKey::new)?;
        let sequence_number = reader.read_u64("sequence number")?;

        let payload_size = reader.read_u32("payload length")? as usize;
        if payload_size > MAX_PAYLOAD_SIZE {
            return Err(MessageError::PayloadTooLarge {
                size: payload_size,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let payload = Payload::from_bytes(reader.read_bytes(payload_size, "payload")?)?;

        let nonce = reader.read_u64("nonce")?;
        let signature = reader.read_array("signature").map(Signature::new)?;

        let bytes = reader.consumed_since(start).to_vec();
        check_size(bytes.len())?;

        Ok(Message {
            version,
            parents_blocks,
            issuing_time,
            issuer_public_key,
            sequence_number,
            payload,
            nonce,
            signature,
            bytes,
            id: OnceLock::new(),
            flags: ObjectFlags::new(),
        })
    }

    fn encode(&self, issuing_time_nanos: i64) -> Vec<u8> {
        let blocks_len: usize = self.parents_blocks.iter().map(ParentsBlock::encoded_len).sum();
        let size = 2 + blocks_len + 8 + PublicKey::LENGTH + 8 + 4 + self.payload.size() + 8 + Signature::LENGTH;

        let mut writer = MarshalWriter::with_capacity(size);
        // Validated blocks have distinct types, so there are at most four.
        writer
            .write_u8(self.version)
            .write_u8(self.parents_blocks.len() as u8);
        for block in &self.parents_blocks {
            block.write_to(&mut writer);
        }
        writer
            .write_i64(issuing_time_nanos)
            .write_bytes(self.issuer_public_key.as_bytes())
            .write_u64(self.sequence_number)
            .write_u32(self.payload.size() as u32);
        self.payload.write_to(&mut writer);
        writer
            .write_u64(self.nonce)
            .write_bytes(self.signature.as_bytes());
        writer.into_bytes()
    }

    /// The same message carrying `signature`.
    pub(crate) fn with_signature(self, signature: Signature) -> Self {
        let mut bytes = self.bytes;
        let essence_len = bytes.len() - Signature::LENGTH;
        bytes[essence_len..].copy_from_slice(signature.as_bytes());
        Message {
            signature,
            bytes,
            id: OnceLock::new(),
            flags: ObjectFlags::new(),
            ..self
        }
    }

    /// Content hash of the encoded message, computed once.
    pub fn id(&self) -> MessageID {
        *self
            .id
            .get_or_init(|| MessageID::new(blake2b_256(&self.bytes)))
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn parents_blocks(&self) -> &[ParentsBlock] {
        &self.parents_blocks
    }

    /// References of one type, in ascending order; empty if the message has
    /// no block of that type.
    pub fn parents_by_type(&self, parents_type: ParentsType) -> &[MessageID] {
        self.parents_blocks
            .iter()
            .find(|block| block.parents_type() == parents_type)
            .map(ParentsBlock::references)
            .unwrap_or(&[])
    }

    /// Parents grouped by type.
    pub fn parent_message_ids(&self) -> ParentMessageIDs {
        ParentMessageIDs::from(self.parents_blocks.as_slice())
    }

    /// Number of references over all blocks.
    pub fn parents_count(&self) -> usize {
        self.parents_blocks.iter().map(ParentsBlock::len).sum()
    }

    /// Whether `id` is referenced by any block.
    pub fn references(&self, id: &MessageID) -> bool {
        self.parents_blocks
            .iter()
            .any(|block| block.references().binary_search(id).is_ok())
    }

    pub fn issuing_time(&self) -> DateTime<Utc> {
        self.issuing_time
    }

    pub fn issuer_public_key(&self) -> PublicKey {
        self.issuer_public_key
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Canonical encoding.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The signed part of the encoding: everything before the signature.
    pub fn essence(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - Signature::LENGTH]
    }

    /// Check the Ed25519 signature of the issuer.
    pub fn verify_signature(&self) -> bool {
        self.verify_signature_with(&Ed25519)
    }

    /// Check the issuer's signature with the given scheme.
    pub fn verify_signature_with(&self, verifier: &impl SignatureVerifier) -> bool {
        verifier.verify(&self.issuer_public_key, self.essence(), &self.signature)
    }
}

fn check_size(size: usize) -> Result<()> {
    if size > MAX_MESSAGE_SIZE {
        return Err(MessageError::TooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Message {}

impl StorableObject for Message {
    type Error = MessageError;

    fn object_storage_key(&self) -> Vec<u8> {
        self.id().to_vec()
    }

    fn object_storage_value(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    fn from_object_storage(key: &[u8], value: &[u8]) -> Result<Self> {
        let stored = MessageID::try_from(key)?;
        let message = Message::from_bytes(value)?;
        let computed = message.id();
        if stored != computed {
            return Err(MessageError::IdMismatch { stored, computed });
        }
        Ok(message)
    }

    fn flags(&self) -> &ObjectFlags {
        &self.flags
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id())
            .field("version", &self.version)
            .field("parents_blocks", &self.parents_blocks)
            .field("issuing_time", &self.issuing_time)
            .field("issuer_public_key", &self.issuer_public_key)
            .field("sequence_number", &self.sequence_number)
            .field("payload", &self.payload)
            .field("nonce", &self.nonce)
            .field("signature", &self.signature)
            .finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Message {{")?;
        writeln!(f, "    id: {}", self.id())?;
        writeln!(f, "    version: {}", self.version)?;
        for block in &self.parents_blocks {
            for reference in block.references() {
                writeln!(f, "    {} parent: {}", block.parents_type(), reference)?;
            }
        }
        writeln!(f, "    issuer: {}", self.issuer_public_key)?;
        writeln!(f, "    issuing time: {}", self.issuing_time.to_rfc3339())?;
        writeln!(f, "    sequence number: {}", self.sequence_number)?;
        writeln!(f, "    payload: {}", self.payload)?;
        writeln!(f, "    nonce: {}", self.nonce)?;
        writeln!(f, "    signature: {}", self.signature)?;
        write!(f, "}}")
    }
}
