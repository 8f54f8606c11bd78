//! Issuer-side message assembly.

use crate::error::Result;
use crate::ids::MessageID;
use crate::message::{Message, MESSAGE_VERSION};
use crate::parents::{ParentMessageIDs, ParentsType};
use crate::payload::Payload;
use crate::signature::{PublicKey, Signature, Signer};
use chrono::{DateTime, Utc};

/// Builder for messages.
///
/// Unset fields default to the current version, the time of
/// [`build`](Self::build), an empty issuer key, sequence number and nonce
/// zero and an empty generic data payload.
#[derive(Clone, Debug)]
pub struct MessageBuilder {
    version: u8,
    parents: ParentMessageIDs,
    issuing_time: Option<DateTime<Utc>>,
    issuer_public_key: PublicKey,
    sequence_number: u64,
    payload: Payload,
    nonce: u64,
}

impl MessageBuilder {
    /// Create a new message builder.
    pub fn new() -> Self {
        MessageBuilder {
            version: MESSAGE_VERSION,
            parents: ParentMessageIDs::new(),
            issuing_time: None,
            issuer_public_key: PublicKey::EMPTY,
            sequence_number: 0,
            payload: Payload::default(),
            nonce: 0,
        }
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Replace all parents.
    pub fn with_parents(mut self, parents: ParentMessageIDs) -> Self {
        self.parents = parents;
        self
    }

    /// Add a single parent of the given type.
    pub fn with_parent(mut self, parents_type: ParentsType, id: MessageID) -> Self {
        self.parents.add(parents_type, id);
        self
    }

    pub fn with_strong_parent(self, id: MessageID) -> Self {
        self.with_parent(ParentsType::Strong, id)
    }

    pub fn with_weak_parent(self, id: MessageID) -> Self {
        self.with_parent(ParentsType::Weak, id)
    }

    pub fn with_shallow_like_parent(self, id: MessageID) -> Self {
        self.with_parent(ParentsType::ShallowLike, id)
    }

    pub fn with_shallow_dislike_parent(self, id: MessageID) -> Self {
        self.with_parent(ParentsType::ShallowDislike, id)
    }

    pub fn with_issuing_time(mut self, issuing_time: DateTime<Utc>) -> Self {
        self.issuing_time = Some(issuing_time);
        self
    }

    pub fn with_issuer(mut self, issuer_public_key: PublicKey) -> Self {
        self.issuer_public_key = issuer_public_key;
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Set the proof of work nonce.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Build an unsigned message.
    pub fn build(self) -> Result<Message> {
        self.build_with_signature(Signature::EMPTY)
    }

    /// Build a message issued and signed by `signer`. The issuer key set on
    /// the builder is replaced by the signer's key.
    pub fn build_signed(self, signer: &impl Signer) -> Result<Message> {
        let unsigned = self.with_issuer(signer.public_key()).build()?;
        let signature = signer.sign(unsigned.essence());
        Ok(unsigned.with_signature(signature))
    }

    fn build_with_signature(self, signature: Signature) -> Result<Message> {
        let issuing_time = self.issuing_time.unwrap_or_else(Utc::now);
        Message::from_parents_blocks(
            self.version,
            self.parents.to_blocks(),
            issuing_time,
            self.issuer_public_key,
            self.sequence_number,
            self.payload,
            self.nonce,
            signature,
        )
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MessageError, ValidationError};
    use crate::ids::EMPTY_MESSAGE_ID;
    use crate::signature::KeyPair;

    #[test]
    fn test_genesis_child() {
        let message = MessageBuilder::new()
            .with_strong_parent(EMPTY_MESSAGE_ID)
            .build()
            .unwrap();

        assert_eq!(message.version(), MESSAGE_VERSION);
        assert_eq!(message.parents_by_type(ParentsType::Strong), &[EMPTY_MESSAGE_ID]);
        assert_eq!(message.signature(), Signature::EMPTY);
        assert!(!message.verify_signature());
    }

    #[test]
    fn test_requires_strong_parent() {
        let err = MessageBuilder::new()
            .with_weak_parent(MessageID::random())
            .build()
            .unwrap_err();
        assert_eq!(err, MessageError::Validation(ValidationError::NoStrongParents));
    }

    #[test]
    fn test_fields_are_carried() {
        let time = Utc::now();
        let issuer = PublicKey::random();
        let message = MessageBuilder::new()
            .with_strong_parent(MessageID::random())
            .with_shallow_like_parent(MessageID::random())
            .with_issuing_time(time)
            .with_issuer(issuer)
            .with_sequence_number(17)
            .with_payload(Payload::generic_data(b"payload".to_vec()))
            .with_nonce(5)
            .build()
            .unwrap();

        assert_eq!(message.issuing_time(), time);
        assert_eq!(message.issuer_public_key(), issuer);
        assert_eq!(message.sequence_number(), 17);
        assert_eq!(message.payload().data(), b"payload");
        assert_eq!(message.nonce(), 5);
        assert_eq!(message.parents_count(), 2);
    }

    #[test]
    fn test_build_signed() {
        let key_pair = KeyPair::generate();
        let message = MessageBuilder::new()
            .with_strong_parent(MessageID::random())
            .with_issuer(PublicKey::random())
            .build_signed(&key_pair)
            .unwrap();

        assert_eq!(message.issuer_public_key(), key_pair.public_key());
        assert!(message.verify_signature());
    }

    #[test]
    fn test_same_inputs_same_id() {
        let time = Utc::now();
        let parent = MessageID::random();
        let build = || {
            MessageBuilder::new()
                .with_strong_parent(parent)
                .with_issuing_time(time)
                .build()
                .unwrap()
        };
        assert_eq!(build().id(), build().id());
    }
}
