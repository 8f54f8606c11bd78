//! Property tests for the message codec.
//!
//! - Valid messages decode back to an equal message with the same ID
//! - Decoding arbitrary bytes never panics
//! - Any appended byte makes decoding fail

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tangle_message::{
    Message, MessageID, ParentMessageIDs, ParentsType, Payload, PayloadType, PublicKey, Signature,
    MAX_PARENTS_COUNT,
};

fn message_id_strategy() -> impl Strategy<Value = MessageID> {
    any::<[u8; 32]>().prop_map(MessageID::new)
}

/// Parent sets that satisfy every block rule: strong parents are always
/// present and disliked messages are drawn from a separate pool.
fn parents_strategy() -> impl Strategy<Value = ParentMessageIDs> {
    let ids = || prop::collection::btree_set(message_id_strategy(), 0..=MAX_PARENTS_COUNT);
    (
        prop::collection::btree_set(message_id_strategy(), 1..=MAX_PARENTS_COUNT),
        ids(),
        ids(),
        ids(),
    )
        .prop_map(|(strong, weak, like, dislike)| {
            let approved: Vec<MessageID> = strong.iter().chain(&weak).chain(&like).copied().collect();
            let mut parents = ParentMessageIDs::new();
            parents
                .add_all(ParentsType::Strong, strong)
                .add_all(ParentsType::Weak, weak)
                .add_all(ParentsType::ShallowLike, like)
                .add_all(
                    ParentsType::ShallowDislike,
                    dislike.into_iter().filter(|id| !approved.contains(id)),
                );
            parents
        })
}

fn message_strategy() -> impl Strategy<Value = Message> {
    (
        parents_strategy(),
        -(1i64 << 62)..(1i64 << 62),
        any::<[u8; 32]>(),
        any::<u64>(),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..256),
        any::<u64>(),
        prop::collection::vec(any::<u8>(), 64),
    )
        .prop_map(|(parents, nanos, key, sequence_number, payload_type, data, nonce, signature)| {
            Message::new(
                &parents,
                Utc.timestamp_nanos(nanos),
                PublicKey::new(key),
                sequence_number,
                Payload::new(PayloadType::new(payload_type), data),
                nonce,
                Signature::try_from(signature.as_slice()).unwrap(),
            )
            .unwrap()
        })
}

proptest! {
    #[test]
    fn prop_message_roundtrip(message in message_strategy()) {
        let decoded = Message::from_bytes(message.bytes()).unwrap();
        prop_assert_eq!(decoded.bytes(), message.bytes());
        prop_assert_eq!(decoded.id(), message.id());
        prop_assert_eq!(decoded.issuing_time(), message.issuing_time());
        prop_assert_eq!(decoded.payload(), message.payload());
        prop_assert_eq!(decoded.parent_message_ids(), message.parent_message_ids());
    }

    #[test]
    fn prop_trailing_bytes_rejected(
        message in message_strategy(),
        trailer in prop::collection::vec(any::<u8>(), 1..16),
    ) {
        let mut bytes = message.bytes().to_vec();
        bytes.extend_from_slice(&trailer);
        let err = Message::from_bytes(&bytes).unwrap_err();
        prop_assert!(err.is_parse_error());
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = Message::from_bytes(&bytes);
    }

    #[test]
    fn prop_single_byte_flip_changes_id_or_fails(message in message_strategy(), index in any::<prop::sample::Index>()) {
        let mut bytes = message.bytes().to_vec();
        let position = index.index(bytes.len());
        bytes[position] ^= 0xff;
        if let Ok(decoded) = Message::from_bytes(&bytes) {
            prop_assert_ne!(decoded.id(), message.id());
        }
    }
}
