//! Message payloads.
//!
//! The message layer does not interpret payloads. It only needs the type
//! tag, the bytes and their size, so a payload is kept as a typed blob and
//! decoded further by whoever owns that payload type.

use std::fmt;
use tangle_core::{MarshalReader, MarshalWriter, ParseError};

/// Numeric tag identifying a payload format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadType(u32);

impl PayloadType {
    /// Arbitrary application data.
    pub const GENERIC_DATA: PayloadType = PayloadType(0);

    /// Ledger transactions.
    pub const TRANSACTION: PayloadType = PayloadType(1337);

    pub const fn new(value: u32) -> Self {
        PayloadType(value)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for PayloadType {
    fn from(value: u32) -> Self {
        PayloadType(value)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PayloadType::GENERIC_DATA => f.write_str("GenericData"),
            PayloadType::TRANSACTION => f.write_str("Transaction"),
            PayloadType(other) => write!(f, "PayloadType({other})"),
        }
    }
}

/// Typed payload carried by a message. Encoded as `type:u32 ⧺ data`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Payload {
    payload_type: PayloadType,
    data: Vec<u8>,
}

impl Payload {
    /// Size of the type tag.
    pub const TYPE_LENGTH: usize = 4;

    pub fn new(payload_type: PayloadType, data: Vec<u8>) -> Self {
        Payload { payload_type, data }
    }

    /// A generic data payload.
    pub fn generic_data(data: impl Into<Vec<u8>>) -> Self {
        Payload::new(PayloadType::GENERIC_DATA, data.into())
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Encoded size, including the type tag.
    pub fn size(&self) -> usize {
        Self::TYPE_LENGTH + self.data.len()
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut writer = MarshalWriter::with_capacity(self.size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub(crate) fn write_to(&self, writer: &mut MarshalWriter) {
        writer
            .write_u32(self.payload_type.as_u32())
            .write_bytes(&self.data);
    }

    /// Decode a payload occupying all of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = MarshalReader::new(bytes);
        let payload_type = PayloadType(reader.read_u32("payload type")?);
        let data = reader.read_bytes(reader.remaining(), "payload data")?;
        Ok(Payload::new(payload_type, data.to_vec()))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::generic_data(Vec::new())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ len: {} }}", self.payload_type, self.data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_data_layout() {
        let payload = Payload::generic_data(b"hello".to_vec());
        let bytes = payload.bytes();
        assert_eq!(bytes.len(), payload.size());
        assert_eq!(&bytes[..4], &0u32.to_le_bytes());
        assert_eq!(&bytes[4..], b"hello");
        assert_eq!(Payload::from_bytes(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_empty_data_still_has_type() {
        let payload = Payload::generic_data(Vec::new());
        assert_eq!(payload.size(), 4);
        assert_eq!(payload.bytes(), vec![0, 0, 0, 0]);
        assert_eq!(payload, Payload::default());
    }

    #[test]
    fn test_missing_type() {
        let err = Payload::from_bytes(&[1, 2]).unwrap_err();
        assert_eq!(err.field(), Some("payload type"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Payload::generic_data(vec![1, 2, 3]).to_string(), "GenericData { len: 3 }");
        assert_eq!(PayloadType::new(7).to_string(), "PayloadType(7)");
        assert_eq!(PayloadType::TRANSACTION.to_string(), "Transaction");
    }
}
