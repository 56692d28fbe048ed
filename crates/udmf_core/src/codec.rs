//! Record and runtime codec.
//!
//! The store never looks inside entry values; it hands records and runtime
//! blocks to a [`DataCodec`]. Records are stored together with their position
//! in the owning object so that a prefix scan, which yields entries in uid
//! order, can be put back into insertion order.

use crate::data::{Runtime, UnifiedRecord};
use udmf_codec::{from_cbor, to_cbor, CodecResult};

/// Encodes and decodes the values stored under group and member keys.
pub trait DataCodec: Send + Sync {
    /// Encodes a record and its position within the object.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded.
    fn encode_record(&self, position: u32, record: &UnifiedRecord) -> CodecResult<Vec<u8>>;

    /// Decodes a record and its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not an encoded record.
    fn decode_record(&self, bytes: &[u8]) -> CodecResult<(u32, UnifiedRecord)>;

    /// Encodes a runtime block.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be encoded.
    fn encode_runtime(&self, runtime: &Runtime) -> CodecResult<Vec<u8>>;

    /// Decodes a runtime block.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not an encoded runtime.
    fn decode_runtime(&self, bytes: &[u8]) -> CodecResult<Runtime>;
}

/// Versioned CBOR codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CborDataCodec;

impl DataCodec for CborDataCodec {
    fn encode_record(&self, position: u32, record: &UnifiedRecord) -> CodecResult<Vec<u8>> {
        to_cbor(&(position, record))
    }

    fn decode_record(&self, bytes: &[u8]) -> CodecResult<(u32, UnifiedRecord)> {
        from_cbor(bytes)
    }

    fn encode_runtime(&self, runtime: &Runtime) -> CodecResult<Vec<u8>> {
        to_cbor(runtime)
    }

    fn decode_runtime(&self, bytes: &[u8]) -> CodecResult<Runtime> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DetailValue, Form, Privilege, RecordValue, UnifiedKey};
    use crate::types::DataStatus;

    #[test]
    fn record_keeps_position() {
        let mut form = Form {
            form_id: 3,
            form_name: "clock".into(),
            ..Form::default()
        };
        form.details.insert("theme".into(), DetailValue::Text("dark".into()));
        let record = UnifiedRecord::with_uid("r1", RecordValue::SystemDefinedForm(form));

        let codec = CborDataCodec;
        let bytes = codec.encode_record(7, &record).unwrap();
        let (position, decoded) = codec.decode_record(&bytes).unwrap();
        assert_eq!(position, 7);
        assert_eq!(decoded, record);
    }

    #[test]
    fn runtime_fields_survive() {
        let runtime = Runtime {
            is_private: true,
            privileges: vec![Privilege {
                token_id: 42,
                read_permission: "read".into(),
                write_permission: String::new(),
            }],
            create_time: 1_700_000_000_000,
            device_id: "dev-1".into(),
            record_total_num: 2,
            data_status: DataStatus::History,
            data_version: 3,
            ..Runtime::new(UnifiedKey::new("drag", "com.x", "g"))
        };

        let codec = CborDataCodec;
        let decoded = codec
            .decode_runtime(&codec.encode_runtime(&runtime).unwrap())
            .unwrap();
        assert_eq!(decoded, runtime);
    }

    #[test]
    fn runtime_bytes_are_not_a_record() {
        let codec = CborDataCodec;
        let bytes = codec.encode_runtime(&Runtime::default()).unwrap();
        assert!(codec.decode_record(&bytes).is_err());
    }
}
