//! # udmf Codec
//!
//! Versioned CBOR encoding/decoding for udmf records and runtime blocks.
//!
//! Every encoded value is a one-byte format version followed by exactly one
//! CBOR item produced by `ciborium` from the value's `serde` representation.
//! Encoding is deterministic as long as the value uses ordered collections
//! (`Vec`, `BTreeMap`) - identical inputs produce identical bytes.
//!
//! ## Usage
//!
//! ```
//! use udmf_codec::{from_cbor, to_cbor};
//! use std::collections::BTreeMap;
//!
//! let mut details = BTreeMap::new();
//! details.insert("title".to_string(), "hello".to_string());
//!
//! let bytes = to_cbor(&details).unwrap();
//! let decoded: BTreeMap<String, String> = from_cbor(&bytes).unwrap();
//! assert_eq!(details, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Format version written in front of every encoded value.
pub const FORMAT_VERSION: u8 = 1;

/// Encode a value to versioned CBOR bytes.
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
pub fn to_cbor<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = vec![FORMAT_VERSION];
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buf)
}

/// Decode a value from versioned CBOR bytes.
///
/// # Errors
///
/// Returns an error if the bytes are empty, carry another format version,
/// are not valid CBOR for `T`, or contain bytes after the value.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    let (&version, mut body) = bytes.split_first().ok_or(CodecError::UnexpectedEof)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let value = ciborium::from_reader(&mut body)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;
    if !body.is_empty() {
        return Err(CodecError::TrailingBytes { count: body.len() });
    }
    Ok(value)
}

/// Trait for types that can be encoded to versioned CBOR.
pub trait Encode {
    /// Encode this value to bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from versioned CBOR.
pub trait Decode: Sized {
    /// Decode this value from bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl<T: Serialize> Encode for T {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self)
    }
}

impl<T: DeserializeOwned> Decode for T {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Shape {
        Point,
        Line { len: u32 },
        Label(String),
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: i64,
        raw: Vec<u8>,
        shape: Shape,
        tags: BTreeMap<String, i32>,
    }

    fn sample() -> Sample {
        let mut tags = BTreeMap::new();
        tags.insert("b".into(), 2);
        tags.insert("a".into(), 1);
        Sample {
            name: "form".into(),
            count: -7,
            raw: vec![0, 1, 2, 255],
            shape: Shape::Line { len: 3 },
            tags,
        }
    }

    #[test]
    fn roundtrip_struct() {
        let value = sample();
        let bytes = to_cbor(&value).unwrap();
        assert_eq!(bytes[0], FORMAT_VERSION);
        let decoded: Sample = from_cbor(&bytes).unwrap();
        assert_eq!(value, decoded);
    }

    #[test]
    fn roundtrip_enum_variants() {
        for shape in [Shape::Point, Shape::Label("x".into())] {
            let decoded: Shape = Shape::decode(&shape.encode().unwrap()).unwrap();
            assert_eq!(shape, decoded);
        }
    }

    #[test]
    fn deterministic_encoding() {
        let a = to_cbor(&sample()).unwrap();
        let b = to_cbor(&sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_fails() {
        let result: CodecResult<Sample> = from_cbor(&[]);
        assert_eq!(result, Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn wrong_version_fails() {
        let mut bytes = to_cbor(&sample()).unwrap();
        bytes[0] = 9;
        let result: CodecResult<Sample> = from_cbor(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut bytes = to_cbor(&42u32).unwrap();
        bytes.push(0x00);
        let result: CodecResult<u32> = from_cbor(&bytes);
        assert_eq!(result, Err(CodecError::TrailingBytes { count: 1 }));
    }

    #[test]
    fn garbage_fails() {
        let result: CodecResult<Sample> = from_cbor(&[FORMAT_VERSION, 0xff, 0x00]);
        assert!(matches!(result, Err(CodecError::DecodingFailed { .. })));
    }

    #[test]
    fn wrong_type_fails() {
        let bytes = to_cbor(&"text").unwrap();
        let result: CodecResult<Sample> = from_cbor(&bytes);
        assert!(result.is_err());
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        proptest! {
            #[test]
            fn maps_survive_encoding(map in prop::collection::btree_map(".{0,8}", any::<i64>(), 0..16)) {
                let bytes = to_cbor(&map).unwrap();
                let decoded: BTreeMap<String, i64> = from_cbor(&bytes).unwrap();
                prop_assert_eq!(map, decoded);
            }
        }
    }
}
