// SPDX-License-Identifier: Apache-2.0
//! Gzip wrappers for the compressed outer stream layer.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::wire::CodecError;

/// Compress `data` into a gzip stream.
///
/// # Errors
///
/// Propagates the underlying I/O error; writing into memory does not fail
/// under normal operation.
pub fn compress_gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflate a gzip stream, refusing to produce more than `max_bytes`.
///
/// The cap is enforced while inflating, so a small compressed input
/// declaring an enormous payload is cut off at the limit rather than
/// ballooning in memory.
///
/// # Errors
///
/// [`CodecError::Stream`] when the input is not a valid gzip stream, or
/// [`CodecError::LimitExceeded`] when the inflated payload would exceed
/// `max_bytes`.
pub fn decompress_gzip(data: &[u8], max_bytes: usize) -> Result<Vec<u8>, CodecError> {
    let cap = u64::try_from(max_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut decoder = GzDecoder::new(data).take(cap);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|source| CodecError::Stream {
            reason: source.to_string(),
        })?;
    if out.len() > max_bytes {
        return Err(CodecError::LimitExceeded { limit: max_bytes });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let payload = b"worldloom".repeat(100);
        let compressed = compress_gzip(&payload).unwrap();
        assert_ne!(compressed, payload);
        let inflated = decompress_gzip(&compressed, 1 << 20).unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn garbage_input_is_a_stream_error() {
        let err = decompress_gzip(b"definitely not gzip", 1 << 20).unwrap_err();
        assert!(matches!(err, CodecError::Stream { .. }));
    }

    #[test]
    fn inflation_is_capped() {
        let payload = vec![0u8; 4096];
        let compressed = compress_gzip(&payload).unwrap();
        assert_eq!(
            decompress_gzip(&compressed, 100),
            Err(CodecError::LimitExceeded { limit: 100 })
        );
    }

    #[test]
    fn empty_payload_roundtrips() {
        let compressed = compress_gzip(&[]).unwrap();
        let inflated = decompress_gzip(&compressed, 1024).unwrap();
        assert!(inflated.is_empty());
    }
}
