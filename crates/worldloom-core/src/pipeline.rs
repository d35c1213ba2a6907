// SPDX-License-Identifier: Apache-2.0
//! Staged conversion pipeline.
//!
//! One invocation converts one source file to one destination file through
//! a fixed stage sequence:
//!
//! ``read → decompress → decode → transform → encode → compress → write``
//!
//! The cancellation handle is checked at every stage boundary; once
//! triggered, no further stage runs. There are no internal retries — a
//! failed conversion is re-invoked by the caller from the start. Partial
//! output already flushed to the sink is left in place; the caller owns
//! cleanup of partial files.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use worldloom_codec::{
    compress_gzip, decode_root, decompress_gzip, encode_root, CodecError, DecodeOptions,
    DEFAULT_MAX_PAYLOAD_BYTES,
};
use worldloom_tag::TagError;

use crate::cancel::CancelHandle;
use crate::transform::classic_world;

/// Tuning knobs for a conversion pass.
#[derive(Clone, Copy, Debug)]
pub struct ConvertOptions {
    /// Budget applied both while inflating the source stream and as the
    /// decoder's structural limit.
    pub max_payload_bytes: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// Terminal outcome of a failed conversion.
///
/// Every stage-local failure surfaces here unmodified; nothing is retried
/// and no partial-success result exists.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A required field was absent or carried the wrong kind.
    #[error(transparent)]
    Tag(#[from] TagError),
    /// The source payload was malformed or exceeded a structural limit.
    #[error("malformed input: {0}")]
    Malformed(#[from] CodecError),
    /// Cooperative cancellation was observed at a stage boundary.
    #[error("conversion cancelled")]
    Cancelled,
    /// The source or sink could not be opened, read, or written.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

fn checkpoint(cancel: &CancelHandle) -> Result<(), ConvertError> {
    if cancel.is_triggered() {
        return Err(ConvertError::Cancelled);
    }
    Ok(())
}

/// Run the full stage sequence from an open byte source to an open byte
/// sink.
///
/// `name` becomes the converted world's `Name` field. The sink is flushed
/// before returning; closing is the caller's concern (dropping a file
/// closes it on every exit path).
///
/// # Errors
///
/// See [`ConvertError`]; cancellation surfaces as
/// [`ConvertError::Cancelled`] and suppresses all further stages.
pub async fn convert_stream<R, W>(
    source: &mut R,
    sink: &mut W,
    name: &str,
    cancel: &CancelHandle,
    options: &ConvertOptions,
) -> Result<(), ConvertError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    checkpoint(cancel)?;
    let mut compressed = Vec::new();
    source.read_to_end(&mut compressed).await?;
    tracing::debug!(bytes = compressed.len(), "source stream read");

    checkpoint(cancel)?;
    let payload = decompress_gzip(&compressed, options.max_payload_bytes)?;
    tracing::debug!(bytes = payload.len(), "source payload inflated");

    checkpoint(cancel)?;
    let decode_options = DecodeOptions {
        max_payload_bytes: options.max_payload_bytes,
    };
    let schematic = decode_root(&payload, &decode_options)?;
    tracing::debug!("schematic tree decoded");

    checkpoint(cancel)?;
    let world = classic_world(&schematic, name)?;
    tracing::debug!("world tree assembled");

    checkpoint(cancel)?;
    let encoded = encode_root(&world)?;

    checkpoint(cancel)?;
    let output = compress_gzip(&encoded)?;
    tracing::debug!(bytes = output.len(), "world payload deflated");

    checkpoint(cancel)?;
    sink.write_all(&output).await?;
    sink.flush().await?;
    Ok(())
}

/// Convert the schematic at `source_path`, writing the ClassicWorld file
/// alongside it.
///
/// The world name is the source file's stem; the destination is the same
/// path with a `.cw` extension. On success the destination path is
/// returned. On failure the destination may hold partial bytes — it is
/// left in place, not guaranteed valid, and not auto-deleted.
///
/// # Errors
///
/// See [`ConvertError`].
pub async fn convert(source_path: &Path, cancel: &CancelHandle) -> Result<PathBuf, ConvertError> {
    convert_with_options(source_path, cancel, &ConvertOptions::default()).await
}

/// [`convert`] with explicit [`ConvertOptions`].
///
/// # Errors
///
/// See [`ConvertError`].
pub async fn convert_with_options(
    source_path: &Path,
    cancel: &CancelHandle,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let name = world_name(source_path);
    let destination = source_path.with_extension("cw");
    tracing::info!(
        source = %source_path.display(),
        destination = %destination.display(),
        "starting conversion"
    );

    let mut source = File::open(source_path).await?;
    let mut sink = File::create(&destination).await?;
    convert_stream(&mut source, &mut sink, &name, cancel, options).await?;

    tracing::info!(destination = %destination.display(), "conversion finished");
    Ok(destination)
}

/// The converted world's name: the source file's stem.
fn world_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| String::from("world"), |stem| stem.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldloom_tag::Tag;

    fn fixture_bytes() -> Vec<u8> {
        let schematic = Tag::compound(
            vec![
                Tag::short(2, "Width"),
                Tag::short(4, "Height"),
                Tag::short(6, "Length"),
                Tag::byte_array(vec![0x01, 0x02], "Blocks"),
            ],
            "Schematic",
        );
        compress_gzip(&encode_root(&schematic).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn stream_conversion_produces_a_decodable_world() {
        let input = fixture_bytes();
        let mut source = &input[..];
        let mut sink = Vec::new();
        convert_stream(
            &mut source,
            &mut sink,
            "island",
            &CancelHandle::new(),
            &ConvertOptions::default(),
        )
        .await
        .unwrap();

        let payload = decompress_gzip(&sink, DEFAULT_MAX_PAYLOAD_BYTES).unwrap();
        let world = decode_root(&payload, &DecodeOptions::default()).unwrap();
        assert_eq!(world.name(), Some("ClassicWorld"));
        assert_eq!(world.first_string("Name"), Ok("island"));
        assert_eq!(world.first_byte_array("BlockArray"), Ok(&[0x01, 0x02][..]));
    }

    #[tokio::test]
    async fn pre_cancelled_handle_writes_nothing() {
        let cancel = CancelHandle::new();
        cancel.trigger();

        let input = fixture_bytes();
        let mut source = &input[..];
        let mut sink = Vec::new();
        let err = convert_stream(
            &mut source,
            &mut sink,
            "island",
            &cancel,
            &ConvertOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ConvertError::Cancelled));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn garbage_source_is_malformed_not_io() {
        let mut source = &b"not a gzip stream"[..];
        let mut sink = Vec::new();
        let err = convert_stream(
            &mut source,
            &mut sink,
            "island",
            &CancelHandle::new(),
            &ConvertOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConvertError::Malformed(_)));
    }

    #[tokio::test]
    async fn missing_field_surfaces_as_tag_error() {
        let schematic = Tag::compound(vec![Tag::short(2, "Width")], "Schematic");
        let input = compress_gzip(&encode_root(&schematic).unwrap()).unwrap();
        let mut source = &input[..];
        let mut sink = Vec::new();
        let err = convert_stream(
            &mut source,
            &mut sink,
            "island",
            &CancelHandle::new(),
            &ConvertOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ConvertError::Tag(TagError::NotFound { .. })));
    }

    #[test]
    fn world_name_is_the_file_stem() {
        assert_eq!(world_name(Path::new("/maps/island.schematic")), "island");
        assert_eq!(world_name(Path::new("island")), "island");
        assert_eq!(world_name(Path::new("/maps/")), "maps");
    }
}
