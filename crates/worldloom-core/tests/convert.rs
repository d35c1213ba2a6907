// SPDX-License-Identifier: Apache-2.0
//! End-to-end conversion tests over real files.

use std::path::PathBuf;

use worldloom_codec::{compress_gzip, decode_root, decompress_gzip, encode_root, DecodeOptions};
use worldloom_core::{convert, CancelHandle, ConvertError};
use worldloom_tag::Tag;

fn schematic_tree(width: i16, height: i16, length: i16, blocks: Vec<u8>) -> Tag {
    Tag::compound(
        vec![
            Tag::short(width, "Width"),
            Tag::short(height, "Height"),
            Tag::short(length, "Length"),
            Tag::byte_array(blocks, "Blocks"),
        ],
        "Schematic",
    )
}

fn write_schematic(dir: &std::path::Path, file_name: &str, tree: &Tag) -> PathBuf {
    let path = dir.join(file_name);
    let bytes = compress_gzip(&encode_root(tree).unwrap()).unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

fn read_world(path: &std::path::Path) -> Tag {
    let bytes = std::fs::read(path).unwrap();
    let payload = decompress_gzip(&bytes, 64 * 1024 * 1024).unwrap();
    decode_root(&payload, &DecodeOptions::default()).unwrap()
}

#[tokio::test]
async fn converts_a_schematic_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_schematic(
        dir.path(),
        "island.schematic",
        &schematic_tree(2, 4, 6, vec![0x01, 0x02]),
    );

    let destination = convert(&source, &CancelHandle::new()).await.unwrap();
    assert_eq!(destination, dir.path().join("island.cw"));

    let world = read_world(&destination);
    assert_eq!(world.name(), Some("ClassicWorld"));
    assert_eq!(world.first_byte("FormatVersion"), Ok(1));
    // The world is named after the source file, not the input tree.
    assert_eq!(world.first_string("Name"), Ok("island"));
    assert_eq!(world.first_byte_array("UUID").unwrap().len(), 16);
    assert_eq!(world.first_short("X"), Ok(2));
    assert_eq!(world.first_short("Y"), Ok(4));
    assert_eq!(world.first_short("Z"), Ok(6));
    assert_eq!(world.first_byte_array("BlockArray"), Ok(&[0x01, 0x02][..]));

    let spawn = world.first_compound("Spawn").unwrap();
    assert_eq!(spawn.first_short("X"), Ok(1));
    assert_eq!(spawn.first_short("Y"), Ok(2));
    assert_eq!(spawn.first_short("Z"), Ok(3));
    assert_eq!(spawn.first_byte("H"), Ok(0));
    assert_eq!(spawn.first_byte("P"), Ok(0));
}

#[tokio::test]
async fn block_payload_survives_at_scale() {
    // Larger than one 64 KiB compression block, so the payload crosses
    // stream chunk boundaries on the way through.
    let blocks: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();
    let dir = tempfile::tempdir().unwrap();
    let source = write_schematic(
        dir.path(),
        "big.schematic",
        &schematic_tree(512, 64, 512, blocks.clone()),
    );

    let destination = convert(&source, &CancelHandle::new()).await.unwrap();
    let world = read_world(&destination);
    assert_eq!(world.first_byte_array("BlockArray").unwrap(), &blocks[..]);
}

#[tokio::test]
async fn identity_differs_between_conversions_of_the_same_input() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_schematic(
        dir.path(),
        "twin.schematic",
        &schematic_tree(8, 8, 8, vec![0xAA]),
    );

    let first = read_world(&convert(&source, &CancelHandle::new()).await.unwrap());
    let second = read_world(&convert(&source, &CancelHandle::new()).await.unwrap());
    assert_ne!(
        first.first_byte_array("UUID").unwrap(),
        second.first_byte_array("UUID").unwrap()
    );
}

#[tokio::test]
async fn cancellation_before_decode_writes_no_content() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_schematic(
        dir.path(),
        "island.schematic",
        &schematic_tree(2, 4, 6, vec![0x01]),
    );

    let cancel = CancelHandle::new();
    cancel.trigger();
    let err = convert(&source, &cancel).await.unwrap_err();
    assert!(matches!(err, ConvertError::Cancelled));

    // The destination may exist (it is opened before the stages run) but
    // must hold no content.
    let destination = dir.path().join("island.cw");
    if destination.exists() {
        assert_eq!(std::fs::metadata(&destination).unwrap().len(), 0);
    }
}

#[tokio::test]
async fn missing_source_file_is_an_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert(&dir.path().join("absent.schematic"), &CancelHandle::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::Io(_)));
}

#[tokio::test]
async fn truncated_source_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_schematic(
        dir.path(),
        "cut.schematic",
        &schematic_tree(2, 4, 6, vec![0x01, 0x02, 0x03]),
    );
    let mut bytes = std::fs::read(&source).unwrap();
    bytes.truncate(bytes.len() / 2);
    std::fs::write(&source, bytes).unwrap();

    let err = convert(&source, &CancelHandle::new()).await.unwrap_err();
    assert!(matches!(err, ConvertError::Malformed(_)));
}
