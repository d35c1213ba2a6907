// SPDX-License-Identifier: Apache-2.0
//! The schematic to ClassicWorld tree transformation.

use uuid::Uuid;
use worldloom_tag::{CompoundBuilder, Tag, TagError};

/// Transform a decoded schematic tree into a ClassicWorld tree.
///
/// Reads `Width`, `Height`, `Length` (shorts) and `Blocks` (byte array)
/// from `schematic`; everything else in the input is ignored. The output
/// compound carries, in fixed order: a format-version marker, the world
/// name, a freshly generated 16-byte identity, the three dimensions, a
/// spawn point at the integer midpoint of each dimension, and the block
/// payload copied verbatim under `BlockArray`.
///
/// The function is pure apart from identity generation: it performs no
/// I/O, never mutates `schematic`, and given the same input differs
/// between calls only in the `UUID` field. Dimensions of zero or negative
/// value are propagated arithmetically, not validated.
///
/// # Errors
///
/// Lookup failures propagate unchanged: [`TagError::NotFound`] for an
/// absent required field, [`TagError::TypeMismatch`] for a present field
/// of the wrong kind.
pub fn classic_world(schematic: &Tag, name: &str) -> Result<Tag, TagError> {
    let width = schematic.first_short("Width")?;
    let height = schematic.first_short("Height")?;
    let length = schematic.first_short("Length")?;
    let blocks = schematic.first_byte_array("Blocks")?;
    tracing::debug!(width, height, length, blocks = blocks.len(), "schematic fields extracted");

    let spawn = CompoundBuilder::new("Spawn")
        .add(Tag::short(width / 2, "X"))
        .add(Tag::short(height / 2, "Y"))
        .add(Tag::short(length / 2, "Z"))
        .add(Tag::byte(0, "H"))
        .add(Tag::byte(0, "P"))
        .build();

    let world = CompoundBuilder::new("ClassicWorld")
        .add(Tag::byte(1, "FormatVersion"))
        .add(Tag::string(name, "Name"))
        .add(Tag::byte_array(Uuid::new_v4().into_bytes(), "UUID"))
        .add(Tag::short(width, "X"))
        .add(Tag::short(height, "Y"))
        .add(Tag::short(length, "Z"))
        .add(spawn)
        .add(Tag::byte_array(blocks, "BlockArray"))
        .build();

    Ok(world)
}
