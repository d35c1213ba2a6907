// SPDX-License-Identifier: Apache-2.0
//! Binary tag wire codec and gzip stream layer for Worldloom.
//!
//! This crate is the serialization collaborator the conversion core reads
//! and writes through:
//! - [`encode_root`]/[`decode_root`] map between [`Tag`](worldloom_tag::Tag)
//!   trees and the big-endian named binary tag wire format both world
//!   schemas use
//! - [`compress_gzip`]/[`decompress_gzip`] wrap the compressed outer layer
//!
//! # Design
//!
//! Serialization is deliberately separated from the tag model. The model
//! crate stays pure, and everything that distrusts bytes lives here: the
//! decoder charges a structural budget before every allocation, bounds
//! nesting depth, and reports malformed input through typed
//! [`CodecError`] variants instead of panicking.

mod gzip;
mod wire;

pub use gzip::{compress_gzip, decompress_gzip};
pub use wire::{decode_root, encode_root, CodecError, DecodeOptions, DEFAULT_MAX_PAYLOAD_BYTES};
