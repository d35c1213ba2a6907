// SPDX-License-Identifier: Apache-2.0
//! Named binary tag tree model for Worldloom.
//!
//! `worldloom-tag` provides the [`Tag`] tree — the self-describing data model
//! both world schemas are built from — plus the [`CompoundBuilder`] used to
//! assemble output trees. These are pure domain types: no serialization
//! logic, no I/O. Byte-level encoding is handled by `worldloom-codec`.
//!
//! # Immutability
//!
//! A [`Tag`] never changes after construction. There is no mutation API;
//! producing a different tree means building new nodes. This keeps trees
//! safely shareable across the conversion pipeline and makes lookup results
//! borrow directly from the tree they came from.
//!
//! # Lookup Semantics
//!
//! Typed lookups scan a compound's children in insertion order and return
//! the first child matching both the requested name and kind. Duplicate
//! names are permitted by the container; first match wins. Callers always
//! declare the kind they expect, so a wrong-kind read is a definitive
//! [`TagError::TypeMismatch`] rather than a silent misread.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod builder;
mod node;

pub use builder::CompoundBuilder;
pub use node::{Tag, TagError, TagKind, TagValue};
