// SPDX-License-Identifier: Apache-2.0
//! Fluent accumulation of compound tags.

use crate::node::Tag;

/// Staged construction of a compound [`Tag`].
///
/// Children are appended in call order with [`add`](CompoundBuilder::add)
/// and finalized with [`build`](CompoundBuilder::build), which snapshots
/// the children added so far into an immutable compound. Building does not
/// consume the builder: each `build` yields a fresh, independent compound,
/// so a builder can serve as a template that is extended and built again.
///
/// The builder validates nothing. Duplicate names, empty compounds, and
/// missing required fields are all permitted here; required-field
/// enforcement belongs to whoever reads the finished tree.
///
/// ```
/// use worldloom_tag::{CompoundBuilder, Tag};
///
/// let spawn = CompoundBuilder::new("Spawn")
///     .add(Tag::short(7, "X"))
///     .add(Tag::short(3, "Y"))
///     .add(Tag::short(7, "Z"))
///     .build();
/// assert_eq!(spawn.first_short("Y"), Ok(3));
/// ```
#[derive(Clone, Debug)]
pub struct CompoundBuilder {
    name: String,
    children: Vec<Tag>,
}

impl CompoundBuilder {
    /// Open an accumulator bound to the output compound's name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append one child, preserving call order.
    #[must_use]
    pub fn add(mut self, child: Tag) -> Self {
        self.children.push(child);
        self
    }

    /// Snapshot the children added so far into an immutable compound.
    pub fn build(&self) -> Tag {
        Tag::compound(self.children.clone(), self.name.clone())
    }
}
