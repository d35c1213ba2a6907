// SPDX-License-Identifier: Apache-2.0
//! The tag node: an optionally named, typed node in a tag tree.

use std::fmt;

/// Discriminant of a [`TagValue`], used in typed lookups and error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// A single signed byte.
    Byte,
    /// A signed 16-bit integer.
    Short,
    /// A UTF-8 string.
    String,
    /// A raw byte array.
    ByteArray,
    /// An ordered collection of named child tags.
    Compound,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagKind::Byte => "byte",
            TagKind::Short => "short",
            TagKind::String => "string",
            TagKind::ByteArray => "byte array",
            TagKind::Compound => "compound",
        };
        f.write_str(label)
    }
}

/// Payload of a tag node.
///
/// A closed set of variants: the two schemas this model serves use exactly
/// these five kinds, and exhaustive matching over them is what keeps the
/// codec and the transformer honest when a kind is missing a case.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    /// A single signed byte.
    Byte(i8),
    /// A signed 16-bit integer.
    Short(i16),
    /// A UTF-8 string.
    String(String),
    /// A raw byte array, carried verbatim.
    ByteArray(Vec<u8>),
    /// An ordered, name-keyed collection of child tags.
    ///
    /// Insertion order is observable and round-trips through the codec.
    /// Duplicate names are permitted; lookup returns the first match.
    Compound(Vec<Tag>),
}

impl TagValue {
    /// The discriminant of this payload.
    pub fn kind(&self) -> TagKind {
        match self {
            TagValue::Byte(_) => TagKind::Byte,
            TagValue::Short(_) => TagKind::Short,
            TagValue::String(_) => TagKind::String,
            TagValue::ByteArray(_) => TagKind::ByteArray,
            TagValue::Compound(_) => TagKind::Compound,
        }
    }
}

/// A node in the tag tree: an optional UTF-8 name plus a typed payload.
///
/// The name is the lookup key within the parent compound. Only an anonymous
/// root use leaves it unset. Nodes are immutable once constructed; a
/// compound exclusively owns its children and ownership is strictly
/// tree-shaped.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    name: Option<String>,
    value: TagValue,
}

/// Failure taxonomy for typed lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// No child with the requested name exists in the compound.
    #[error("required tag `{name}` not found")]
    NotFound {
        /// The name that was looked up.
        name: String,
    },
    /// A child with the requested name exists, but not with the requested
    /// kind.
    #[error("tag `{name}` is a {actual}, expected a {expected}")]
    TypeMismatch {
        /// The name that was looked up.
        name: String,
        /// The kind the caller declared.
        expected: TagKind,
        /// The kind of the first same-named child found.
        actual: TagKind,
    },
    /// A lookup was invoked on a tag that is not a compound.
    #[error("cannot look up children of a {kind} tag")]
    NotCompound {
        /// The kind of the tag the lookup was invoked on.
        kind: TagKind,
    },
}

impl Tag {
    /// Construct a named byte tag.
    pub fn byte(value: i8, name: impl Into<String>) -> Self {
        Self::named(TagValue::Byte(value), name)
    }

    /// Construct a named short tag.
    pub fn short(value: i16, name: impl Into<String>) -> Self {
        Self::named(TagValue::Short(value), name)
    }

    /// Construct a named string tag.
    pub fn string(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self::named(TagValue::String(value.into()), name)
    }

    /// Construct a named byte array tag.
    pub fn byte_array(bytes: impl Into<Vec<u8>>, name: impl Into<String>) -> Self {
        Self::named(TagValue::ByteArray(bytes.into()), name)
    }

    /// Construct a named compound tag from already-constructed children.
    pub fn compound(children: Vec<Tag>, name: impl Into<String>) -> Self {
        Self::named(TagValue::Compound(children), name)
    }

    /// Construct a named tag from an arbitrary payload.
    pub fn named(value: TagValue, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    /// Construct an anonymous tag (root use only).
    pub fn unnamed(value: TagValue) -> Self {
        Self { name: None, value }
    }

    /// The node's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The node's payload.
    pub fn value(&self) -> &TagValue {
        &self.value
    }

    /// The discriminant of the node's payload.
    pub fn kind(&self) -> TagKind {
        self.value.kind()
    }

    /// The node's children, when it is a compound.
    pub fn children(&self) -> Option<&[Tag]> {
        match &self.value {
            TagValue::Compound(children) => Some(children),
            _ => None,
        }
    }

    /// Look up the first byte child named `name`.
    ///
    /// # Errors
    ///
    /// [`TagError::NotFound`] if no child carries the name,
    /// [`TagError::TypeMismatch`] if the name exists with a different kind,
    /// [`TagError::NotCompound`] if `self` is not a compound.
    pub fn first_byte(&self, name: &str) -> Result<i8, TagError> {
        self.first_matching(name, TagKind::Byte, |child| match child.value() {
            TagValue::Byte(byte) => Some(*byte),
            _ => None,
        })
    }

    /// Look up the first short child named `name`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Tag::first_byte`].
    pub fn first_short(&self, name: &str) -> Result<i16, TagError> {
        self.first_matching(name, TagKind::Short, |child| match child.value() {
            TagValue::Short(short) => Some(*short),
            _ => None,
        })
    }

    /// Look up the first string child named `name`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Tag::first_byte`].
    pub fn first_string(&self, name: &str) -> Result<&str, TagError> {
        self.first_matching(name, TagKind::String, |child| match child.value() {
            TagValue::String(string) => Some(string.as_str()),
            _ => None,
        })
    }

    /// Look up the first byte array child named `name`.
    ///
    /// The returned slice borrows from the tree; bytes are never copied by
    /// a lookup.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Tag::first_byte`].
    pub fn first_byte_array(&self, name: &str) -> Result<&[u8], TagError> {
        self.first_matching(name, TagKind::ByteArray, |child| match child.value() {
            TagValue::ByteArray(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    /// Look up the first compound child named `name`.
    ///
    /// Returns the child tag itself so nested lookups chain:
    /// `world.first_compound("Spawn")?.first_short("X")`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Tag::first_byte`].
    pub fn first_compound(&self, name: &str) -> Result<&Tag, TagError> {
        self.first_matching(name, TagKind::Compound, |child| match child.value() {
            TagValue::Compound(_) => Some(child),
            _ => None,
        })
    }

    /// Scan children in insertion order for the first child matching `name`
    /// AND the kind `extract` accepts. When only wrong-kind children carry
    /// the name, the kind of the first of them is reported in the mismatch.
    fn first_matching<'tree, T>(
        &'tree self,
        name: &str,
        expected: TagKind,
        extract: impl Fn(&'tree Tag) -> Option<T>,
    ) -> Result<T, TagError> {
        let TagValue::Compound(children) = &self.value else {
            return Err(TagError::NotCompound { kind: self.kind() });
        };
        let mut wrong_kind = None;
        for child in children {
            if child.name() != Some(name) {
                continue;
            }
            if let Some(found) = extract(child) {
                return Ok(found);
            }
            if wrong_kind.is_none() {
                wrong_kind = Some(child.kind());
            }
        }
        match wrong_kind {
            Some(actual) => Err(TagError::TypeMismatch {
                name: name.to_owned(),
                expected,
                actual,
            }),
            None => Err(TagError::NotFound {
                name: name.to_owned(),
            }),
        }
    }
}
