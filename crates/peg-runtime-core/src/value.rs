//! The tagged result type assembled on the output stack.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A reference into the input buffer by byte offsets.
///
/// The range borrows the buffer instead of copying it, so it can never
/// outlive the input it was captured from. Offsets are half-open and
/// satisfy `start <= end <= input.len()`.
///
/// # Example
///
/// ```
/// use peg_runtime_core::InputRange;
///
/// let range = InputRange::new(b"abc", 1, 3).expect("in bounds");
/// assert_eq!(range.bytes(), b"bc");
/// assert!(InputRange::new(b"abc", 2, 1).is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InputRange<'a> {
    input: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> InputRange<'a> {
    /// Creates a range over `input[start..end]`.
    ///
    /// Returns `None` when the offsets are inverted or exceed the buffer.
    #[must_use]
    pub const fn new(input: &'a [u8], start: usize, end: usize) -> Option<Self> {
        if start > end || end > input.len() {
            return None;
        }
        Some(Self { input, start, end })
    }

    /// Returns the inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns the exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns the number of bytes covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` when the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the covered bytes, borrowed from the input buffer.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.input.get(self.start..self.end).unwrap_or_default()
    }

    /// Returns the covered bytes decoded as UTF-8, replacing invalid
    /// sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes())
    }
}

impl fmt::Debug for InputRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputRange({}..{} {:?})", self.start, self.end, self.text())
    }
}

/// Names the variant of a [`Value`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Empty`].
    Empty,
    /// [`Value::Range`].
    Range,
    /// [`Value::Boolean`].
    Boolean,
    /// [`Value::Text`].
    Text,
    /// [`Value::Array`].
    Array,
    /// [`Value::Mapping`].
    Mapping,
    /// [`Value::Object`].
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Range => "range",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Array => "array",
            Self::Mapping => "mapping",
            Self::Object => "object",
        })
    }
}

/// A node of the result tree built by a matcher.
///
/// `Empty` is the neutral starting value of a structured capture and behaves
/// as an empty mapping wherever a mapping is required.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// An empty mapping.
    Empty,
    /// A slice of the input buffer.
    Range(InputRange<'a>),
    /// A boolean literal.
    Boolean(bool),
    /// An owned string, independent of the input buffer.
    Text(String),
    /// An ordered sequence, only ever grown by appending.
    Array(Vec<Self>),
    /// Labelled values with unique keys.
    Mapping(BTreeMap<String, Self>),
    /// A payload tagged with a class name by a [`Factory`](crate::Factory).
    Object {
        /// Class name supplied by the grammar.
        class: String,
        /// The value the object was built from.
        payload: Box<Self>,
    },
}

impl<'a> Value<'a> {
    /// Returns the variant of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Empty => ValueKind::Empty,
            Self::Range(_) => ValueKind::Range,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Text(_) => ValueKind::Text,
            Self::Array(_) => ValueKind::Array,
            Self::Mapping(_) => ValueKind::Mapping,
            Self::Object { .. } => ValueKind::Object,
        }
    }

    /// Returns the raw bytes of a `Range` or `Text` value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Range(range) => Some(range.bytes()),
            Self::Text(text) => Some(text.as_bytes()),
            _ => None,
        }
    }

    /// Returns the textual content of a `Range` or `Text` value.
    #[must_use]
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Range(range) => Some(range.text()),
            Self::Text(text) => Some(Cow::Borrowed(text.as_str())),
            _ => None,
        }
    }

    /// Returns the flag of a `Boolean` value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the elements of an `Array` value.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a label in a `Mapping` value.
    ///
    /// `Empty` has no labels; every other variant yields `None`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Self> {
        match self {
            Self::Mapping(entries) => entries.get(label),
            _ => None,
        }
    }

    /// Converts a mapping-like value into its entries.
    ///
    /// `Empty` yields an empty map. Other variants are handed back unchanged
    /// so the caller can report them.
    ///
    /// # Errors
    ///
    /// Returns the original value when it is neither `Empty` nor `Mapping`.
    pub fn into_mapping(self) -> Result<BTreeMap<String, Self>, Self> {
        match self {
            Self::Empty => Ok(BTreeMap::new()),
            Self::Mapping(entries) => Ok(entries),
            other => Err(other),
        }
    }

    /// Detaches the value from the input buffer.
    ///
    /// Every `Range` is copied into a `Text`, so the result can outlive the
    /// input it was parsed from.
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::Empty => Value::Empty,
            Self::Range(range) => Value::Text(range.text().into_owned()),
            Self::Boolean(flag) => Value::Boolean(flag),
            Self::Text(text) => Value::Text(text),
            Self::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Self::Mapping(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(label, value)| (label, value.into_owned()))
                    .collect(),
            ),
            Self::Object { class, payload } => Value::Object {
                class,
                payload: Box::new(payload.into_owned()),
            },
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_map(Some(0))?.end(),
            Self::Range(range) => serializer.serialize_str(&range.text()),
            Self::Boolean(flag) => serializer.serialize_bool(*flag),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (label, value) in entries {
                    map.serialize_entry(label, value)?;
                }
                map.end()
            }
            Self::Object { class, payload } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("class", class)?;
                map.serialize_entry("payload", payload)?;
                map.end()
            }
        }
    }
}
