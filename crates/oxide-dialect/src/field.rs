//! Field descriptors.
//!
//! A [`FieldDescriptor`] is what the host ORM knows about one mapped
//! attribute when it asks a dialect for a column type. Dialects read it and
//! write back exactly one thing: the auto-increment flag.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size assumed when the host declares none.
pub const DEFAULT_SIZE: usize = 255;

/// Native value kind of a mapped attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Signed integer up to 32 bits.
    Int,
    /// Unsigned integer up to 32 bits.
    Uint,
    /// Signed 64-bit integer.
    BigInt,
    /// Unsigned 64-bit integer.
    BigUint,
    /// Floating point.
    Float,
    /// Character string.
    String,
    /// Point in time.
    Time,
    /// Byte sequence.
    Bytes,
    /// Anything the host could not classify (maps, channels, ...).
    Other(String),
}

impl ValueKind {
    /// Parses a kind from its display name. Unknown names become [`Self::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "int" | "int32" => Self::Int,
            "uint" | "uint32" => Self::Uint,
            "int64" | "bigint" => Self::BigInt,
            "uint64" => Self::BigUint,
            "float" | "float64" | "double" => Self::Float,
            "string" | "text" => Self::String,
            "time" | "timestamp" => Self::Time,
            "bytes" | "blob" => Self::Bytes,
            _ => Self::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Uint => f.write_str("uint"),
            Self::BigInt => f.write_str("int64"),
            Self::BigUint => f.write_str("uint64"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Time => f.write_str("time"),
            Self::Bytes => f.write_str("bytes"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Describes one mapped attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Attribute (column) name.
    pub name: String,
    /// Native value kind.
    pub kind: ValueKind,
    /// Declared size. `0` means no bound.
    pub size: usize,
    /// Explicit column type, used verbatim when present.
    pub sql_type: Option<String>,
    /// Whether the field is (part of) the primary key.
    pub primary_key: bool,
    /// Auto-increment setting. `None` when the host declared nothing.
    pub auto_increment: Option<bool>,
    /// Extra column modifiers, appended after the type.
    pub modifiers: Vec<String>,
}

impl FieldDescriptor {
    /// Creates a descriptor with the default size and no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            size: DEFAULT_SIZE,
            sql_type: None,
            primary_key: false,
            auto_increment: None,
            modifiers: Vec::new(),
        }
    }

    /// Sets the declared size.
    #[must_use]
    pub const fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Overrides the resolved column type.
    #[must_use]
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Marks the field as primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Declares auto-increment explicitly on or off.
    #[must_use]
    pub const fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = Some(enabled);
        self
    }

    /// Adds `NOT NULL`.
    #[must_use]
    pub fn not_null(self) -> Self {
        self.modifier("NOT NULL")
    }

    /// Adds `UNIQUE`.
    #[must_use]
    pub fn unique(self) -> Self {
        self.modifier("UNIQUE")
    }

    /// Adds `DEFAULT <expr>`. The expression is emitted as given.
    #[must_use]
    pub fn default_value(self, expr: impl fmt::Display) -> Self {
        self.modifier(format!("DEFAULT {expr}"))
    }

    /// Adds a free-form modifier.
    #[must_use]
    pub fn modifier(mut self, text: impl Into<String>) -> Self {
        self.modifiers.push(text.into());
        self
    }

    /// Returns whether a dialect should give this field an identity column.
    ///
    /// An explicit setting wins; otherwise primary keys auto-increment.
    #[must_use]
    pub fn can_auto_increment(&self) -> bool {
        self.auto_increment.unwrap_or(self.primary_key)
    }

    /// Returns whether the declared size is bounded and at most `limit`.
    #[must_use]
    pub const fn fits_inline(&self, limit: usize) -> bool {
        self.size > 0 && self.size <= limit
    }

    /// Returns the modifiers joined by single spaces, blanks dropped.
    #[must_use]
    pub fn additional_type(&self) -> String {
        self.modifiers
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Appends the modifiers to a resolved type.
    #[must_use]
    pub fn with_modifiers(&self, sql_type: String) -> String {
        let additional = self.additional_type();
        if additional.is_empty() {
            sql_type
        } else {
            format!("{sql_type} {additional}")
        }
    }
}
