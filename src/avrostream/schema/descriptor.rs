//! Type descriptors: the abstract shape of a data type
//!
//! A [`TypeDescriptor`] describes a data shape independently of any wire
//! representation. [`SchemaBuilder`](super::SchemaBuilder) turns a
//! descriptor into an Avro schema document, rewriting names through a
//! naming strategy along the way.
//!
//! Field order within a record is significant and preserved end-to-end:
//! it determines the positional binary layout of the derived schema.

use serde_json::Value as JsonValue;

/// Abstract description of a data shape.
///
/// Self-referential record shapes cannot be built by naive recursive value
/// construction; they are expressed with [`TypeDescriptor::Ref`], a named
/// back-reference to a record or enum defined earlier in the same tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    /// An ordered sequence of named, typed fields.
    Record(RecordDescriptor),
    /// An ordered set of symbol names.
    Enum(EnumDescriptor),
    /// A tagged choice among alternatives; optionality is `[null, T]`.
    Union(Vec<TypeDescriptor>),
    /// A homogeneous sequence.
    Array(Box<TypeDescriptor>),
    /// A string-keyed map with homogeneous values.
    Map(Box<TypeDescriptor>),
    /// Named back-reference to an already-defined record or enum.
    Ref(String),
}

impl TypeDescriptor {
    /// Wraps `inner` as an optional type: a union of `[null, inner]`.
    ///
    /// The `[null, T]` ordering is fixed; default-value and binary-tag
    /// semantics depend on it.
    pub fn optional(inner: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Union(vec![TypeDescriptor::Null, inner])
    }

    /// An array of `element` values.
    pub fn array(element: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Array(Box::new(element))
    }

    /// A string-keyed map of `values`.
    pub fn map(values: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::Map(Box::new(values))
    }

    /// A named back-reference to a record or enum defined earlier.
    pub fn reference(name: impl Into<String>) -> TypeDescriptor {
        TypeDescriptor::Ref(name.into())
    }
}

/// An ordered sequence of named, typed fields with a type name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        RecordDescriptor {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a required field. Declaration order is wire order.
    pub fn field(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            descriptor,
            default: None,
        });
        self
    }

    /// Appends a required field carrying a default value for schema
    /// resolution. The default is expressed in plain JSON encoding.
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
        default: JsonValue,
    ) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            descriptor,
            default: Some(default),
        });
        self
    }

    /// Appends an optional field: a `[null, inner]` union defaulting to
    /// null.
    pub fn optional_field(mut self, name: impl Into<String>, inner: TypeDescriptor) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            descriptor: TypeDescriptor::optional(inner),
            default: Some(JsonValue::Null),
        });
        self
    }

    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::Record(self)
    }
}

impl From<RecordDescriptor> for TypeDescriptor {
    fn from(record: RecordDescriptor) -> Self {
        TypeDescriptor::Record(record)
    }
}

/// A single named, typed record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Logical name; rewritten by the naming strategy during derivation.
    pub name: String,
    pub descriptor: TypeDescriptor,
    /// Default value in plain JSON encoding, if any.
    pub default: Option<JsonValue>,
}

/// An ordered set of enum symbols with a type name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub symbols: Vec<String>,
    /// Symbol substituted when a writer symbol is unknown to the reader.
    pub default: Option<String>,
}

impl EnumDescriptor {
    pub fn new<I, S>(name: impl Into<String>, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumDescriptor {
            name: name.into(),
            symbols: symbols.into_iter().map(Into::into).collect(),
            default: None,
        }
    }

    pub fn with_default(mut self, symbol: impl Into<String>) -> Self {
        self.default = Some(symbol.into());
        self
    }

    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::Enum(self)
    }
}

impl From<EnumDescriptor> for TypeDescriptor {
    fn from(descriptor: EnumDescriptor) -> Self {
        TypeDescriptor::Enum(descriptor)
    }
}
