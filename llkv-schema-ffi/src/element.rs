//! Values that live in the handle table while a schema is being described.

use std::fmt;

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use llkv_result::{Error, Result};

/// Element owned by a session's handle table.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaElement {
    /// A named column: name, data type, nullability.
    Field(Field),
    /// A bare data type not yet wrapped in a field. Used for array elements
    /// and map keys/values.
    Type(DataType),
    /// A finished, ordered collection of fields.
    Schema(Schema),
}

impl SchemaElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            SchemaElement::Field(_) => ElementKind::Field,
            SchemaElement::Type(_) => ElementKind::Type,
            SchemaElement::Schema(_) => ElementKind::Schema,
        }
    }
}

/// Discriminant of [`SchemaElement`], used to reject mismatched handles
/// before anything is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Field,
    Type,
    Schema,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Field => "field",
            ElementKind::Type => "type",
            ElementKind::Schema => "schema",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of primitive column types a producer can describe.
///
/// The discriminants are the stable codes accepted by
/// [`visit_primitive_type`](crate::visit_primitive_type).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String = 0,
    Long = 1,
    Integer = 2,
    Short = 3,
    Byte = 4,
    Float = 5,
    Double = 6,
    Boolean = 7,
    Binary = 8,
    Date = 9,
    /// Microsecond precision, UTC.
    Timestamp = 10,
    /// Microsecond precision, no time zone.
    TimestampNtz = 11,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::String,
        PrimitiveKind::Long,
        PrimitiveKind::Integer,
        PrimitiveKind::Short,
        PrimitiveKind::Byte,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Boolean,
        PrimitiveKind::Binary,
        PrimitiveKind::Date,
        PrimitiveKind::Timestamp,
        PrimitiveKind::TimestampNtz,
    ];

    /// Arrow type backing this kind.
    pub fn data_type(self) -> DataType {
        match self {
            PrimitiveKind::String => DataType::Utf8,
            PrimitiveKind::Long => DataType::Int64,
            PrimitiveKind::Integer => DataType::Int32,
            PrimitiveKind::Short => DataType::Int16,
            PrimitiveKind::Byte => DataType::Int8,
            PrimitiveKind::Float => DataType::Float32,
            PrimitiveKind::Double => DataType::Float64,
            PrimitiveKind::Boolean => DataType::Boolean,
            PrimitiveKind::Binary => DataType::Binary,
            PrimitiveKind::Date => DataType::Date32,
            PrimitiveKind::Timestamp => {
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
            }
            PrimitiveKind::TimestampNtz => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

impl TryFrom<u8> for PrimitiveKind {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        PrimitiveKind::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| Error::invalid_input(format!("unknown primitive kind code {code}")))
    }
}
