//! C entry points for producers.
//!
//! Every function here is a thin wrapper: it validates the raw pointers it
//! was given, forwards to the `Result`-returning method on
//! [`SchemaBuilderState`], and collapses failure to [`NULL_HANDLE`]. The
//! failure itself is kept on the state and can be read back with
//! [`schema_builder_last_error`].
//!
//! A null `state` makes every entry point return [`NULL_HANDLE`] without
//! doing anything else.

use llkv_result::{Error, Result};

use crate::element::PrimitiveKind;
use crate::handle::{NULL_HANDLE, SchemaHandle};
use crate::slice::{MetadataEntry, StringSlice, read_handles, read_metadata};
use crate::state::SchemaBuilderState;
use crate::visitor::FieldMetadata;

/// Stable error codes reported to producers.
///
/// `Internal` is reserved for broken invariants inside the builder; no
/// current code path reports it.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    Ok = 0,
    InvalidEncoding = 1,
    InvalidInput = 2,
    LimitExceeded = 3,
    UnknownHandle = 4,
    KindMismatch = 5,
    Internal = 6,
}

impl From<&Error> for SchemaErrorCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidEncoding(_) => SchemaErrorCode::InvalidEncoding,
            Error::InvalidInput(_) | Error::Arrow(_) | Error::NotFound(_) => {
                SchemaErrorCode::InvalidInput
            }
            Error::LimitExceeded { .. } => SchemaErrorCode::LimitExceeded,
            Error::UnknownHandle(_) => SchemaErrorCode::UnknownHandle,
            Error::KindMismatch { .. } => SchemaErrorCode::KindMismatch,
            Error::Internal(_) => SchemaErrorCode::Internal,
        }
    }
}

/// Error code of the most recent failed call on `state`, or
/// [`SchemaErrorCode::Ok`] if the last call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn schema_builder_last_error(
    state: Option<&SchemaBuilderState>,
) -> SchemaErrorCode {
    match state {
        Some(state) => state
            .last_error()
            .map(SchemaErrorCode::from)
            .unwrap_or(SchemaErrorCode::Ok),
        None => SchemaErrorCode::InvalidInput,
    }
}

/// Signature shared by the primitive `visit_schema_*` entry points.
pub type PrimitiveFieldVisitor = unsafe extern "C" fn(
    state: Option<&mut SchemaBuilderState>,
    name: StringSlice<'_>,
    nullable: bool,
    metadata: *const MetadataEntry<'_>,
    metadata_count: usize,
) -> SchemaHandle;

/// Read a field's name bytes and metadata with the session's ceilings.
///
/// Runs before any handle is consumed. Repeated metadata keys keep the last
/// value.
///
/// # Safety
///
/// As for the `name` and `metadata` arguments of the field visitors.
unsafe fn read_field_parts<'a>(
    state: &SchemaBuilderState,
    name: StringSlice<'a>,
    metadata: *const MetadataEntry<'a>,
    metadata_count: usize,
) -> Result<(&'a [u8], FieldMetadata)> {
    let options = *state.options();
    let name = unsafe { name.as_bytes(options.max_name_bytes) }?;
    let entries = unsafe { read_metadata(metadata, metadata_count, options.max_field_count) }?;
    let mut decoded = FieldMetadata::with_capacity(entries.len());
    for entry in entries {
        let key = unsafe { entry.key.as_bytes(options.max_name_bytes) }?;
        let value = unsafe { entry.value.as_bytes(options.max_name_bytes) }?;
        decoded.insert(
            state.decode_text(key, "metadata key length")?,
            state.decode_text(value, "metadata value length")?,
        );
    }
    Ok((name, decoded))
}

macro_rules! generate_primitive_field_visitors {
    ($(($fn_name:ident, $kind:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            #[doc = ""]
            #[doc = "# Safety"]
            #[doc = ""]
            #[doc = "`name` must point to `name.len` readable bytes (or be null with length 0)."]
            #[doc = "`metadata` must point to `metadata_count` readable entries (or be null with"]
            #[doc = "count 0), each of whose slices follows the same rule as `name`."]
            #[unsafe(no_mangle)]
            pub unsafe extern "C" fn $fn_name(
                state: Option<&mut SchemaBuilderState>,
                name: StringSlice<'_>,
                nullable: bool,
                metadata: *const MetadataEntry<'_>,
                metadata_count: usize,
            ) -> SchemaHandle {
                let Some(state) = state else {
                    return NULL_HANDLE;
                };
                let result = unsafe { read_field_parts(state, name, metadata, metadata_count) }
                    .and_then(|(name, metadata)| {
                        state.visit_primitive_field_with_metadata(name, $kind, nullable, metadata)
                    });
                state.finish(stringify!($fn_name), result)
            }
        )*
    };
}

generate_primitive_field_visitors! {
    (visit_schema_string, PrimitiveKind::String, "Describe a UTF-8 string column."),
    (visit_schema_long, PrimitiveKind::Long, "Describe a 64-bit signed integer column."),
    (visit_schema_integer, PrimitiveKind::Integer, "Describe a 32-bit signed integer column."),
    (visit_schema_short, PrimitiveKind::Short, "Describe a 16-bit signed integer column."),
    (visit_schema_byte, PrimitiveKind::Byte, "Describe an 8-bit signed integer column."),
    (visit_schema_float, PrimitiveKind::Float, "Describe a 32-bit float column."),
    (visit_schema_double, PrimitiveKind::Double, "Describe a 64-bit float column."),
    (visit_schema_boolean, PrimitiveKind::Boolean, "Describe a boolean column."),
    (visit_schema_binary, PrimitiveKind::Binary, "Describe a variable-length binary column."),
    (visit_schema_date, PrimitiveKind::Date, "Describe a calendar date column."),
    (
        visit_schema_timestamp,
        PrimitiveKind::Timestamp,
        "Describe a microsecond UTC timestamp column."
    ),
    (
        visit_schema_timestamp_ntz,
        PrimitiveKind::TimestampNtz,
        "Describe a microsecond timestamp column without time zone."
    ),
}

/// Describe a `Decimal128(precision, scale)` column.
///
/// # Safety
///
/// `name` and `metadata` as for [`visit_schema_string`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn visit_schema_decimal(
    state: Option<&mut SchemaBuilderState>,
    name: StringSlice<'_>,
    precision: u8,
    scale: u8,
    nullable: bool,
    metadata: *const MetadataEntry<'_>,
    metadata_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = unsafe { read_field_parts(state, name, metadata, metadata_count) }.and_then(
        |(name, metadata)| {
            state.visit_decimal_field_with_metadata(name, precision, scale, nullable, metadata)
        },
    );
    state.finish("visit_schema_decimal", result)
}

/// Describe a named struct column from `field_count` child field handles.
///
/// The children are consumed on success. On failure every child stays
/// available, though those already walked are re-issued under new handles.
///
/// # Safety
///
/// `name` and `metadata` as for [`visit_schema_string`]. `field_handles` must
/// point to `field_count` readable handles, or be null when `field_count` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn visit_schema_struct(
    state: Option<&mut SchemaBuilderState>,
    name: StringSlice<'_>,
    field_handles: *const SchemaHandle,
    field_count: usize,
    nullable: bool,
    metadata: *const MetadataEntry<'_>,
    metadata_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let limit = state.options().max_field_count;
    let result = unsafe { read_field_parts(state, name, metadata, metadata_count) }.and_then(
        |(name, metadata)| {
            let handles = unsafe { read_handles(field_handles, field_count, limit) }?;
            state.visit_struct_field_with_metadata(name, handles, nullable, metadata)
        },
    );
    state.finish("visit_schema_struct", result)
}

/// Describe a list column whose element type is `element` (a type or field
/// handle, consumed).
///
/// # Safety
///
/// `name` and `metadata` as for [`visit_schema_string`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn visit_schema_array(
    state: Option<&mut SchemaBuilderState>,
    name: StringSlice<'_>,
    element: SchemaHandle,
    contains_null: bool,
    nullable: bool,
    metadata: *const MetadataEntry<'_>,
    metadata_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = unsafe { read_field_parts(state, name, metadata, metadata_count) }.and_then(
        |(name, metadata)| {
            state.visit_array_field_with_metadata(name, element, contains_null, nullable, metadata)
        },
    );
    state.finish("visit_schema_array", result)
}

/// Describe a map column from key and value type handles (both consumed).
///
/// # Safety
///
/// `name` and `metadata` as for [`visit_schema_string`].
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn visit_schema_map(
    state: Option<&mut SchemaBuilderState>,
    name: StringSlice<'_>,
    key: SchemaHandle,
    value: SchemaHandle,
    value_contains_null: bool,
    nullable: bool,
    metadata: *const MetadataEntry<'_>,
    metadata_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = unsafe { read_field_parts(state, name, metadata, metadata_count) }.and_then(
        |(name, metadata)| {
            state.visit_map_field_with_metadata(
                name,
                key,
                value,
                value_contains_null,
                nullable,
                metadata,
            )
        },
    );
    state.finish("visit_schema_map", result)
}

/// Create a bare primitive type from its [`PrimitiveKind`] code.
#[unsafe(no_mangle)]
pub extern "C" fn visit_primitive_type(
    state: Option<&mut SchemaBuilderState>,
    kind: u8,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = PrimitiveKind::try_from(kind).and_then(|kind| state.visit_primitive_type(kind));
    state.finish("visit_primitive_type", result)
}

#[unsafe(no_mangle)]
pub extern "C" fn visit_decimal_type(
    state: Option<&mut SchemaBuilderState>,
    precision: u8,
    scale: u8,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = state.visit_decimal_type(precision, scale);
    state.finish("visit_decimal_type", result)
}

/// Create an anonymous struct type from child field handles.
///
/// # Safety
///
/// `field_handles` must point to `field_count` readable handles, or be null
/// when `field_count` is 0.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn visit_struct_type(
    state: Option<&mut SchemaBuilderState>,
    field_handles: *const SchemaHandle,
    field_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let limit = state.options().max_field_count;
    let result = unsafe { read_handles(field_handles, field_count, limit) }
        .and_then(|handles| state.visit_struct_type(handles));
    state.finish("visit_struct_type", result)
}

#[unsafe(no_mangle)]
pub extern "C" fn visit_array_type(
    state: Option<&mut SchemaBuilderState>,
    element: SchemaHandle,
    contains_null: bool,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = state.visit_array_type(element, contains_null);
    state.finish("visit_array_type", result)
}

#[unsafe(no_mangle)]
pub extern "C" fn visit_map_type(
    state: Option<&mut SchemaBuilderState>,
    key: SchemaHandle,
    value: SchemaHandle,
    value_contains_null: bool,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let result = state.visit_map_type(key, value, value_contains_null);
    state.finish("visit_map_type", result)
}

/// Assemble the final schema from top-level field handles.
///
/// This is the producer's last call; its return value is what the visitor
/// callback hands back to the session.
///
/// # Safety
///
/// `field_handles` must point to `field_count` readable handles, or be null
/// when `field_count` is 0. Nothing is read when `field_count` exceeds the
/// configured maximum.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn build_schema(
    state: Option<&mut SchemaBuilderState>,
    field_handles: *const SchemaHandle,
    field_count: usize,
) -> SchemaHandle {
    let Some(state) = state else {
        return NULL_HANDLE;
    };
    let limit = state.options().max_field_count;
    let result = unsafe { read_handles(field_handles, field_count, limit) }
        .and_then(|handles| state.build_schema(handles));
    state.finish("build_schema", result)
}
