//! Description protocol: the operations a producer calls to register fields
//! and types.
//!
//! Field operations take a name, validate it before anything else happens,
//! and return a `Field` handle. Type operations take no name and return a
//! `Type` handle, for use as array elements and map keys/values. Every field
//! operation has a `_with_metadata` form; metadata is validated alongside the
//! name, before any child handle is consumed. Struct variants live in
//! [`composite`](crate::composite) alongside the other list-consuming
//! operations.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{
    DataType, Decimal128Type, Field, Fields, validate_decimal_precision_and_scale,
};
use llkv_result::{Error, Result};

use crate::element::PrimitiveKind;
use crate::handle::SchemaHandle;
use crate::state::SchemaBuilderState;

/// Name Arrow gives the element field of a list.
pub const LIST_ITEM_NAME: &str = "item";
/// Name of the key/value struct field inside a map.
pub const MAP_ENTRIES_NAME: &str = "entries";
pub const MAP_KEY_NAME: &str = "key";
pub const MAP_VALUE_NAME: &str = "value";

/// Key/value annotations attached to a field.
pub type FieldMetadata = HashMap<String, String>;

impl SchemaBuilderState {
    /// Validate and copy a producer-supplied name.
    pub(crate) fn decode_name(&self, name: &[u8]) -> Result<String> {
        self.decode_text(name, "field name length")
    }

    pub(crate) fn decode_text(&self, text: &[u8], what: &'static str) -> Result<String> {
        let limit = self.options().max_name_bytes;
        if text.len() > limit {
            return Err(Error::limit_exceeded(what, text.len(), limit));
        }
        let text = std::str::from_utf8(text).map_err(Error::invalid_encoding)?;
        Ok(text.to_owned())
    }

    /// Apply the name ceilings to metadata built on the Rust side.
    pub(crate) fn check_metadata(&self, metadata: &FieldMetadata) -> Result<()> {
        let options = self.options();
        if metadata.len() > options.max_field_count {
            return Err(Error::limit_exceeded(
                "metadata entry count",
                metadata.len(),
                options.max_field_count,
            ));
        }
        for (key, value) in metadata {
            if key.len() > options.max_name_bytes {
                return Err(Error::limit_exceeded(
                    "metadata key length",
                    key.len(),
                    options.max_name_bytes,
                ));
            }
            if value.len() > options.max_name_bytes {
                return Err(Error::limit_exceeded(
                    "metadata value length",
                    value.len(),
                    options.max_name_bytes,
                ));
            }
        }
        Ok(())
    }

    pub fn visit_primitive_field(
        &mut self,
        name: impl AsRef<[u8]>,
        kind: PrimitiveKind,
        nullable: bool,
    ) -> Result<SchemaHandle> {
        self.visit_primitive_field_with_metadata(name, kind, nullable, FieldMetadata::new())
    }

    pub fn visit_primitive_field_with_metadata(
        &mut self,
        name: impl AsRef<[u8]>,
        kind: PrimitiveKind,
        nullable: bool,
        metadata: FieldMetadata,
    ) -> Result<SchemaHandle> {
        let name = self.decode_name(name.as_ref())?;
        self.check_metadata(&metadata)?;
        let field = Field::new(name, kind.data_type(), nullable).with_metadata(metadata);
        Ok(self.insert_field(field))
    }

    pub fn visit_decimal_field(
        &mut self,
        name: impl AsRef<[u8]>,
        precision: u8,
        scale: u8,
        nullable: bool,
    ) -> Result<SchemaHandle> {
        self.visit_decimal_field_with_metadata(
            name,
            precision,
            scale,
            nullable,
            FieldMetadata::new(),
        )
    }

    pub fn visit_decimal_field_with_metadata(
        &mut self,
        name: impl AsRef<[u8]>,
        precision: u8,
        scale: u8,
        nullable: bool,
        metadata: FieldMetadata,
    ) -> Result<SchemaHandle> {
        let name = self.decode_name(name.as_ref())?;
        self.check_metadata(&metadata)?;
        let data_type = decimal_data_type(precision, scale)?;
        Ok(self.insert_field(Field::new(name, data_type, nullable).with_metadata(metadata)))
    }

    /// List field. `element` is consumed and may be a type or a field; a
    /// field contributes only its data type.
    pub fn visit_array_field(
        &mut self,
        name: impl AsRef<[u8]>,
        element: SchemaHandle,
        contains_null: bool,
        nullable: bool,
    ) -> Result<SchemaHandle> {
        self.visit_array_field_with_metadata(
            name,
            element,
            contains_null,
            nullable,
            FieldMetadata::new(),
        )
    }

    pub fn visit_array_field_with_metadata(
        &mut self,
        name: impl AsRef<[u8]>,
        element: SchemaHandle,
        contains_null: bool,
        nullable: bool,
        metadata: FieldMetadata,
    ) -> Result<SchemaHandle> {
        let name = self.decode_name(name.as_ref())?;
        self.check_metadata(&metadata)?;
        let data_type = self.array_data_type(element, contains_null)?;
        Ok(self.insert_field(Field::new(name, data_type, nullable).with_metadata(metadata)))
    }

    /// Map field. Both handles are consumed, or neither is.
    pub fn visit_map_field(
        &mut self,
        name: impl AsRef<[u8]>,
        key: SchemaHandle,
        value: SchemaHandle,
        value_contains_null: bool,
        nullable: bool,
    ) -> Result<SchemaHandle> {
        self.visit_map_field_with_metadata(
            name,
            key,
            value,
            value_contains_null,
            nullable,
            FieldMetadata::new(),
        )
    }

    pub fn visit_map_field_with_metadata(
        &mut self,
        name: impl AsRef<[u8]>,
        key: SchemaHandle,
        value: SchemaHandle,
        value_contains_null: bool,
        nullable: bool,
        metadata: FieldMetadata,
    ) -> Result<SchemaHandle> {
        let name = self.decode_name(name.as_ref())?;
        self.check_metadata(&metadata)?;
        let data_type = self.map_data_type(key, value, value_contains_null)?;
        Ok(self.insert_field(Field::new(name, data_type, nullable).with_metadata(metadata)))
    }

    pub fn visit_primitive_type(&mut self, kind: PrimitiveKind) -> Result<SchemaHandle> {
        Ok(self.insert_type(kind.data_type()))
    }

    pub fn visit_decimal_type(&mut self, precision: u8, scale: u8) -> Result<SchemaHandle> {
        let data_type = decimal_data_type(precision, scale)?;
        Ok(self.insert_type(data_type))
    }

    pub fn visit_array_type(
        &mut self,
        element: SchemaHandle,
        contains_null: bool,
    ) -> Result<SchemaHandle> {
        let data_type = self.array_data_type(element, contains_null)?;
        Ok(self.insert_type(data_type))
    }

    pub fn visit_map_type(
        &mut self,
        key: SchemaHandle,
        value: SchemaHandle,
        value_contains_null: bool,
    ) -> Result<SchemaHandle> {
        let data_type = self.map_data_type(key, value, value_contains_null)?;
        Ok(self.insert_type(data_type))
    }

    fn array_data_type(&mut self, element: SchemaHandle, contains_null: bool) -> Result<DataType> {
        let element = self.take_type_element(element)?.into_data_type();
        Ok(DataType::List(Arc::new(Field::new(
            LIST_ITEM_NAME,
            element,
            contains_null,
        ))))
    }

    fn map_data_type(
        &mut self,
        key: SchemaHandle,
        value: SchemaHandle,
        value_contains_null: bool,
    ) -> Result<DataType> {
        let (key, value) = self.take_type_pair(key, value)?;
        let entries = Fields::from(vec![
            Field::new(MAP_KEY_NAME, key, false),
            Field::new(MAP_VALUE_NAME, value, value_contains_null),
        ]);
        Ok(DataType::Map(
            Arc::new(Field::new(
                MAP_ENTRIES_NAME,
                DataType::Struct(entries),
                false,
            )),
            false,
        ))
    }
}

fn decimal_data_type(precision: u8, scale: u8) -> Result<DataType> {
    let scale = i8::try_from(scale)
        .map_err(|_| Error::invalid_input(format!("decimal scale {scale} out of range")))?;
    validate_decimal_precision_and_scale::<Decimal128Type>(precision, scale)?;
    Ok(DataType::Decimal128(precision, scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use crate::options::SchemaBuilderOptions;

    #[test]
    fn primitive_field_carries_name_type_and_nullability() {
        let mut state = SchemaBuilderState::default();
        let handle = state
            .visit_primitive_field("id", PrimitiveKind::Long, false)
            .unwrap();
        let schema = state.build_schema(&[handle]).unwrap();
        let schema = state.take_schema(schema).unwrap();
        let field = schema.field(0);
        assert_eq!(field.name(), "id");
        assert_eq!(field.data_type(), &DataType::Int64);
        assert!(!field.is_nullable());
    }

    fn metadata(pairs: &[(&str, &str)]) -> FieldMetadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn field_metadata_is_attached() {
        let mut state = SchemaBuilderState::default();
        let handle = state
            .visit_primitive_field_with_metadata(
                "id",
                PrimitiveKind::Long,
                false,
                metadata(&[("comment", "primary key"), ("origin", "engine")]),
            )
            .unwrap();
        let schema = state.build_schema(&[handle]).unwrap();
        let schema = state.take_schema(schema).unwrap();
        let field_metadata = schema.field(0).metadata();
        assert_eq!(field_metadata.len(), 2);
        assert_eq!(field_metadata["comment"], "primary key");
    }

    #[test]
    fn too_many_metadata_entries_are_rejected() {
        let options = SchemaBuilderOptions::default().with_max_field_count(1);
        let mut state = SchemaBuilderState::new(options);
        let err = state
            .visit_decimal_field_with_metadata(
                "price",
                10,
                2,
                true,
                metadata(&[("a", "1"), ("b", "2")]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LimitExceeded {
                what: "metadata entry count",
                count: 2,
                limit: 1,
            }
        ));
        assert_eq!(state.live_elements(), 0);
    }

    #[test]
    fn map_with_oversized_metadata_key_keeps_children() {
        let options = SchemaBuilderOptions::default().with_max_name_bytes(4);
        let mut state = SchemaBuilderState::new(options);
        let key = state.visit_primitive_type(PrimitiveKind::String).unwrap();
        let value = state.visit_primitive_type(PrimitiveKind::Long).unwrap();

        let err = state
            .visit_map_field_with_metadata(
                "m",
                key,
                value,
                true,
                true,
                metadata(&[("longkey", "v")]),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LimitExceeded {
                what: "metadata key length",
                ..
            }
        ));
        assert_eq!(state.peek_kind(key), Some(ElementKind::Type));
        assert_eq!(state.peek_kind(value), Some(ElementKind::Type));
    }

    #[test]
    fn invalid_utf8_name_registers_nothing() {
        let mut state = SchemaBuilderState::default();
        let err = state
            .visit_primitive_field(b"bad\xff", PrimitiveKind::String, true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
        assert_eq!(state.live_elements(), 0);
    }

    #[test]
    fn embedded_nul_is_part_of_the_name() {
        let mut state = SchemaBuilderState::default();
        let handle = state
            .visit_primitive_field(b"a\0b", PrimitiveKind::Integer, true)
            .unwrap();
        let schema = state.build_schema(&[handle]).unwrap();
        assert_eq!(state.take_schema(schema).unwrap().field(0).name(), "a\0b");
    }

    #[test]
    fn oversized_name_is_rejected() {
        let options = SchemaBuilderOptions::default().with_max_name_bytes(4);
        let mut state = SchemaBuilderState::new(options);
        let err = state
            .visit_primitive_field("toolong", PrimitiveKind::Boolean, true)
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { count: 7, limit: 4, .. }));
        assert_eq!(state.live_elements(), 0);
    }

    #[test]
    fn decimal_precision_and_scale_are_validated() {
        let mut state = SchemaBuilderState::default();
        let ok = state.visit_decimal_field("price", 10, 2, false).unwrap();
        assert_ne!(ok, 0);
        assert!(matches!(
            state.visit_decimal_field("too_wide", 39, 2, false),
            Err(Error::Arrow(_))
        ));
        assert!(matches!(
            state.visit_decimal_type(5, 6),
            Err(Error::Arrow(_))
        ));
        assert!(matches!(
            state.visit_decimal_type(10, 200),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(state.live_elements(), 1);
    }

    #[test]
    fn array_consumes_type_element() {
        let mut state = SchemaBuilderState::default();
        let element = state.visit_primitive_type(PrimitiveKind::String).unwrap();
        let tags = state.visit_array_field("tags", element, true, true).unwrap();
        assert_eq!(state.peek_kind(element), None);

        let schema = state.build_schema(&[tags]).unwrap();
        let schema = state.take_schema(schema).unwrap();
        match schema.field(0).data_type() {
            DataType::List(item) => {
                assert_eq!(item.data_type(), &DataType::Utf8);
                assert!(item.is_nullable());
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn array_accepts_field_as_element_type() {
        let mut state = SchemaBuilderState::default();
        let element = state
            .visit_primitive_field("ignored", PrimitiveKind::Double, false)
            .unwrap();
        let array = state.visit_array_type(element, false).unwrap();
        assert_eq!(state.peek_kind(array), Some(ElementKind::Type));
        assert_eq!(state.live_elements(), 1);
    }

    #[test]
    fn array_with_consumed_element_fails_cleanly() {
        let mut state = SchemaBuilderState::default();
        let element = state.visit_primitive_type(PrimitiveKind::Long).unwrap();
        state.visit_array_type(element, true).unwrap();
        let live = state.live_elements();

        let err = state.visit_array_field("again", element, true, true).unwrap_err();
        assert!(matches!(err, Error::UnknownHandle(h) if h == element));
        assert_eq!(state.live_elements(), live);
    }

    #[test]
    fn array_rejects_schema_element() {
        let mut state = SchemaBuilderState::default();
        let schema = state.build_schema(&[]).unwrap();
        let err = state.visit_array_type(schema, true).unwrap_err();
        assert!(matches!(err, Error::KindMismatch { found: "schema", .. }));
        assert_eq!(state.peek_kind(schema), Some(ElementKind::Schema));
    }

    #[test]
    fn map_builds_entries_struct() {
        let mut state = SchemaBuilderState::default();
        let key = state.visit_primitive_type(PrimitiveKind::String).unwrap();
        let value = state.visit_primitive_type(PrimitiveKind::Long).unwrap();
        let map = state.visit_map_field("counts", key, value, true, false).unwrap();
        let schema = state.build_schema(&[map]).unwrap();
        let schema = state.take_schema(schema).unwrap();

        let DataType::Map(entries, sorted) = schema.field(0).data_type() else {
            panic!("expected map");
        };
        assert!(!sorted);
        let DataType::Struct(children) = entries.data_type() else {
            panic!("expected struct entries");
        };
        assert_eq!(children[0].name(), MAP_KEY_NAME);
        assert!(!children[0].is_nullable());
        assert_eq!(children[1].data_type(), &DataType::Int64);
        assert!(children[1].is_nullable());
    }

    #[test]
    fn map_with_bad_value_restores_key() {
        let mut state = SchemaBuilderState::default();
        let key = state.visit_primitive_type(PrimitiveKind::String).unwrap();
        let before = state.live_elements();
        let err = state.visit_map_type(key, key, true).unwrap_err();
        assert!(matches!(err, Error::UnknownHandle(_)));
        assert_eq!(state.live_elements(), before);
    }
}
