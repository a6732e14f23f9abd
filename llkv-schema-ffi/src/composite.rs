//! Assembly of composite elements from lists of previously issued handles.
//!
//! Every operation here is all-or-nothing. Handles are consumed in order; if
//! one of them is dead, mistyped, or repeated, the elements already consumed
//! by the same call go back into the table under fresh handles before the
//! error is returned. The table's live count is the same before and after a
//! failed call.

use arrow::datatypes::{DataType, Field, Fields, Schema};
use llkv_result::{Error, Result};
use rustc_hash::FxHashSet;

use crate::element::SchemaElement;
use crate::handle::SchemaHandle;
use crate::state::SchemaBuilderState;
use crate::visitor::FieldMetadata;

impl SchemaBuilderState {
    /// Consume an ordered list of field handles.
    pub(crate) fn take_fields(&mut self, handles: &[SchemaHandle]) -> Result<Vec<Field>> {
        let limit = self.options().max_field_count;
        if handles.len() > limit {
            return Err(Error::limit_exceeded("handle count", handles.len(), limit));
        }

        let mut fields = Vec::with_capacity(handles.len());
        for &handle in handles {
            match self.take_field(handle) {
                Ok(field) => fields.push(field),
                Err(err) => {
                    self.restore(fields.into_iter().map(SchemaElement::Field));
                    return Err(err);
                }
            }
        }

        if self.options().reject_duplicate_names
            && let Some(name) = first_duplicate_name(&fields)
        {
            let err = Error::invalid_input(format!("duplicate field name '{name}'"));
            self.restore(fields.into_iter().map(SchemaElement::Field));
            return Err(err);
        }

        Ok(fields)
    }

    /// Wrap the given top-level fields into the terminal schema element.
    ///
    /// Sibling names are not deduplicated unless
    /// [`reject_duplicate_names`](crate::SchemaBuilderOptions::reject_duplicate_names)
    /// is set.
    pub fn build_schema(&mut self, field_handles: &[SchemaHandle]) -> Result<SchemaHandle> {
        let fields = self.take_fields(field_handles)?;
        tracing::debug!(fields = fields.len(), "assembled schema");
        Ok(self.insert(SchemaElement::Schema(Schema::new(fields))))
    }

    /// Anonymous struct type, for use as an array element or map value.
    pub fn visit_struct_type(&mut self, field_handles: &[SchemaHandle]) -> Result<SchemaHandle> {
        let data_type = self.struct_data_type(field_handles)?;
        Ok(self.insert_type(data_type))
    }

    /// Named struct field built from child field handles.
    pub fn visit_struct_field(
        &mut self,
        name: impl AsRef<[u8]>,
        field_handles: &[SchemaHandle],
        nullable: bool,
    ) -> Result<SchemaHandle> {
        self.visit_struct_field_with_metadata(name, field_handles, nullable, FieldMetadata::new())
    }

    pub fn visit_struct_field_with_metadata(
        &mut self,
        name: impl AsRef<[u8]>,
        field_handles: &[SchemaHandle],
        nullable: bool,
        metadata: FieldMetadata,
    ) -> Result<SchemaHandle> {
        let name = self.decode_name(name.as_ref())?;
        self.check_metadata(&metadata)?;
        let data_type = self.struct_data_type(field_handles)?;
        Ok(self.insert_field(Field::new(name, data_type, nullable).with_metadata(metadata)))
    }

    fn struct_data_type(&mut self, field_handles: &[SchemaHandle]) -> Result<DataType> {
        let fields = self.take_fields(field_handles)?;
        Ok(DataType::Struct(Fields::from(fields)))
    }

    /// Consume a key and a value type, restoring the key if the value fails.
    pub(crate) fn take_type_pair(
        &mut self,
        first: SchemaHandle,
        second: SchemaHandle,
    ) -> Result<(DataType, DataType)> {
        let first = self.take_type_element(first)?;
        match self.take_type_element(second) {
            Ok(second) => Ok((first.into_data_type(), second.into_data_type())),
            Err(err) => {
                self.restore([first]);
                Err(err)
            }
        }
    }
}

fn first_duplicate_name(fields: &[Field]) -> Option<&str> {
    let mut seen = FxHashSet::default();
    fields
        .iter()
        .map(|field| field.name().as_str())
        .find(|name| !seen.insert(*name))
}
