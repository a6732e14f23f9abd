//! Per-session builder state handed to the producer.

use arrow::datatypes::{DataType, Field, Schema};
use llkv_result::{Error, Result};

use crate::element::{ElementKind, SchemaElement};
use crate::handle::{HandleTable, NULL_HANDLE, SchemaHandle};
use crate::options::SchemaBuilderOptions;

/// Everything a producer can touch during one description session.
///
/// The state owns every element the producer describes until the element is
/// consumed by a composite operation or by final extraction. Whatever is left
/// when the state is dropped is released with it.
#[derive(Debug, Default)]
pub struct SchemaBuilderState {
    elements: HandleTable<SchemaElement>,
    options: SchemaBuilderOptions,
    last_error: Option<Error>,
}

impl SchemaBuilderState {
    pub fn new(options: SchemaBuilderOptions) -> Self {
        Self {
            elements: HandleTable::new(),
            options,
            last_error: None,
        }
    }

    pub fn options(&self) -> &SchemaBuilderOptions {
        &self.options
    }

    /// Number of elements currently owned by the table.
    pub fn live_elements(&self) -> usize {
        self.elements.len()
    }

    /// Handles of every live element, in no particular order.
    pub fn live_handles(&self) -> impl Iterator<Item = SchemaHandle> + '_ {
        self.elements.handles()
    }

    /// Non-consuming look at what `handle` refers to.
    pub fn peek_kind(&self, handle: SchemaHandle) -> Option<ElementKind> {
        self.elements.get(handle).map(SchemaElement::kind)
    }

    pub fn get(&self, handle: SchemaHandle) -> Option<&SchemaElement> {
        self.elements.get(handle)
    }

    /// Failure recorded by the most recent C entry point, if it failed.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub(crate) fn insert(&mut self, element: SchemaElement) -> SchemaHandle {
        self.elements.insert(element)
    }

    pub(crate) fn insert_field(&mut self, field: Field) -> SchemaHandle {
        self.insert(SchemaElement::Field(field))
    }

    pub(crate) fn insert_type(&mut self, data_type: DataType) -> SchemaHandle {
        self.insert(SchemaElement::Type(data_type))
    }

    /// Consume `handle` if it names one of the `accepted` kinds.
    ///
    /// A mismatched element stays in the table under its original handle.
    pub(crate) fn take_checked(
        &mut self,
        handle: SchemaHandle,
        accepted: &[ElementKind],
        expected: &'static str,
    ) -> Result<SchemaElement> {
        let kind = self
            .peek_kind(handle)
            .ok_or(Error::UnknownHandle(handle))?;
        if !accepted.contains(&kind) {
            return Err(Error::KindMismatch {
                handle,
                expected,
                found: kind.as_str(),
            });
        }
        self.elements
            .take(handle)
            .ok_or(Error::UnknownHandle(handle))
    }

    pub(crate) fn take_field(&mut self, handle: SchemaHandle) -> Result<Field> {
        match self.take_checked(handle, &[ElementKind::Field], "field")? {
            SchemaElement::Field(field) => Ok(field),
            _ => unreachable!("kind checked before take"),
        }
    }

    /// Consume a handle usable as a data type: a bare type, or a field whose
    /// type is lifted out. The element is returned whole so it can be put back.
    pub(crate) fn take_type_element(&mut self, handle: SchemaHandle) -> Result<SchemaElement> {
        self.take_checked(
            handle,
            &[ElementKind::Type, ElementKind::Field],
            "type or field",
        )
    }

    /// Consume the terminal schema element.
    pub fn take_schema(&mut self, handle: SchemaHandle) -> Result<Schema> {
        match self.take_checked(handle, &[ElementKind::Schema], "schema")? {
            SchemaElement::Schema(schema) => Ok(schema),
            _ => unreachable!("kind checked before take"),
        }
    }

    /// Re-insert elements consumed by a call that then failed. Each one gets
    /// a fresh handle; the originals stay consumed.
    pub(crate) fn restore<I>(&mut self, elements: I) -> usize
    where
        I: IntoIterator<Item = SchemaElement>,
    {
        let mut restored = 0;
        for element in elements {
            self.elements.insert(element);
            restored += 1;
        }
        if restored > 0 {
            tracing::debug!(restored, "rolled back partially consumed schema elements");
        }
        restored
    }

    /// Record the outcome of a C entry point and collapse it to a handle.
    pub(crate) fn finish(
        &mut self,
        operation: &'static str,
        result: Result<SchemaHandle>,
    ) -> SchemaHandle {
        match result {
            Ok(handle) => {
                self.last_error = None;
                handle
            }
            Err(err) => {
                if err.is_caller_error() {
                    tracing::debug!(operation, error = %err, "schema builder call rejected");
                } else {
                    tracing::warn!(operation, error = %err, "schema builder call failed");
                }
                self.last_error = Some(err);
                NULL_HANDLE
            }
        }
    }
}

impl SchemaElement {
    /// Data type carried by a type-capable element.
    pub(crate) fn into_data_type(self) -> DataType {
        match self {
            SchemaElement::Type(data_type) => data_type,
            SchemaElement::Field(field) => field.data_type().clone(),
            SchemaElement::Schema(schema) => DataType::Struct(schema.fields().clone()),
        }
    }
}
