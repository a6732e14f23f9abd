//! Scan setup for LLKV: which columns of a table a scan reads.
//!
//! A [`ScanBuilder`] starts out reading every column of its table. An
//! optional projection schema, typically produced by a foreign engine through
//! `llkv-schema-ffi`, narrows that to the listed columns. The result is a
//! [`ScanPlan`]: the schema of the batches the scan will emit and the table
//! column indices backing them.

use std::sync::Arc;

use arrow::datatypes::{Schema, SchemaRef};
use llkv_result::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

pub mod plan;
pub use plan::ScanPlan;

/// Builder for a scan over a single table.
#[derive(Debug, Clone)]
pub struct ScanBuilder {
    table_schema: SchemaRef,
    projection: Option<SchemaRef>,
}

impl ScanBuilder {
    pub fn new(table_schema: SchemaRef) -> Self {
        Self {
            table_schema,
            projection: None,
        }
    }

    /// Restrict the scan to the fields of `schema`. `None` restores the
    /// default of reading every column.
    pub fn with_schema(mut self, schema: Option<SchemaRef>) -> Self {
        self.projection = schema;
        self
    }

    pub fn table_schema(&self) -> &SchemaRef {
        &self.table_schema
    }

    pub fn projection(&self) -> Option<&SchemaRef> {
        self.projection.as_ref()
    }

    /// Resolve the projection against the table schema.
    ///
    /// Each projected field must name a table column with the same data type,
    /// and may appear only once. Output columns follow the projection's order.
    pub fn build(self) -> Result<ScanPlan> {
        let Some(projection) = self.projection else {
            let column_indices = (0..self.table_schema.fields().len()).collect();
            return Ok(ScanPlan::new(
                Arc::clone(&self.table_schema),
                self.table_schema,
                column_indices,
                false,
            ));
        };

        let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
        for (idx, field) in self.table_schema.fields().iter().enumerate() {
            by_name.entry(field.name().as_str()).or_insert(idx);
        }

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut column_indices = Vec::with_capacity(projection.fields().len());
        let mut read_fields = Vec::with_capacity(projection.fields().len());
        for field in projection.fields() {
            let name = field.name().as_str();
            if !seen.insert(name) {
                return Err(Error::invalid_input(format!(
                    "column '{name}' is projected more than once"
                )));
            }
            let Some(&idx) = by_name.get(name) else {
                return Err(Error::NotFound(format!("column '{name}'")));
            };
            let table_field = self.table_schema.field(idx);
            if table_field.data_type() != field.data_type() {
                return Err(Error::invalid_input(format!(
                    "column '{name}' has type {}, projection requested {}",
                    table_field.data_type(),
                    field.data_type()
                )));
            }
            column_indices.push(idx);
            read_fields.push(Arc::clone(&self.table_schema.fields()[idx]));
        }

        tracing::debug!(
            projected = column_indices.len(),
            total = self.table_schema.fields().len(),
            "resolved scan projection"
        );

        let read_schema = Arc::new(Schema::new_with_metadata(
            read_fields,
            self.table_schema.metadata().clone(),
        ));
        Ok(ScanPlan::new(
            self.table_schema,
            read_schema,
            column_indices,
            true,
        ))
    }
}
