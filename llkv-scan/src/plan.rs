use arrow::datatypes::SchemaRef;

/// Resolved column selection for a scan.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    table_schema: SchemaRef,
    read_schema: SchemaRef,
    column_indices: Vec<usize>,
    projected: bool,
}

impl ScanPlan {
    pub(crate) fn new(
        table_schema: SchemaRef,
        read_schema: SchemaRef,
        column_indices: Vec<usize>,
        projected: bool,
    ) -> Self {
        debug_assert_eq!(read_schema.fields().len(), column_indices.len());
        Self {
            table_schema,
            read_schema,
            column_indices,
            projected,
        }
    }

    pub fn table_schema(&self) -> &SchemaRef {
        &self.table_schema
    }

    /// Schema of the batches this scan emits.
    pub fn read_schema(&self) -> &SchemaRef {
        &self.read_schema
    }

    /// Table column index for each output column, in output order.
    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    /// `false` when the scan reads every column because no projection was set.
    pub fn is_projected(&self) -> bool {
        self.projected
    }

    /// Number of table columns the scan skips.
    pub fn pruned_columns(&self) -> usize {
        self.table_schema.fields().len() - self.column_indices.len()
    }
}
