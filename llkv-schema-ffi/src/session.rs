//! Session driver: one producer callback, one handle table, one result.

use std::ffi::c_void;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use llkv_result::Result;
use llkv_scan::ScanBuilder;

use crate::handle::{NULL_HANDLE, SchemaHandle};
use crate::options::SchemaBuilderOptions;
use crate::state::SchemaBuilderState;

/// Producer callback: describe a schema into `state` and return the handle
/// of the finished schema, or `0` to decline.
pub type EngineSchemaVisitor =
    extern "C" fn(schema: *mut c_void, state: &mut SchemaBuilderState) -> SchemaHandle;

/// A producer's description of the schema it wants: an opaque context the
/// producer owns plus the callback that reads it.
///
/// The callback is invoked once per session and never retained afterwards.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct EngineSchema {
    pub schema: *mut c_void,
    pub visitor: EngineSchemaVisitor,
}

/// Run one description session with a Rust producer.
///
/// Returns `Ok(None)` when the producer returns the null handle, and an error
/// when it returns a handle that is unknown or does not name a schema.
/// Elements the producer created but never assembled are dropped with the
/// session.
pub fn build_schema_with<F>(options: SchemaBuilderOptions, producer: F) -> Result<Option<SchemaRef>>
where
    F: FnOnce(&mut SchemaBuilderState) -> SchemaHandle,
{
    let mut state = SchemaBuilderState::new(options);
    let handle = producer(&mut state);

    let outcome = if handle == NULL_HANDLE {
        tracing::debug!(last_error = ?state.last_error(), "producer returned no schema");
        Ok(None)
    } else {
        state
            .take_schema(handle)
            .map(|schema| Some(Arc::new(schema)))
    };

    match &outcome {
        Ok(Some(schema)) => {
            tracing::debug!(fields = schema.fields().len(), "schema session complete")
        }
        Ok(None) => {}
        Err(err) => {
            tracing::debug!(handle, error = %err, "producer returned an invalid schema handle")
        }
    }

    let leftover = state.live_elements();
    if leftover > 0 {
        tracing::debug!(leftover, "dropping unconsumed schema elements");
    }
    outcome
}

/// Run one description session with a C producer.
///
/// # Safety
///
/// `engine.schema` must be whatever `engine.visitor` expects, and stay valid
/// for the duration of this call.
pub unsafe fn build_engine_schema(
    engine: &EngineSchema,
    options: SchemaBuilderOptions,
) -> Result<Option<SchemaRef>> {
    build_schema_with(options, |state| (engine.visitor)(engine.schema, state))
}

/// Narrow `builder` to the producer's schema, if there is one.
///
/// A missing producer, or a producer that declines, leaves `builder` as it
/// was: every column is read.
///
/// # Safety
///
/// Same contract as [`build_engine_schema`] when `engine` is `Some`.
pub unsafe fn apply_engine_schema(
    builder: ScanBuilder,
    engine: Option<&EngineSchema>,
    options: SchemaBuilderOptions,
) -> Result<ScanBuilder> {
    let Some(engine) = engine else {
        return Ok(builder);
    };
    match unsafe { build_engine_schema(engine, options) }? {
        Some(schema) => Ok(builder.with_schema(Some(schema))),
        None => Ok(builder),
    }
}
