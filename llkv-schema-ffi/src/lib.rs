//! Handle-based schema builder for foreign producers.
//!
//! An engine on the other side of a C boundary describes the columns it wants
//! (its projection) through a narrow set of callbacks; this crate owns every
//! intermediate value and assembles an Arrow [`Schema`](arrow::datatypes::Schema)
//! the scan layer can prune against.
//!
//! # Model
//!
//! Each description call inserts an element into the session's
//! [`HandleTable`] and returns an opaque, non-zero [`SchemaHandle`]. Composite
//! calls (structs, arrays, maps, the final schema) consume the handles of
//! their children. A handle is good for exactly one consuming call; `0` is
//! never issued and always means failure.
//!
//! Children must be described before their parents:
//!
//! ```rust
//! use llkv_schema_ffi::{PrimitiveKind, SchemaBuilderOptions, build_schema_with};
//!
//! let schema = build_schema_with(SchemaBuilderOptions::default(), |state| {
//!     let id = state.visit_primitive_field("id", PrimitiveKind::Long, false).unwrap();
//!     let name = state.visit_primitive_field("name", PrimitiveKind::String, true).unwrap();
//!     state.build_schema(&[id, name]).unwrap()
//! })
//! .unwrap()
//! .expect("producer returned a schema");
//!
//! assert_eq!(schema.fields().len(), 2);
//! assert_eq!(schema.field(0).name(), "id");
//! ```
//!
//! # Failure
//!
//! Nothing a producer passes in can crash the builder. Bad text, null
//! pointers, oversized lists, dead or mistyped handles all come back as the
//! null handle, with the cause available through
//! [`schema_builder_last_error`]. A list-consuming call that fails partway
//! re-issues the children it already consumed, so the table's live count is
//! unchanged by any failed call.
//!
//! # Sessions
//!
//! [`build_schema_with`] and [`build_engine_schema`] create a table, invoke
//! the producer exactly once, extract the schema, and drop the table along
//! with anything the producer left unassembled.

pub mod composite;
pub mod element;
pub mod ffi;
pub mod handle;
pub mod options;
pub mod session;
pub mod slice;
pub mod state;
pub mod visitor;

pub use element::{ElementKind, PrimitiveKind, SchemaElement};
pub use ffi::*;
pub use handle::{HandleTable, NULL_HANDLE, SchemaHandle};
pub use options::SchemaBuilderOptions;
pub use session::{
    EngineSchema, EngineSchemaVisitor, apply_engine_schema, build_engine_schema,
    build_schema_with,
};
pub use slice::{MetadataEntry, StringSlice};
pub use state::SchemaBuilderState;
pub use visitor::FieldMetadata;
