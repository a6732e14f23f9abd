use std::ffi::c_void;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use llkv_scan::{ScanBuilder, ScanPlan};
use llkv_schema_ffi::{
    EngineSchema, NULL_HANDLE, PrimitiveFieldVisitor, SchemaBuilderOptions, SchemaBuilderState,
    SchemaErrorCode, SchemaHandle, StringSlice, apply_engine_schema, build_schema,
    schema_builder_last_error, visit_schema_boolean, visit_schema_long, visit_schema_string,
};
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("engine rejected while describing '{column}': {code:?}")]
    Describe {
        column: &'static str,
        code: SchemaErrorCode,
    },
    #[error(transparent)]
    Llkv(#[from] llkv_result::error::Error),
}

type Result<T> = std::result::Result<T, Error>;

const APP_TITLE: &str = env!("CARGO_PKG_NAME");

/// Column types the mock engine knows about.
#[derive(Clone, Copy)]
enum EngineType {
    BigInt,
    Text,
    Bool,
}

struct EngineColumn {
    name: &'static str,
    ty: EngineType,
    nullable: bool,
}

/// Stand-in for a foreign query engine. Its projection is read back through
/// the `extern "C"` callback below, exactly as a C caller would provide it.
struct MockEngine {
    projection: Vec<EngineColumn>,
    failure: Option<Error>,
}

extern "C" fn describe_projection(
    schema: *mut c_void,
    state: &mut SchemaBuilderState,
) -> SchemaHandle {
    // SAFETY: `schema` is the `MockEngine` registered in `main`, alive for
    // the whole session.
    let engine = unsafe { &mut *(schema as *mut MockEngine) };

    let mut handles = Vec::with_capacity(engine.projection.len());
    for column in &engine.projection {
        let visit: PrimitiveFieldVisitor = match column.ty {
            EngineType::BigInt => visit_schema_long,
            EngineType::Text => visit_schema_string,
            EngineType::Bool => visit_schema_boolean,
        };
        let name = StringSlice::new(column.name);
        let handle = unsafe {
            visit(Some(&mut *state), name, column.nullable, std::ptr::null(), 0)
        };
        if handle == NULL_HANDLE {
            engine.failure = Some(Error::Describe {
                column: column.name,
                code: schema_builder_last_error(Some(&*state)),
            });
            return NULL_HANDLE;
        }
        handles.push(handle);
    }
    unsafe { build_schema(Some(state), handles.as_ptr(), handles.len()) }
}

fn table_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("email", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, false),
        Field::new("score", DataType::Float64, true),
    ]))
}

fn print_plan(plan: &ScanPlan) {
    println!(
        "reading {} of {} columns ({} pruned)",
        plan.column_indices().len(),
        plan.table_schema().fields().len(),
        plan.pruned_columns()
    );
    for (field, idx) in plan.read_schema().fields().iter().zip(plan.column_indices()) {
        println!(
            "  [{idx}] {:<8} {:<10} {}",
            field.name(),
            field.data_type().to_string(),
            if field.is_nullable() { "NULL" } else { "NOT NULL" }
        );
    }
}

fn run() -> Result<()> {
    let mut engine = MockEngine {
        projection: vec![
            EngineColumn {
                name: "id",
                ty: EngineType::BigInt,
                nullable: false,
            },
            EngineColumn {
                name: "name",
                ty: EngineType::Text,
                nullable: true,
            },
            EngineColumn {
                name: "active",
                ty: EngineType::Bool,
                nullable: false,
            },
        ],
        failure: None,
    };
    let engine_schema = EngineSchema {
        schema: &mut engine as *mut MockEngine as *mut c_void,
        visitor: describe_projection,
    };

    println!("{APP_TITLE}: full table scan");
    print_plan(&ScanBuilder::new(table_schema()).build()?);

    let options = SchemaBuilderOptions::from_env();
    let builder = unsafe {
        apply_engine_schema(ScanBuilder::new(table_schema()), Some(&engine_schema), options)
    }?;
    if let Some(err) = engine.failure.take() {
        return Err(err);
    }

    println!("{APP_TITLE}: engine projection");
    print_plan(&builder.build()?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "projection demo failed");
        std::process::exit(1);
    }
}
