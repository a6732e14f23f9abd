use std::sync::Once;

use arrow::datatypes::{DataType, Schema};

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset or unparseable.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // Another harness may already have installed a global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// Top-level field names of `schema`, in order.
pub fn field_names(schema: &Schema) -> Vec<&str> {
    schema.fields().iter().map(|f| f.name().as_str()).collect()
}

/// Assert that `schema` has exactly the `(name, type, nullable)` fields
/// listed, in order.
#[track_caller]
pub fn assert_schema_fields(schema: &Schema, expected: &[(&str, DataType, bool)]) {
    let actual: Vec<(&str, &DataType, bool)> = schema
        .fields()
        .iter()
        .map(|f| (f.name().as_str(), f.data_type(), f.is_nullable()))
        .collect();
    let expected: Vec<(&str, &DataType, bool)> = expected
        .iter()
        .map(|(name, data_type, nullable)| (*name, data_type, *nullable))
        .collect();
    assert_eq!(actual, expected, "schema fields differ");
}

#[cfg(feature = "auto-init")]
mod auto {
    // Use ctor to run at binary init time to avoid having to call init in every test.
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    #[test]
    fn assert_schema_fields_accepts_matching_schema() {
        init_tracing_for_tests();
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
        ]);
        assert_schema_fields(
            &schema,
            &[("id", DataType::Int64, false), ("name", DataType::Utf8, true)],
        );
        assert_eq!(field_names(&schema), ["id", "name"]);
    }

    #[test]
    #[should_panic(expected = "schema fields differ")]
    fn assert_schema_fields_rejects_reordered_schema() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Int32, true),
        ]);
        assert_schema_fields(
            &schema,
            &[("b", DataType::Int32, true), ("a", DataType::Int32, true)],
        );
    }
}
