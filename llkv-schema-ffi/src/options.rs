//! Session limits and policies, with `LLKV_SCHEMA_*` environment overrides.

/// Default ceiling on the number of handles accepted in a single list.
pub const DEFAULT_MAX_FIELD_COUNT: usize = 10_000;

/// Default ceiling on the byte length of a field name.
pub const DEFAULT_MAX_NAME_BYTES: usize = 64 * 1024;

pub const MAX_FIELDS_ENV: &str = "LLKV_SCHEMA_MAX_FIELDS";
pub const MAX_NAME_BYTES_ENV: &str = "LLKV_SCHEMA_MAX_NAME_BYTES";
pub const REJECT_DUPLICATE_NAMES_ENV: &str = "LLKV_SCHEMA_REJECT_DUPLICATE_NAMES";

/// Limits and policies for one schema-building session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaBuilderOptions {
    /// Largest handle list accepted by struct and schema assembly.
    pub max_field_count: usize,
    /// Largest field name, in bytes, accepted from a producer.
    pub max_name_bytes: usize,
    /// Reject struct/schema assembly when two siblings share a name. Off by
    /// default: duplicates pass through to the consumer of the schema.
    pub reject_duplicate_names: bool,
}

impl Default for SchemaBuilderOptions {
    fn default() -> Self {
        Self {
            max_field_count: DEFAULT_MAX_FIELD_COUNT,
            max_name_bytes: DEFAULT_MAX_NAME_BYTES,
            reject_duplicate_names: false,
        }
    }
}

impl SchemaBuilderOptions {
    /// Defaults overridden by `LLKV_SCHEMA_*` environment variables.
    ///
    /// Values that fail to parse are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(value) = parse_var(&lookup, MAX_FIELDS_ENV) {
            options.max_field_count = value;
        }
        if let Some(value) = parse_var(&lookup, MAX_NAME_BYTES_ENV) {
            options.max_name_bytes = value;
        }
        if let Some(value) = parse_var(&lookup, REJECT_DUPLICATE_NAMES_ENV) {
            options.reject_duplicate_names = value;
        }
        options
    }

    pub fn with_max_field_count(mut self, max_field_count: usize) -> Self {
        self.max_field_count = max_field_count;
        self
    }

    pub fn with_max_name_bytes(mut self, max_name_bytes: usize) -> Self {
        self.max_name_bytes = max_name_bytes;
        self
    }

    pub fn with_reject_duplicate_names(mut self, reject: bool) -> Self {
        self.reject_duplicate_names = reject;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable schema builder setting");
            None
        }
    }
}
