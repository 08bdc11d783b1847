//! In-memory source.
//!
//! A bare `KeyStore` already is a `Source` whose `load` does nothing, so the
//! memory source is the store itself.

pub use strata_core::KeyStore as MemorySource;

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Configurable, Source, Value};

    #[tokio::test]
    async fn test_memory_source_keeps_values_across_load() {
        let source = MemorySource::new();
        source.set("Name", Value::from("strata"));
        source.load().await.unwrap();
        assert_eq!(source.get_string("name"), "strata");
        assert_eq!(source.describe(), "memory");
    }
}
