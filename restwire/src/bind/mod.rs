//! Declarative request binding
//!
//! Fields of an input type declare where their values come from with source
//! tags (`path:"user_id" query:"id"`); the binder walks the type's
//! [`BindSchema`], asks the [`ProviderRegistry`] for each declared source in
//! order, and binds the first source that yields values. Fields no source
//! covers keep their current value; that is not an error.
//!
//! The binder and its registry are built once, before the route table
//! freezes, and shared read-only across requests.

mod coerce;
mod provider;
mod schema;
mod tag;

pub use coerce::{CoerceError, FromToken, FromTokens};
pub use provider::{Provider, ProviderRegistry, RequestParts, HEADER, PATH, QUERY};
pub use schema::{Bind, BindSchema, SchemaBuilder};
pub use tag::TagSource;

use schema::FieldRule;
use thiserror::Error;

/// Binding failure: a declared source produced tokens the field rejected
#[derive(Debug, Error)]
#[error("field {field}: {source}")]
pub struct BindError {
    /// Name of the field whose coercion failed
    pub field: &'static str,
    /// The underlying coercion failure
    #[source]
    pub source: CoerceError,
}

/// Resolves tagged fields of an input value from request parts
#[derive(Debug, Clone, Default)]
pub struct Binder {
    registry: ProviderRegistry,
}

impl Binder {
    /// Binder with the built-in `path`, `query`, and `header` providers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider under a source name before the binder is shared
    #[must_use]
    pub fn with_provider<F>(mut self, name: &str, provider: F) -> Self
    where
        F: Fn(&RequestParts, &str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.registry.register(name, provider);
        self
    }

    /// Resolve every tagged field of `dest` from the request parts
    ///
    /// Nested rules recurse first-class; leaf rules consult their declared
    /// sources left-to-right and bind the first non-empty value list. A
    /// field whose sources are all silent keeps its current value.
    pub fn resolve<T: Bind>(&self, parts: &RequestParts, dest: &mut T) -> Result<(), BindError> {
        self.resolve_schema(T::schema(), parts, dest)
    }

    pub(crate) fn resolve_schema<T>(
        &self,
        schema: &BindSchema<T>,
        parts: &RequestParts,
        dest: &mut T,
    ) -> Result<(), BindError> {
        for rule in &schema.rules {
            match rule {
                FieldRule::Leaf {
                    name,
                    sources,
                    apply,
                } => {
                    if let Some(tokens) = self.lookup(parts, sources) {
                        apply(dest, &tokens)
                            .map_err(|source| BindError { field: *name, source })?;
                    }
                }
                FieldRule::Nested(run) => run(self, parts, dest)?,
            }
        }
        Ok(())
    }

    /// First declared source whose provider yields a non-empty value list
    ///
    /// Unregistered source names are skipped, so foreign tags like serde's
    /// `json` never participate.
    fn lookup(&self, parts: &RequestParts, sources: &[TagSource]) -> Option<Vec<String>> {
        for declared in sources {
            let Some(provider) = self.registry.get(&declared.source) else {
                continue;
            };
            if let Some(values) = provider(parts, &declared.key) {
                if !values.is_empty() {
                    return Some(values);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue};
    use once_cell::sync::Lazy;

    fn parts(path: &[(&str, &str)], raw_query: &str, headers: &[(&str, &str)]) -> RequestParts {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            header_map.append(
                http::header::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        RequestParts::new(
            path.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            raw_query,
            header_map,
        )
    }

    #[derive(Debug, Default, PartialEq)]
    struct ScalarRequest {
        name: String,
        age: i32,
        active: bool,
        score: f64,
    }

    static SCALAR_SCHEMA: Lazy<BindSchema<ScalarRequest>> = Lazy::new(|| {
        BindSchema::builder()
            .field("name", r#"query:"name""#, |r: &mut ScalarRequest| &mut r.name)
            .field("age", r#"query:"age""#, |r: &mut ScalarRequest| &mut r.age)
            .field("active", r#"query:"active""#, |r: &mut ScalarRequest| {
                &mut r.active
            })
            .field("score", r#"query:"score""#, |r: &mut ScalarRequest| {
                &mut r.score
            })
            .build()
    });

    impl Bind for ScalarRequest {
        fn schema() -> &'static BindSchema<Self> {
            &SCALAR_SCHEMA
        }
    }

    #[test]
    fn test_scalar_types() {
        let binder = Binder::new();
        let parts = parts(&[], "name=Gopher&age=10&active=true&score=99.9", &[]);

        let mut req = ScalarRequest::default();
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.name, "Gopher");
        assert_eq!(req.age, 10);
        assert!(req.active);
        assert!((req.score - 99.9).abs() < 1e-9);
    }

    #[derive(Debug, Default)]
    struct SliceRequest {
        tags: Vec<String>,
        nums: Vec<i32>,
    }

    static SLICE_SCHEMA: Lazy<BindSchema<SliceRequest>> = Lazy::new(|| {
        BindSchema::builder()
            .field("tags", r#"query:"tag""#, |r: &mut SliceRequest| &mut r.tags)
            .field("nums", r#"query:"num""#, |r: &mut SliceRequest| &mut r.nums)
            .build()
    });

    impl Bind for SliceRequest {
        fn schema() -> &'static BindSchema<Self> {
            &SLICE_SCHEMA
        }
    }

    #[test]
    fn test_slices_preserve_order_and_count() {
        let binder = Binder::new();
        let parts = parts(&[], "tag=a&tag=b&num=1&num=2", &[]);

        let mut req = SliceRequest::default();
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(req.nums, vec![1, 2]);
    }

    #[derive(Debug, Default)]
    struct PrecedenceRequest {
        path_first: String,
        query_first: String,
        fallback_to_query: String,
    }

    static PRECEDENCE_SCHEMA: Lazy<BindSchema<PrecedenceRequest>> = Lazy::new(|| {
        BindSchema::builder()
            .field(
                "path_first",
                r#"path:"my_key" query:"my_key""#,
                |r: &mut PrecedenceRequest| &mut r.path_first,
            )
            .field(
                "query_first",
                r#"query:"my_key" path:"my_key""#,
                |r: &mut PrecedenceRequest| &mut r.query_first,
            )
            .field(
                "fallback_to_query",
                r#"path:"missing_key" query:"my_key""#,
                |r: &mut PrecedenceRequest| &mut r.fallback_to_query,
            )
            .build()
    });

    impl Bind for PrecedenceRequest {
        fn schema() -> &'static BindSchema<Self> {
            &PRECEDENCE_SCHEMA
        }
    }

    #[test]
    fn test_declaration_order_decides_precedence() {
        let binder = Binder::new();
        let parts = parts(
            &[("my_key", "value_from_path")],
            "my_key=value_from_query",
            &[],
        );

        let mut req = PrecedenceRequest::default();
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.path_first, "value_from_path");
        assert_eq!(req.query_first, "value_from_query");
        assert_eq!(req.fallback_to_query, "value_from_query");
    }

    #[derive(Debug, Default)]
    struct Metadata {
        request_id: String,
    }

    static METADATA_SCHEMA: Lazy<BindSchema<Metadata>> = Lazy::new(|| {
        BindSchema::builder()
            .field(
                "request_id",
                r#"header:"X-Request-ID""#,
                |m: &mut Metadata| &mut m.request_id,
            )
            .build()
    });

    impl Bind for Metadata {
        fn schema() -> &'static BindSchema<Self> {
            &METADATA_SCHEMA
        }
    }

    #[derive(Debug, Default)]
    struct NestedRequest {
        meta: Metadata,
        meta_opt: Option<Metadata>,
    }

    static NESTED_SCHEMA: Lazy<BindSchema<NestedRequest>> = Lazy::new(|| {
        BindSchema::builder()
            .nested(|r: &mut NestedRequest| &mut r.meta)
            .nested_opt(|r: &mut NestedRequest| &mut r.meta_opt)
            .build()
    });

    impl Bind for NestedRequest {
        fn schema() -> &'static BindSchema<Self> {
            &NESTED_SCHEMA
        }
    }

    #[test]
    fn test_nested_structs_and_optional_allocation() {
        let binder = Binder::new();
        let parts = parts(&[], "", &[("X-Request-ID", "123-abc")]);

        let mut req = NestedRequest::default();
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.meta.request_id, "123-abc");
        let allocated = req.meta_opt.expect("optional nested struct allocated");
        assert_eq!(allocated.request_id, "123-abc");
    }

    #[test]
    fn test_absent_sources_keep_defaults() {
        let binder = Binder::new();
        let parts = parts(&[], "", &[]);

        let mut req = ScalarRequest {
            name: "initial".to_string(),
            age: 7,
            active: true,
            score: 1.5,
        };
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.name, "initial");
        assert_eq!(req.age, 7);
        assert!(req.active);
        assert!((req.score - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_token_reports_field() {
        let binder = Binder::new();
        let parts = parts(&[], "age=not_a_number", &[]);

        let mut req = ScalarRequest::default();
        let err = binder.resolve(&parts, &mut req).unwrap_err();

        assert_eq!(err.field, "age");
        assert_eq!(err.source.token, "not_a_number");
        assert_eq!(err.source.target, "i32");
    }

    #[derive(Debug, Default)]
    struct ForeignTagRequest {
        name: String,
    }

    static FOREIGN_SCHEMA: Lazy<BindSchema<ForeignTagRequest>> = Lazy::new(|| {
        BindSchema::builder()
            .field(
                "name",
                r#"json:"name" query:"name""#,
                |r: &mut ForeignTagRequest| &mut r.name,
            )
            .build()
    });

    impl Bind for ForeignTagRequest {
        fn schema() -> &'static BindSchema<Self> {
            &FOREIGN_SCHEMA
        }
    }

    #[test]
    fn test_unregistered_source_skipped() {
        let binder = Binder::new();
        let parts = parts(&[], "name=from_query", &[]);

        let mut req = ForeignTagRequest::default();
        binder.resolve(&parts, &mut req).unwrap();

        assert_eq!(req.name, "from_query");
    }

    #[test]
    fn test_custom_provider() {
        let binder = Binder::new().with_provider("fixed", |_, key| {
            (key == "name").then(|| vec!["constant".to_string()])
        });

        #[derive(Debug, Default)]
        struct FixedRequest {
            name: String,
        }

        static FIXED_SCHEMA: Lazy<BindSchema<FixedRequest>> = Lazy::new(|| {
            BindSchema::builder()
                .field("name", r#"fixed:"name""#, |r: &mut FixedRequest| &mut r.name)
                .build()
        });

        impl Bind for FixedRequest {
            fn schema() -> &'static BindSchema<Self> {
                &FIXED_SCHEMA
            }
        }

        let mut req = FixedRequest::default();
        binder.resolve(&parts(&[], "", &[]), &mut req).unwrap();
        assert_eq!(req.name, "constant");
    }
}
