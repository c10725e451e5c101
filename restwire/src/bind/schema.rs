//! Per-type binding schemas
//!
//! Binding is driven by an explicit schema registered per input type: a
//! list of field rules built once at startup (behind
//! `once_cell::sync::Lazy`) and reused for every request, so no request
//! ever pays for runtime type inspection. Leaf rules pair a parsed
//! source-tag declaration with a coercing setter; nested rules delegate
//! into another type's schema so arbitrarily nested inputs bind all the
//! way down.
//!
//! # Example
//!
//! ```rust
//! use once_cell::sync::Lazy;
//! use restwire::bind::{Bind, BindSchema};
//!
//! #[derive(Debug, Default)]
//! struct GetUser {
//!     id: String,
//!     page: u32,
//! }
//!
//! static SCHEMA: Lazy<BindSchema<GetUser>> = Lazy::new(|| {
//!     BindSchema::builder()
//!         .field("id", r#"path:"user_id" query:"id""#, |r: &mut GetUser| &mut r.id)
//!         .field("page", r#"query:"page""#, |r: &mut GetUser| &mut r.page)
//!         .build()
//! });
//!
//! impl Bind for GetUser {
//!     fn schema() -> &'static BindSchema<Self> {
//!         &SCHEMA
//!     }
//! }
//! ```

use super::coerce::{CoerceError, FromTokens};
use super::provider::RequestParts;
use super::tag::{self, TagSource};
use super::{BindError, Binder};

/// Input types that carry a binding schema
pub trait Bind: Sized + 'static {
    /// The schema describing how request values bind into this type
    fn schema() -> &'static BindSchema<Self>;
}

type ApplyFn<T> = Box<dyn Fn(&mut T, &[String]) -> Result<(), CoerceError> + Send + Sync>;
type NestedFn<T> = Box<dyn Fn(&Binder, &RequestParts, &mut T) -> Result<(), BindError> + Send + Sync>;

pub(crate) enum FieldRule<T> {
    Leaf {
        name: &'static str,
        sources: Vec<TagSource>,
        apply: ApplyFn<T>,
    },
    Nested(NestedFn<T>),
}

/// Binding rules for one input type, built once and reused per request
pub struct BindSchema<T> {
    pub(crate) rules: Vec<FieldRule<T>>,
}

impl<T: 'static> BindSchema<T> {
    /// Start building a schema
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { rules: Vec::new() }
    }
}

impl<T> std::fmt::Debug for BindSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let leaves: Vec<&str> = self
            .rules
            .iter()
            .filter_map(|rule| match rule {
                FieldRule::Leaf { name, .. } => Some(*name),
                FieldRule::Nested(_) => None,
            })
            .collect();
        f.debug_struct("BindSchema").field("fields", &leaves).finish()
    }
}

/// Builder collecting field rules in declaration order
pub struct SchemaBuilder<T> {
    rules: Vec<FieldRule<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declare a terminal field with its source tag and accessor
    ///
    /// The tag is parsed now, not per request; a malformed tail is flagged
    /// with a startup warning and the parsed prefix kept.
    pub fn field<V>(
        mut self,
        name: &'static str,
        tag: &str,
        access: fn(&mut T) -> &mut V,
    ) -> Self
    where
        V: FromTokens + 'static,
    {
        let parsed = tag::parse(tag);
        if parsed.malformed {
            tracing::warn!(
                field = name,
                tag,
                "malformed source tag; trailing declarations ignored"
            );
        }
        self.rules.push(FieldRule::Leaf {
            name,
            sources: parsed.sources,
            apply: Box::new(move |dest: &mut T, tokens: &[String]| {
                if let Some(value) = V::from_tokens(tokens)? {
                    *access(dest) = value;
                }
                Ok(())
            }),
        });
        self
    }

    /// Recurse into a nested structured field
    pub fn nested<U: Bind>(mut self, access: fn(&mut T) -> &mut U) -> Self {
        self.rules.push(FieldRule::Nested(Box::new(
            move |binder: &Binder, parts: &RequestParts, dest: &mut T| {
                binder.resolve_schema(U::schema(), parts, access(dest))
            },
        )));
        self
    }

    /// Recurse into an optional nested field, allocating it first
    ///
    /// An unset `Option` gets an empty instance before recursion so nested
    /// binding is never silently skipped.
    pub fn nested_opt<U: Bind + Default>(
        mut self,
        access: fn(&mut T) -> &mut Option<U>,
    ) -> Self {
        self.rules.push(FieldRule::Nested(Box::new(
            move |binder: &Binder, parts: &RequestParts, dest: &mut T| {
                let inner = access(dest).get_or_insert_with(U::default);
                binder.resolve_schema(U::schema(), parts, inner)
            },
        )));
        self
    }

    /// Freeze the schema
    pub fn build(self) -> BindSchema<T> {
        BindSchema { rules: self.rules }
    }
}
