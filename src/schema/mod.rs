//! Declarations loaded once per build: content types and render pipelines.
//!
//! | Type                  | Document            |
//! |-----------------------|---------------------|
//! | [`ContentDefinition`] | `types/*.yml`       |
//! | [`RenderPipeline`]    | `pipelines/*.yml`   |
//!
//! Both are immutable after loading. Front-matter values are decoded into
//! [`TypedValue`].

mod definition;
mod pipeline;
mod property;
mod query;
mod relation;
mod value;

pub use definition::ContentDefinition;
pub use pipeline::{
    ContentTypeFilter, ContextPart, EngineConfig, IteratorConfig, OutputConfig, RenderPipeline,
    Scope, WILDCARD,
};
pub use property::{Property, PropertyType};
pub use query::{Condition, Direction, Operator, Order, Query};
pub use relation::{Relation, RelationType};
pub use value::{TypedValue, ValueKind, ValueMap};
