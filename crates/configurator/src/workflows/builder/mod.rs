//! Variant builder: narrow an item's variants by spec facets.

pub mod facets;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use facets::{discover_facets, filter_variants, Facet, FacetSelection, FacetValue};
pub use router::builder_router;
pub use service::{BuilderError, BuilderMatches, BuilderService, BuilderView};
