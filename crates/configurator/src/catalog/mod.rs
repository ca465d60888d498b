//! Authored catalog: product groups, items, quiz questions with their choices
//! and score impacts, and item variants.

pub mod domain;
pub mod import;
pub mod menu;
pub mod repository;
pub mod router;
pub mod slug;
pub mod validation;

pub use domain::{
    Choice, ChoiceId, ChoiceImpact, GroupId, ImpactWeight, InputType, Item, ItemId, ItemSpec,
    ItemVariant, ProductGroup, Question, QuestionId, VariantId, VariantSpec,
};
pub use import::{
    ImportError, ImportMode, ImportOptions, ImportSummary, ItemImportOptions, ItemImporter,
    QuestionImporter,
};
pub use menu::{product_menu, MenuGroup, MenuItem, ProductMenu};
pub use repository::{CatalogReader, CatalogWriter, ImpactReader, RepositoryError};
pub use router::catalog_router;
pub use slug::slugify;
pub use validation::CatalogViolation;
