use super::domain::{
    Choice, ChoiceId, ChoiceImpact, GroupId, ImpactWeight, Item, ItemId, ItemVariant,
    ProductGroup, Question, QuestionId,
};
use super::validation::CatalogViolation;

/// Read access to the authored catalog.
///
/// Listing methods return inactive rows as well; callers decide what to show.
pub trait CatalogReader: Send + Sync {
    fn groups(&self) -> Result<Vec<ProductGroup>, RepositoryError>;
    fn group_by_slug(&self, slug: &str) -> Result<Option<ProductGroup>, RepositoryError>;
    /// Questions of a group ordered by `order`, then id.
    fn questions_for_group(&self, group: GroupId) -> Result<Vec<Question>, RepositoryError>;
    fn question(&self, id: QuestionId) -> Result<Option<Question>, RepositoryError>;
    /// Choices of a question ordered by `order`, then id.
    fn choices_for_question(&self, question: QuestionId) -> Result<Vec<Choice>, RepositoryError>;
    fn choice(&self, id: ChoiceId) -> Result<Option<Choice>, RepositoryError>;
    fn item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;
    /// Item carrying `code`, in any group.
    fn item_by_code(&self, code: &str) -> Result<Option<Item>, RepositoryError>;
    /// Items of a group ordered by name.
    fn items_for_group(&self, group: GroupId) -> Result<Vec<Item>, RepositoryError>;
    fn variants_for_item(&self, item: ItemId) -> Result<Vec<ItemVariant>, RepositoryError>;
}

/// Choice-to-item score contributions.
pub trait ImpactReader: Send + Sync {
    fn impacts_for_choice(&self, choice: ChoiceId) -> Result<Vec<ImpactWeight>, RepositoryError>;
}

/// Administrative writes. Saves upsert by id; question saves are validated
/// against the stored catalog first and item codes stay unique.
pub trait CatalogWriter: Send + Sync {
    /// Reserve a fresh identifier for a new catalog row.
    fn next_id(&self) -> u64;
    fn save_group(&self, group: ProductGroup) -> Result<ProductGroup, RepositoryError>;
    fn save_item(&self, item: Item) -> Result<Item, RepositoryError>;
    fn save_question(&self, question: Question) -> Result<Question, RepositoryError>;
    fn save_choice(&self, choice: Choice) -> Result<Choice, RepositoryError>;
    /// Remove every choice of a question, returning how many were dropped.
    fn clear_choices(&self, question: QuestionId) -> Result<usize, RepositoryError>;
    /// Insert or replace the impact for its (choice, item) pair.
    fn save_impact(&self, impact: ChoiceImpact) -> Result<(), RepositoryError>;
    fn save_variant(&self, variant: ItemVariant) -> Result<ItemVariant, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("catalog rejected: {0}")]
    Invalid(#[from] CatalogViolation),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
