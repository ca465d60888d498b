use std::sync::Arc;

use serde::Serialize;

use super::facets::{discover_facets, filter_variants, Facet, FacetSelection};
use crate::catalog::domain::{Item, ItemId, ItemVariant, ProductGroup};
use crate::catalog::repository::{CatalogReader, RepositoryError};

/// Facet form of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderView {
    pub group: ProductGroup,
    pub item: Item,
    pub facets: Vec<Facet>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuilderMatches {
    #[serde(flatten)]
    pub view: BuilderView,
    pub selection: FacetSelection,
    pub matches: Vec<ItemVariant>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    #[error("product group '{0}' not found")]
    GroupNotFound(String),
    #[error("item {0} not found in this group")]
    ItemNotFound(ItemId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Variant builder over an item's spec facets.
pub struct BuilderService<C> {
    catalog: Arc<C>,
}

impl<C> BuilderService<C>
where
    C: CatalogReader,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    pub fn facets(&self, slug: &str, item_id: ItemId) -> Result<BuilderView, BuilderError> {
        let (view, _) = self.load(slug, item_id)?;
        Ok(view)
    }

    pub fn matches(
        &self,
        slug: &str,
        item_id: ItemId,
        selection: FacetSelection,
    ) -> Result<BuilderMatches, BuilderError> {
        let (view, variants) = self.load(slug, item_id)?;
        let matches: Vec<ItemVariant> = filter_variants(&variants, &selection)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(
            item = %item_id,
            constrained = selection.pairs().len(),
            matches = matches.len(),
            "variant builder filtered"
        );
        Ok(BuilderMatches {
            view,
            selection,
            matches,
        })
    }

    fn load(
        &self,
        slug: &str,
        item_id: ItemId,
    ) -> Result<(BuilderView, Vec<ItemVariant>), BuilderError> {
        let group = self
            .catalog
            .group_by_slug(slug)?
            .filter(|group| group.is_active)
            .ok_or_else(|| BuilderError::GroupNotFound(slug.to_string()))?;
        let item = self
            .catalog
            .item(item_id)?
            .filter(|item| item.is_active && item.group_id == group.id)
            .ok_or(BuilderError::ItemNotFound(item_id))?;

        let variants = self.catalog.variants_for_item(item.id)?;
        let facets = discover_facets(&variants);
        let tags = facets.iter().map(|facet| facet.label.clone()).collect();

        Ok((
            BuilderView {
                group,
                item,
                facets,
                tags,
            },
            variants,
        ))
    }
}
