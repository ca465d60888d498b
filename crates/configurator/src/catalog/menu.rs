use serde::Serialize;

use super::domain::{ItemId, ProductGroup};
use super::repository::{CatalogReader, RepositoryError};

/// Navigation tree of active groups and their active items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMenu {
    pub groups: Vec<MenuGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuGroup {
    pub name: String,
    pub slug: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
}

/// Build the menu; groups without active items are left out.
pub fn product_menu<C>(catalog: &C) -> Result<ProductMenu, RepositoryError>
where
    C: CatalogReader + ?Sized,
{
    let mut groups: Vec<ProductGroup> = catalog
        .groups()?
        .into_iter()
        .filter(|group| group.is_active)
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    let mut menu = Vec::with_capacity(groups.len());
    for group in groups {
        let mut items: Vec<MenuItem> = catalog
            .items_for_group(group.id)?
            .into_iter()
            .filter(|item| item.is_active)
            .map(|item| MenuItem {
                id: item.id,
                name: item.name,
            })
            .collect();
        if items.is_empty() {
            continue;
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        menu.push(MenuGroup {
            name: group.name,
            slug: group.slug,
            items,
        });
    }

    Ok(ProductMenu { groups: menu })
}
