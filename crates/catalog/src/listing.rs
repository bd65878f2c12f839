//! Listing helpers: ordering, filtering and per-actor decoration.

use serde::{Deserialize, Serialize};

use storefront_auth::{Actor, can_unpublish, has_partial_editor_insight};
use storefront_core::CategoryId;

use crate::ledger::active_version_name;
use crate::product::Product;
use crate::version::Version;

/// Listing order: name, then description, then price (all ascending).
pub fn sort_for_listing(products: &mut [Product]) {
    products.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| a.price.cmp(&b.price))
    });
}

/// Optional listing filters (by category, by case-insensitive text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub q: Option<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.q.as_deref().is_none_or(|q| q.trim().is_empty())
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category_id != category {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                product.name.to_lowercase().contains(&q) || product.description.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

/// A product as shown in a listing, with per-actor flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecoratedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub active_version_name: String,
    pub can_unpublish: bool,
    pub can_edit_as_moderator: bool,
}

/// Attach the active version name and the actor's listing flags.
///
/// Anonymous callers get `false` for both flags.
pub fn decorate_for_listing(product: Product, active: Option<&Version>, actor: Option<&Actor>) -> DecoratedProduct {
    DecoratedProduct {
        active_version_name: active_version_name(active),
        can_unpublish: actor.is_some_and(can_unpublish),
        can_edit_as_moderator: actor.is_some_and(has_partial_editor_insight),
        product,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use storefront_auth::permissions::catalog;
    use storefront_core::{ProductId, UserId, VersionId};

    use crate::ledger::NO_ACTIVE_VERSION;
    use crate::product::Price;

    fn product(name: &str, description: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            description: description.to_string(),
            image: None,
            category_id: CategoryId::new(),
            price: Price::new(Decimal::from(price)).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_published: true,
            views_counter: 0,
            owner: None,
        }
    }

    #[test]
    fn listing_sorts_by_name_description_price() {
        let mut products = vec![
            product("b", "a", 1),
            product("a", "b", 1),
            product("a", "a", 9),
            product("a", "a", 2),
        ];
        sort_for_listing(&mut products);
        let keys: Vec<(&str, &str, Decimal)> = products
            .iter()
            .map(|p| (p.name.as_str(), p.description.as_str(), p.price.amount()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a", "a", Decimal::from(2)),
                ("a", "a", Decimal::from(9)),
                ("a", "b", Decimal::from(1)),
                ("b", "a", Decimal::from(1)),
            ]
        );
    }

    #[test]
    fn filter_matches_category_and_text() {
        let p = product("Чайник", "Стальной", 1);
        let by_text = ProductFilter {
            category: None,
            q: Some("СТАЛЬ".to_string()),
        };
        assert!(by_text.matches(&p));
        let by_other_category = ProductFilter {
            category: Some(CategoryId::new()),
            q: None,
        };
        assert!(!by_other_category.matches(&p));
        assert!(ProductFilter::default().is_empty());
    }

    #[test]
    fn anonymous_decoration_has_no_flags() {
        let decorated = decorate_for_listing(product("a", "b", 1), None, None);
        assert_eq!(decorated.active_version_name, NO_ACTIVE_VERSION);
        assert!(!decorated.can_unpublish);
        assert!(!decorated.can_edit_as_moderator);
    }

    #[test]
    fn one_change_permission_is_enough_for_the_moderator_flag() {
        let p = product("a", "b", 1);
        let version = Version {
            id: VersionId::new(),
            product_id: Some(p.id),
            version_number: 1,
            version_name: Some("1.0".to_string()),
            is_current: true,
        };
        let actor = Actor::new(UserId::new(), false, vec![], vec![catalog::CAN_CHANGE_DESCRIPTION]);
        let decorated = decorate_for_listing(p, Some(&version), Some(&actor));
        assert_eq!(decorated.active_version_name, "1.0");
        assert!(decorated.can_edit_as_moderator);
        assert!(!decorated.can_unpublish);
    }
}
