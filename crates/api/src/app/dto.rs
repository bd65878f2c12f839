use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_catalog::{ModeratorForm, Product, ProductForm, Version, VersionEntry};
use storefront_core::{CategoryId, DomainError, DomainResult, FieldError, ProductId};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /product/{id}/update`.
///
/// Carries the full form; a moderated edit binds only `description`,
/// `category_id` and `is_published` and ignores the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

impl UpdateProductRequest {
    pub fn full_form(&self) -> DomainResult<ProductForm> {
        let mut errors = Vec::new();
        if self.name.is_none() {
            errors.push(FieldError::new("name", "this field is required"));
        }
        if self.price.is_none() {
            errors.push(FieldError::new("price", "this field is required"));
        }
        DomainError::from_field_errors(errors)?;

        Ok(ProductForm {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone(),
            image: self.image.clone(),
            category_id: self.category_id,
            price: self.price.unwrap_or_default(),
            is_published: self.is_published,
        })
    }

    pub fn moderator_form(&self) -> ModeratorForm {
        ModeratorForm {
            description: self.description.clone(),
            category_id: self.category_id,
            is_published: self.is_published,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVersionRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub version_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVersionRequest {
    #[serde(default)]
    pub version_number: Option<u32>,
    #[serde(default)]
    pub version_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionListQuery {
    #[serde(default)]
    pub product: Option<ProductId>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Product detail page: the product, its history (current first) and the
/// active version name. Cached as a whole when page caching is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub versions: Vec<Version>,
    pub active_version_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> UpdateProductRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn full_form_requires_name_and_price() {
        let req = request(json!({
            "description": "d",
            "category_id": CategoryId::new(),
        }));
        let err = req.full_form().unwrap_err();
        let DomainError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().filter_map(|f| f.field.as_deref()).collect();
        assert_eq!(names, vec!["name", "price"]);
    }

    #[test]
    fn moderator_form_ignores_owner_only_fields() {
        let category_id = CategoryId::new();
        let req = request(json!({
            "name": "Renamed",
            "description": "new text",
            "category_id": category_id,
            "price": "1.00",
            "is_published": true,
            "versions": [{"version_name": "9.9", "is_current": true}],
        }));
        let form = req.moderator_form();
        assert_eq!(form.description, "new text");
        assert_eq!(form.category_id, category_id);
        assert!(form.is_published);
    }
}
