use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_auth::Owned;
use storefront_core::{
    CategoryId, DomainError, DomainResult, Entity, FieldError, ProductId, UserId, ValueObject,
};

use crate::{char_len, denylist};

pub const PRODUCT_NAME_MAX_LEN: usize = 50;
pub const PRODUCT_DESCRIPTION_MAX_LEN: usize = 500;
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Non-negative price with at most 10 digits, 2 of them after the point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl ValueObject for Price {}

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, FieldError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(FieldError::new("price", "ensure this value is greater than or equal to 0"));
        }
        let normalized = amount.normalize();
        if normalized.scale() > PRICE_DECIMAL_PLACES {
            return Err(FieldError::new(
                "price",
                format!("ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places"),
            ));
        }
        let integer_digits = normalized.trunc().abs().to_string().trim_start_matches('0').len() as u32;
        if integer_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
            return Err(FieldError::new(
                "price",
                format!("ensure that there are no more than {PRICE_MAX_DIGITS} digits in total"),
            ));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_published: bool,
    pub views_counter: u64,
    /// Nulled when the owning user is removed.
    pub owner: Option<UserId>,
}

/// Full-edit form: every user-editable field.
///
/// `views_counter` and `owner` are never bound from input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: CategoryId,
    pub price: Decimal,
    #[serde(default)]
    pub is_published: bool,
}

/// Moderated-edit form: description, category and publish status only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModeratorForm {
    pub description: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub is_published: bool,
}

fn validate_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.trim().is_empty() {
        errors.push(FieldError::new("description", "this field is required"));
    } else if char_len(description) > PRODUCT_DESCRIPTION_MAX_LEN {
        errors.push(FieldError::new(
            "description",
            format!("ensure this value has at most {PRODUCT_DESCRIPTION_MAX_LEN} characters"),
        ));
    } else if let Some(err) = denylist::check("description", description) {
        errors.push(err);
    }
}

impl ProductForm {
    /// Validate every field, collecting all failures.
    pub fn validate(&self) -> DomainResult<Price> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "this field is required"));
        } else if char_len(&self.name) > PRODUCT_NAME_MAX_LEN {
            errors.push(FieldError::new(
                "name",
                format!("ensure this value has at most {PRODUCT_NAME_MAX_LEN} characters"),
            ));
        } else if let Some(err) = denylist::check("name", &self.name) {
            errors.push(err);
        }

        validate_description(&self.description, &mut errors);

        let price = Price::new(self.price).map_err(|e| errors.push(e)).ok();

        DomainError::from_field_errors(errors)?;
        price.ok_or_else(|| DomainError::invariant("price missing after validation"))
    }
}

impl ModeratorForm {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        validate_description(&self.description, &mut errors);
        DomainError::from_field_errors(errors)
    }
}

impl Product {
    /// Create a product owned by `owner`.
    pub fn create(id: ProductId, form: ProductForm, owner: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        let price = form.validate()?;
        Ok(Self {
            id,
            name: form.name,
            description: form.description,
            image: form.image,
            category_id: form.category_id,
            price,
            created_at: now,
            updated_at: now,
            is_published: form.is_published,
            views_counter: 0,
            owner: Some(owner),
        })
    }

    /// Replace every user-editable field.
    pub fn apply_full_edit(&mut self, form: ProductForm, now: DateTime<Utc>) -> DomainResult<()> {
        let price = form.validate()?;
        self.name = form.name;
        self.description = form.description;
        self.image = form.image;
        self.category_id = form.category_id;
        self.price = price;
        self.is_published = form.is_published;
        self.updated_at = now;
        Ok(())
    }

    /// Replace only the moderator-editable fields.
    pub fn apply_moderated_edit(&mut self, form: ModeratorForm, now: DateTime<Utc>) -> DomainResult<()> {
        form.validate()?;
        self.description = form.description;
        self.category_id = form.category_id;
        self.is_published = form.is_published;
        self.updated_at = now;
        Ok(())
    }

    /// One detail-view access.
    pub fn record_view(&mut self) {
        self.views_counter = self.views_counter.saturating_add(1);
    }
}

impl Owned for Product {
    fn owner(&self) -> Option<UserId> {
        self.owner
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
