use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity, FieldError};

use crate::char_len;

pub const CATEGORY_NAME_MAX_LEN: usize = 50;

/// A product category. No lifecycle beyond creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub description: String,
}

impl CategoryForm {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "this field is required"));
        } else if char_len(&self.name) > CATEGORY_NAME_MAX_LEN {
            errors.push(FieldError::new(
                "name",
                format!("ensure this value has at most {CATEGORY_NAME_MAX_LEN} characters"),
            ));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "this field is required"));
        }
        DomainError::from_field_errors(errors)
    }
}

impl Category {
    pub fn create(id: CategoryId, form: CategoryForm) -> DomainResult<Self> {
        form.validate()?;
        Ok(Self {
            id,
            name: form.name,
            description: form.description,
        })
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
