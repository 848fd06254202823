//! The cake catalog entity.

use serde::{Deserialize, Serialize};

use crate::cache::{Draft, Patch, Record};
use crate::error::ValidationError;

fn validate_rating(value: f64) -> Result<(), ValidationError> {
    if (0.0..=5.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange { value })
    }
}

fn validate_price(value: f64) -> Result<(), ValidationError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativePrice { value })
    }
}

/// A catalog cake.
///
/// `rating` is the average of approved feedback ratings and is written back by
/// an admin flow, not derived automatically on every feedback mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Cake {
    /// Backend-assigned key.
    pub id: String,
    pub name: String,
    pub description: String,
    /// URL into the image bucket, empty when no image was uploaded.
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub price: f64,
    /// Available stock.
    pub quantity: u32,
    /// Average rating in [0, 5].
    pub rating: f64,
    pub total_ratings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Cake {
    /// Returns true if the cake carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Record for Cake {
    const COLLECTION: &'static str = "cakes";

    type Draft = CakeDraft;
    type Patch = CakePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn apply_patch(&mut self, patch: &CakePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(total_ratings) = patch.total_ratings {
            self.total_ratings = total_ratings;
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
    }

    fn touch(&mut self, at_millis: i64) {
        self.updated_at = at_millis;
    }
}

/// Creation input for a cake. New cakes start unrated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CakeDraft {
    pub name: String,
    pub description: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
    pub rating: f64,
    pub total_ratings: u32,
    pub tags: Vec<String>,
}

impl CakeDraft {
    /// Builds a draft with an unrated starting state.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
        quantity: u32,
        tags: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: image_url.into(),
            price,
            quantity,
            rating: 0.0,
            total_ratings: 0,
            tags,
        }
    }
}

impl Draft for CakeDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        validate_price(self.price)?;
        validate_rating(self.rating)
    }
}

/// Partial update for a cake. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CakePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CakePatch {
    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the price.
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Sets the available stock.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Sets the aggregated rating and rating count.
    #[must_use]
    pub const fn with_rating(mut self, rating: f64, total_ratings: u32) -> Self {
        self.rating = Some(rating);
        self.total_ratings = Some(total_ratings);
        self
    }

    /// Replaces the tag list.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Sets the image URL.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

impl Patch for CakePatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyField { field: "name" });
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }
}
