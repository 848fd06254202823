//! The feedback entity: a customer rating for one cake, gated behind admin
//! approval.

use serde::{Deserialize, Serialize};

use crate::cache::{Draft, Patch, Record};
use crate::error::ValidationError;

fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if rating <= 5 {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange {
            value: f64::from(rating),
        })
    }
}

/// A customer feedback for one cake. Only approved feedback contributes to
/// the public rating aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Feedback {
    /// Backend-assigned key.
    pub id: String,
    pub cake_id: String,
    /// Cake name copied for display.
    pub cake_name: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    /// Rating in [0, 5].
    pub rating: u8,
    pub comment: String,
    pub approved: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Feedback {
    const COLLECTION: &'static str = "feedbacks";

    type Draft = FeedbackDraft;
    type Patch = FeedbackPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn apply_patch(&mut self, patch: &FeedbackPatch) {
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(comment) = &patch.comment {
            self.comment = comment.clone();
        }
        if let Some(approved) = patch.approved {
            self.approved = approved;
        }
    }

    fn touch(&mut self, at_millis: i64) {
        self.updated_at = at_millis;
    }
}

/// Creation input for feedback. New feedback awaits approval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub cake_id: String,
    pub cake_name: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub rating: u8,
    pub comment: String,
    pub approved: bool,
}

impl FeedbackDraft {
    /// Builds an unapproved draft.
    #[must_use]
    pub fn new(
        cake_id: impl Into<String>,
        cake_name: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        rating: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            cake_id: cake_id.into(),
            cake_name: cake_name.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            rating,
            comment: comment.into(),
            approved: false,
        }
    }
}

impl Draft for FeedbackDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.cake_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "cake_id" });
        }
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "user_id" });
        }
        validate_rating(self.rating)
    }
}

/// Partial update for feedback.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl FeedbackPatch {
    /// Sets the approval flag.
    #[must_use]
    pub const fn with_approved(mut self, approved: bool) -> Self {
        self.approved = Some(approved);
        self
    }

    /// Sets the rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Sets the comment text.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl Patch for FeedbackPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let ok = FeedbackDraft::new("c1", "Choco", "u1", "Ada", "a@b.c", 5, "great");
        assert!(ok.validate().is_ok());
        assert!(!ok.approved);

        let out_of_range = FeedbackDraft::new("c1", "Choco", "u1", "Ada", "a@b.c", 6, "");
        assert!(matches!(
            out_of_range.validate(),
            Err(ValidationError::RatingOutOfRange { .. })
        ));

        let no_cake = FeedbackDraft::new("", "Choco", "u1", "Ada", "a@b.c", 4, "");
        assert!(no_cake.validate().is_err());
    }

    #[test]
    fn test_patch_validation_and_apply() {
        assert!(FeedbackPatch::default().with_rating(9).validate().is_err());

        let mut feedback = Feedback {
            id: "f1".to_string(),
            cake_id: "c1".to_string(),
            cake_name: "Choco".to_string(),
            user_id: "u1".to_string(),
            user_name: "Ada".to_string(),
            user_email: "a@b.c".to_string(),
            rating: 4,
            comment: String::new(),
            approved: false,
            created_at: 1,
            updated_at: 1,
        };
        feedback.apply_patch(&FeedbackPatch::default().with_approved(true));
        assert!(feedback.approved);
        assert_eq!(feedback.rating, 4);
    }
}
