use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Review, ReviewCreate, ReviewPatch, MAX_COMMENT_LEN};

impl Entity for Review {
    type Id = String;
    type CreateParams = ReviewCreate;
    type Patch = ReviewPatch;
    type Action = ();
    type ActionResult = ();

    const KIND: &'static str = "review";

    fn id(&self) -> &String {
        &self.id
    }

    /// New reviews are always unapproved; publication is an admin decision.
    fn from_create(id: String, params: ReviewCreate) -> Result<Self, String> {
        if !(1..=5).contains(&params.rating) {
            return Err(format!("rating must be between 1 and 5, got {}", params.rating));
        }
        let comment = params.comment.trim().to_string();
        if comment.is_empty() {
            return Err("comment must not be empty".to_string());
        }
        if comment.len() > MAX_COMMENT_LEN {
            return Err(format!(
                "comment too long: {} chars (max {})",
                comment.len(),
                MAX_COMMENT_LEN
            ));
        }
        Ok(Self {
            id,
            user_id: params.user_id,
            rating: params.rating,
            comment,
            is_approved: false,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: ReviewPatch) -> Result<(), String> {
        if let Some(is_approved) = patch.is_approved {
            self.is_approved = is_approved;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(rating: u8, comment: &str) -> Result<Review, String> {
        Review::from_create(
            "review_1".to_string(),
            ReviewCreate {
                user_id: "user_1".to_string(),
                rating,
                comment: comment.to_string(),
            },
        )
    }

    #[test]
    fn new_reviews_start_unapproved() {
        let review = create(5, "Best flat white in town").unwrap();
        assert!(!review.is_approved);
    }

    #[test]
    fn rating_bounds() {
        assert!(create(0, "meh").is_err());
        assert!(create(6, "great").is_err());
        assert!(create(1, "burnt").is_ok());
        assert!(create(5, "perfect").is_ok());
    }

    #[test]
    fn comment_bounds() {
        assert!(create(4, "   ").is_err());
        assert!(create(4, &"x".repeat(MAX_COMMENT_LEN)).is_ok());
        assert!(create(4, &"x".repeat(MAX_COMMENT_LEN + 1)).is_err());
    }

    #[test]
    fn moderation_toggles_approval() {
        let mut review = create(4, "Cozy corner seats").unwrap();
        review
            .on_update(ReviewPatch {
                is_approved: Some(true),
            })
            .unwrap();
        assert!(review.is_approved);
    }
}
