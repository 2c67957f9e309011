use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest comment a review may carry.
pub const MAX_COMMENT_LEN: usize = 500;

/// A customer review of the shop. One per user; unpublished until an admin
/// approves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Parameters for submitting a review.
#[derive(Debug, Clone)]
pub struct ReviewCreate {
    pub user_id: String,
    pub rating: u8,
    pub comment: String,
}

/// Payload for moderating an existing review.
#[derive(Debug, Clone)]
pub struct ReviewPatch {
    pub is_approved: Option<bool>,
}
