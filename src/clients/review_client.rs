use tracing::{debug, info, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::auth::Identity;
use crate::clients::UserClient;
use crate::domain::{Review, ReviewCreate, ReviewPatch, MAX_COMMENT_LEN};
use crate::error::ReviewError;

/// How many approved reviews the public listing shows.
const PUBLISHED_LIMIT: usize = 10;

/// Client for the review store. Submission is customer-facing; everything
/// that changes visibility is admin-only.
#[derive(Clone)]
pub struct ReviewClient {
    inner: ResourceClient<Review>,
    users: UserClient,
}

impl ReviewClient {
    pub fn new(inner: ResourceClient<Review>, users: UserClient) -> Self {
        Self { inner, users }
    }

    /// Submit the caller's review. Each user gets exactly one; a second
    /// submission is rejected. The review stays unpublished until an admin
    /// approves it.
    #[instrument(skip(self, identity, comment), fields(user_id = %identity.user_id))]
    pub async fn submit_review(
        &self,
        identity: &Identity,
        rating: u8,
        comment: String,
    ) -> Result<Review, ReviewError> {
        info!("Processing submit_review request");

        match self.users.get_user(identity.user_id.clone()).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(ReviewError::InvalidUser(identity.user_id.clone())),
            Err(e) => return Err(ReviewError::InvalidUser(format!(
                "User validation failed: {}",
                e
            ))),
        }

        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating(rating));
        }
        let comment = comment.trim().to_string();
        if comment.is_empty() {
            return Err(ReviewError::EmptyComment);
        }
        if comment.len() > MAX_COMMENT_LEN {
            return Err(ReviewError::CommentTooLong {
                len: comment.len(),
                max: MAX_COMMENT_LEN,
            });
        }

        let existing = self.inner.list().await.map_err(comm)?;
        if existing.iter().any(|r| r.user_id == identity.user_id) {
            return Err(ReviewError::DuplicateReview(identity.user_id.clone()));
        }

        let id = self
            .inner
            .create(ReviewCreate {
                user_id: identity.user_id.clone(),
                rating,
                comment,
            })
            .await
            .map_err(|e| match e {
                FrameworkError::Rejected(msg) => ReviewError::ValidationError(msg),
                other => comm(other),
            })?;
        self.inner
            .get(id.clone())
            .await
            .map_err(comm)?
            .ok_or(ReviewError::NotFound(id))
    }

    /// The public listing: approved reviews only, newest first.
    #[instrument(skip(self))]
    pub async fn published(&self) -> Result<Vec<Review>, ReviewError> {
        debug!("Sending request");
        let mut reviews = self.inner.list().await.map_err(comm)?;
        reviews.retain(|r| r.is_approved);
        newest_first(&mut reviews);
        reviews.truncate(PUBLISHED_LIMIT);
        Ok(reviews)
    }

    /// Everything, approved or not, for the moderation queue.
    #[instrument(skip(self, identity))]
    pub async fn list_all(&self, identity: &Identity) -> Result<Vec<Review>, ReviewError> {
        identity.require_admin()?;
        debug!("Sending request");
        let mut reviews = self.inner.list().await.map_err(comm)?;
        newest_first(&mut reviews);
        Ok(reviews)
    }

    #[instrument(skip(self, identity))]
    pub async fn moderate(
        &self,
        identity: &Identity,
        id: String,
        approve: bool,
    ) -> Result<Review, ReviewError> {
        identity.require_admin()?;
        info!(review_id = %id, approve, "Moderating review");
        self.inner
            .update(
                id,
                ReviewPatch {
                    is_approved: Some(approve),
                },
            )
            .await
            .map_err(|e| match e {
                FrameworkError::NotFound { id, .. } => ReviewError::NotFound(id),
                FrameworkError::Rejected(msg) => ReviewError::ValidationError(msg),
                other => comm(other),
            })
    }

    #[instrument(skip(self, identity))]
    pub async fn delete_review(&self, identity: &Identity, id: String) -> Result<(), ReviewError> {
        identity.require_admin()?;
        self.inner.delete(id).await.map_err(|e| match e {
            FrameworkError::NotFound { id, .. } => ReviewError::NotFound(id),
            other => comm(other),
        })
    }
}

fn newest_first(reviews: &mut [Review]) {
    reviews.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn comm(e: FrameworkError) -> ReviewError {
    ReviewError::ActorCommunicationError(e.to_string())
}
