use thiserror::Error;

use crate::domain::OrderStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("admin access required")]
    Forbidden,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order has no items")]
    EmptyOrder,
    #[error("Invalid quantity for product {0}")]
    InvalidQuantity(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    /// Message names the product and both quantities.
    #[error("{0}")]
    InsufficientStock(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order {0} is not awaiting payment verification")]
    PaymentNotPending(String),
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error("Review not found: {0}")]
    NotFound(String),
    #[error("User {0} has already submitted a review")]
    DuplicateReview(String),
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
    #[error("Comment must not be empty")]
    EmptyComment,
    #[error("Comment too long: {len} chars (max {max})")]
    CommentTooLong { len: usize, max: usize },
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("Review validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}
