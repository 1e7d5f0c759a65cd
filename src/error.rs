//! Errors surfaced by the contact form.
//!
//! Both kinds are handled where they occur: field errors render inline under
//! the field, submit errors become a notification. Neither propagates.

use thiserror::Error;

/// A field failed validation on blur or submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// The transport reported a failed delivery
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Form is incomplete")]
    Invalid,
}
