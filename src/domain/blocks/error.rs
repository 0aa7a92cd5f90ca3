// Errors raised while validating pages and submitting forms

use thiserror::Error;

use crate::domain::template::InterpolationError;

/// A page definition that cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("block id '{0}' is used more than once")]
    DuplicateBlockId(String),
    #[error("block id '{0}' must be non-empty and must not contain '.' or whitespace")]
    InvalidBlockId(String),
    #[error("'{{{{{token}}}}}' uses the `this` namespace outside a form block")]
    LocalScopeOutsideForm { token: String },
    #[error("form '{0}' must be a top-level block")]
    NestedForm(String),
}

/// A form submission that was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no form '{0}' on this page")]
    UnknownForm(String),
    #[error("field '{0}' is required")]
    MissingField(String),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}
