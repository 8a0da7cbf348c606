//! Validation modules

pub mod share;

pub use share::{
    validate_file_name, validate_slug, MAX_SLUG_LENGTH, MIN_SLUG_LENGTH,
};
