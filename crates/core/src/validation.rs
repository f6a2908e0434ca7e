//! Structural validation of uploads before anything is persisted.

use validator::Validate;

use crate::asset::Asset;
use crate::error::CoreError;

/// Maximum length of a filename or content type, in characters.
pub const MAX_FIELD_LEN: u64 = 255;

/// Rejects malformed uploads. Runs before the store or publisher is touched.
pub trait AssetValidator: Send + Sync {
    fn validate(&self, asset: &Asset) -> Result<(), CoreError>;
}

/// Default rules: filename and content type must be non-blank and at most
/// [`MAX_FIELD_LEN`] characters. Size is already non-negative by construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAssetValidator;

#[derive(Debug, Validate)]
struct UploadFields {
    #[validate(length(
        min = 1,
        max = 255,
        message = "filename must be non-blank and at most 255 characters"
    ))]
    filename: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "content type must be non-blank and at most 255 characters"
    ))]
    content_type: String,
}

impl AssetValidator for DefaultAssetValidator {
    fn validate(&self, asset: &Asset) -> Result<(), CoreError> {
        let fields = UploadFields {
            filename: asset.filename().as_str().trim().to_string(),
            content_type: asset.content_type().as_str().trim().to_string(),
        };
        fields
            .validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
