use super::ValidationError;

/// Sniffs the mime type of an uploaded image from its magic bytes.
/// Anything that is not recognised as an image is rejected.
pub fn compute_image_mime(data: &[u8]) -> Result<&'static str, ValidationError> {
    if data.is_empty() {
        return Err(ValidationError::EmptyImage);
    }

    match infer::get(data) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type()),
        _ => Err(ValidationError::NotAnImage),
    }
}
