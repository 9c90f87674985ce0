use crate::error::{AppError, Result};

/// Validates a request title.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }

    if title.len() > 200 {
        return Err(AppError::Validation(
            "Title must be at most 200 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a request description.
pub fn validate_description(description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }

    if description.len() > 5000 {
        return Err(AppError::Validation(
            "Description must be at most 5000 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a document metadata record.
pub fn validate_document(file_name: &str, file_size: i64) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(AppError::Validation(
            "File name cannot be empty".to_string(),
        ));
    }

    if file_size <= 0 {
        return Err(AppError::Validation(
            "File size must be positive".to_string(),
        ));
    }

    Ok(())
}

/// Validates a message body.
pub fn validate_message_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation(
            "Message content cannot be empty".to_string(),
        ));
    }

    if content.len() > 10_000 {
        return Err(AppError::Validation(
            "Message content must be at most 10000 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_and_descriptions_must_be_nonempty() {
        assert!(validate_title("Squeaky brakes").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_description("It squeaks").is_ok());
        assert!(validate_description("").is_err());
    }

    #[test]
    fn oversized_fields_are_rejected() {
        assert!(validate_title(&"t".repeat(201)).is_err());
        assert!(validate_description(&"d".repeat(5001)).is_err());
    }

    #[test]
    fn document_metadata_bounds() {
        assert!(validate_document("invoice.pdf", 1024).is_ok());
        assert!(validate_document("", 1024).is_err());
        assert!(validate_document("invoice.pdf", 0).is_err());
    }
}
