use crate::db::StoreError;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 1024;
pub const QUESTION_TEXT_MIN_CHARS: usize = 3;

/// Category titles must be 3 to 1024 characters.
pub fn validate_title(title: &str) -> Result<(), StoreError> {
    let chars = title.chars().count();
    if chars < TITLE_MIN_CHARS || chars > TITLE_MAX_CHARS {
        return Err(StoreError::Validation {
            field: "title",
            message: format!(
                "must be between {} and {} characters, got {}",
                TITLE_MIN_CHARS, TITLE_MAX_CHARS, chars
            ),
        });
    }
    Ok(())
}

pub fn validate_question_text(text: &str) -> Result<(), StoreError> {
    if text.chars().count() < QUESTION_TEXT_MIN_CHARS {
        return Err(StoreError::Validation {
            field: "text",
            message: format!("must be at least {} characters", QUESTION_TEXT_MIN_CHARS),
        });
    }
    Ok(())
}

/// Option texts only have to be non-empty.
pub fn validate_option_text(index: usize, text: &str) -> Result<(), StoreError> {
    if text.is_empty() {
        return Err(StoreError::Validation {
            field: "options",
            message: format!("option {} must not be empty", index),
        });
    }
    Ok(())
}
