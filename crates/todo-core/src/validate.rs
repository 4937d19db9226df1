use thiserror::Error;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 32;

/// Rejected task name. The `Display` text is shown inline under the name field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Enter a name between 2 and 32 characters")]
    TooShort { len: usize },
    #[error("Enter a name between 2 and 32 characters")]
    TooLong { len: usize },
}

pub fn validate_name(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if len < NAME_MIN_LEN {
        return Err(NameError::TooShort { len });
    }
    if len > NAME_MAX_LEN {
        return Err(NameError::TooLong { len });
    }
    Ok(())
}

/// Inline message for the form, `None` when the name is acceptable.
pub fn name_error_message(name: &str) -> Option<String> {
    validate_name(name).err().map(|err| err.to_string())
}
