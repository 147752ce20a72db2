use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Blog not found")]
    PostNotFound,

    #[error("Forbidden: you do not have permission to perform this action")]
    Forbidden,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn to_status_code(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::Unauthorized(_) => 401,
            Self::Forbidden => 403,
            Self::PostNotFound => 404,
            Self::EmailAlreadyRegistered => 409,
            Self::DatabaseError(_) | Self::InternalError(_) => 500,
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_kinds() {
        assert_eq!(
            DomainError::ValidationError("bad".to_string()).to_status_code(),
            400
        );
        assert_eq!(DomainError::InvalidCredentials.to_status_code(), 401);
        assert_eq!(DomainError::InvalidToken.to_status_code(), 401);
        assert_eq!(DomainError::ExpiredToken.to_status_code(), 401);
        assert_eq!(DomainError::Forbidden.to_status_code(), 403);
        assert_eq!(DomainError::PostNotFound.to_status_code(), 404);
        assert_eq!(DomainError::EmailAlreadyRegistered.to_status_code(), 409);
        assert_eq!(
            DomainError::DatabaseError("boom".to_string()).to_status_code(),
            500
        );
    }

    #[test]
    fn credential_failures_share_one_message() {
        // Unknown email and wrong password must be indistinguishable.
        assert_eq!(
            DomainError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
