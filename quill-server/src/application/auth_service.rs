use crate::application::validation;
use crate::data::account_repository::AccountRepository;
use crate::domain::account::{AccountResponse, SigninRequest, SignupRequest};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct AuthService {
    account_repo: Arc<dyn AccountRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        account_repo: Arc<dyn AccountRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            account_repo,
            jwt_service,
        }
    }

    /// Register a new account. Returns the public fields only: no token is
    /// issued at signup, and the password hash never leaves the store layer.
    pub async fn register(&self, req: SignupRequest) -> Result<AccountResponse, DomainError> {
        tracing::debug!("Registering account for email: {}", req.email);

        if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
            return Err(DomainError::ValidationError(
                "Missing required fields: name, email, password".to_string(),
            ));
        }

        let role = validation::validate_role(req.role.as_deref())?;
        validation::validate_name(&req.name)?;
        validation::validate_email(&req.email)?;
        validation::validate_password(&req.password)?;

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                DomainError::InternalError(format!("Password hashing failed: {}", e))
            })?
            .to_string();

        // Uniqueness is enforced by the store; a duplicate email surfaces as
        // EmailAlreadyRegistered from the insert itself.
        let account = self
            .account_repo
            .create(&req.name, &req.email, &password_hash, role)
            .await?;

        tracing::info!(
            "Account registered: id={}, role={}",
            account.id,
            account.role.as_str()
        );

        Ok(AccountResponse::from(account))
    }

    /// Authenticate with email and password, issuing a token on success.
    /// Unknown email and wrong password fail identically so callers cannot
    /// probe which addresses are registered.
    pub async fn login(
        &self,
        req: SigninRequest,
    ) -> Result<(String, AccountResponse), DomainError> {
        if req.email.trim().is_empty() || req.password.is_empty() {
            return Err(DomainError::ValidationError(
                "Missing required fields: email, password".to_string(),
            ));
        }

        let account = match self.account_repo.find_by_email(&req.email).await? {
            Some(account) => account,
            None => {
                tracing::warn!("Signin failed: unknown email");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let parsed_hash = PasswordHash::new(&account.password_hash).map_err(|e| {
            tracing::error!("Invalid password hash format: {}", e);
            DomainError::InternalError(format!("Invalid password hash: {}", e))
        })?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Signin failed: wrong password for account {}", account.id);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.jwt_service.issue(&account)?;

        tracing::info!("Account signed in: id={}", account.id);

        Ok((token, AccountResponse::from(account)))
    }
}
