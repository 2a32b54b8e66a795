use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::AccountStore,
    error::{AppError, AppResult},
    models::{Account, AccountView, AuthResponse, LoginRequest, RegisterRequest},
};

const MIN_PASSWORD_LEN: usize = 6;

/// Bearer token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account ID
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn account_id(&self) -> AppResult<Uuid> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("invalid token".to_string()))
    }
}

/// Registers accounts, checks passwords, and issues and validates bearer tokens
#[derive(Clone)]
pub struct CredentialService {
    accounts: Arc<dyn AccountStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl CredentialService {
    pub fn new(accounts: Arc<dyn AccountStore>, secret: &str, token_ttl: Duration) -> Self {
        Self {
            accounts,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        }
    }

    /// Creates an account with a hashed password
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AccountView> {
        let username = request.username.trim();
        let email = request.email.trim().to_lowercase();

        if username.is_empty() {
            return Err(AppError::MissingField("username"));
        }
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if request.password.is_empty() {
            return Err(AppError::MissingField("password"));
        }
        if !email.contains('@') {
            return Err(AppError::InvalidInput("email is not valid".to_string()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::Duplicate("user already exists".to_string()));
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash: hash_password(&request.password)?,
            created_at: Utc::now(),
        };

        let account = self.accounts.insert(account).await?;
        tracing::info!(account_id = %account.id, "Account registered");

        Ok(AccountView::from(&account))
    }

    /// Verifies credentials and issues a bearer token
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::Unauthorized("invalid credentials".to_string());

        let account = self
            .accounts
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&account.password_hash, &request.password)? {
            tracing::info!(account_id = %account.id, "Rejected login");
            return Err(invalid());
        }

        let token = self.issue_token(&account)?;
        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(AuthResponse {
            token,
            user: AccountView::from(&account),
        })
    }

    pub fn issue_token(&self, account: &Account) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AppError::Internal("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature and expiry; returns the owner id carried by the token
    pub fn verify_token(&self, token: &str) -> AppResult<Uuid> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::Unauthorized("invalid or expired token".to_string())
            })?;

        claims.account_id()
    }

    /// Resolves a token to a still-existing account
    pub async fn authenticate(&self, token: &str) -> AppResult<Account> {
        let account_id = self.verify_token(token)?;
        self.accounts
            .get(account_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
