//! Account registration, login and access tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use cidadao_common::{AppError, AppResult, config::AuthConfig};
use cidadao_db::{
    entities::{official, user, user::UserRole},
    repositories::{OfficialRepository, UserRepository},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User ID, as a string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    pub role: UserRole,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    /// Party acronym, required for officials.
    #[validate(length(min = 1, max = 20))]
    pub party: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: user::Model,
    /// Official profile linked to the user, if any.
    pub official: Option<official::Model>,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    official_repo: OfficialRepository,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        official_repo: OfficialRepository,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            official_repo,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::days(config.token_ttl_days),
        }
    }

    /// Register a new account.
    ///
    /// Officials get their public profile created in the same transaction.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Session> {
        input.validate()?;

        let email = input.email.trim().to_string();
        let party = match (input.role, input.party) {
            (UserRole::Official, Some(party)) => Some(party),
            (UserRole::Official, None) => {
                return Err(AppError::Validation(
                    "party is required for officials".to_string(),
                ));
            }
            (UserRole::Citizen, _) => None,
        };

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let txn = self.user_repo.begin().await?;

        let user = self
            .user_repo
            .create(
                &txn,
                user::ActiveModel {
                    email: Set(email),
                    password_hash: Set(password_hash),
                    name: Set(input.name.clone()),
                    role: Set(input.role),
                    phone: Set(input.phone),
                    created_at: Set(Utc::now().into()),
                    ..Default::default()
                },
            )
            .await?;

        let official = match party {
            Some(party) => Some(
                self.official_repo
                    .create(
                        &txn,
                        official::ActiveModel {
                            user_id: Set(Some(user.id)),
                            name: Set(input.name),
                            party: Set(party),
                            created_at: Set(Utc::now().into()),
                            ..Default::default()
                        },
                    )
                    .await?,
            ),
            None => None,
        };

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        info!(user_id = user.id, role = ?user.role, "Registered account");

        let token = self.issue_token(user.id)?;
        Ok(Session {
            token,
            user,
            official,
        })
    }

    /// Log in with e-mail and password.
    pub async fn login(&self, input: LoginInput) -> AppResult<Session> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let official = self.official_for(&user).await?;
        let token = self.issue_token(user.id)?;

        Ok(Session {
            token,
            user,
            official,
        })
    }

    /// The official profile linked to a user, if the user is an official.
    pub async fn official_for(&self, user: &user::Model) -> AppResult<Option<official::Model>> {
        if !user.is_official() {
            return Ok(None);
        }
        self.official_repo.find_by_user_id(user.id).await
    }

    /// Issue an access token for a user.
    pub fn issue_token(&self, user_id: i32) -> AppResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Decode a token and return the user ID it was issued for.
    pub fn verify_token(&self, token: &str) -> AppResult<i32> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;

        data.claims.sub.parse().map_err(|_| AppError::Unauthorized)
    }

    /// Authenticate a user by access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user_id = self.verify_token(token)?;
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
        }
    }

    fn service(db: DatabaseConnection) -> AuthService {
        let db = Arc::new(db);
        AuthService::new(
            UserRepository::new(Arc::clone(&db)),
            OfficialRepository::new(db),
            &auth_config(),
        )
    }

    fn create_test_user(id: i32, role: UserRole, password: &str) -> user::Model {
        user::Model {
            id,
            email: "joao@email.com".to_string(),
            password_hash: hash_password(password).unwrap(),
            name: "João Silva".to_string(),
            role,
            phone: None,
            created_at: Utc::now().into(),
        }
    }

    fn register_input(role: UserRole, party: Option<&str>) -> RegisterInput {
        RegisterInput {
            email: "joao@email.com".to_string(),
            password: "123456".to_string(),
            name: "João Silva".to_string(),
            role,
            phone: None,
            party: party.map(str::to_string),
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("segredo").unwrap();
        assert!(verify_password("segredo", &hash).unwrap());
        assert!(!verify_password("errado", &hash).unwrap());
    }

    #[test]
    fn test_token_roundtrip() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let token = service.issue_token(42).unwrap();
        assert_eq!(service.verify_token(&token).unwrap(), 42);
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let other = AuthService::new(
            UserRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            OfficialRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            &AuthConfig {
                jwt_secret: "another".to_string(),
                token_ttl_days: 7,
            },
        );

        let token = other.issue_token(1).unwrap();
        assert!(matches!(
            service.verify_token(&token),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.verify_token("garbage"),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let existing = create_test_user(1, UserRole::Citizen, "123456");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();

        let result = service(db)
            .register(register_input(UserRole::Citizen, None))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_official_requires_party() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(db)
            .register(register_input(UserRole::Official, None))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_short_password_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut input = register_input(UserRole::Citizen, None);
        input.password = "12345".to_string();

        let result = service(db).register(input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_official_creates_profile() {
        let created_user = create_test_user(3, UserRole::Official, "123456");
        let created_official = official::Model {
            id: 9,
            user_id: Some(3),
            name: "João Silva".to_string(),
            party: "PV".to_string(),
            photo_url: None,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[created_user]])
            .append_query_results([[created_official]])
            .into_connection();

        let session = service(db)
            .register(register_input(UserRole::Official, Some("PV")))
            .await
            .unwrap();

        assert_eq!(session.user.id, 3);
        assert_eq!(session.official.map(|o| o.id), Some(9));
        assert!(!session.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = create_test_user(1, UserRole::Citizen, "123456");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let result = service(db)
            .login(LoginInput {
                email: "joao@email.com".to_string(),
                password: "654321".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_citizen_has_no_official() {
        let user = create_test_user(1, UserRole::Citizen, "123456");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user]])
            .into_connection();

        let session = service(db)
            .login(LoginInput {
                email: "joao@email.com".to_string(),
                password: "123456".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.user.id, 1);
        assert!(session.official.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_by_token_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = service(db);
        let token = service.issue_token(99).unwrap();

        let result = service.authenticate_by_token(&token).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
