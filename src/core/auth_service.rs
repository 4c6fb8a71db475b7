use std::time::Duration;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::core::security::{self, ACCESS_TOKEN_TTL_SECONDS, REFRESH_TOKEN_TTL_DAYS};
use crate::domain::{NewUser, User};
use crate::infrastructure::cache::CacheClient;
use crate::infrastructure::database::users::{UserDraft, UserStore};
use crate::infrastructure::error::{AppError, AppResult};
use crate::infrastructure::scylla::{AuthEvent, AuthEventStore};

/// Paire de tokens renvoyée après chaque authentification réussie
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn refresh_key(jti: &str) -> String {
    format!("refresh:{jti}")
}

fn invalid_credentials() -> AppError {
    // Message identique pour email inconnu et mot de passe erroné
    AppError::Unauthorized("Identifiants invalides".to_string())
}

/// Service d'authentification
///
/// Inscription, connexion et rotation des refresh tokens. La liste des
/// refresh tokens valides (jti) vit dans Redis quand elle est branchée;
/// le journal d'événements part vers ScyllaDB en best-effort.
pub struct AuthService<S: UserStore> {
    store: S,
    secret: String,
    sessions: Option<CacheClient>,
    events: Option<AuthEventStore>,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, secret: impl Into<String>) -> Self {
        Self {
            store,
            secret: secret.into(),
            sessions: None,
            events: None,
        }
    }

    pub fn with_sessions(mut self, sessions: CacheClient) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_events(mut self, events: AuthEventStore) -> Self {
        self.events = Some(events);
        self
    }

    /// Inscription d'un nouvel utilisateur
    pub async fn register(&self, new_user: NewUser) -> AppResult<(User, TokenPair)> {
        if self.store.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::Conflict("Email déjà utilisé".to_string()));
        }

        let password_hash = security::hash_password(&new_user.password)?;
        let user = self
            .store
            .insert(&UserDraft {
                name: new_user.name,
                email: new_user.email,
                password_hash: Some(password_hash),
            })
            .await?;

        let tokens = self.issue_tokens(&user).await?;
        self.record(user.id, AuthEvent::Register).await;
        Ok((user, tokens))
    }

    /// Connexion email/mot de passe
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, TokenPair)> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
        if !security::verify_password(password, hash) {
            return Err(invalid_credentials());
        }

        let tokens = self.issue_tokens(&user).await?;
        self.record(user.id, AuthEvent::Login).await;
        Ok((user, tokens))
    }

    /// Rotation d'un refresh token: l'ancien jti est révoqué, une nouvelle
    /// paire est émise
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(User, TokenPair)> {
        let claims = security::verify_refresh_token(refresh_token, &self.secret)?;

        if let Some(sessions) = &self.sessions {
            if !sessions.exists(&refresh_key(&claims.jti)).await? {
                return Err(AppError::Unauthorized("Session expirée".to_string()));
            }
            if let Err(e) = sessions.delete(&refresh_key(&claims.jti)).await {
                warn!(error = %e, "révocation du refresh token impossible");
            }
        }

        // Un utilisateur supprimé entre-temps ne doit pas ressusciter sa session
        let user = self
            .store
            .get(claims.sub)
            .await
            .map_err(|_| AppError::Unauthorized("Session expirée".to_string()))?;

        let tokens = self.issue_tokens(&user).await?;
        self.record(user.id, AuthEvent::Refresh).await;
        Ok((user, tokens))
    }

    async fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access_token = security::generate_access_token(user.id, &user.email, &self.secret)?;
        let (refresh_token, jti) = security::generate_refresh_token(user.id, &self.secret)?;

        if let Some(sessions) = &self.sessions {
            let ttl = Duration::from_secs(REFRESH_TOKEN_TTL_DAYS as u64 * 86_400);
            sessions
                .set_ex(&refresh_key(&jti), &user.id, ttl)
                .await?;
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECONDS,
        })
    }

    async fn record(&self, user_id: Uuid, event: AuthEvent) {
        if let Some(events) = &self.events {
            if let Err(e) = events.record_event(user_id, event).await {
                warn!(error = %e, "journalisation de l'événement impossible");
            }
        }
    }
}
