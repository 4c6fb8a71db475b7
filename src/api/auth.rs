use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::auth_service::TokenPair;
use crate::domain::{NewUser, User};
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Requête pour la connexion
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,
    pub password: String,
}

/// Requête pour le renouvellement de token
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Réponse d'authentification réussie
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Inscription d'un nouvel utilisateur
#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let (user, tokens) = state.auth.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(AuthResponse { user, tokens }))
}

/// Connexion email/mot de passe
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let (user, tokens) = state.auth.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, tokens }))
}

/// Rotation d'un refresh token
#[post("/auth/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let (user, tokens) = state.auth.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, tokens }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn login_request_requires_an_email() {
        let bad = LoginRequest {
            email: "pas-un-email".to_string(),
            password: "secret123".to_string(),
        };
        assert!(bad.validate().is_err());

        let ok = LoginRequest {
            email: "jean@example.com".to_string(),
            password: "secret123".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn auth_response_is_flat() {
        let response = AuthResponse {
            user: User {
                id: Uuid::new_v4(),
                name: "Jean".to_string(),
                email: "jean@example.com".to_string(),
                password_hash: Some("$argon2id$fake".to_string()),
                created_at: Utc::now(),
                updated_at: None,
                deleted_at: None,
            },
            tokens: TokenPair {
                access_token: "acc".to_string(),
                refresh_token: "ref".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 7200,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "acc");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["user"]["email"], "jean@example.com");
        assert!(json["user"].get("password_hash").is_none());
    }
}
