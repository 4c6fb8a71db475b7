use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::error::{AppError, AppResult};

/// Durée de vie d'un token d'accès
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 2;
/// Durée de vie d'un refresh token
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;
/// `expires_in` annoncé aux clients, en secondes
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = ACCESS_TOKEN_TTL_HOURS * 3600;

const JWT_ALGORITHM: jsonwebtoken::Algorithm = jsonwebtoken::Algorithm::HS512;

/// Claims JWT pour les tokens d'accès
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: Uuid,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub kind: String,
}

/// Claims JWT pour les refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub kind: String,
}

/// Générer un token d'accès JWT (HS512)
pub fn generate_access_token(user_id: Uuid, email: &str, secret: &str) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(ACCESS_TOKEN_TTL_HOURS);

    let claims = AccessTokenClaims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        kind: "access".to_string(),
    };

    encode(
        &Header::new(JWT_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Génération du token impossible: {e}")))
}

/// Générer un refresh token JWT, retourne le token et son identifiant (jti)
pub fn generate_refresh_token(user_id: Uuid, secret: &str) -> AppResult<(String, String)> {
    let now = Utc::now();
    let expires_at = now + Duration::days(REFRESH_TOKEN_TTL_DAYS);
    let jti = Uuid::new_v4().to_string();

    let claims = RefreshTokenClaims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
        jti: jti.clone(),
        kind: "refresh".to_string(),
    };

    let token = encode(
        &Header::new(JWT_ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Génération du token impossible: {e}")))?;

    Ok((token, jti))
}

/// Vérifier un token d'accès
pub fn verify_access_token(token: &str, secret: &str) -> AppResult<AccessTokenClaims> {
    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(JWT_ALGORITHM),
    )
    .map_err(map_jwt_error)?;

    if data.claims.kind != "access" {
        return Err(AppError::Unauthorized("Token invalide".to_string()));
    }
    Ok(data.claims)
}

/// Vérifier un refresh token
pub fn verify_refresh_token(token: &str, secret: &str) -> AppResult<RefreshTokenClaims> {
    let data = decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(JWT_ALGORITHM),
    )
    .map_err(map_jwt_error)?;

    if data.claims.kind != "refresh" {
        return Err(AppError::Unauthorized("Token invalide".to_string()));
    }
    Ok(data.claims)
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AppError {
    match error.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expiré".to_string())
        }
        _ => AppError::Unauthorized("Token invalide".to_string()),
    }
}

/// Instance Argon2id configurée (64 Mo, 3 passes, parallélisme 4)
fn argon2() -> AppResult<Argon2<'static>> {
    let params = Params::new(65536, 3, 4, None)
        .map_err(|e| AppError::InternalError(format!("Paramètres Argon2 invalides: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Générer un hash de mot de passe avec Argon2id
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Erreur de hashage: {e}")))
}

/// Vérifier un mot de passe contre un hash stocké
///
/// Les paramètres sont relus depuis le hash, un hash illisible vaut échec.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
