use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Représente un utilisateur du système
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identifiant unique de l'utilisateur (UUID)
    pub id: Uuid,
    /// Nom complet de l'utilisateur
    pub name: String,
    /// Email de l'utilisateur (unique)
    pub email: String,
    /// Hash du mot de passe (jamais exposé dans les APIs)
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Date de création du compte
    pub created_at: DateTime<Utc>,
    /// Date de dernière mise à jour
    pub updated_at: Option<DateTime<Utc>>,
    /// Marqueur de suppression logique
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Un utilisateur supprimé logiquement est invisible des lectures
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Données requises pour créer un nouvel utilisateur
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: String,
    #[validate(email(message = "Format d'email invalide"))]
    pub email: String,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: String,
}

/// Mise à jour partielle d'un utilisateur, mot de passe en clair
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: Option<String>,
    #[validate(email(message = "Format d'email invalide"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Le mot de passe doit contenir au moins 6 caractères"))]
    pub password: Option<String>,
}

/// Champs modifiables d'un utilisateur, hash déjà calculé
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jean Dupont".to_string(),
            email: "jean@example.com".to_string(),
            password_hash: Some("$argon2id$fake".to_string()),
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "jean@example.com");
    }

    #[test]
    fn deleted_flag_follows_timestamp() {
        let mut user = sample_user();
        assert!(!user.is_deleted());
        user.deleted_at = Some(Utc::now());
        assert!(user.is_deleted());
    }

    #[test]
    fn new_user_validation() {
        let valid = NewUser {
            name: "Jean".to_string(),
            email: "jean@example.com".to_string(),
            password: "secret123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = NewUser {
            email: "pas-un-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = NewUser {
            password: "abc".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }
}
