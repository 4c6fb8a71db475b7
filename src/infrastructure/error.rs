use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

/// Type de résultat standard pour l'application
pub type AppResult<T> = Result<T, AppError>;

/// Erreurs principales de l'application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Erreur d'authentification (401 Unauthorized)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Permissions insuffisantes (403 Forbidden)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Ressource non trouvée (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Conflit de ressources (409 Conflict)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Données invalides (400 Bad Request)
    #[error("Validation failed: {0}")]
    ValidationError(ValidationErrors),

    /// Requête mal formée (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Erreur de base de données (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(#[source] SqlxError),

    /// Erreur de sérialisation/désérialisation (500 Internal Server Error)
    #[error("Serialization error: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// Erreur d'une couche de cache (500 Internal Server Error)
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Erreur de l'index de recherche (500 Internal Server Error)
    #[error("Search error: {0}")]
    SearchError(String),

    /// Erreur du stockage objet (500 Internal Server Error)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Erreur du journal d'événements wide-column (500 Internal Server Error)
    #[error("Event store error: {0}")]
    EventStoreError(String),

    /// Erreur de configuration (500 Internal Server Error)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Erreur interne du serveur (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// Convertit l'erreur en code HTTP approprié
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_)
            | AppError::SerializationError(_)
            | AppError::CacheError(_)
            | AppError::SearchError(_)
            | AppError::StorageError(_)
            | AppError::EventStoreError(_)
            | AppError::ConfigurationError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message destiné au client (jamais les détails internes)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(resource) => format!("{resource} non trouvé"),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::ValidationError(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        match error.message.as_ref() {
                            Some(msg) => messages.push(msg.to_string()),
                            None => messages.push(format!("Champ invalide: {field}")),
                        }
                    }
                }
                if messages.is_empty() {
                    "Données invalides".to_string()
                } else {
                    messages.join("; ")
                }
            }
            AppError::DatabaseError(_)
            | AppError::SerializationError(_)
            | AppError::CacheError(_)
            | AppError::SearchError(_)
            | AppError::StorageError(_)
            | AppError::EventStoreError(_)
            | AppError::ConfigurationError(_)
            | AppError::InternalError(_) => "Une erreur interne est survenue".to_string(),
        }
    }
}

/// Structure de réponse d'erreur standardisée
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.http_status().is_server_error() {
            tracing::error!(error = %self, "erreur serveur");
        }
        HttpResponse::build(self.http_status()).json(ErrorBody {
            error: self.user_message(),
            code: self.http_status().as_u16(),
        })
    }
}

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match &error {
            SqlxError::RowNotFound => AppError::NotFound("Ressource".to_string()),
            SqlxError::Database(db_error) => {
                // 23505 = violation de contrainte d'unicité Postgres
                if db_error.code().as_deref() == Some("23505") {
                    AppError::Conflict("Cette ressource existe déjà".to_string())
                } else {
                    AppError::DatabaseError(error)
                }
            }
            _ => AppError::DatabaseError(error),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::SerializationError(error)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::InternalError(format!("IO error: {error}"))
    }
}
