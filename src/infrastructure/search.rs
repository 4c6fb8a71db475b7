use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::domain::User;
use crate::infrastructure::error::{AppError, AppResult};

/// Index des documents utilisateur
const USER_INDEX: &str = "users";
/// Délai maximal d'une requête vers le cluster
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client HTTP vers le cluster Elasticsearch
///
/// Les écritures de l'application y sont reflétées au fil de l'eau; le
/// cluster n'est jamais la source de vérité.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    node: String,
    username: String,
    password: String,
}

impl SearchClient {
    pub fn new(node: &str, username: &str, password: &str) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::SearchError(e.to_string()))?;

        Ok(Self {
            http,
            node: node.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Vérifie que le cluster répond
    pub async fn ping(&self) -> AppResult<()> {
        let response = self
            .http
            .get(format!("{}/", self.node))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::SearchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::SearchError(format!(
                "Le cluster a répondu {}",
                response.status()
            )));
        }
        info!("Elasticsearch connecté");
        Ok(())
    }

    /// Indexe (ou réindexe) un document utilisateur
    ///
    /// La sérialisation de `User` exclut le hash du mot de passe.
    pub async fn index_user(&self, user: &User) -> AppResult<()> {
        let response = self
            .http
            .put(format!("{}/{}/_doc/{}", self.node, USER_INDEX, user.id))
            .basic_auth(&self.username, Some(&self.password))
            .json(user)
            .send()
            .await
            .map_err(|e| AppError::SearchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::SearchError(format!(
                "Indexation refusée: {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Supprime un document utilisateur, un document absent n'est pas une
    /// erreur
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let response = self
            .http
            .delete(format!("{}/{}/_doc/{}", self.node, USER_INDEX, id))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| AppError::SearchError(e.to_string()))?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::SearchError(format!(
                "Suppression refusée: {}",
                response.status()
            )));
        }
        Ok(())
    }
}
