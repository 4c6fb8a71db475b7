use std::sync::Arc;
use std::time::Duration;

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::infrastructure::error::{AppError, AppResult};

/// Client générique pour une couche de cache parlant le protocole Redis
///
/// Instancié une fois par couche (Valkey, Redis), chaque instance isole
/// ses clés derrière un préfixe.
#[derive(Clone)]
pub struct CacheClient {
    client: Arc<Client>,
    prefix: String,
    default_ttl: Duration,
}

impl CacheClient {
    /// Ouvre le client et vérifie la connexion avec un PING
    pub async fn connect(url: &str, prefix: &str, default_ttl: Duration) -> AppResult<Self> {
        let client = Client::open(url).map_err(|e| AppError::CacheError(e.to_string()))?;

        let cache = Self {
            client: Arc::new(client),
            prefix: prefix.to_string(),
            default_ttl,
        };
        cache.ping().await?;
        info!(prefix = %cache.prefix, "Cache connecté");

        Ok(cache)
    }

    /// Vérifie que le serveur répond
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;
        Ok(())
    }

    /// Stocker une valeur JSON avec le TTL par défaut
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_ex(key, value, self.default_ttl).await
    }

    /// Stocker une valeur JSON avec un TTL spécifique
    pub async fn set_ex<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let serialized = serde_json::to_string(value)?;

        let _: () = conn
            .set_ex(self.key(key), serialized, ttl.as_secs() as usize)
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;

        Ok(())
    }

    /// Récupérer une valeur JSON
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection().await?;

        let value: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Supprimer une clé, retourne vrai si elle existait
    pub async fn delete(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;

        let deleted: i64 = conn
            .del(self.key(key))
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;

        Ok(deleted > 0)
    }

    /// Vérifier si une clé existe
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection().await?;

        let exists: bool = conn
            .exists(self.key(key))
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))?;

        Ok(exists)
    }

    async fn connection(&self) -> AppResult<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| AppError::CacheError(e.to_string()))
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("prefix", &self.prefix)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}
