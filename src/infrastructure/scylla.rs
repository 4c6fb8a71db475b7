use std::sync::Arc;

use chrono::Utc;
use scylla::transport::load_balancing::DefaultPolicy;
use scylla::transport::ExecutionProfile;
use scylla::{Session, SessionBuilder};
use tracing::info;
use uuid::Uuid;

use crate::core::config::Config;
use crate::infrastructure::error::{AppError, AppResult};

/// Événements d'authentification journalisés
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    Register,
    Login,
    Refresh,
}

impl AuthEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthEvent::Register => "register",
            AuthEvent::Login => "login",
            AuthEvent::Refresh => "refresh",
        }
    }
}

/// Journal d'événements d'authentification dans ScyllaDB
///
/// Une ligne par événement, partitionnée par utilisateur et ordonnée par
/// horodatage (epoch millisecondes).
#[derive(Clone)]
pub struct AuthEventStore {
    session: Arc<Session>,
}

impl AuthEventStore {
    /// Ouvre la session vers le cluster et prépare la table
    pub async fn connect(config: &Config) -> AppResult<Self> {
        info!("Connexion à ScyllaDB...");

        let policy = DefaultPolicy::builder()
            .prefer_datacenter(config.scylla_datacenter.clone())
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy)
            .build();

        let mut builder = SessionBuilder::new()
            .known_nodes(&config.scylla_contact_points)
            .default_execution_profile_handle(profile.into_handle());

        if let (Some(username), Some(password)) =
            (&config.scylla_username, &config.scylla_password)
        {
            builder = builder.user(username.clone(), password.clone());
        }

        let session = builder
            .build()
            .await
            .map_err(|e| AppError::EventStoreError(e.to_string()))?;

        session
            .use_keyspace(config.scylla_keyspace.as_str(), false)
            .await
            .map_err(|e| AppError::EventStoreError(e.to_string()))?;

        let store = Self {
            session: Arc::new(session),
        };
        store.init().await?;
        info!("ScyllaDB connecté");

        Ok(store)
    }

    /// Crée la table d'événements si elle n'existe pas encore
    async fn init(&self) -> AppResult<()> {
        self.session
            .query(
                "CREATE TABLE IF NOT EXISTS auth_events ( \
                     user_id uuid, \
                     occurred_at bigint, \
                     event text, \
                     PRIMARY KEY (user_id, occurred_at) \
                 ) WITH CLUSTERING ORDER BY (occurred_at DESC)",
                (),
            )
            .await
            .map_err(|e| AppError::EventStoreError(e.to_string()))?;
        Ok(())
    }

    /// Ajoute un événement au journal de l'utilisateur
    pub async fn record_event(&self, user_id: Uuid, event: AuthEvent) -> AppResult<()> {
        self.session
            .query(
                "INSERT INTO auth_events (user_id, occurred_at, event) VALUES (?, ?, ?)",
                (user_id, Utc::now().timestamp_millis(), event.as_str()),
            )
            .await
            .map_err(|e| AppError::EventStoreError(e.to_string()))?;
        Ok(())
    }

    /// Vérifie que le cluster répond
    pub async fn health_check(&self) -> AppResult<()> {
        self.session
            .query("SELECT release_version FROM system.local", ())
            .await
            .map_err(|e| AppError::EventStoreError(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for AuthEventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEventStore").finish_non_exhaustive()
    }
}
