pub mod users;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::core::config::Config;
use crate::infrastructure::error::AppResult;

pub use users::{UserRepository, UserStore};

/// Gestion de la connexion à la base de données PostgreSQL
#[derive(Debug, Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    /// Ouvre le pool de connexions et vérifie la connectivité
    pub async fn connect(config: &Config) -> AppResult<Self> {
        info!("Connexion à PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await?;

        let db = Self { pool };
        db.health_check().await?;
        info!("PostgreSQL connecté");

        Ok(db)
    }

    /// Applique les migrations embarquées
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::infrastructure::error::AppError::DatabaseError(e.into()))?;
        info!("Migrations appliquées");
        Ok(())
    }

    /// Vérifie que la base répond
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
