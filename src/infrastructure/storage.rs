use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client as S3Client;
use tracing::info;

use crate::infrastructure::error::{AppError, AppResult};

/// Stockage objet (MinIO, API S3)
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    client: S3Client,
    bucket: String,
}

impl ObjectStorage {
    /// Construit le client S3 en mode path-style (requis par MinIO)
    pub fn new(endpoint: &str, access_key: &str, secret_key: &str, bucket: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "minio");

        let config = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(config),
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Vérifie que le stockage répond (listing des buckets)
    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .list_buckets()
            .send()
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        info!("MinIO connecté");
        Ok(())
    }

    /// Crée le bucket de l'application s'il n'existe pas encore
    pub async fn ensure_bucket(&self) -> AppResult<()> {
        let exists = self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok();

        if !exists {
            self.client
                .create_bucket()
                .bucket(&self.bucket)
                .send()
                .await
                .map_err(|e| AppError::StorageError(e.to_string()))?;
            info!(bucket = %self.bucket, "Bucket créé");
        }

        Ok(())
    }
}
