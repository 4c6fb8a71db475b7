use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use socle_api::api;
use socle_api::core::{AuthService, Config, UserService};
use socle_api::infrastructure::{
    AuthEventStore, CacheClient, Database, ObjectStorage, SearchClient, UserRepository,
};
use socle_api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Chargement et validation de la configuration
    let config = Config::from_env().expect("❌ Configuration invalide");

    setup_tracing(&config);
    info!("🚀 Démarrage de {}", socle_api::NAME);
    info!("🔧 Mode: {}", config.run_mode);

    // Connexions aux datastores critiques
    let db = Database::connect(&config)
        .await
        .expect("❌ Connexion PostgreSQL impossible");
    db.migrate().await.expect("❌ Migrations impossibles");

    let events = AuthEventStore::connect(&config)
        .await
        .expect("❌ Connexion ScyllaDB impossible");

    let valkey = CacheClient::connect(&config.valkey_url(), "cache:", Duration::from_secs(300))
        .await
        .expect("❌ Connexion Valkey impossible");

    let redis = CacheClient::connect(&config.redis_url(), "auth:", Duration::from_secs(3600))
        .await
        .expect("❌ Connexion Redis impossible");

    // Elasticsearch et MinIO sont sans connexion persistante: un échec au
    // démarrage est signalé mais n'empêche pas le service de démarrer
    let search = SearchClient::new(
        &config.elasticsearch_node,
        &config.elasticsearch_username,
        &config.elasticsearch_password,
    )
    .expect("❌ Client Elasticsearch invalide");
    if let Err(e) = search.ping().await {
        warn!("⚠️  Elasticsearch indisponible: {e}");
    }

    let storage = ObjectStorage::new(
        &config.minio_url(),
        &config.minio_access_key,
        &config.minio_secret_key,
        &config.minio_bucket,
    );
    match storage.health_check().await {
        Ok(()) => {
            if let Err(e) = storage.ensure_bucket().await {
                warn!("⚠️  Création du bucket impossible: {e}");
            }
        }
        Err(e) => warn!("⚠️  MinIO indisponible: {e}"),
    }

    // Assemblage de l'état applicatif
    let repository = UserRepository::new(db.pool.clone());
    let state = web::Data::new(AppState {
        users: UserService::new(repository.clone())
            .with_cache(valkey)
            .with_search(search),
        auth: AuthService::new(repository, config.secret_key.clone())
            .with_sessions(redis)
            .with_events(events),
    });

    let jwt_secret = config.secret_key.clone();
    let cors_origins = config.cors_allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        let secret = jwt_secret.clone();
        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(state.clone())
            .configure(move |cfg| api::config(cfg, &secret))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .shutdown_timeout(10)
    .disable_signals()
    .run();

    info!(
        "🔗 API disponible sur http://{}:{}",
        config.server_host, config.server_port
    );

    // Arrêt propre: drainage des requêtes en cours puis sortie
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        let signal = shutdown_signal().await;
        info!("{signal} reçu, arrêt en cours...");
        handle.stop(true).await;
    });

    server.await?;
    info!("✅ Serveur arrêté proprement");
    Ok(())
}

/// Configure le tracing: format lisible en développement, JSON en production
fn setup_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.effective_log_level()));

    if config.is_development() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .init();
    }
}

/// Attend SIGINT ou SIGTERM et retourne le nom du signal reçu
async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("installation du handler SIGTERM impossible");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT"
    }
}
