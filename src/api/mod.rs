pub mod auth;
pub mod middleware;
pub mod users;

use actix_web::{web, HttpResponse, Responder};

/// Monte l'ensemble des routes de l'API
///
/// Les routes d'authentification sont publiques, tout `/users` exige un
/// token d'accès valide. `/health` vit hors du préfixe versionné.
pub fn config(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.service(
        web::scope("/api/v1")
            // Routes d'authentification (publiques)
            .service(auth::register)
            .service(auth::login)
            .service(auth::refresh)
            // Routes utilisateurs (protégées)
            .service(
                web::scope("")
                    .wrap(middleware::JwtAuth::new(jwt_secret))
                    .service(users::list_users)
                    .service(users::get_user)
                    .service(users::create_user)
                    .service(users::update_user)
                    .service(users::soft_delete_user)
                    .service(users::delete_user),
            ),
    );

    cfg.service(web::resource("/health").route(web::get().to(health)));
}

/// Endpoint de santé pour les probes Kubernetes/Docker
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    const SECRET: &str = "une-clef-de-test-suffisamment-longue-0123";

    #[actix_web::test]
    async fn health_is_public() {
        crate::test_utils::init_test_logging();
        let app =
            test::init_service(App::new().configure(|cfg| config(cfg, SECRET))).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn users_routes_require_a_token() {
        let app =
            test::init_service(App::new().configure(|cfg| config(cfg, SECRET))).await;

        // Refusé par le middleware avant même de toucher l'état applicatif
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/users").to_request(),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 401);
    }
}
