use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::AuthenticatedUser;
use crate::domain::{ListParams, NewUser, UserPatch};
use crate::infrastructure::error::AppResult;
use crate::AppState;

/// Liste paginée des utilisateurs
///
/// Supporte `page`, `per_page`, `search` (nom ou email), `sort` et `order`.
#[get("/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<ListParams>,
) -> AppResult<HttpResponse> {
    let page = state.users.list(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Utilisateur par identifiant
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Création d'un utilisateur
#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<NewUser>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let user = state.users.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Mise à jour partielle d'un utilisateur
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UserPatch>,
) -> AppResult<HttpResponse> {
    body.validate()?;

    let user = state.users.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Suppression logique d'un utilisateur
#[patch("/users/{id}/soft-delete")]
pub async fn soft_delete_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.users.soft_delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Suppression physique d'un utilisateur
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    caller: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let user = state.users.delete(id).await?;
    info!(deleted = %id, by = %caller.0.sub, "utilisateur supprimé définitivement");
    Ok(HttpResponse::Ok().json(user))
}

#[cfg(test)]
mod tests {
    use crate::domain::UserPatch;
    use validator::Validate;

    #[test]
    fn patch_validates_only_provided_fields() {
        let empty = UserPatch::default();
        assert!(empty.validate().is_ok());

        let bad_email = UserPatch {
            email: Some("pas-un-email".to_string()),
            ..UserPatch::default()
        };
        assert!(bad_email.validate().is_err());

        let short_password = UserPatch {
            password: Some("abc".to_string()),
            ..UserPatch::default()
        };
        assert!(short_password.validate().is_err());

        let ok = UserPatch {
            name: Some("Jean Martin".to_string()),
            email: Some("jean@example.com".to_string()),
            password: None,
        };
        assert!(ok.validate().is_ok());
    }
}
