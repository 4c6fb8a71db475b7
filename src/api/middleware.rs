use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::core::security::{self, AccessTokenClaims};
use crate::infrastructure::error::AppError;

/// Middleware d'authentification JWT
///
/// Vérifie le token d'accès du header `Authorization: Bearer` et place les
/// claims dans les extensions de la requête. Toute requête sans token
/// valide reçoit un 401 JSON sans atteindre le handler.
pub struct JwtAuth {
    secret: Rc<String>,
}

impl JwtAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Rc::new(secret.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            secret: self.secret.clone(),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

fn authenticate(req: &ServiceRequest, secret: &str) -> Result<AccessTokenClaims, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("En-tête Authorization manquant".to_string()))?;

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("En-tête Authorization invalide".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("En-tête Authorization invalide".to_string()))?;

    security::verify_access_token(token, secret)
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let outcome = authenticate(&req, &self.secret);

        Box::pin(async move {
            match outcome {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    let (req, _) = req.into_parts();
                    let response = e.error_response().map_into_right_body();
                    Ok(ServiceResponse::new(req, response))
                }
            }
        })
    }
}

/// Extracteur des claims posés par [`JwtAuth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AccessTokenClaims);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AccessTokenClaims>().cloned();
        ready(
            claims
                .map(AuthenticatedUser)
                .ok_or_else(|| AppError::Unauthorized("Authentification requise".to_string()).into()),
        )
    }
}
