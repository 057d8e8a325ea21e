use actix_web::{
    body::BoxBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::models::Role;
use crate::services::auth_service::{verify_token, Claims};
use crate::state::AppState;
use crate::utils::error::ApiError;

/// Bearer-token gate. On success the verified [`Claims`] are stored in the
/// request extensions for `web::ReqData<Claims>`.
///
/// ```ignore
/// web::patch().to(update_request).wrap(RequireAuth::allowed_roles(vec![Role::Coordinator]))
/// ```
pub struct RequireAuth {
    allowed_roles: Rc<Vec<Role>>,
}

impl RequireAuth {
    pub fn allowed_roles(allowed_roles: Vec<Role>) -> Self {
        RequireAuth {
            allowed_roles: Rc::new(allowed_roles),
        }
    }

    /// Any signed-in user
    pub fn any() -> Self {
        Self::allowed_roles(vec![Role::Customer, Role::Coordinator, Role::Admin])
    }
}

impl<S> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Rc<Vec<Role>>,
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Decides whether the request may reach the handler
fn authorize(req: &ServiceRequest, allowed_roles: &[Role]) -> Result<Claims, ApiError> {
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Authentication("Not authorized, no token".to_string()))?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("Server error", "AppState is not registered"))?;

    let claims = verify_token(&state.keys, &token).map_err(|e| {
        log::warn!("🔒 {} {} - {}", req.method(), req.path(), e);
        ApiError::Authentication("Not authorized, token failed".to_string())
    })?;

    if !allowed_roles.contains(&claims.role) {
        log::warn!(
            "🚫 {} {} - role {} not allowed",
            req.method(),
            req.path(),
            claims.role
        );
        return Err(ApiError::Authorization(format!(
            "User role ({}) is not authorized to access this route",
            claims.role
        )));
    }

    Ok(claims)
}

impl<S> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authorize(&req, &self.allowed_roles) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let srv = Rc::clone(&self.service);
                Box::pin(async move { srv.call(req).await })
            }
            // Rendered here so the handler never runs
            Err(e) => {
                let response = req.into_response(e.error_response());
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
