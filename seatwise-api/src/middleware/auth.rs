use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use seatwise_core::identity::{bearer_token, has_admin_role, Claims, TokenVerifier};
use seatwise_core::{CoreError, CoreResult};

use crate::error::AppError;
use crate::state::AppState;

/// HS256 verifier over a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> CoreResult<Claims> {
        decode::<Claims>(token, &self.key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| CoreError::Validation(format!("invalid token: {err}")))
    }
}

/// Verified identity attached to every request. `None` means the request
/// carried no (valid) credential, which is only permitted in dev mode or on
/// public routes.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<Claims>);

/// Resolve the caller's identity once, up front. A presented token that
/// fails verification is rejected here; absence of a token is left for the
/// route-level gates to judge.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let claims = match (&state.verifier, header) {
        (Some(verifier), Some(header)) => {
            let token = bearer_token(&header)
                .map_err(|err| AppError::Unauthorized(err.to_string()))?;
            let claims = verifier
                .verify(token)
                .await
                .map_err(|err| AppError::Unauthorized(err.to_string()))?;
            Some(claims)
        }
        _ => None,
    };

    req.extensions_mut().insert(Identity(claims));
    Ok(next.run(req).await)
}

/// Gate for admin-only routes. With no verifier configured everything passes
/// through (dev-mode trust boundary); otherwise the caller must present
/// verified claims carrying an admin role.
pub async fn admin_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.verifier.is_some() {
        let identity = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity(None));
        match identity.0 {
            Some(claims) if has_admin_role(&claims) => {}
            Some(_) => {
                return Err(AppError::Forbidden("admin role required".to_string()));
            }
            None => {
                return Err(AppError::Unauthorized("authentication required".to_string()));
            }
        }
    }
    Ok(next.run(req).await)
}
