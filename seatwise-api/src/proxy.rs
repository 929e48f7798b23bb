use std::collections::HashMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Extension, Router,
};
use tracing::debug;

use seatwise_core::identity::has_admin_role;
use seatwise_core::{CoreError, CoreResult};
use seatwise_store::app_config::ServicesConfig;

use crate::error::AppError;
use crate::middleware::auth::Identity;
use crate::state::AppState;

/// Logical service name → base URL map for the pass-through gateway.
#[derive(Clone)]
pub struct ProxyTargets {
    client: reqwest::Client,
    targets: HashMap<String, String>,
}

impl ProxyTargets {
    pub fn new(services: &ServicesConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| CoreError::Internal(format!("failed to build http client: {err}")))?;

        let mut targets = HashMap::new();
        targets.insert("booking".to_string(), services.booking_url.clone());
        targets.insert("payment".to_string(), services.payment_url.clone());
        if let Some(url) = &services.notification_url {
            targets.insert("notification".to_string(), url.clone());
        }
        if let Some(url) = &services.admin_url {
            targets.insert("admin".to_string(), url.clone());
        }

        Ok(Self { client, targets })
    }

    fn url_for(&self, service: &str) -> Option<&str> {
        self.targets
            .get(service)
            .map(|url| url.trim_end_matches('/'))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/proxy/{service}/{*path}", any(forward))
}

/// Pass-through gateway: logical service + path + verb + payload becomes a
/// downstream call, with the verified identity forwarded as headers. Paths
/// with an `admin` segment require the admin role whenever a verifier is
/// configured; without one everything passes through unauthenticated.
async fn forward(
    State(state): State<AppState>,
    Path((service, path)): Path<(String, String)>,
    Extension(identity): Extension<Identity>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    if state.verifier.is_some() && path.split('/').any(|segment| segment == "admin") {
        match &identity.0 {
            Some(claims) if has_admin_role(claims) => {}
            Some(_) => return Err(AppError::Forbidden("admin role required".to_string())),
            None => {
                return Err(AppError::Unauthorized("authentication required".to_string()))
            }
        }
    }

    let base = state
        .proxy
        .url_for(&service)
        .ok_or_else(|| CoreError::NotFound(format!("Service {service}")))?;
    let url = format!("{base}/{path}");

    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| CoreError::Validation("unsupported method".to_string()))?;

    debug!(%url, "proxying request");

    let mut request = state.proxy.client.request(method, &url);
    if let Some(claims) = identity.0 {
        request = request
            .header("X-User-Id", claims.sub)
            .header("X-User-Roles", claims.roles.join(","));
    }
    if !body.is_empty() {
        request = request
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec());
    }

    let response = request
        .send()
        .await
        .map_err(|err| CoreError::Upstream(format!("{service} service unreachable: {err}")))?;

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let bytes = response
        .bytes()
        .await
        .map_err(|err| CoreError::Upstream(format!("failed to read {service} response: {err}")))?;

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        bytes.to_vec(),
    )
        .into_response())
}
