use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Verified identity assertion extracted from a bearer token.
///
/// Token issuance and key management live outside this core; every service
/// consumes identity as a black-box `verify(token) -> Claims` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> CoreResult<Claims>;
}

/// Role checks are a pure function over claims, not a middleware concern.
pub fn has_admin_role(claims: &Claims) -> bool {
    claims.roles.iter().any(|r| r.eq_ignore_ascii_case("admin"))
}

/// Strip the `Bearer ` scheme from an Authorization header value.
pub fn bearer_token(header_value: &str) -> CoreResult<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::Validation("Missing or invalid Authorization header".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_roles(roles: &[&str]) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            email: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 0,
        }
    }

    #[test]
    fn admin_role_is_case_insensitive() {
        assert!(has_admin_role(&claims_with_roles(&["ADMIN"])));
        assert!(has_admin_role(&claims_with_roles(&["user", "admin"])));
        assert!(!has_admin_role(&claims_with_roles(&["user"])));
        assert!(!has_admin_role(&claims_with_roles(&[])));
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("Bearer ").is_err());
    }
}
