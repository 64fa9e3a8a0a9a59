use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use stationflow_core::error::StationFlowError;

use crate::api::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Resolved caller: user id plus role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Accepts both `ADMIN` and the `ROLE_ADMIN` spelling.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| {
            let r = r.trim();
            r.eq_ignore_ascii_case("ADMIN") || r.eq_ignore_ascii_case("ROLE_ADMIN")
        })
    }

    pub fn require_admin(&self) -> Result<(), StationFlowError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(StationFlowError::Forbidden("admin role required".into()))
        }
    }

    /// Rate-limit key for mutating calls.
    pub fn throttle_key(&self) -> String {
        format!("user:{}", self.user_id)
    }

    fn from_parts(parts: &Parts) -> Option<Self> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_string();

        let roles = parts
            .headers
            .get(USER_ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { user_id, roles })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_parts(parts).ok_or_else(|| ApiError(StationFlowError::AuthFailed))
    }
}
