use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    auth::CurrentSession,
    session::{Role, RoleFlags},
};

/// RouteRequirement
///
/// What a route declaration demands of the visitor. At most one `require_*` flag is
/// expected per route, but nothing enforces that; see `evaluate` for how combinations
/// resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteRequirement {
    pub require_admin: bool,
    pub require_worker: bool,
    pub require_citizen: bool,
    /// Route sits behind the guard at all. A protected route with no specific role
    /// admits any signed-in visitor.
    pub protected: bool,
}

impl RouteRequirement {
    pub const PUBLIC: RouteRequirement = RouteRequirement {
        require_admin: false,
        require_worker: false,
        require_citizen: false,
        protected: false,
    };

    pub const SIGNED_IN: RouteRequirement = RouteRequirement {
        require_admin: false,
        require_worker: false,
        require_citizen: false,
        protected: true,
    };

    pub const fn role(role: Role) -> RouteRequirement {
        RouteRequirement {
            require_admin: matches!(role, Role::Admin),
            require_worker: matches!(role, Role::Worker),
            require_citizen: matches!(role, Role::Citizen),
            protected: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Redirected { to: &'static str },
}

/// evaluate
///
/// Checks run in a fixed order: admin, worker, citizen, then the generic
/// signed-in check. The first failing check decides the redirect target.
pub fn evaluate(requirement: RouteRequirement, flags: RoleFlags) -> GuardDecision {
    if requirement.require_admin && !flags.is_admin {
        tracing::warn!("Blocked non-admin access. Redirecting...");
        return GuardDecision::Redirected {
            to: Role::Admin.login_path(),
        };
    }

    if requirement.require_worker && !flags.is_worker {
        tracing::warn!("Blocked non-worker access. Redirecting...");
        return GuardDecision::Redirected {
            to: Role::Worker.login_path(),
        };
    }

    if requirement.require_citizen && !flags.is_citizen {
        tracing::warn!("Blocked non-citizen access. Redirecting...");
        return GuardDecision::Redirected {
            to: Role::Citizen.login_path(),
        };
    }

    let role_required =
        requirement.require_admin || requirement.require_worker || requirement.require_citizen;
    if requirement.protected && !role_required && !flags.any() {
        tracing::warn!("Blocked unauthorized access. Redirecting...");
        return GuardDecision::Redirected {
            to: Role::Citizen.login_path(),
        };
    }

    GuardDecision::Allowed
}

async fn enforce(
    requirement: RouteRequirement,
    current: CurrentSession,
    request: Request,
    next: Next,
) -> Response {
    match evaluate(requirement, current.session.flags()) {
        GuardDecision::Allowed => next.run(request).await,
        GuardDecision::Redirected { to } => Redirect::to(to).into_response(),
    }
}

// --- Middleware entry points ---
//
// Applied with `middleware::from_fn_with_state` so `CurrentSession` can reach the
// session store. One per route group in `routes`.

pub async fn require_citizen(current: CurrentSession, request: Request, next: Next) -> Response {
    enforce(RouteRequirement::role(Role::Citizen), current, request, next).await
}

pub async fn require_worker(current: CurrentSession, request: Request, next: Next) -> Response {
    enforce(RouteRequirement::role(Role::Worker), current, request, next).await
}

pub async fn require_admin(current: CurrentSession, request: Request, next: Next) -> Response {
    enforce(RouteRequirement::role(Role::Admin), current, request, next).await
}

pub async fn require_signed_in(current: CurrentSession, request: Request, next: Next) -> Response {
    enforce(RouteRequirement::SIGNED_IN, current, request, next).await
}
