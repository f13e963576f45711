/// Authentication middleware for Axum
///
/// Reads the `Authorization: Bearer <token>` header, validates the JWT and
/// loads the caller from the `users` table. On success the loaded [`User`]
/// and its [`AuthContext`] are added to the request extensions.
///
/// # Errors
///
/// - missing header, bad token, unknown user: 401
/// - malformed header: 400
/// - deactivated account: 403
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use crewdesk_shared::auth::middleware::{create_auth_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.user_id)
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(handler))
///         .layer(middleware::from_fn(create_auth_middleware(pool, "secret".to_string())))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::{User, UserRole};

/// Identity of the caller for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub is_active: bool,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole, is_active: bool) -> Self {
        Self {
            user_id,
            role,
            is_active,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, user.role, user.is_active)
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == UserRole::Superadmin
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header
    MissingCredentials,

    /// Authorization header isn't `Bearer <token>`
    InvalidFormat(String),

    /// Token rejected (signature, expiry, issuer, type)
    InvalidToken(String),

    /// Token is valid but its subject doesn't exist
    UnknownUser(Uuid),

    /// Account has been deactivated
    InactiveUser(Uuid),

    DatabaseError(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::InactiveUser(_) => StatusCode::FORBIDDEN,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidFormat(_) => "bad_request",
            AuthError::InvalidToken(_) | AuthError::UnknownUser(_) => "unauthorized",
            AuthError::InactiveUser(_) => "account_inactive",
            AuthError::DatabaseError(_) => "internal_error",
        }
    }

    fn message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Missing credentials".to_string(),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg.clone(),
            AuthError::UnknownUser(_) => "Unknown user".to_string(),
            AuthError::InactiveUser(_) => "Account is inactive".to_string(),
            AuthError::DatabaseError(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::DatabaseError(ref e) = self {
            tracing::error!(error = %e, "Failed to load caller identity");
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates `token` and loads the caller it names
///
/// The token is checked before the database is touched.
pub async fn authenticate(pool: &PgPool, secret: &str, token: &str) -> Result<User, AuthError> {
    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser(claims.sub))?;

    if !user.is_active {
        tracing::debug!(user_id = %user.id, "Rejected inactive account");
        return Err(AuthError::InactiveUser(user.id));
    }

    Ok(user)
}

pub async fn auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;
    let user = authenticate(&pool, &secret, token).await?;

    req.extensions_mut().insert(AuthContext::from_user(&user));
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Captures the pool and secret for use with `axum::middleware::from_fn`
pub fn create_auth_middleware(
    pool: PgPool,
    secret: String,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(auth_middleware(pool, secret, req, next))
    }
}
