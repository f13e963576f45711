/// Authentication and authorization
///
/// # Modules
///
/// - [`jwt`]: bearer token validation (tokens are issued by the identity provider)
/// - [`middleware`]: Axum middleware that resolves the caller into an [`middleware::AuthContext`]
/// - [`authorization`]: role policy chain guarding each route
///
/// # Example
///
/// ```
/// use crewdesk_shared::auth::authorization::require_roles;
/// use crewdesk_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use crewdesk_shared::auth::middleware::AuthContext;
/// use crewdesk_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-shared-secret-of-at-least-32-bytes";
/// let token = create_token(&Claims::new(Uuid::new_v4(), TokenType::Access), secret)?;
/// let claims = validate_access_token(&token, secret)?;
///
/// // Role and active flag come from the users table in practice
/// let auth = AuthContext::new(claims.sub, UserRole::Leader, true);
/// require_roles(&auth, &[UserRole::Leader])?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
