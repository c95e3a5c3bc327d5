/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: signing and verifying bearer tokens
/// - [`token`]: issuing revocable tokens (JWT + access token row)
/// - [`middleware`]: resolving the request principal from a bearer token
/// - [`authorization`]: the owner-only board policy
///
/// # Example
///
/// ```no_run
/// use kanban_shared::auth::password::{hash_password, verify_password};
/// use kanban_shared::auth::token::issue_token;
/// use kanban_shared::auth::jwt::default_ttl;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password123")?;
/// assert!(verify_password("password123", &hash)?);
///
/// let issued = issue_token(&pool, 1, "jwt-secret", default_ttl()).await?;
/// println!("Bearer {}", issued.token);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;
