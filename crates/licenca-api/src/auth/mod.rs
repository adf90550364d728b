pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{IdentityProvider, JwtIdentityProvider};
pub use middleware::{auth_middleware, bearer_token, AuthState};
pub use models::{BearerToken, Claims, Identity};
