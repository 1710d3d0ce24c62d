pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthenticatedUser, IdentityMiddleware, OptionalUser, TOKEN_COOKIE};
