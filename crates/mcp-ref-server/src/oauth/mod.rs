//! OAuth 2.1 authorization plane: PKCE, single-use authorization codes,
//! refresh tokens, and RFC 8414 / RFC 9728 discovery (spec.md §4.11-§4.13).

pub mod discovery;
pub mod handlers;
pub mod login;
pub mod pkce;
pub mod store;
pub mod types;
pub mod www_authenticate;

pub use store::OAuthStore;
pub use types::{AccessToken, AuthorizationCode, ClientInfo, OAuthClient, RefreshToken, TokenPair};
