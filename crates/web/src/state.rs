use nestboard_auth::{AuthError, AuthSession, Authenticator, User};
use nestboard_config::AuthConfig;
use nestboard_db::ListingRepository;

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    listings: ListingRepository,
    session_ttl_seconds: i64,
    cookie_secure: bool,
}

impl AppState {
    pub fn new(
        authenticator: Authenticator,
        listings: ListingRepository,
        auth_config: &AuthConfig,
    ) -> Self {
        let session_ttl_seconds = if auth_config.session_ttl_seconds > i64::MAX as u64 {
            i64::MAX
        } else {
            auth_config.session_ttl_seconds as i64
        };

        Self {
            authenticator,
            listings,
            session_ttl_seconds,
            cookie_secure: auth_config.cookie_secure,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn listings(&self) -> &ListingRepository {
        &self.listings
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub async fn authenticate(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        self.authenticator.authenticate_token(token).await
    }
}
