//! Session cookie handling and the per-request identity extractors.
//!
//! `CurrentUser` is the access gate for protected pages: when no valid
//! session accompanies the request, its rejection redirects to the login
//! page with an explanatory flash instead of surfacing an error status.
//! `MaybeUser` does the same lookup but never rejects, for pages that
//! render for visitors and members alike.

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use nestboard_auth::User;

use crate::flash::{self, Flash};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "nestboard_session";

/// Builds the session cookie handed out on login and signup.
pub fn issue_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.cookie_secure())
        .max_age(time::Duration::seconds(state.session_ttl_seconds()))
        .build()
}

/// A removal cookie matching the one built by [`issue_cookie`].
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// The token presented by the request, if any.
pub fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
}

/// The authenticated user for this request. Extraction fails with a
/// redirect to the login page when the session is absent or invalid.
pub struct CurrentUser(pub User);

/// The authenticated user when one is present, `None` otherwise.
pub struct MaybeUser(pub Option<User>);

/// Rejection for [`CurrentUser`]: drops any stale session cookie, queues
/// a flash explaining the redirect, and sends the client to `/login`.
pub struct LoginRedirect {
    jar: CookieJar,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        let jar = self.jar.remove(removal_cookie());
        let jar = flash::push(jar, Flash::error("You must be logged in first"));
        (jar, Redirect::to("/login")).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let app = AppState::from_ref(state);

        let Some(token) = token_from_jar(&jar) else {
            return Err(LoginRedirect { jar });
        };

        match app.authenticate(&token).await {
            Ok((user, _session)) => Ok(Self(user)),
            Err(_) => Err(LoginRedirect { jar }),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let app = AppState::from_ref(state);

        let user = match token_from_jar(&jar) {
            Some(token) => app.authenticate(&token).await.ok().map(|(user, _)| user),
            None => None,
        };
        Ok(Self(user))
    }
}
