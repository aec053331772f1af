//! Account pages: signup, login, logout, and the profile view.

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use nestboard_auth::AuthError;

use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::schema::{FormSchema, LoginForm, SignupForm};
use crate::session::{self, CurrentUser};
use crate::state::AppState;
use crate::views;

/// GET /signup
pub async fn signup_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (flash, jar) = flash::take(jar);
    (jar, views::signup_form(flash.as_ref()))
}

/// POST /signup
///
/// Registers, then immediately logs the new account in. A taken username
/// bounces back to the form with a flash rather than an error page.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<impl IntoResponse, PageError> {
    form.validate()?;
    let username = form.username.trim().to_owned();

    let user = match state
        .authenticator()
        .register_with_password(&username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::UserExists) => {
            let jar = flash::push(jar, Flash::error("That username is already taken"));
            return Ok((jar, Redirect::to("/signup")));
        }
        Err(err) => return Err(err.into()),
    };

    let session = state
        .authenticator()
        .login_with_password(&username, &form.password)
        .await?;
    info!(user = %user.public_id, "new user signed up");

    let jar = jar.add(session::issue_cookie(&state, session.token));
    let jar = flash::push(jar, Flash::success(format!("Welcome, {username}!")));
    Ok((jar, Redirect::to("/listing")))
}

/// GET /login
pub async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (flash, jar) = flash::take(jar);
    (jar, views::login_form(flash.as_ref()))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, PageError> {
    form.validate()?;
    let username = form.username.trim();

    let session = match state
        .authenticator()
        .login_with_password(username, &form.password)
        .await
    {
        Ok(session) => session,
        Err(AuthError::InvalidCredentials) => {
            let jar = flash::push(jar, Flash::error("Invalid username or password"));
            return Ok((jar, Redirect::to("/login")));
        }
        Err(err) => return Err(err.into()),
    };

    let jar = jar.add(session::issue_cookie(&state, session.token));
    let jar = flash::push(jar, Flash::success(format!("Welcome back, {username}!")));
    Ok((jar, Redirect::to("/listing")))
}

/// POST /logout
///
/// Destroys the session server-side and drops the cookie. Logging out
/// without a session is a no-op redirect.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, PageError> {
    if let Some(token) = session::token_from_jar(&jar) {
        state.authenticator().logout(&token).await?;
    }

    let jar = jar.remove(session::removal_cookie());
    let jar = flash::push(jar, Flash::success("You are logged out"));
    Ok((jar, Redirect::to("/login")))
}

/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, PageError> {
    let listings = state.listings().owned_listings(user.id).await?;
    let (flash, jar) = flash::take(jar);
    Ok((jar, views::profile(&user, &listings, flash.as_ref())))
}
