//! Listing pages: browse, search, and owner-gated writes.
//!
//! Write handlers follow a fixed order: authenticate, authorize against
//! the listing owner, validate the form, then touch the database. A
//! request that fails an earlier step never reaches a later one.

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use nestboard_auth::User;
use nestboard_db::{Listing, ListingUpdate};

use crate::error::PageError;
use crate::flash::{self, Flash};
use crate::schema::{FilterForm, ListingForm};
use crate::session::{CurrentUser, MaybeUser};
use crate::state::AppState;
use crate::views;

fn ensure_owner(listing: &Listing, user: &User) -> Result<(), PageError> {
    if listing.owner_id != user.id {
        return Err(PageError::forbidden("You do not own this listing"));
    }
    Ok(())
}

/// GET / and GET /listing
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, PageError> {
    let (flash, jar) = flash::take(jar);
    let listings = state.listings().list_all().await?;
    Ok((jar, views::home(&listings, user.as_ref(), flash.as_ref())))
}

/// POST /listing/filter
pub async fn filter(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    jar: CookieJar,
    Form(form): Form<FilterForm>,
) -> Result<impl IntoResponse, PageError> {
    let (flash, jar) = flash::take(jar);
    let listings = state.listings().search(&form.into_filter()).await?;
    Ok((
        jar,
        views::filter_results(&listings, user.as_ref(), flash.as_ref()),
    ))
}

/// GET /listing/:id
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PageError> {
    let listing = state.listings().find_by_public_id(&id).await?;
    let (flash, jar) = flash::take(jar);
    Ok((jar, views::show(&listing, Some(&user), flash.as_ref())))
}

/// GET /listing/new
pub async fn new_form(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    let (flash, jar) = flash::take(jar);
    (jar, views::new_form(&user, flash.as_ref()))
}

/// POST /listing
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<ListingForm>,
) -> Result<impl IntoResponse, PageError> {
    let new = form.into_listing()?;
    let listing = state.listings().create(user.id, new).await?;
    info!(listing = %listing.public_id, owner = %user.public_id, "listing created");

    let jar = flash::push(jar, Flash::success("New listing created!"));
    Ok((jar, Redirect::to("/listing")))
}

/// GET /listing/:id/edit
pub async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PageError> {
    let listing = state.listings().find_by_public_id(&id).await?;
    ensure_owner(&listing, &user)?;

    let (flash, jar) = flash::take(jar);
    Ok((jar, views::edit_form(&listing, &user, flash.as_ref())))
}

/// PUT /listing/:id
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<ListingForm>,
) -> Result<impl IntoResponse, PageError> {
    let listing = state.listings().find_by_public_id(&id).await?;
    ensure_owner(&listing, &user)?;

    let fields = form.into_listing()?;
    let updated = state
        .listings()
        .update(
            &id,
            ListingUpdate {
                title: fields.title,
                location: fields.location,
                technology: fields.technology,
                description: fields.description,
                price: fields.price,
            },
        )
        .await?;
    info!(listing = %updated.public_id, owner = %user.public_id, "listing updated");

    let jar = flash::push(jar, Flash::success("Listing updated!"));
    Ok((
        jar,
        Redirect::to(&format!("/listing/{}", updated.public_id)),
    ))
}

/// DELETE /listing/:id
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PageError> {
    let listing = state.listings().find_by_public_id(&id).await?;
    ensure_owner(&listing, &user)?;

    state.listings().delete(&id).await?;
    info!(listing = %listing.public_id, owner = %user.public_id, "listing deleted");

    let jar = flash::push(jar, Flash::success("Listing deleted"));
    Ok((jar, Redirect::to("/listing")))
}
