//! Server-rendered HTML views.
//!
//! Markup is assembled with plain string formatting; every piece of
//! user-provided text passes through [`escape`] before it reaches a page.

use axum::http::StatusCode;
use axum::response::Html;
use nestboard_auth::User;
use nestboard_db::Listing;

use crate::flash::{Flash, FlashLevel};

/// HTML-escapes text destined for element content or attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn nav(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            concat!(
                r#"<nav><a href="/listing">Listings</a> "#,
                r#"<a href="/listing/new">New listing</a> "#,
                r#"<a href="/profile">{}</a> "#,
                r#"<form class="inline" method="post" action="/logout">"#,
                r#"<button type="submit">Log out</button></form></nav>"#
            ),
            escape(&user.username)
        ),
        None => concat!(
            r#"<nav><a href="/listing">Listings</a> "#,
            r#"<a href="/login">Log in</a> "#,
            r#"<a href="/signup">Sign up</a></nav>"#
        )
        .to_owned(),
    }
}

fn flash_banner(flash: Option<&Flash>) -> String {
    match flash {
        Some(flash) => {
            let class = match flash.level {
                FlashLevel::Success => "flash success",
                FlashLevel::Error => "flash error",
            };
            format!(r#"<p class="{}">{}</p>"#, class, escape(&flash.message))
        }
        None => String::new(),
    }
}

fn layout(title: &str, user: Option<&User>, flash: Option<&Flash>, body: &str) -> Html<String> {
    Html(format!(
        concat!(
            "<!DOCTYPE html>\n",
            r#"<html lang="en"><head><meta charset="utf-8">"#,
            "<title>{title} | Nestboard</title></head>\n",
            "<body>{nav}{flash}\n<main>{body}</main>\n</body></html>"
        ),
        title = escape(title),
        nav = nav(user),
        flash = flash_banner(flash),
        body = body,
    ))
}

fn listing_card(listing: &Listing) -> String {
    format!(
        concat!(
            r#"<article class="listing"><h2><a href="/listing/{id}">{title}</a></h2>"#,
            "<p>{location}</p><p>{technology}</p><p>{price} &euro;/month</p></article>"
        ),
        id = escape(&listing.public_id),
        title = escape(&listing.title),
        location = escape(&listing.location),
        technology = escape(&listing.technology),
        price = listing.price,
    )
}

fn listing_grid(listings: &[Listing]) -> String {
    if listings.is_empty() {
        return "<p>No listings found.</p>".to_owned();
    }
    listings.iter().map(listing_card).collect()
}

const FILTER_FORM: &str = concat!(
    r#"<form method="post" action="/listing/filter">"#,
    r#"<input type="text" name="search" placeholder="Search listings">"#,
    r#"<select name="sort_by">"#,
    r#"<option value="">Sort by</option>"#,
    r#"<option value="title">Title</option>"#,
    r#"<option value="location">Location</option>"#,
    r#"<option value="technology">Technology</option>"#,
    r#"<option value="price">Price</option>"#,
    r#"<option value="created_at">Newest</option>"#,
    "</select>",
    r#"<select name="order">"#,
    r#"<option value="asc">Ascending</option>"#,
    r#"<option value="desc">Descending</option>"#,
    "</select>",
    r#"<button type="submit">Filter</button></form>"#
);

pub fn home(listings: &[Listing], user: Option<&User>, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        "<h1>All Listings</h1>{}{}",
        FILTER_FORM,
        listing_grid(listings)
    );
    layout("All Listings", user, flash, &body)
}

pub fn filter_results(
    listings: &[Listing],
    user: Option<&User>,
    flash: Option<&Flash>,
) -> Html<String> {
    let body = format!(
        "<h1>Filtered Listings</h1>{}{}",
        FILTER_FORM,
        listing_grid(listings)
    );
    layout("Filtered Listings", user, flash, &body)
}

pub fn show(listing: &Listing, user: Option<&User>, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        concat!(
            "<h1>{title}</h1>",
            r#"<p class="location">{location}</p>"#,
            r#"<p class="technology">{technology}</p>"#,
            r#"<p class="price">{price} &euro;/month</p>"#,
            r#"<p class="description">{description}</p>"#,
            r#"<a href="/listing/{id}/edit">Edit</a>"#,
            r#"<form class="inline" method="post" action="/listing/{id}?_method=DELETE">"#,
            r#"<button type="submit">Delete</button></form>"#
        ),
        title = escape(&listing.title),
        location = escape(&listing.location),
        technology = escape(&listing.technology),
        price = listing.price,
        description = escape(&listing.description),
        id = escape(&listing.public_id),
    );
    layout(&listing.title, user, flash, &body)
}

fn listing_fields(
    title: &str,
    location: &str,
    technology: &str,
    description: &str,
    price: i64,
) -> String {
    format!(
        concat!(
            r#"<label>Title <input type="text" name="title" value="{title}"></label>"#,
            r#"<label>Location <input type="text" name="location" value="{location}"></label>"#,
            r#"<label>Technology <input type="text" name="technology" value="{technology}"></label>"#,
            r#"<label>Description <textarea name="description">{description}</textarea></label>"#,
            r#"<label>Price <input type="number" name="price" min="0" value="{price}"></label>"#
        ),
        title = escape(title),
        location = escape(location),
        technology = escape(technology),
        description = escape(description),
        price = price,
    )
}

pub fn new_form(user: &User, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        concat!(
            "<h1>New Listing</h1>",
            r#"<form method="post" action="/listing">{}"#,
            r#"<button type="submit">Create</button></form>"#
        ),
        listing_fields("", "", "", "", 0)
    );
    layout("New Listing", Some(user), flash, &body)
}

pub fn edit_form(listing: &Listing, user: &User, flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        concat!(
            "<h1>Edit Listing</h1>",
            r#"<form method="post" action="/listing/{id}?_method=PUT">{fields}"#,
            r#"<button type="submit">Save</button></form>"#
        ),
        id = escape(&listing.public_id),
        fields = listing_fields(
            &listing.title,
            &listing.location,
            &listing.technology,
            &listing.description,
            listing.price,
        ),
    );
    layout("Edit Listing", Some(user), flash, &body)
}

pub fn login_form(flash: Option<&Flash>) -> Html<String> {
    let body = concat!(
        "<h1>Log In</h1>",
        r#"<form method="post" action="/login">"#,
        r#"<label>Username <input type="text" name="username"></label>"#,
        r#"<label>Password <input type="password" name="password"></label>"#,
        r#"<button type="submit">Log in</button></form>"#,
        r#"<p>No account yet? <a href="/signup">Sign up</a></p>"#
    );
    layout("Log In", None, flash, body)
}

pub fn signup_form(flash: Option<&Flash>) -> Html<String> {
    let body = concat!(
        "<h1>Sign Up</h1>",
        r#"<form method="post" action="/signup">"#,
        r#"<label>Username <input type="text" name="username"></label>"#,
        r#"<label>Password <input type="password" name="password"></label>"#,
        r#"<button type="submit">Sign up</button></form>"#,
        r#"<p>Already registered? <a href="/login">Log in</a></p>"#
    );
    layout("Sign Up", None, flash, body)
}

pub fn profile(user: &User, listings: &[Listing], flash: Option<&Flash>) -> Html<String> {
    let body = format!(
        "<h1>{}</h1><h2>Your Listings</h2>{}",
        escape(&user.username),
        listing_grid(listings)
    );
    layout("Profile", Some(user), flash, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        "<h1>{}</h1><p>{}</p>",
        status.as_u16(),
        escape(message)
    );
    layout("Error", None, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("it's & that"), "it&#39;s &amp; that");
    }

    #[test]
    fn home_escapes_listing_text() {
        let listing = Listing {
            id: 1,
            public_id: "abc".into(),
            owner_id: 1,
            title: "<b>Loft</b>".into(),
            location: "Berlin".into(),
            technology: "Fiber".into(),
            description: String::new(),
            price: 700,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let Html(page) = home(std::slice::from_ref(&listing), None, None);
        assert!(page.contains("&lt;b&gt;Loft&lt;/b&gt;"));
        assert!(!page.contains("<b>Loft</b>"));
    }

    #[test]
    fn error_page_shows_status_and_message() {
        let Html(page) = error_page(StatusCode::NOT_FOUND, "Page Not Found");
        assert!(page.contains("404"));
        assert!(page.contains("Page Not Found"));
    }
}
