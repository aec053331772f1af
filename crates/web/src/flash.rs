//! One-shot notification messages carried across a redirect.
//!
//! A flash is stored in a short-lived cookie and removed as soon as it is
//! read, so a message set while handling one request is shown exactly once
//! on the next page the client loads.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub const FLASH_COOKIE: &str = "nestboard_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    fn tag(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Queues a flash for the next request.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, encode(&flash)))
        .path("/")
        .http_only(true)
        .build();
    jar.add(cookie)
}

/// Takes the pending flash, if any, clearing it from the jar.
pub fn take(jar: CookieJar) -> (Option<Flash>, CookieJar) {
    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|cookie| decode(cookie.value()));
    if flash.is_some() {
        let removal = Cookie::build(FLASH_COOKIE).path("/").build();
        (flash, jar.remove(removal))
    } else {
        (None, jar)
    }
}

// The message is base64-encoded so punctuation survives cookie transport.
fn encode(flash: &Flash) -> String {
    format!(
        "{}:{}",
        flash.level.tag(),
        URL_SAFE_NO_PAD.encode(flash.message.as_bytes())
    )
}

fn decode(value: &str) -> Option<Flash> {
    let (tag, encoded) = value.split_once(':')?;
    let level = FlashLevel::parse(tag)?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let message = String::from_utf8(bytes).ok()?;
    Some(Flash { level, message })
}
