//! One-shot status messages carried across a redirect in a cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use url::form_urlencoded;

pub const FLASH_COOKIE: &str = "tenki_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl FlashLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "danger" => Some(Self::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("level", self.level.as_str())
            .append_pair("message", &self.message)
            .finish()
    }

    fn decode(value: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;
        for (key, val) in form_urlencoded::parse(value.as_bytes()) {
            match key.as_ref() {
                "level" => level = FlashLevel::parse(&val),
                "message" => message = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            level: level?,
            message: message?,
        })
    }

    /// Queue this flash for the next rendered page.
    pub fn set(self, jar: CookieJar) -> CookieJar {
        jar.add(
            Cookie::build((FLASH_COOKIE, self.encode()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    }

    /// Pop the pending flash, if any, and clear the cookie.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let Some(cookie) = jar.get(FLASH_COOKIE) else {
            return (jar, None);
        };
        let flash = Flash::decode(cookie.value());
        (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
    }
}
