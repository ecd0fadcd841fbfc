//! [`Session`] definitions.

use std::net::IpAddr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authenticated session of a [`User`], carried as [JWT] claims.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`user::Username`] of the [`User`] this [`Session`] belongs to.
    pub username: user::Username,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Signed access token of a [`Session`].
///
/// Nothing is known about a [`Token`] until it's verified.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Token(String);

/// Signature of an HTTP request a [`Session`] is authorized for.
///
/// Identical signatures within a short window reuse the previously authorized
/// [`Session`] instead of verifying the [`Token`] again.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{client} {method} {path}")]
pub struct Signature {
    /// Address of the client the request originates from.
    pub client: IpAddr,

    /// HTTP method of the request.
    pub method: String,

    /// Path (with query) of the request.
    pub path: String,
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
