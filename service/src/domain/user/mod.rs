//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Registered user owning notes.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Username`] of this [`User`].
    pub username: Username,

    /// [`Email`] of this [`User`], if any.
    pub email: Option<Email>,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was last updated.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Unique name a [`User`] logs in with.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Username(String);

impl Username {
    /// Maximum length of a [`Username`] in characters.
    pub const MAX_LEN: usize = 50;

    /// Creates a new [`Username`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Username`]: letters,
    /// digits, `_`, `.` and `-` only, so it never looks like an [`Email`].
    fn check(name: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Username`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}_.\-]+$").expect("valid regex")
        });

        let name = name.as_ref();
        name.chars().count() <= Self::MAX_LEN && REGEX.is_match(name)
    }
}

impl FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

impl TryFrom<String> for Username {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

/// Identifier a [`User`] provides on login: either a [`Username`] or an
/// [`Email`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Login {
    /// [`Username`] of a [`User`].
    Username(Username),

    /// [`Email`] of a [`User`].
    Email(Email),
}

impl Login {
    /// Parses the provided identifier as an [`Email`] if it contains `@`, or
    /// as a [`Username`] otherwise.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Option<Self> {
        let identifier = identifier.into();
        if identifier.contains('@') {
            Email::new(identifier).map(Self::Email)
        } else {
            Username::new(identifier).map(Self::Username)
        }
    }
}

/// Password of a [`User`] in plain text.
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Maximum length of a [`Password`] in bytes.
    pub const MAX_LEN: usize = 128;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.len() <= Self::MAX_LEN
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2id] hash of a [`Password`] in the [PHC string format].
///
/// [Argon2id]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If [`Argon2`] fails to hash the [`Password`].
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.0.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
    }

    /// Checks whether the provided [`Password`] matches this [`PasswordHash`].
    ///
    /// A malformed [`PasswordHash`] never matches.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.0.as_bytes(), &hash)
                .is_ok()
        })
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Maximum length of an [`Email`], in characters.
    pub const MAX_LEN: usize = 255;

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format, as described in
        /// [RFC 5322](https://www.rfc-editor.org/rfc/rfc5322#section-3.4.1).
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                "^([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                  |\\x5c[\\x00-\\x7f])*\\x22)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x22([^\\x0d\\x22\\x5c\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x22))*\\x40\
                  ([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                     \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                  |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d)\
                  (\\x2e([^\\x00-\\x20\\x22\\x28\\x29\\x2c\\x2e\\x3a-\
                           \\x3c\\x3e\\x40\\x5b-\\x5d\\x7f-\\xff]+\
                        |\\x5b([^\\x0d\\x5b-\\x5d\\x80-\\xff]\
                        |\\x5c[\\x00-\\x7f])*\\x5d))*$",
            )
            .expect("valid regex")
        });

        let address = address.as_ref();
        address.chars().count() <= Self::MAX_LEN && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was last updated.
pub type UpdateDateTime = DateTimeOf<(User, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::{Email, Login, Password, PasswordHash, Username};

    #[test]
    fn username_format() {
        assert!(Username::new("alice").is_some());
        assert!(Username::new("root").is_some());
        assert!(Username::new("j.doe-42_x").is_some());
        assert!(Username::new("Ärger").is_some());

        assert!(Username::new("").is_none());
        assert!(Username::new(" alice").is_none());
        assert!(Username::new("al ice").is_none());
        assert!(Username::new("alice@example.com").is_none());
        assert!(Username::new("a".repeat(Username::MAX_LEN + 1)).is_none());
        assert!(Username::new("a".repeat(Username::MAX_LEN)).is_some());
    }

    #[test]
    fn login_detects_email() {
        assert_eq!(
            Login::new("root@example.com"),
            Some(Login::Email(Email::new("root@example.com").unwrap())),
        );
        assert_eq!(
            Login::new("root"),
            Some(Login::Username(Username::new("root").unwrap())),
        );
        assert_eq!(Login::new("not an email@"), None);
    }

    #[test]
    fn email_length() {
        let local = "a".repeat(Email::MAX_LEN - "@example.com".len());
        assert!(Email::new(format!("{local}@example.com")).is_some());
        assert!(Email::new(format!("{local}a@example.com")).is_none());
        assert!(Email::new(format!("{}@example.com", "a".repeat(300)))
            .is_none());
    }

    #[test]
    fn password_length() {
        assert!(Password::new("p1").is_some());
        assert!(Password::new("").is_none());
        assert!(Password::new("x".repeat(Password::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn password_hash_verifies_only_original_password() {
        let password = Password::new("p1").unwrap();
        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.to_string().starts_with("$argon2id$"));
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("p2").unwrap()));
    }

    #[test]
    fn password_hash_is_salted() {
        let password = Password::new("p1").unwrap();

        assert_ne!(
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );
    }
}
