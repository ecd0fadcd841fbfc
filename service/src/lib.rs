//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod task;

use std::{error::Error, time::Duration};

use common::operations::{By, Start};
use derive_more::Debug;

use crate::domain::user::{session, Session};
#[cfg(doc)]
use crate::{command::AuthorizeUserSession, domain::User, infra::Database};

pub use self::{command::Command, query::Query, task::Task};

/// Cache of recent [`AuthorizeUserSession`] results.
pub type AuthCache = infra::Cache<session::Signature, Session>;

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of a [`Session`] created on [`User`] login.
    pub session_ttl: Duration,

    /// Period an [`AuthorizeUserSession`] result is reused for the same
    /// [`session::Signature`].
    pub auth_cache_ttl: Duration,

    /// [`task::SweepAuthCache`] configuration.
    pub sweep_auth_cache: task::sweep_auth_cache::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`AuthCache`] of this [`Service`].
    auth_cache: AuthCache,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    ///
    /// Returned [`task::Background`] must be awaited for the background
    /// [`Task`]s to run.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::SweepAuthCache<Self>,
                        task::sweep_auth_cache::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Self {
            auth_cache: AuthCache::new(config.auth_cache_ttl),
            config,
            database,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("SweepAuthCache", async move {
            svc.execute(Start(By::new(svc.config().sweep_auth_cache)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`AuthCache`] of this [`Service`].
    #[must_use]
    pub fn auth_cache(&self) -> &AuthCache {
        &self.auth_cache
    }
}

#[cfg(test)]
impl<Db> Service<Db> {
    /// Secret the [JWT]s are signed with in tests.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    pub(crate) const TEST_SECRET: &'static [u8] = b"secret";

    /// Creates a new [`Service`] for tests, without any background [`Task`]s.
    pub(crate) fn for_tests(database: Db) -> Self {
        let config = Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                Self::TEST_SECRET,
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                Self::TEST_SECRET,
            ),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            auth_cache_ttl: Duration::from_millis(300),
            sweep_auth_cache: task::sweep_auth_cache::Config {
                interval: Duration::from_secs(60),
            },
        };
        Self {
            auth_cache: AuthCache::new(config.auth_cache_ttl),
            config,
            database,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{
            self, AuthorizeUserSession, CreateNote, CreateUser,
            CreateUserSession, DeleteNote, UpdateNote,
        },
        domain::{
            note,
            user::{self, session},
        },
        infra::Memory,
        query, Command as _, Service,
    };

    fn password(p: &str) -> SecretBox<user::Password> {
        SecretBox::new(Box::new(user::Password::new(p).unwrap()))
    }

    fn signature(method: &str, path: &str) -> session::Signature {
        session::Signature {
            client: [10, 0, 0, 1].into(),
            method: method.into(),
            path: path.into(),
        }
    }

    #[tokio::test]
    async fn alice_manages_her_notes() {
        let svc = Service::for_tests(Memory::default());

        let alice = svc
            .execute(CreateUser {
                username: user::Username::new("alice").unwrap(),
                password: password("p1"),
                email: None,
            })
            .await
            .unwrap();
        let login = svc
            .execute(CreateUserSession {
                login: user::Login::new("alice").unwrap(),
                password: password("p1"),
            })
            .await
            .unwrap();
        let session = svc
            .execute(AuthorizeUserSession {
                signature: signature("POST", "/api/notes"),
                token: Some(login.token.clone()),
            })
            .await
            .unwrap();
        assert_eq!(session.user_id, alice.id);

        let created = svc
            .execute(CreateNote {
                user_id: session.user_id,
                title: note::Title::new("t").unwrap(),
                content: note::Content::new("c").unwrap(),
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(created.category.to_string(), "default");

        let listed = svc
            .execute(query::notes::ByOwner::by(session.user_id))
            .await
            .unwrap();
        assert_eq!(listed, [created.clone()]);

        let updated = svc
            .execute(UpdateNote {
                user_id: session.user_id,
                note_id: created.id,
                title: note::Title::new("t2"),
                content: None,
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.title.to_string(), "t2");
        assert_eq!(updated.content, created.content);

        let _ = svc
            .execute(DeleteNote {
                user_id: session.user_id,
                note_id: created.id,
            })
            .await
            .unwrap();
        assert!(svc
            .execute(query::note::ById::by((session.user_id, created.id)))
            .await
            .unwrap()
            .is_none());

        let err = svc
            .execute(DeleteNote {
                user_id: session.user_id,
                note_id: created.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            command::delete_note::ExecutionError::NoteNotExists(_),
        ));
    }
}
