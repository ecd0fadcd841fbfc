//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] making a request.
///
/// A request with the same [`session::Signature`] as a recently authorized
/// one reuses its [`Session`] without verifying any [`session::Token`], so a
/// burst of identical requests costs a single verification.
#[derive(Clone, Debug)]
pub struct AuthorizeUserSession {
    /// [`session::Signature`] of the request being authorized.
    pub signature: session::Signature,

    /// [`session::Token`] presented by the request, if any.
    pub token: Option<session::Token>,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { signature, token } = cmd;

        if let Some(session) = self.auth_cache().get(&signature).await {
            log::trace!("reusing `Session` authorized for `{signature}`");
            return Ok(session);
        }

        let token = token.ok_or_else(|| tracerr::new!(E::TokenMissing))?;

        let mut validation = Validation::default();
        validation.leeway = 0;
        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map_err(|e| {
            log::warn!("failed to verify `session::Token`: {e}");
            tracerr::new!(E::from(e))
        })?
        .claims;

        let ttl = session.expires_at.remaining();
        self.auth_cache()
            .insert_for(signature, session.clone(), ttl)
            .await;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// No [`session::Token`] is presented.
    #[display("No `session::Token` is presented")]
    TokenMissing,

    /// [`session::Token`] is malformed, forged or expired.
    #[display("Failed to verify `session::Token`: {_0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        infra::Memory,
        Command as _, Service,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    fn signature(path: &str) -> session::Signature {
        session::Signature {
            client: [127, 0, 0, 1].into(),
            method: "GET".into(),
            path: path.into(),
        }
    }

    fn session(ttl: Duration) -> Session {
        let expires_at = session::ExpirationDateTime::now() + ttl;
        Session {
            user_id: user::Id::new(),
            username: user::Username::new("alice").unwrap(),
            expires_at: session::ExpirationDateTime::from_unix_timestamp(
                expires_at.unix_timestamp(),
            )
            .unwrap(),
        }
    }

    fn token(session: &Session, secret: &[u8]) -> session::Token {
        jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
        .into()
    }

    fn valid_token(session: &Session) -> session::Token {
        token(session, Service::<Memory>::TEST_SECRET)
    }

    fn service() -> Service<Memory> {
        Service::for_tests(Memory::default())
    }

    #[tokio::test(start_paused = true)]
    async fn verifies_token() {
        let svc = service();
        let expected = session(Duration::from_secs(3600));

        let session = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some(valid_token(&expected)),
            })
            .await
            .unwrap();

        assert_eq!(session, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn requires_token() {
        let err = service()
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::TokenMissing));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_garbage_token() {
        let err = service()
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some("garbage".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_foreign_signature() {
        let s = session(Duration::from_secs(3600));

        let err = service()
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some(token(&s, b"other secret")),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_expired_token() {
        let mut s = session(Duration::ZERO);
        s.expires_at = s.expires_at - Duration::from_secs(1);

        let err = service()
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some(valid_token(&s)),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn reuses_recent_result_for_same_signature() {
        let svc = service();
        let expected = session(Duration::from_secs(3600));
        let _ = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some(valid_token(&expected)),
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(100)).await;
        let cached = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: None,
            })
            .await
            .unwrap();
        assert_eq!(cached, expected);

        let err = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes?x=1"),
                token: None,
            })
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::TokenMissing),
            "different path is not cached",
        );
    }

    #[tokio::test(start_paused = true)]
    async fn forgets_result_after_ttl() {
        let svc = service();
        let s = session(Duration::from_secs(3600));
        let _ = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some(valid_token(&s)),
            })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(300)).await;
        let err = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::TokenMissing));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_cache_failures() {
        let svc = service();
        let _ = svc
            .execute(AuthorizeUserSession {
                signature: signature("/notes"),
                token: Some("garbage".into()),
            })
            .await
            .unwrap_err();

        assert!(svc.auth_cache().is_empty().await);
    }
}
