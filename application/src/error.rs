//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

use crate::api::Envelope;

/// Defines a new error type convertible into an [`Error`].
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        $(#[$meta:meta])*
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_owned(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    ///
    /// Never exposed to clients for server errors.
    pub message: String,
}

impl Error {
    /// Message clients receive instead of a server [`Error`]'s own one.
    pub const SERVER_ERROR_MESSAGE: &'static str = "Server error";

    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = if self.status_code.is_server_error() {
            log::error!("{self}");
            Self::SERVER_ERROR_MESSAGE.to_owned()
        } else {
            self.message
        };

        (
            self.status_code,
            Envelope::<()>::failure(self.code, message),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError + fmt::Display> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }

    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        let mut error = self.as_ref().as_error();
        error.backtrace = Some(self.trace().clone());
        error
    }
}

impl AsError for JsonRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.body_text(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use super::{AsError as _, Error};

    crate::define_error! {
        /// Errors of tests.
        enum TestError {
            #[code = "TEAPOT"]
            #[status = IM_A_TEAPOT]
            #[message = "I'm a teapot"]
            Teapot,
        }
    }

    #[test]
    fn defined_error_converts() {
        let err = Error::from(TestError::Teapot);

        assert_eq!(err.code, "TEAPOT");
        assert_eq!(err.status_code, http::StatusCode::IM_A_TEAPOT);
        assert_eq!(err.message, "I'm a teapot");
        assert_eq!(err.to_string(), "[TEAPOT]: I'm a teapot");
    }

    #[test]
    fn traced_error_keeps_trace() {
        let err = tracerr::new!(TestError::Teapot).into_error();

        assert_eq!(err.code, "TEAPOT");
        assert!(err.backtrace.is_some());
    }

    impl super::AsError for TestError {
        fn try_as_error(&self) -> Option<Error> {
            Some((*self).into())
        }
    }
}
