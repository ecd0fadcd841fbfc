use std::{
    future::IntoFuture as _,
    io,
    net::SocketAddr,
    sync::OnceLock,
    time,
};

use application::{config::SeedUser, router, Args, Config};
use axum::{extract::MatchedPath, Extension};
use axum_client_ip::InsecureClientIp;
use futures::{future, TryFutureExt as _};
use secrecy::SecretBox;
use service::{
    command::{self, Command as _},
    domain::user,
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    let level_enabled = |meta: &log::Metadata<'_>| {
        LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO) >= *meta.level()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(move |meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && level_enabled(meta)
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(move |meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && level_enabled(meta)
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log,
        seed,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let postgres_config = postgres.into();
    let mut postgres = Postgres::new(&postgres_config).map_err(|e| {
        log::error!("failed to initialize `Postgres` client: {e}");
    })?;

    migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;

    let (service, background) = Service::new(service.into(), postgres);

    seed_users(&service, seed.users).await?;

    let origins = if server.cors.origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            server
                .cors
                .origins
                .iter()
                .map(|origin| {
                    origin.parse::<http::header::HeaderValue>().map_err(|e| {
                        log::error!("`{origin}` is not a CORS origin: {e}");
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE]);

    let mut app = router();
    if let Some(dir) = server.static_dir {
        log::info!("serving static files from `{}`", dir.display());
        app = app.fallback_service(
            ServeDir::new(&dir)
                .fallback(ServeFile::new(dir.join("index.html"))),
        );
    }
    let app = app
        .layer(Extension(service))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.client_ip = InsecureClientIp::from(
                            r.headers(),
                            r.extensions()
                        )
                            .map(|ip| ip.0.to_string())
                            .ok(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get("User-Agent")
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(r.status().as_u16()),
                        );

                        let duration = format!("{}ms", dur.as_millis());
                        let duration = duration.as_str();
                        if r.status().is_server_error() {
                            tracing::error!(duration);
                        } else if r.status().is_client_error() {
                            tracing::warn!(duration);
                        } else {
                            tracing::info!(duration);
                        }
                    },
                ),
        );

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            log::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;

    log::info!("listening on `{}:{}`", server.host, server.port);

    let serve = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    future::try_join(
        serve
            .into_future()
            .map_err(|e| log::error!("webserver failed: {e}")),
        background.into_future().map_err(|e| {
            log::error!("background task failed: {e}");
        }),
    )
    .await
    .map(drop)
}

/// Registers the provided [`SeedUser`]s, skipping the already registered ones.
async fn seed_users(
    service: &application::Service,
    users: Vec<SeedUser>,
) -> Result<(), ()> {
    for SeedUser {
        username,
        password,
        email,
    } in users
    {
        let cmd = command::CreateUser {
            username: user::Username::new(username.clone()).ok_or_else(
                || log::error!("seed `User` has invalid name `{username}`"),
            )?,
            password: SecretBox::new(Box::new(
                user::Password::new(password).ok_or_else(|| {
                    log::error!("seed `User` `{username}` has invalid password")
                })?,
            )),
            email: email
                .map(|e| {
                    user::Email::new(e).ok_or_else(|| {
                        log::error!("seed `User` `{username}` has bad email")
                    })
                })
                .transpose()?,
        };

        match service.execute(cmd).await {
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.as_ref(),
                    command::create_user::ExecutionError::UsernameOccupied(_),
                ) =>
            {
                log::info!("seed `User` `{username}` is already registered");
            }
            Err(e) => {
                log::error!("failed to seed `User` `{username}`: {e}");
                return Err(());
            }
        }
    }
    Ok(())
}
