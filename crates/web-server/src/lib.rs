use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use configuration::{ResourceSettings, ServerSettings, Settings};
use core_types::FieldNames;
use database::{PgRecordStore, RecordStore};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod telemetry;

use error::AppError;

/// The state shared by the handlers of one resource.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub fields: FieldNames,
    pub singular: String,
    pub strict_ids: bool,
    not_found_message: String,
}

impl AppState {
    pub fn new(resource: &ResourceSettings, store: Arc<dyn RecordStore>) -> Self {
        let singular = resource.singular();
        let not_found_message = format!("{} not found", capitalize(&singular));
        Self {
            store,
            fields: resource.field_names(),
            singular,
            strict_ids: resource.strict_ids,
            not_found_message,
        }
    }

    /// Interprets the `:id` path segment.
    ///
    /// A non-numeric id cannot match any row, so by default it is simply
    /// `None` and the caller answers 404. With `strict_ids` it is a 400.
    pub fn parse_id(&self, raw: &str) -> Result<Option<i32>, AppError> {
        match raw.parse::<i32>() {
            Ok(id) => Ok(Some(id)),
            Err(_) if self.strict_ids => Err(AppError::BadRequest(format!("invalid id '{raw}'"))),
            Err(_) => Ok(None),
        }
    }

    pub fn not_found(&self) -> AppError {
        AppError::NotFound(self.not_found_message.clone())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The five CRUD routes of one resource, mounted at `/<path>`.
pub fn resource_router(path: &str, state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            &format!("/{path}"),
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            &format!("/{path}/:id"),
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .with_state(state)
}

/// Accepts `http://localhost` and `http://127.0.0.1`, on any port.
/// The host must match exactly, so `http://localhost.example.com` is refused.
fn is_local_origin(origin: &HeaderValue) -> bool {
    let Some(authority) = origin.to_str().ok().and_then(|o| o.strip_prefix("http://")) else {
        return false;
    };
    let (host, port) = match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };
    let port_ok = port.is_none_or(|p| {
        !p.is_empty() && p.len() <= 5 && p.bytes().all(|b| b.is_ascii_digit())
    });
    matches!(host, "localhost" | "127.0.0.1") && port_ok
}

fn cors_layer(server: &ServerSettings) -> CorsLayer {
    let origins = if server.cors_permissive {
        AllowOrigin::any()
    } else {
        AllowOrigin::predicate(|origin: &HeaderValue, _| is_local_origin(origin))
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any())
}

/// Assembles the application from one `(path, state)` pair per resource.
pub fn build_router(resources: Vec<(String, Arc<AppState>)>, server: &ServerSettings) -> Router {
    let mut app = Router::new().route("/health", get(|| async { "OK" }));
    for (path, state) in resources {
        app = app.merge(resource_router(&path, state));
    }

    app.layer(cors_layer(server))
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
}

/// Connects the pool, builds one store per resource and serves until a
/// shutdown signal arrives. The pool is closed before returning.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database).await?;
    if settings.database.create_tables {
        database::create_tables(&pool, &settings.resources).await?;
    }

    let mut resources = Vec::with_capacity(settings.resources.len());
    for resource in &settings.resources {
        let store = PgRecordStore::new(pool.clone(), resource)?;
        tracing::info!(
            path = %format!("/{}", resource.path),
            table = %store.table(),
            label = %resource.label_field,
            flag = %resource.flag_field,
            "Mounted resource."
        );
        resources.push((resource.path.clone(), Arc::new(AppState::new(resource, Arc::new(store)))));
    }
    let app = build_router(resources, &settings.server);

    let addr = settings.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete.");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, starting shutdown."),
        _ = terminate => tracing::info!("Received SIGTERM, starting shutdown."),
    }
}
