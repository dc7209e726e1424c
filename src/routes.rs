use axum::routing::{get, post, put};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{admin, public};

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Auth
        .route("/api/auth/login", post(public::auth::login))
        // Content collections: reads are public, writes are admin
        .route(
            "/api/sermons",
            get(public::content::sermons_list).post(admin::content::sermon_create),
        )
        .route(
            "/api/sermons/:id",
            get(public::content::sermons_get)
                .put(admin::content::sermon_update)
                .delete(admin::content::sermon_delete),
        )
        .route(
            "/api/events",
            get(public::content::events_list).post(admin::content::event_create),
        )
        .route(
            "/api/events/:id",
            get(public::content::events_get)
                .put(admin::content::event_update)
                .delete(admin::content::event_delete),
        )
        .route(
            "/api/leaders",
            get(public::content::leaders_list).post(admin::content::leader_create),
        )
        .route(
            "/api/leaders/:id",
            get(public::content::leaders_get)
                .put(admin::content::leader_update)
                .delete(admin::content::leader_delete),
        )
        .route(
            "/api/cell-groups",
            get(public::content::cell_groups_list).post(admin::content::cell_group_create),
        )
        .route(
            "/api/cell-groups/:id",
            get(public::content::cell_groups_get)
                .put(admin::content::cell_group_update)
                .delete(admin::content::cell_group_delete),
        )
        .route(
            "/api/zones",
            get(public::content::zones_list).post(admin::content::zone_create),
        )
        .route(
            "/api/zones/:id",
            get(public::content::zones_get)
                .put(admin::content::zone_update)
                .delete(admin::content::zone_delete),
        )
        .route(
            "/api/media",
            get(public::content::media_list).post(admin::content::media_create),
        )
        .route(
            "/api/media/:id",
            get(public::content::media_get)
                .put(admin::content::media_update)
                .delete(admin::content::media_delete),
        )
        // Membership renewals
        .route("/api/membership/renew", post(public::requests::membership_renew))
        .route("/api/membership/renewals", get(admin::requests::renewals_list))
        .route(
            "/api/membership/renewals/:id",
            put(admin::requests::renewal_status_put).delete(admin::requests::renewal_delete),
        )
        // Foundation classes
        .route(
            "/api/foundation-classes/register",
            post(public::requests::foundation_class_register),
        )
        .route(
            "/api/foundation-classes/registrations",
            get(admin::requests::registrations_list),
        )
        .route(
            "/api/foundation-classes/registrations/:id",
            put(admin::requests::registration_status_put)
                .delete(admin::requests::registration_delete),
        )
        // Event signups
        .route("/api/events/:id/signup", post(public::requests::event_signup))
        .route("/api/event-signups", get(admin::requests::signups_list))
        .route(
            "/api/event-signups/:id",
            put(admin::requests::signup_status_put).delete(admin::requests::signup_delete),
        )
        // Notifications
        .route("/api/notifications", post(admin::notifications::send))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until shutdown. Port resolution: explicit override,
/// then PARISH_API_PORT / PORT env, then 3000.
pub async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let config = crate::config::config();
    tracing::info!("Starting Parish API in {:?} mode", config.environment);

    let app = app();

    let port = port_override
        .or_else(|| {
            std::env::var("PARISH_API_PORT")
                .ok()
                .or_else(|| std::env::var("PORT").ok())
                .and_then(|s| s.parse::<u16>().ok())
        })
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    println!("🚀 Parish API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Parish API (Rust)",
            "version": version,
            "description": "Church content management backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/login (public - token acquisition)",
                "content": "/api/sermons, /api/events, /api/leaders, /api/cell-groups, /api/zones, /api/media (GET public, writes admin)",
                "membership": "/api/membership/renew (public), /api/membership/renewals[/:id] (admin)",
                "foundation_classes": "/api/foundation-classes/register (public), /api/foundation-classes/registrations[/:id] (admin)",
                "event_signups": "/api/events/:id/signup (public), /api/event-signups[/:id] (admin)",
                "notifications": "/api/notifications (admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
