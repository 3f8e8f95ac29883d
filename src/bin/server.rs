//! Rolematrix REST API Server
//!
//! Run with: cargo run --features server --bin rolematrix-server
//!
//! Endpoints:
//!   GET    /status            - Store status
//!   PUT    /role              - Create or replace a role
//!   GET    /roles             - List all roles
//!   DELETE /role/:name        - Delete a role
//!   PUT    /catalog           - Replace the resource catalog
//!   GET    /catalog           - Get the effective catalog
//!   GET    /resolve/:name     - Resolve one role's effective permissions
//!   GET    /matrix            - Dense matrix for all roles
//!   POST   /check             - Check one (role, resource, action)
//!   POST   /reset             - Clear the store (dev only)

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rolematrix::{
    build_matrix, merge_role_permissions, store, Catalog, CatalogResource, ResolvedPermission,
    Role,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
struct PutRoleReq {
    name: String,
    #[serde(default)]
    permissions: Vec<rolematrix::Permission>,
    #[serde(default)]
    inherits_from: Vec<String>,
}

#[derive(Deserialize)]
struct PutCatalogReq {
    resources: Vec<CatalogResource>,
}

#[derive(Deserialize)]
struct CheckReq {
    role: String,
    resource: String,
    action: String,
}

#[derive(Serialize)]
struct StatusRes {
    roles: usize,
    catalog_pairs: usize,
    default_catalog: bool,
}

#[derive(Serialize)]
struct CheckRes {
    granted: bool,
    inherited: bool,
    inherited_from: Option<String>,
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Stored catalog, or the default set when none is stored or it is empty
fn effective_catalog() -> rolematrix::Result<Catalog> {
    Ok(match store::get_catalog()? {
        Some(c) if !c.is_empty() => c,
        _ => Catalog::default_set(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_status() -> Json<ApiResponse<StatusRes>> {
    let roles = store::list_roles().map(|r| r.len()).unwrap_or(0);
    let stored = store::get_catalog().ok().flatten().filter(|c| !c.is_empty());
    let default_catalog = stored.is_none();
    let catalog_pairs = stored.unwrap_or_else(Catalog::default_set).total_pairs();
    Json(ApiResponse::ok(StatusRes { roles, catalog_pairs, default_catalog }))
}

async fn put_role(Json(req): Json<PutRoleReq>) -> (StatusCode, Json<ApiResponse<String>>) {
    let role = Role {
        name: req.name.clone(),
        permissions: req.permissions,
        inherits_from: req.inherits_from,
    };
    match store::put_role(&role) {
        Ok(_) => (StatusCode::OK, Json(ApiResponse::ok(req.name))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn get_roles() -> (StatusCode, Json<ApiResponse<Vec<Role>>>) {
    match store::list_roles() {
        Ok(roles) => {
            let mut list: Vec<Role> = roles.into_values().collect();
            list.sort_by(|a, b| a.name.cmp(&b.name));
            (StatusCode::OK, Json(ApiResponse::ok(list)))
        }
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn delete_role(Path(name): Path<String>) -> (StatusCode, Json<ApiResponse<bool>>) {
    match store::delete_role(&name) {
        Ok(existed) => (StatusCode::OK, Json(ApiResponse::ok(existed))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn put_catalog(Json(req): Json<PutCatalogReq>) -> (StatusCode, Json<ApiResponse<usize>>) {
    let catalog = Catalog::new(req.resources);
    match store::put_catalog(&catalog) {
        Ok(_) => (StatusCode::OK, Json(ApiResponse::ok(catalog.total_pairs()))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn get_catalog() -> (StatusCode, Json<ApiResponse<Catalog>>) {
    match effective_catalog() {
        Ok(catalog) => (StatusCode::OK, Json(ApiResponse::ok(catalog))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn get_resolve(
    Path(name): Path<String>,
) -> (StatusCode, Json<ApiResponse<Vec<ResolvedPermission>>>) {
    let roles = match store::list_roles() {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    };
    match roles.get(&name) {
        Some(role) => {
            let resolved = merge_role_permissions(role, &roles, None);
            (StatusCode::OK, Json(ApiResponse::ok(resolved)))
        }
        None => (StatusCode::NOT_FOUND, Json(ApiResponse::err(format!("unknown role `{}`", name)))),
    }
}

async fn get_matrix(
) -> (StatusCode, Json<ApiResponse<HashMap<String, Vec<ResolvedPermission>>>>) {
    let roles = match store::list_roles() {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    };
    match effective_catalog() {
        Ok(catalog) => (StatusCode::OK, Json(ApiResponse::ok(build_matrix(&roles, &catalog)))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

async fn post_check(Json(req): Json<CheckReq>) -> (StatusCode, Json<ApiResponse<CheckRes>>) {
    let roles = match store::list_roles() {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    };
    let cell = roles.get(&req.role).and_then(|role| {
        merge_role_permissions(role, &roles, None)
            .into_iter()
            .find(|r| r.covers(&req.resource, &req.action))
    });
    let res = match cell {
        Some(c) => CheckRes { granted: c.granted, inherited: c.inherited, inherited_from: c.inherited_from },
        None => CheckRes { granted: false, inherited: false, inherited_from: None },
    };
    (StatusCode::OK, Json(ApiResponse::ok(res)))
}

async fn post_reset() -> (StatusCode, Json<ApiResponse<String>>) {
    match store::clear_all() {
        Ok(_) => (StatusCode::OK, Json(ApiResponse::ok("reset".into()))),
        Err(e) => (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let db_path = std::env::var("ROLEMATRIX_DB").unwrap_or_else(|_| "./data/rolematrix.mdb".into());
    tracing::info!(path = %db_path, "initializing store");
    store::init(&db_path).expect("failed to initialize store");

    // CORS for demo UIs
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/status", get(get_status))
        .route("/role", put(put_role))
        .route("/roles", get(get_roles))
        .route("/role/:name", delete(delete_role))
        .route("/catalog", put(put_catalog).get(get_catalog))
        .route("/resolve/:name", get(get_resolve))
        .route("/matrix", get(get_matrix))
        .route("/check", post(post_check))
        .route("/reset", post(post_reset))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!(%addr, "rolematrix server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
