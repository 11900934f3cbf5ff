//! Route table.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState};

/// Build the application router.
///
/// - `/health` and the settlement callback are public (the callback checks
///   its own signature)
/// - `/account/*` and `/admin/*` require an API key; admin handlers also
///   require the admin role
pub fn create_router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route("/account", get(handlers::accounts::get_account))
        .route("/account/deposit", post(handlers::accounts::deposit))
        .route("/account/payment", post(handlers::accounts::payment))
        .route("/account/withdraw", post(handlers::accounts::withdraw));

    let admin_routes = Router::new()
        .route("/admin", get(handlers::admin::home))
        .route("/admin/promo/add", post(handlers::admin::add_promo))
        .route("/admin/vendor/add", post(handlers::admin::add_vendor))
        .route(
            "/admin/multiplier/update",
            put(handlers::admin::update_multiplier),
        )
        .route(
            "/admin/max-balance/update",
            put(handlers::admin::update_max_balance),
        )
        .route(
            "/admin/max-daily/update",
            put(handlers::admin::update_max_daily),
        );

    let authenticated_routes = account_routes
        .merge(admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.pool.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/payments/{id}/settlement",
            post(handlers::settlement::settle_payment),
        )
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
