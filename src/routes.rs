// routes.rs - Route table under /portfolio
//
// Three tiers, each a router of its own:
//   public        - no token
//   authenticated - `require_auth`
//   admin         - `require_auth` then `authorize` with an Admin-only gate

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{
    email, expense, layout, resource, session, system, user, visitor, Certificates, Messages, Projects, Resource,
    Services, Visitors,
};
use crate::middleware::{authorize, capture_visitor, require_auth, RoleGate};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let portfolio = Router::new()
        .merge(public_routes(&state))
        .merge(authenticated_routes(&state))
        .merge(admin_routes(&state));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/portfolio", portfolio)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

/// `get-all` and `get-one/:id` under `/<name>`
fn public_reads<R: Resource>(name: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("/{}/get-all", name), get(resource::get_all::<R>))
        .route(&format!("/{}/get-one/:id", name), get(resource::get_one::<R>))
}

fn authenticated_writes<R: Resource>(name: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("/{}/create", name), post(resource::create::<R>))
        .route(&format!("/{}/update/:id", name), put(resource::update::<R>))
        .route(&format!("/{}/delete/:id", name), delete(resource::delete::<R>))
}

/// Read and delete only; creation has its own public route.
fn private_collection<R: Resource>(name: &str) -> Router<AppState> {
    public_reads::<R>(name).route(&format!("/{}/delete/:id", name), delete(resource::delete::<R>))
}

fn public_routes(state: &AppState) -> Router<AppState> {
    let visitor_capture = Router::new()
        .route("/visitor/create", post(visitor::create))
        .route_layer(from_fn_with_state(state.visitors.clone(), capture_visitor));

    Router::new()
        .route("/login", post(session::login))
        // Reads are public; writes on the same path need a token
        .route(
            "/manage-layout",
            get(layout::get_layout).merge(
                post(layout::create_layout)
                    .put(layout::update_layout)
                    .route_layer(from_fn_with_state(state.clone(), require_auth)),
            ),
        )
        .merge(public_reads::<Certificates>("certificate"))
        .merge(public_reads::<Services>("service"))
        .merge(public_reads::<Projects>("project"))
        .route("/email/create", post(email::create))
        .merge(visitor_capture)
        .route("/user/register", post(user::register))
        .route("/user/login", post(user::login))
}

fn authenticated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(authenticated_writes::<Certificates>("certificate"))
        .merge(authenticated_writes::<Services>("service"))
        .merge(authenticated_writes::<Projects>("project"))
        .merge(private_collection::<Messages>("email"))
        .merge(private_collection::<Visitors>("visitor"))
        // Account
        .route("/expense/user/me", get(user::me))
        .route("/expense/user/update", put(user::update_info))
        .route("/expense/user/password", put(user::change_password))
        // Categories
        .route("/expense/category/create", post(expense::category::create))
        .route("/expense/category/update/:id", put(expense::category::update))
        .route("/expense/category/delete/:id", delete(expense::category::delete))
        .route("/expense/category/get-all", get(expense::category::get_all))
        .route("/expense/category/get-one/:id", get(expense::category::get_one))
        // Items
        .route("/expense/item/create", post(expense::item::create))
        .route("/expense/item/update/:id", put(expense::item::update))
        .route("/expense/item/delete/:id", delete(expense::item::delete))
        .route("/expense/item/get-one/:id", get(expense::item::get_one))
        .route("/expense/item/incomes", get(expense::item::incomes))
        .route("/expense/item/outcomes", get(expense::item::outcomes))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/expense/user/get-all", get(user::get_all))
        .route("/expense/user/role", put(user::change_role))
        .route("/expense/user/delete/:id", delete(user::delete))
        // Layers run outermost-last: authenticate, then check the role
        .route_layer(from_fn_with_state(RoleGate::admin_only(), authorize))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
