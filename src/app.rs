use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::RecordStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{DoctorService, MappingService, PatientService, UserService};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone())
    }

    pub fn patients(&self) -> PatientService {
        PatientService::new(self.store.clone())
    }

    pub fn doctors(&self) -> DoctorService {
        DoctorService::new(self.store.clone())
    }

    pub fn mappings(&self) -> MappingService {
        MappingService::new(self.store.clone())
    }
}

/// Build the full HTTP router
pub fn app(state: AppState) -> Router {
    let api = public_routes().merge(protected_routes(state.clone()));

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .nest("/api", api)
        .fallback(public::not_found)
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/register/", post(auth::register_post))
        .route("/auth/login/", post(auth::login_post))
        .route("/auth/token/refresh/", post(auth::refresh_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, doctors, mappings, patients};

    Router::new()
        // Account
        .route("/auth/whoami/", get(auth::whoami))
        .route("/auth/user/", delete(auth::delete_account))
        // Patients
        .route("/patients/", get(patients::list).post(patients::create))
        .route(
            "/patients/:id/",
            get(patients::retrieve)
                .put(patients::update)
                .patch(patients::partial_update)
                .delete(patients::destroy),
        )
        .route("/patients/:id/doctors/", get(patients::doctors))
        // Doctors
        .route("/doctors/", get(doctors::list).post(doctors::create))
        .route(
            "/doctors/:id/",
            get(doctors::retrieve)
                .put(doctors::update)
                .patch(doctors::partial_update)
                .delete(doctors::destroy),
        )
        // Mappings
        .route("/mappings/", get(mappings::list).post(mappings::create))
        .route("/mappings/:id/", get(mappings::retrieve).delete(mappings::destroy))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    }
}
