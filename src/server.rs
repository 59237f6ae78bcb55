use crate::app::giving::GivingUseCase;
use crate::app::notify::NotifyUseCase;
use crate::app::pledges::PledgeUseCase;
use crate::app::ports::{BibleTextPort, EmailPort, PaymentGatewayPort, PushSenderPort};
use crate::app::sacraments::SacramentUseCase;
use crate::config::Config;
use crate::handlers;
use crate::infra::bible::BibleApiClient;
use crate::infra::email::RestEmailer;
use crate::infra::payments::HttpPaymentGateway;
use crate::infra::push::ServiceAccountPush;
use crate::storage::Storage;
use axum::{
    http::Method,
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

/// Shared request state: storage plus the use cases wired to their adapters.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub giving: GivingUseCase,
    pub sacraments: SacramentUseCase,
    pub pledges: PledgeUseCase,
    pub notify: NotifyUseCase,
    pub bible: Arc<dyn BibleTextPort>,
    /// Header name carrying the gateway's shared webhook secret.
    pub webhook_header: String,
}

impl AppState {
    /// Wire production adapters from configuration.
    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        let gateway: Arc<dyn PaymentGatewayPort> = Arc::new(HttpPaymentGateway::new(&config.gateway));
        let email: Arc<dyn EmailPort> = Arc::new(RestEmailer::new(&config.email));
        let push: Arc<dyn PushSenderPort> = Arc::new(ServiceAccountPush::new(config.push.clone()));
        let bible: Arc<dyn BibleTextPort> = Arc::new(BibleApiClient::new(&config.bible));
        Self::new(storage, gateway, email, push, bible, config.gateway.webhook_header.clone())
    }

    /// Wire explicit ports (tests substitute fakes here).
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn PaymentGatewayPort>,
        email: Arc<dyn EmailPort>,
        push: Arc<dyn PushSenderPort>,
        bible: Arc<dyn BibleTextPort>,
        webhook_header: String,
    ) -> Self {
        Self {
            giving: GivingUseCase::new(storage.clone(), gateway),
            sacraments: SacramentUseCase::new(storage.clone()),
            pledges: PledgeUseCase::new(storage.clone()),
            notify: NotifyUseCase::new(storage.clone(), email, push),
            storage,
            bible,
            webhook_header,
        }
    }
}

/// Create the HTTP server with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Members
        .route("/api/members", get(handlers::list_members).post(handlers::create_member))
        .route("/api/members/:id", get(handlers::get_member))
        // Sermons
        .route("/api/sermons", get(handlers::list_sermons).post(handlers::create_sermon))
        .route("/api/sermons/:id", get(handlers::get_sermon))
        // Prayers
        .route("/api/prayers", get(handlers::list_prayers).post(handlers::create_prayer))
        .route("/api/prayers/:id/pray", post(handlers::pray))
        // Notices and community posts
        .route("/api/notices", get(handlers::list_notices).post(handlers::create_notice))
        .route("/api/posts", get(handlers::list_posts).post(handlers::create_post))
        // Giving (mobile money)
        .route("/api/giving", get(handlers::list_giving).post(handlers::initiate_giving))
        .route("/api/giving/:reference/verify", get(handlers::verify_giving))
        .route("/webhooks/payments", post(handlers::payment_webhook))
        // Campaigns and pledges
        .route("/api/campaigns", post(handlers::create_campaign))
        .route("/api/campaigns/:id/progress", get(handlers::campaign_progress))
        .route("/api/pledges", post(handlers::create_pledge))
        // Sacrament requests
        .route("/api/sacraments", get(handlers::list_sacraments).post(handlers::submit_sacrament))
        .route("/api/sacraments/:id/status", post(handlers::advance_sacrament))
        // Devices and notifications
        .route("/api/devices", post(handlers::register_device))
        .route("/api/notifications/broadcast", post(handlers::broadcast_notification))
        // Bible passages (keeps the provider key server-side)
        .route("/api/bible/passage", get(handlers::bible_passage))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: Arc<AppState>, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("🙏 API root:     http://localhost:{port}/api");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
