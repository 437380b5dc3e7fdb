use actix_web::{HttpResponse, web};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::list_subscriptions,
        handlers::subscription::get_total_price,
    ),
    components(
        schemas(
            Subscription,
            CreateSubscriptionResponse,
            ApiError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "subscriptions", description = "Subscription records and price totals"),
    ),
    info(
        title = "Subscriptions API",
        version = "1.0.0",
        description = "Records user subscriptions and sums their prices over a period"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

async fn redirect_to_ui() -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", "/swagger-ui/"))
        .finish()
}

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route("/swagger-ui", web::get().to(redirect_to_ui))
    // older clients bookmark the bare path
    .route("/swagger", web::get().to(redirect_to_ui));
}
