use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpRequest, HttpResponse, error, web};
use uuid::Uuid;

fn parse_subscription_id(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidInput(format!(
            "Invalid subscription id: {raw}"
        ))),
    }
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid request body: {err}")).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid query string: {err}")).into()
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = Subscription,
    responses(
        (status = 201, description = "Subscription created", body = CreateSubscriptionResponse),
        (status = 400, description = "Malformed body or validation failure", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    body: web::Json<Subscription>,
) -> AppResult<HttpResponse> {
    let sub = body.into_inner();
    sub.validate()?;

    let subscription_id = service.create(&sub).await?;
    log::info!("Subscription {subscription_id} created");
    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        CreateSubscriptionResponse { subscription_id },
        "Subscription created",
    )))
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    let sub = service.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(sub))
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = Subscription,
    responses(
        (status = 200, description = "Subscription updated"),
        (status = 400, description = "Malformed id or body, or validation failure", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    body: web::Json<Subscription>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    let sub = body.into_inner();
    sub.validate()?;

    service.update_by_id(id, &sub).await?;
    log::info!("Subscription {id} updated");
    Ok(HttpResponse::Ok().json(ApiResponse::message("Subscription updated")))
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    service.delete_by_id(id).await?;
    log::info!("Subscription {id} deleted");
    Ok(HttpResponse::Ok().json(ApiResponse::message("Subscription deleted")))
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    responses(
        (status = 200, description = "All subscriptions", body = [Subscription]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
) -> AppResult<HttpResponse> {
    let subs = service.list_all().await?;
    Ok(HttpResponse::Ok().json(subs))
}

#[utoipa::path(
    get,
    path = "/total",
    tag = "subscriptions",
    params(TotalQuery),
    responses(
        (status = 200, description = "Sum of prices over the period", body = i64),
        (status = 400, description = "Missing or malformed dates, bad user_id, or end before start", body = ErrorResponse)
    )
)]
pub async fn get_total_price(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalQuery>,
) -> AppResult<HttpResponse> {
    let filter = period_filter(query.into_inner())?;
    let total = service.sum_price_in_period(&filter).await?;
    log::info!(
        "Total for {}..{} computed: {total}",
        filter.start_date,
        filter.end_date
    );
    Ok(HttpResponse::Ok().json(total))
}

/// Dates are checked before `user_id` is parsed.
fn period_filter(query: TotalQuery) -> AppResult<PeriodFilter> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(start_date), Some(end_date)) = (non_empty(query.start_date), non_empty(query.end_date))
    else {
        return Err(AppError::InvalidInput(
            "start_date and end_date are required".to_string(),
        ));
    };

    let mut filter = PeriodFilter {
        start_date,
        end_date,
        user_id: Uuid::nil(),
        service_name: query.service_name.unwrap_or_default(),
    };
    filter.validate()?;

    if let Some(raw) = non_empty(query.user_id) {
        filter.user_id = Uuid::parse_str(&raw)
            .map_err(|_| AppError::InvalidInput(format!("Invalid user_id: {raw}")))?;
    }
    Ok(filter)
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/subscriptions")
                .route("", web::post().to(create_subscription))
                .route("", web::get().to(list_subscriptions))
                .route("/{id}", web::get().to(get_subscription))
                .route("/{id}", web::put().to(update_subscription))
                .route("/{id}", web::delete().to(delete_subscription)),
        )
        .route("/total", web::get().to(get_total_price));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::subscription_entity as subscriptions;
    use actix_web::{App, http::StatusCode, test as actix_test};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::{Value as Json, json};
    use std::collections::BTreeMap;

    fn model(id: i64) -> subscriptions::Model {
        subscriptions::Model {
            subscription_id: id,
            service_name: "Yandex Plus".to_string(),
            price: 400,
            user_id: Uuid::parse_str("60601fee-2bf1-4721-ae6f-7636e79a0cba").unwrap(),
            start_date: "07-2025".to_string(),
            end_date: None,
        }
    }

    fn payload() -> Json {
        json!({
            "service_name": "Yandex Plus",
            "price": 400,
            "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
            "start_date": "07-2025"
        })
    }

    macro_rules! app {
        ($db:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(SubscriptionService::new($db.into_connection())))
                    .service(web::scope("/api").configure(subscription_config)),
            )
            .await
        };
    }

    async fn error_code(resp: actix_web::dev::ServiceResponse) -> String {
        let body: Json = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        body["error"]["code"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_parse_subscription_id() {
        assert_eq!(parse_subscription_id("12").unwrap(), 12);
        assert!(parse_subscription_id("0").is_err());
        assert!(parse_subscription_id("-3").is_err());
        assert!(parse_subscription_id("abc").is_err());
        assert!(parse_subscription_id("1.5").is_err());
    }

    #[actix_web::test]
    async fn test_create_subscription() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(5)]]));

        let req = actix_test::TestRequest::post()
            .uri("/api/subscriptions")
            .set_json(payload())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Json = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["subscription_id"], 5);
    }

    #[actix_web::test]
    async fn test_create_rejects_invalid_payloads() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres));

        let mut negative = payload();
        negative["price"] = json!(-1);
        let mut bad_date = payload();
        bad_date["start_date"] = json!("13-2020");
        let mut reversed = payload();
        reversed["start_date"] = json!("05-2021");
        reversed["end_date"] = json!("04-2021");

        for (body, code) in [
            (negative, "NEGATIVE_PRICE"),
            (bad_date, "INVALID_DATE_FORMAT"),
            (reversed, "DATE_ORDER_VIOLATION"),
            (json!({"service_name": "x"}), "INVALID_INPUT"),
        ] {
            let req = actix_test::TestRequest::post()
                .uri("/api/subscriptions")
                .set_json(body)
                .to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_code(resp).await, code);
        }
    }

    #[actix_web::test]
    async fn test_get_subscription() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(3)], vec![]]));

        let req = actix_test::TestRequest::get().uri("/api/subscriptions/3").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Json = actix_test::read_body_json(resp).await;
        assert_eq!(body, payload());

        let req = actix_test::TestRequest::get().uri("/api/subscriptions/4").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_code(resp).await, "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_bad_id_never_reaches_storage() {
        // no mock results: any storage call would fail with a database error
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres));

        for req in [
            actix_test::TestRequest::get().uri("/api/subscriptions/abc").to_request(),
            actix_test::TestRequest::delete().uri("/api/subscriptions/0").to_request(),
            actix_test::TestRequest::put()
                .uri("/api/subscriptions/-1")
                .set_json(payload())
                .to_request(),
        ] {
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_code(resp).await, "INVALID_INPUT");
        }
    }

    #[actix_web::test]
    async fn test_update_and_delete() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ]));

        let req = actix_test::TestRequest::put()
            .uri("/api/subscriptions/1")
            .set_json(payload())
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::put()
            .uri("/api/subscriptions/2")
            .set_json(payload())
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::NOT_FOUND
        );

        let req = actix_test::TestRequest::delete()
            .uri("/api/subscriptions/1")
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_list_subscriptions_empty() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscriptions::Model>::new()]));

        let req = actix_test::TestRequest::get().uri("/api/subscriptions").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Json = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_total() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
            [BTreeMap::from([("total", Value::BigInt(Some(50)))])]
        ]));

        let req = actix_test::TestRequest::get()
            .uri("/api/total?start_date=03-2021&end_date=06-2021&service_name=")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Json = actix_test::read_body_json(resp).await;
        assert_eq!(body, json!(50));
    }

    #[actix_web::test]
    async fn test_total_rejects_bad_queries() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres));

        for (uri, code) in [
            ("/api/total?start_date=03-2021", "INVALID_INPUT"),
            ("/api/total?start_date=&end_date=06-2021", "INVALID_INPUT"),
            ("/api/total?start_date=2021-03&end_date=06-2021", "INVALID_DATE_FORMAT"),
            ("/api/total?start_date=06-2021&end_date=03-2021", "DATE_ORDER_VIOLATION"),
            (
                "/api/total?start_date=03-2021&end_date=06-2021&user_id=not-a-uuid",
                "INVALID_INPUT",
            ),
        ] {
            let req = actix_test::TestRequest::get().uri(uri).to_request();
            let resp = actix_test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(error_code(resp).await, code, "{uri}");
        }
    }

    #[test]
    fn test_period_filter_precedence() {
        // date problems win over a malformed user_id
        let err = period_filter(TotalQuery {
            start_date: Some("06-2021".into()),
            end_date: Some("03-2021".into()),
            user_id: Some("nope".into()),
            service_name: None,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(crate::error::ValidationError::DateOrderViolation)
        ));

        let filter = period_filter(TotalQuery {
            start_date: Some("03-2021".into()),
            end_date: Some("06-2021".into()),
            user_id: Some(String::new()),
            service_name: Some("Netflix".into()),
        })
        .unwrap();
        assert!(filter.user_id.is_nil());
        assert_eq!(filter.service_name, "Netflix");
    }
}
