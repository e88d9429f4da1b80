//! End-to-end coverage of the feedback API over the production app wiring.
//!
//! Drives the exact `server::build_app` assembly — routes, per-resource
//! middleware, tracing — against the in-memory repository, covering the
//! submission contract, authentication, rate limiting, and the
//! filter/sort/paginate pipeline of both read endpoints.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::Utc;
use serde_json::{Value, json};

use feedback_api::domain::ports::InMemoryFeedbackRepository;
use feedback_api::domain::{NewFeedback, WordListFilter};
use feedback_api::inbound::http::api_key::{API_KEY_HEADER, ApiKey};
use feedback_api::inbound::http::health::HealthState;
use feedback_api::inbound::http::rate_limit::{RateLimit, RateLimitConfig};
use feedback_api::inbound::http::state::HttpState;
use feedback_api::server::{AppDependencies, build_app};

const TEST_API_KEY: &str = "test-api-key";

fn dependencies(
    repository: Arc<InMemoryFeedbackRepository>,
    rate_limit: RateLimitConfig,
) -> AppDependencies {
    AppDependencies {
        http_state: web::Data::new(HttpState::new(
            repository,
            Arc::new(WordListFilter::new()),
        )),
        health_state: web::Data::new(HealthState::new()),
        api_key: ApiKey::new(TEST_API_KEY),
        rate_limit: RateLimit::new(rate_limit),
    }
}

fn permissive_rate_limit() -> RateLimitConfig {
    RateLimitConfig::new(1000, Duration::from_secs(60))
}

fn submission_body(experiment: &str) -> Value {
    json!({
        "experiment": experiment,
        "feedback": "This is a test feedback",
        "php_version": "8.1",
        "vanguard_version": "1.0.0",
    })
}

fn seed(
    repository: &InMemoryFeedbackRepository,
    experiment: &str,
    email: Option<&str>,
    age_days: i64,
) {
    repository.seed(
        NewFeedback {
            experiment: experiment.to_owned(),
            feedback: format!("feedback about {experiment}"),
            php_version: "8.1".to_owned(),
            vanguard_version: "1.0.0".to_owned(),
            email_address: email.map(str::to_owned),
        },
        Utc::now() - chrono::Duration::days(age_days),
    );
}

async fn get_with_key<S>(app: &S, uri: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .insert_header((API_KEY_HEADER, TEST_API_KEY))
        .to_request();
    test::call_service(app, req).await
}

#[actix_web::test]
async fn submit_without_email_stores_absent_email() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(submission_body("Test Experiment"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Experiment feedback successfully submitted");
    assert_eq!(body["status"], "success");

    let res = get_with_key(&app, "/api/feedback").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    let record = &body["data"][0];
    assert_eq!(record["experiment"], "Test Experiment");
    assert_eq!(record["has_email"], false);
    assert!(record.get("email_address").is_none(), "key must be omitted");
    assert!(record.get("email_domain").is_none(), "key must be omitted");
}

#[actix_web::test]
async fn submit_with_email_exposes_address_and_domain() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let mut body = submission_body("Test Experiment");
    body["email_address"] = json!("test@example.com");
    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = get_with_key(&app, "/api/feedback").await;
    let body: Value = test::read_body_json(res).await;
    let record = &body["data"][0];
    assert_eq!(record["email_address"], "test@example.com");
    assert_eq!(record["email_domain"], "example.com");
    assert_eq!(record["has_email"], true);
}

#[actix_web::test]
async fn submit_filters_profanity_before_storage() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let mut body = submission_body("Test Experiment");
    body["feedback"] = json!("This feedback is fucking terrible.");
    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = get_with_key(&app, "/api/feedback").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"][0]["feedback"], "This feedback is ******* terrible.");
}

#[actix_web::test]
async fn submit_validates_required_fields_together() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(json!({}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    let errors = body["details"]["errors"].as_object().expect("field errors");
    for field in ["experiment", "feedback", "php_version", "vanguard_version"] {
        assert!(errors.contains_key(field), "missing error for {field}");
    }
}

#[actix_web::test]
async fn submit_validates_email_format() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let mut body = submission_body("Test Experiment");
    body["email_address"] = json!("invalid-email");
    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(body)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(res).await;
    assert!(body["details"]["errors"]["email_address"].is_array());
}

#[actix_web::test]
async fn submissions_beyond_the_rate_limit_are_rejected() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        RateLimitConfig::new(5, Duration::from_secs(60)),
    )))
    .await;

    for index in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .set_json(submission_body(&format!("Rate Limit Test {index}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(submission_body("Rate Limit Test overflow"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "too_many_requests");
}

#[actix_web::test]
async fn submissions_recover_after_the_window_elapses() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        RateLimitConfig::new(2, Duration::from_millis(80)),
    )))
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .set_json(submission_body("Rate Limit Test"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }
    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(submission_body("Rate Limit Test"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    tokio::time::sleep(Duration::from_millis(120)).await;

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .set_json(submission_body("Rate Limit Test"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );
}

#[actix_web::test]
async fn read_endpoints_require_the_api_key() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    for uri in ["/api/feedback", "/api/feedback/search?query=test"] {
        let res =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "no key: {uri}");

        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((API_KEY_HEADER, "wrong-key"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "wrong key: {uri}");
    }
}

#[actix_web::test]
async fn listing_paginates_with_default_and_requested_sizes() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    for index in 0..30 {
        seed(&repository, &format!("Experiment {index}"), Some("user@example.com"), 0);
    }
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"].as_array().expect("data array").len(), 15);
    assert_eq!(body["meta"]["total"], 30);
    assert_eq!(body["meta"]["last_page"], 2);
    assert!(body["links"]["next"].is_string());

    let res = get_with_key(&app, "/api/feedback?per_page=20").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"].as_array().expect("data array").len(), 20);
}

#[actix_web::test]
async fn per_page_is_clamped_at_both_ends() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    seed(&repository, "Experiment", None, 0);
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback?per_page=1000").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["per_page"], 100);

    for raw in ["0", "-5", "abc"] {
        let res = get_with_key(&app, &format!("/api/feedback?per_page={raw}")).await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["meta"]["per_page"], 15, "per_page={raw}");
    }
}

#[actix_web::test]
async fn listing_filters_by_exact_values() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    seed(&repository, "TestExperiment", None, 0);
    seed(&repository, "OtherExperiment", None, 0);
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback?experiment=TestExperiment").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["experiment"], "TestExperiment");

    let res = get_with_key(&app, "/api/feedback?experiment=Experiment").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 0, "substring must not match");
}

#[actix_web::test]
async fn has_email_partitions_the_record_set() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    seed(&repository, "WithEmail", Some("test@example.com"), 0);
    seed(&repository, "WithoutEmail", None, 0);
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback?has_email=true").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["experiment"], "WithEmail");

    let res = get_with_key(&app, "/api/feedback?has_email=false").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["experiment"], "WithoutEmail");
}

#[actix_web::test]
async fn listing_filters_by_date_range_and_email_domain() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    seed(&repository, "Fresh", Some("a@example.com"), 5);
    seed(&repository, "Stale", Some("b@other.org"), 15);
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let from = (Utc::now() - chrono::Duration::days(10)).format("%Y-%m-%d");
    let res = get_with_key(&app, &format!("/api/feedback?from_date={from}")).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["experiment"], "Fresh");

    let res = get_with_key(&app, "/api/feedback?email_domain=example.com").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["email_domain"], "example.com");
}

#[actix_web::test]
async fn listing_sorts_by_allowed_fields_and_falls_back() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    seed(&repository, "B Experiment", None, 1);
    seed(&repository, "A Experiment", None, 2);
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback?sort_by=experiment&sort_direction=asc").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"][0]["experiment"], "A Experiment");

    // Unrecognised sort field: newest first, direction ignored.
    let res = get_with_key(&app, "/api/feedback?sort_by=email_address&sort_direction=asc").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"][0]["experiment"], "B Experiment");
}

#[actix_web::test]
async fn search_matches_substrings_across_fields() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    repository.seed(
        NewFeedback {
            experiment: "Alpha".to_owned(),
            feedback: "this mentions a test somewhere".to_owned(),
            php_version: "8.1".to_owned(),
            vanguard_version: "1.0.0".to_owned(),
            email_address: None,
        },
        Utc::now(),
    );
    seed(&repository, "Beta", Some("someone@testers.io"), 0);
    repository.seed(
        NewFeedback {
            experiment: "Gamma".to_owned(),
            feedback: "unrelated words".to_owned(),
            php_version: "8.2".to_owned(),
            vanguard_version: "2.0.0".to_owned(),
            email_address: None,
        },
        Utc::now(),
    );
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = get_with_key(&app, "/api/feedback/search?query=test").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 2, "feedback-only and email-only matches count");

    let res = get_with_key(&app, "/api/feedback/search?query=TEST").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 2, "matching is case-insensitive");

    let res = get_with_key(&app, "/api/feedback/search?query=test&experiment=Beta").await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["meta"]["total"], 1, "free text ANDs with exact filters");
}

#[actix_web::test]
async fn root_endpoint_is_public() {
    let repository = Arc::new(InMemoryFeedbackRepository::new());
    let app = test::init_service(build_app(dependencies(
        repository.clone(),
        permissive_rate_limit(),
    )))
    .await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert!(body["message"].is_string());
}
