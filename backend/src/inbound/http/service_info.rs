//! Unauthenticated root endpoint describing the service.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Service metadata payload for `GET /`.
#[utoipa::path(
    get,
    path = "/",
    tags = ["meta"],
    security([]),
    responses((status = 200, description = "Service metadata"))
)]
#[get("/")]
pub async fn service_info() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "You've reached the API for Vanguard's Experiments feedback.",
        "links": {
            "vanguard_repository": "https://github.com/vanguardbackup/vanguard",
            "vanguard_website": "https://vanguardbackup.com",
            "api_documentation": "https://docs.vanguardbackup.com/api/introduction",
            "experiments_info": "https://docs.vanguardbackup.com/experiments",
        },
        "need_help": "If you need assistance, please contact support@vanguardbackup.com",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn root_payload_is_public_json() {
        let app = test::init_service(App::new().service(service_info)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = test::read_body_json(res).await;
        assert!(body["message"].as_str().is_some_and(|m| m.contains("feedback")));
        assert!(body["links"]["vanguard_repository"].is_string());
    }
}
