use actix_web::{
    HttpResponse,
    web::{self, Json},
};
use serde::{Deserialize, Serialize};

use crate::adapter::api::ApiResponse;
use crate::profile::{BillingProfile, ProfileClient};

pub fn routes() -> actix_web::Scope {
    web::scope("/profile")
        .route("/billing", web::get().to(get_billing))
        .route("/billing", web::put().to(put_billing))
        .route("/demo-mode", web::get().to(get_demo_mode))
        .route("/demo-mode", web::put().to(put_demo_mode))
}

#[derive(Debug, Serialize, Deserialize)]
struct DemoModeDto {
    enabled: bool,
}

async fn get_billing(profile: web::Data<ProfileClient>) -> HttpResponse {
    HttpResponse::Ok().json(profile.billing())
}

async fn put_billing(profile: web::Data<ProfileClient>, Json(billing): Json<BillingProfile>) -> ApiResponse {
    Ok(HttpResponse::Ok().json(profile.set_billing(billing).await?))
}

async fn get_demo_mode(profile: web::Data<ProfileClient>) -> HttpResponse {
    HttpResponse::Ok().json(DemoModeDto {
        enabled: profile.demo_mode(),
    })
}

async fn put_demo_mode(profile: web::Data<ProfileClient>, Json(dto): Json<DemoModeDto>) -> ApiResponse {
    profile.set_demo_mode(dto.enabled).await?;
    Ok(HttpResponse::Ok().json(dto))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use serde_json::json;

    use crate::adapter::api::tests::TestContext;

    #[actix_web::test]
    async fn billing_defaults_and_update() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().service(ctx.routes())).await;

        let req = test::TestRequest::get().uri("/api/profile/billing").to_request();
        let billing: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(billing, json!({ "electricityRate": 7.0, "monthlyBillLimit": null }));

        let req = test::TestRequest::put()
            .uri("/api/profile/billing")
            .set_json(json!({ "electricityRate": 8.5, "monthlyBillLimit": 2000 }))
            .to_request();
        let billing: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(billing, json!({ "electricityRate": 8.5, "monthlyBillLimit": 2000.0 }));
        assert_eq!(ctx.profile.billing().electricity_rate, 8.5);
    }

    #[actix_web::test]
    async fn invalid_rate_is_bad_request() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().service(ctx.routes())).await;

        let req = test::TestRequest::put()
            .uri("/api/profile/billing")
            .set_json(json!({ "electricityRate": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.profile.billing().electricity_rate, 7.0);
    }

    #[actix_web::test]
    async fn demo_mode_toggles() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().service(ctx.routes())).await;

        let req = test::TestRequest::put()
            .uri("/api/profile/demo-mode")
            .set_json(json!({ "enabled": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/profile/demo-mode").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "enabled": true }));
    }
}
