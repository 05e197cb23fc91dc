use actix_web::{HttpResponse, web};

use crate::meter::MeterClient;

pub fn routes() -> actix_web::Scope {
    web::scope("/energy")
        .route("", web::get().to(get_report))
        .route("/connection", web::get().to(get_connection))
}

async fn get_report(meter: web::Data<MeterClient>) -> HttpResponse {
    HttpResponse::Ok().json(meter.energy_report().await)
}

async fn get_connection(meter: web::Data<MeterClient>) -> HttpResponse {
    HttpResponse::Ok().json(meter.connection_status())
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    use crate::adapter::api::tests::TestContext;

    #[actix_web::test]
    async fn reports_configured_channels_with_default_rate() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().service(ctx.routes())).await;

        let req = test::TestRequest::get().uri("/api/energy").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_json_include!(
            actual: body,
            expected: json!({
                "voltage": null,
                "electricityRate": 7.0,
                "channels": [
                    { "name": "incandescent", "energy": 0.0, "cost": 0.0 },
                    { "name": "led" },
                    { "name": "socket" }
                ],
                "groups": [{ "name": "Bedroom 2" }],
                "total": { "name": "Total", "energy": 0.0 },
                "billLimitExceeded": false
            })
        );
    }

    #[actix_web::test]
    async fn connection_is_unknown_before_first_poll() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().service(ctx.routes())).await;

        let req = test::TestRequest::get().uri("/api/energy/connection").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body, json!({ "status": "unknown" }));
    }
}
