use actix_web::{http::StatusCode, web, web::ServiceConfig};
use razorpay_tools::{RazorpayApiError, RazorpayOrder};
use serde_json::json;

use super::helpers::post_request;
use crate::{endpoint_tests::mocks::MockGateway, routes::CreateOrderRoute};

fn configure(gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(CreateOrderRoute::<MockGateway>::new()).app_data(web::Data::new(gateway));
    }
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_order()
        .withf(|order| order.amount == 15000 && order.currency == "INR" && order.receipt == "rcpt_ana")
        .times(1)
        .returning(|order| {
            Ok(RazorpayOrder {
                id: "order_Nx7".into(),
                entity: "order".into(),
                amount: order.amount,
                amount_due: order.amount,
                currency: order.currency,
                receipt: Some(order.receipt),
                status: "created".into(),
                ..Default::default()
            })
        });
    let body = json!({"amount": 15000, "currency": "INR", "receipt": "rcpt_ana"});
    let res = post_request("/order", body, configure(gateway)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["id"], "order_Nx7");
    assert_eq!(body["order"]["amount"], 15000);
}

#[actix_web::test]
async fn create_order_validation() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 15000, "currency": "INR"});
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    let res = post_request("/order", body, configure(gateway)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"success": false, "error": "Missing required fields: amount, currency, receipt"}));

    let body = json!({"amount": -100, "currency": "INR", "receipt": "rcpt_ana"});
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().never();
    let res = post_request("/order", body, configure(gateway)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], "Invalid amount. Must be a positive number");
}

#[actix_web::test]
async fn create_order_gateway_errors() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 15000, "currency": "INR", "receipt": "rcpt_ana"});
    let mut gateway = MockGateway::new();
    gateway.expect_create_order().returning(|_| {
        Err(RazorpayApiError::QueryError {
            status: 400,
            code: "BAD_REQUEST_ERROR".into(),
            description: "The amount must be atleast INR 1.00".into(),
        })
    });
    let res = post_request("/order", body.clone(), configure(gateway)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"success": false, "error": "The amount must be atleast INR 1.00"}));

    let mut gateway = MockGateway::new();
    gateway.expect_create_order().returning(|_| Err(RazorpayApiError::NotConfigured));
    let res = post_request("/order", body, configure(gateway)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["error"], "Payment service configuration error");
}
