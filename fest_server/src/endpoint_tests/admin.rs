use actix_web::{
    http::{header, StatusCode},
    web,
    web::ServiceConfig,
};
use fest_common::Rupees;
use fest_engine::{
    db_types::{EventStat, Pagination, RegistrationOverview, SortField, SortOrder, Sorting},
    traits::StoreError,
    AdminApi,
};
use serde_json::json;

use super::helpers::{get_request, issue_token, post_request, sample_registration, TEST_ADMIN_PASSWORD};
use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    endpoint_tests::{helpers::get_auth_config, mocks::MockRegistrationStore},
    routes::{admin_login, not_found, AdminExportRoute, AdminRegistrationsRoute, AdminStatsRoute},
};

fn configure(store: MockRegistrationStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(admin_login)
            .service(AdminRegistrationsRoute::<MockRegistrationStore>::new())
            .service(AdminExportRoute::<MockRegistrationStore>::new())
            .service(AdminStatsRoute::<MockRegistrationStore>::new())
            .app_data(web::Data::new(AdminApi::new(store)));
    }
}

/// A store that must not be touched, for requests that should be turned away first.
fn untouched_store() -> MockRegistrationStore {
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_registrations().never();
    store.expect_registration_overview().never();
    store
}

#[actix_web::test]
async fn login() {
    let _ = env_logger::try_init().ok();
    let res = post_request("/admin/login", json!({"password": TEST_ADMIN_PASSWORD}), configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Admin authenticated successfully");
    let token = body["token"].as_str().expect("token is a string");
    assert_ne!(token, TEST_ADMIN_PASSWORD);
    let claims = TokenIssuer::new(&get_auth_config()).validate_token(token).expect("token is valid");
    assert_eq!(claims.sub, "admin");
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    let res = post_request("/admin/login", json!({"password": "guess"}), configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"success": false, "error": "Invalid admin password"}));

    let res = post_request("/admin/login", json!({}), configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_routes_need_a_token() {
    let _ = env_logger::try_init().ok();
    for path in ["/admin/registrations", "/admin/export", "/admin/stats"] {
        let res = get_request("", path, configure(untouched_store())).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(res.json(), json!({"success": false, "error": "No admin token provided"}));
    }
}

#[actix_web::test]
async fn admin_routes_reject_foreign_tokens() {
    let _ = env_logger::try_init().ok();
    let foreign = TokenIssuer::new(&AuthConfig::new(TEST_ADMIN_PASSWORD, "some-other-key")).issue_token().unwrap();
    let res = get_request(&foreign, "/admin/stats", configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "Invalid admin credentials");

    // The password is not a token
    let res = get_request(TEST_ADMIN_PASSWORD, "/admin/stats", configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["error"], "Invalid admin credentials");
}

#[actix_web::test]
async fn list_registrations() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store
        .expect_fetch_registrations()
        .withf(|filter, sorting, page| {
            filter.event.as_deref() == Some("Code Sprint")
                && filter.search.as_deref() == Some("ana")
                && *sorting == Sorting::new(SortField::LeaderName, SortOrder::Ascending)
                && *page == Some(Pagination { offset: 2, limit: 2 })
        })
        .times(1)
        .returning(|_, _, _| Ok(vec![sample_registration(1003, "Ana Patil", "Code Sprint")]));
    store.expect_count_registrations().times(1).returning(|_| Ok(3));
    store.expect_registered_events().times(1).returning(|| Ok(vec!["Code Sprint".into(), "Robo Race".into()]));

    let path = "/admin/registrations?sortBy=leaderName&sortOrder=asc&eventFilter=Code%20Sprint&search=%20ana%20&page=2&limit=2";
    let res = get_request(&issue_token(), path, configure(store)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["registrations"][0]["registrationId"], 1003);
    assert_eq!(data["registrations"][0]["leaderName"], "Ana Patil");
    assert_eq!(data["pagination"], json!({"currentPage": 2, "totalPages": 2, "totalCount": 3, "limit": 2}));
    assert_eq!(data["filters"]["availableEvents"], json!(["Code Sprint", "Robo Race"]));
}

#[actix_web::test]
async fn list_registrations_bad_query() {
    let _ = env_logger::try_init().ok();
    let res = get_request(&issue_token(), "/admin/registrations?page=0", configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"success": false, "error": "page must be 1 or greater"}));

    let res = get_request(&issue_token(), "/admin/registrations?limit=lots", configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["success"], false);

    let path = "/admin/registrations?limit=9223372036854775807";
    let res = get_request(&issue_token(), path, configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json(), json!({"success": false, "error": "limit must be 1000 or less"}));
}

#[actix_web::test]
async fn list_registrations_store_failure() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_registrations().returning(|_, _, _| Err(StoreError::Query("disk I/O error".into())));
    let res = get_request(&issue_token(), "/admin/registrations", configure(store)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"success": false, "error": "Failed to fetch registrations"}));
}

#[actix_web::test]
async fn export_spreadsheet() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store
        .expect_fetch_registrations()
        .withf(|filter, sorting, page| {
            filter.event.as_deref() == Some("Robo Race") && *sorting == Sorting::default() && page.is_none()
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(vec![sample_registration(1002, "Ravi Kumar", "Robo Race"), sample_registration(1001, "Ana Patil", "Robo Race")])
        });
    let res = get_request(&issue_token(), "/admin/export?eventFilter=Robo%20Race", configure(store)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers.get(header::CONTENT_TYPE).unwrap().to_str().unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = res.headers.get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Discovery_ADCET_Registrations_RoboRace_"), "{disposition}");
    assert!(disposition.ends_with(".xlsx\""), "{disposition}");
    assert_eq!(&res.body[..2], b"PK");
}

#[actix_web::test]
async fn export_nothing() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_fetch_registrations().times(1).returning(|_, _, _| Ok(vec![]));
    let res = get_request(&issue_token(), "/admin/export?startDate=2025-02-01&endDate=2025-02-02", configure(store)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"success": false, "error": "No registrations found for the given criteria"}));

    let res = get_request(&issue_token(), "/admin/export?startDate=yesterday", configure(untouched_store())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn statistics() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_overview().times(1).returning(|| {
        Ok(RegistrationOverview {
            total_registrations: 3,
            solo_registrations: 2,
            team_registrations: 1,
            total_revenue: Rupees::from(700),
        })
    });
    store.expect_event_statistics().times(1).returning(|| {
        Ok(vec![
            EventStat { event: "Robo Race".into(), count: 2, total_fees: Rupees::from(300) },
            EventStat { event: "Hackathon".into(), count: 1, total_fees: Rupees::from(400) },
        ])
    });
    store
        .expect_fetch_registrations()
        .withf(|_, sorting, page| *sorting == Sorting::default() && *page == Some(Pagination { offset: 0, limit: 5 }))
        .times(1)
        .returning(|_, _, _| Ok(vec![sample_registration(1003, "Zoya Shaikh", "Hackathon")]));

    let res = get_request(&issue_token(), "/admin/stats", configure(store)).await;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.json()["data"];
    assert_eq!(data["overview"]["totalRegistrations"], 3);
    assert_eq!(data["overview"]["teamRegistrations"], 1);
    assert_eq!(data["eventStats"][0]["event"], "Robo Race");
    assert_eq!(data["eventStats"][1]["count"], 1);
    assert_eq!(data["recentRegistrations"][0]["leaderName"], "Zoya Shaikh");
    assert_eq!(data["recentRegistrations"][0]["selectedEvent"], "Hackathon");
}

#[actix_web::test]
async fn statistics_store_failure() {
    let _ = env_logger::try_init().ok();
    let mut store = MockRegistrationStore::new();
    store.expect_registration_overview().returning(|| Err(StoreError::Query("no such table: registrations".into())));
    let res = get_request(&issue_token(), "/admin/stats", configure(store)).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json(), json!({"success": false, "error": "Failed to fetch statistics"}));
}

#[actix_web::test]
async fn unknown_api_route() {
    let _ = env_logger::try_init().ok();
    let res = get_request("", "/api/nothing-here", |cfg: &mut ServiceConfig| {
        cfg.service(web::scope("/api").service(admin_login).default_service(web::to(not_found)));
    })
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json(), json!({"success": false, "error": "Route not found"}));
}
