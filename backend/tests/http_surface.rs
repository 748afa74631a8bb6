//! End-to-end exercises of the HTTP surface over the in-memory adapters.
//!
//! These tests drive the same route table the real server mounts, with the
//! fixture identity provider standing in for the external one.

use std::sync::Arc;

use actix_web::http::{header, StatusCode};
use actix_web::{test as actix_test, web, App};
use serde_json::Value;

use backend::domain::ports::{MemoryStore, ProviderProfile, StaticIdentityProvider};
use backend::inbound::http;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::test_utils::{fixture_state, test_session_middleware, TEST_CLIENT_ID};

fn provider_for(name: &str, email: &str) -> Arc<StaticIdentityProvider> {
    Arc::new(StaticIdentityProvider::new(
        format!("subject-{email}"),
        TEST_CLIENT_ID,
        ProviderProfile {
            name: name.to_owned(),
            email: email.to_owned(),
            picture: None,
        },
    ))
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .configure(http::configure)
}

fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

async fn sign_in<S>(app: &S) -> actix_web::cookie::Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let login_res =
        actix_test::call_service(app, actix_test::TestRequest::get().uri("/login").to_request())
            .await;
    assert_eq!(login_res.status(), StatusCode::OK);
    let cookie = session_cookie(&login_res);
    let view: Value = actix_test::read_body_json(login_res).await;
    let state = view
        .get("state")
        .and_then(Value::as_str)
        .expect("nonce issued")
        .to_owned();

    let connect_res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/gconnect?state={state}"))
            .cookie(cookie)
            .set_payload("auth-code")
            .to_request(),
    )
    .await;
    assert_eq!(connect_res.status(), StatusCode::OK);
    session_cookie(&connect_res)
}

#[actix_web::test]
async fn spring_bouquet_walkthrough() {
    // Create an arrangement as U1, view it anonymously, and export its
    // (initially empty) flower list.
    let store = MemoryStore::new();
    let app = actix_test::init_service(test_app(fixture_state(
        &store,
        provider_for("Ada Lovelace", "ada@example.com"),
    )))
    .await;
    let cookie = sign_in(&app).await;

    let create_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/arrangements/new")
            .cookie(cookie.clone())
            .set_form([("name", "Spring Bouquet"), ("base_price", "19.99")])
            .to_request(),
    )
    .await;
    assert_eq!(create_res.status(), StatusCode::SEE_OTHER);

    // Anonymous detail view: same data, no edit capability.
    let detail_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/arrangements/1")
            .to_request(),
    )
    .await;
    assert_eq!(detail_res.status(), StatusCode::OK);
    let detail: Value = actix_test::read_body_json(detail_res).await;
    let arrangement = detail.get("arrangement").expect("arrangement view");
    assert_eq!(arrangement.get("id"), Some(&Value::from(1)));
    assert_eq!(arrangement.get("name"), Some(&Value::from("Spring Bouquet")));
    assert_eq!(arrangement.get("canEdit"), Some(&Value::from(false)));

    // The owner sees the editable rendering of the same record.
    let owner_detail_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/arrangements/1")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let owner_detail: Value = actix_test::read_body_json(owner_detail_res).await;
    assert_eq!(
        owner_detail
            .get("arrangement")
            .and_then(|a| a.get("canEdit")),
        Some(&Value::from(true))
    );

    // Flower export is empty until a flower is added.
    let export_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/arrangements/1/JSON/")
            .to_request(),
    )
    .await;
    assert_eq!(export_res.status(), StatusCode::OK);
    let export: Value = actix_test::read_body_json(export_res).await;
    assert_eq!(export.get("Flower"), Some(&Value::Array(Vec::new())));
}

#[actix_web::test]
async fn reconnecting_the_same_identity_is_idempotent() {
    let store = MemoryStore::new();
    let app = actix_test::init_service(test_app(fixture_state(
        &store,
        provider_for("Ada Lovelace", "ada@example.com"),
    )))
    .await;
    let cookie = sign_in(&app).await;

    // A second full flow within the established session short-circuits.
    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/login")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&login_res);
    let view: Value = actix_test::read_body_json(login_res).await;
    let state = view
        .get("state")
        .and_then(Value::as_str)
        .expect("nonce issued")
        .to_owned();

    let reconnect_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/gconnect?state={state}"))
            .cookie(cookie)
            .set_payload("auth-code")
            .to_request(),
    )
    .await;
    assert_eq!(reconnect_res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(reconnect_res).await;
    assert_eq!(body, Value::from("User is already connected."));

    // No duplicate user was created.
    let users_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/users/JSON/").to_request(),
    )
    .await;
    let users: Value = actix_test::read_body_json(users_res).await;
    assert_eq!(
        users.get("User").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[actix_web::test]
async fn logout_clears_the_session_even_when_revocation_fails() {
    let store = MemoryStore::new();
    let identity = provider_for("Ada Lovelace", "ada@example.com");
    let app = actix_test::init_service(test_app(fixture_state(&store, identity.clone()))).await;
    let cookie = sign_in(&app).await;
    identity.fail_revocations();

    let logout_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/disconnect")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout_res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        logout_res
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/arrangements")
    );
    let cookie = session_cookie(&logout_res);

    let list_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/arrangements")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let listing: Value = actix_test::read_body_json(list_res).await;
    assert_eq!(listing.get("authenticated"), Some(&Value::from(false)));
    assert_eq!(
        listing.get("notices"),
        Some(&Value::from(vec!["You have successfully been logged out."]))
    );
}

#[actix_web::test]
async fn gated_routes_redirect_anonymous_visitors_to_login() {
    let store = MemoryStore::new();
    let app = actix_test::init_service(test_app(fixture_state(
        &store,
        provider_for("Ada Lovelace", "ada@example.com"),
    )))
    .await;

    for uri in [
        "/arrangements/new",
        "/arrangements/1/edit",
        "/arrangements/1/delete",
        "/arrangements/1/new",
        "/arrangements/1/2",
        "/arrangements/1/2/delete",
    ] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "uri: {uri}");
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/login"),
            "uri: {uri}"
        );
    }
}
