//! Read-only JSON export of the catalog.
//!
//! Record shapes are serialized field-for-field in the snake_case form
//! external consumers already rely on; the envelope keys name the record
//! type. Lookup failures surface as typed JSON errors (404 for missing ids)
//! rather than prose.

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Arrangement, ArrangementId, Error, Flower, FlowerId, User};

use super::state::HttpState;
use super::ApiResult;

/// Exported user record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    pub name: String,
    pub id: i32,
    pub email: String,
    pub picture: Option<String>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            name: user.name().to_owned(),
            id: user.id().as_i32(),
            email: user.email().as_ref().to_owned(),
            picture: user.picture().map(str::to_owned),
        }
    }
}

/// Exported arrangement record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArrangementRecord {
    pub name: String,
    pub id: i32,
    pub description: String,
    pub base_price: String,
    pub user_id: i32,
    pub picture: Option<String>,
}

impl From<&Arrangement> for ArrangementRecord {
    fn from(arrangement: &Arrangement) -> Self {
        Self {
            name: arrangement.name().to_owned(),
            id: arrangement.id().as_i32(),
            description: arrangement.description().to_owned(),
            base_price: arrangement.base_price().as_ref().to_owned(),
            user_id: arrangement.owner().as_i32(),
            picture: arrangement.picture().map(str::to_owned),
        }
    }
}

/// Exported flower record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlowerRecord {
    pub name: String,
    pub description: String,
    pub id: i32,
    pub price: String,
    pub user_id: i32,
    pub picture: Option<String>,
}

impl From<&Flower> for FlowerRecord {
    fn from(flower: &Flower) -> Self {
        Self {
            name: flower.name().to_owned(),
            description: flower.description().to_owned(),
            id: flower.id().as_i32(),
            price: flower.price().as_ref().to_owned(),
            user_id: flower.owner().as_i32(),
            picture: flower.picture().map(str::to_owned),
        }
    }
}

/// Envelope for the user listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersDocument {
    #[serde(rename = "User")]
    pub users: Vec<UserRecord>,
}

/// Envelope for the arrangement listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ArrangementsDocument {
    #[serde(rename = "Arrangement")]
    pub arrangements: Vec<ArrangementRecord>,
}

/// Envelope for one arrangement's flower listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlowersDocument {
    #[serde(rename = "Flower")]
    pub flowers: Vec<FlowerRecord>,
}

/// Envelope for a single flower record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlowerDocument {
    #[serde(rename = "Flower")]
    pub flower: FlowerRecord,
}

/// All registered users.
#[utoipa::path(
    get,
    path = "/users/JSON/",
    responses(
        (status = 200, description = "User listing", body = UsersDocument),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["export"],
    operation_id = "usersJson",
    security([])
)]
#[get("/users/JSON/")]
pub async fn users_json(state: web::Data<HttpState>) -> ApiResult<web::Json<UsersDocument>> {
    let users = state.catalog.list_users().await?;
    Ok(web::Json(UsersDocument {
        users: users.iter().map(UserRecord::from).collect(),
    }))
}

/// All arrangements.
#[utoipa::path(
    get,
    path = "/arrangements/JSON/",
    responses(
        (status = 200, description = "Arrangement listing", body = ArrangementsDocument),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["export"],
    operation_id = "arrangementsJson",
    security([])
)]
#[get("/arrangements/JSON/")]
pub async fn arrangements_json(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ArrangementsDocument>> {
    let arrangements = state.catalog.list_arrangements().await?;
    Ok(web::Json(ArrangementsDocument {
        arrangements: arrangements.iter().map(ArrangementRecord::from).collect(),
    }))
}

/// The flowers of one arrangement.
#[utoipa::path(
    get,
    path = "/arrangements/{id}/JSON/",
    params(("id" = i32, Path, description = "Arrangement id")),
    responses(
        (status = 200, description = "Flower listing", body = FlowersDocument),
        (status = 404, description = "No such arrangement", body = Error)
    ),
    tags = ["export"],
    operation_id = "arrangementFlowersJson",
    security([])
)]
#[get("/arrangements/{id}/JSON/")]
pub async fn arrangement_flowers_json(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<FlowersDocument>> {
    let flowers = state
        .catalog
        .arrangement_flowers(ArrangementId::new(path.into_inner()))
        .await?;
    Ok(web::Json(FlowersDocument {
        flowers: flowers.iter().map(FlowerRecord::from).collect(),
    }))
}

/// A single flower.
#[utoipa::path(
    get,
    path = "/arrangements/{id}/{flower_id}/JSON/",
    params(
        ("id" = i32, Path, description = "Arrangement id"),
        ("flower_id" = i32, Path, description = "Flower id")
    ),
    responses(
        (status = 200, description = "Flower record", body = FlowerDocument),
        (status = 404, description = "No such arrangement or flower", body = Error)
    ),
    tags = ["export"],
    operation_id = "flowerJson",
    security([])
)]
#[get("/arrangements/{id}/{flower_id}/JSON/")]
pub async fn flower_json(
    state: web::Data<HttpState>,
    path: web::Path<(i32, i32)>,
) -> ApiResult<web::Json<FlowerDocument>> {
    let (arrangement_id, flower_id) = path.into_inner();
    let flower = state
        .catalog
        .flower(ArrangementId::new(arrangement_id), FlowerId::new(flower_id))
        .await?;
    Ok(web::Json(FlowerDocument {
        flower: FlowerRecord::from(&flower),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use serde_json::Value;
    use std::sync::Arc;

    use crate::domain::ports::{MemoryStore, StaticIdentityProvider};
    use crate::domain::{ArrangementAttributes, EmailAddress, FlowerAttributes, NewUser, Price};
    use crate::inbound::http::test_utils::{
        fixture_state, test_profile, test_session_middleware, TEST_CLIENT_ID,
    };

    fn test_app(
        state: crate::inbound::http::state::HttpState,
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
            .configure(crate::inbound::http::configure)
    }

    fn provider() -> Arc<StaticIdentityProvider> {
        Arc::new(StaticIdentityProvider::new(
            "subject-1",
            TEST_CLIENT_ID,
            test_profile(),
        ))
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let owner = store
            .seed_user(
                &NewUser::new(
                    "Ada",
                    EmailAddress::new("ada@example.com").expect("email"),
                    Some("https://example.com/ada.png".to_owned()),
                )
                .expect("draft"),
            )
            .id();
        let arrangement = store.seed_arrangement(
            &ArrangementAttributes::new(
                "Spring Bouquet",
                "Tulips and daffodils",
                Price::new("19.99").expect("price"),
                None,
            )
            .expect("attributes"),
            owner,
        );
        store.seed_flower(
            &FlowerAttributes::new("Rose", "A red rose", Price::new("2.50").expect("price"), None)
                .expect("attributes"),
            arrangement.id(),
            owner,
        );
        store
    }

    #[actix_web::test]
    async fn user_listing_matches_the_exported_shape() {
        let app = actix_test::init_service(test_app(fixture_state(&seeded_store(), provider())))
            .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/users/JSON/").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        let users = value
            .get("User")
            .and_then(Value::as_array)
            .expect("User envelope");
        assert_eq!(users.len(), 1);
        let user = &users[0];
        assert_eq!(user.get("name"), Some(&Value::from("Ada")));
        assert_eq!(user.get("id"), Some(&Value::from(1)));
        assert_eq!(user.get("email"), Some(&Value::from("ada@example.com")));
        assert_eq!(
            user.get("picture"),
            Some(&Value::from("https://example.com/ada.png"))
        );
    }

    #[actix_web::test]
    async fn arrangement_listing_uses_snake_case_fields() {
        let app = actix_test::init_service(test_app(fixture_state(&seeded_store(), provider())))
            .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/arrangements/JSON/")
                .to_request(),
        )
        .await;
        let value: Value = actix_test::read_body_json(res).await;
        let arrangements = value
            .get("Arrangement")
            .and_then(Value::as_array)
            .expect("Arrangement envelope");
        let arrangement = &arrangements[0];
        assert_eq!(arrangement.get("base_price"), Some(&Value::from("19.99")));
        assert_eq!(arrangement.get("user_id"), Some(&Value::from(1)));
        assert!(arrangement.get("basePrice").is_none());
    }

    #[actix_web::test]
    async fn flower_listing_is_scoped_to_the_arrangement() {
        let app = actix_test::init_service(test_app(fixture_state(&seeded_store(), provider())))
            .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/arrangements/1/JSON/")
                .to_request(),
        )
        .await;
        let value: Value = actix_test::read_body_json(res).await;
        let flowers = value
            .get("Flower")
            .and_then(Value::as_array)
            .expect("Flower envelope");
        assert_eq!(flowers.len(), 1);
        assert_eq!(flowers[0].get("price"), Some(&Value::from("2.50")));
        assert_eq!(flowers[0].get("user_id"), Some(&Value::from(1)));
    }

    #[actix_web::test]
    async fn empty_arrangement_exports_an_empty_list() {
        let store = MemoryStore::new();
        let owner = store
            .seed_user(
                &NewUser::new(
                    "Ada",
                    EmailAddress::new("ada@example.com").expect("email"),
                    None,
                )
                .expect("draft"),
            )
            .id();
        store.seed_arrangement(
            &ArrangementAttributes::new(
                "Spring Bouquet",
                "",
                Price::new("19.99").expect("price"),
                None,
            )
            .expect("attributes"),
            owner,
        );
        let app = actix_test::init_service(test_app(fixture_state(&store, provider()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/arrangements/1/JSON/")
                .to_request(),
        )
        .await;
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value.get("Flower"), Some(&Value::Array(Vec::new())));
    }

    #[actix_web::test]
    async fn missing_ids_are_typed_404s() {
        let app = actix_test::init_service(test_app(fixture_state(&seeded_store(), provider())))
            .await;

        for uri in ["/arrangements/9/JSON/", "/arrangements/1/9/JSON/"] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "uri: {uri}");
            let value: Value = actix_test::read_body_json(res).await;
            assert_eq!(
                value.get("code").and_then(Value::as_str),
                Some("not_found"),
                "uri: {uri}"
            );
        }
    }

    #[actix_web::test]
    async fn single_flower_export_shape() {
        let app = actix_test::init_service(test_app(fixture_state(&seeded_store(), provider())))
            .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/arrangements/1/1/JSON/")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        let flower = value.get("Flower").expect("Flower envelope");
        assert_eq!(flower.get("name"), Some(&Value::from("Rose")));
        assert_eq!(flower.get("description"), Some(&Value::from("A red rose")));
        assert_eq!(flower.get("id"), Some(&Value::from(1)));
    }
}
