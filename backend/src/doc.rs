//! OpenAPI document for the JSON surface.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::auth::LoginView;
use crate::inbound::http::catalog::{
    ArrangementDetailView, ArrangementFormView, ArrangementView, CatalogView, CreatorView,
    FlowerFormView, FlowerView, WarningView,
};
use crate::inbound::http::export::{
    ArrangementRecord, ArrangementsDocument, FlowerDocument, FlowerRecord, FlowersDocument,
    UserRecord, UsersDocument,
};

/// Aggregated OpenAPI description of the documented endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::auth::show_login,
        crate::inbound::http::auth::gconnect,
        crate::inbound::http::auth::gdisconnect,
        crate::inbound::http::auth::disconnect,
        crate::inbound::http::catalog::home,
        crate::inbound::http::catalog::list_arrangements,
        crate::inbound::http::catalog::show_arrangement,
        crate::inbound::http::export::users_json,
        crate::inbound::http::export::arrangements_json,
        crate::inbound::http::export::arrangement_flowers_json,
        crate::inbound::http::export::flower_json,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginView,
        CatalogView,
        ArrangementView,
        ArrangementDetailView,
        ArrangementFormView,
        CreatorView,
        FlowerView,
        FlowerFormView,
        WarningView,
        UserRecord,
        UsersDocument,
        ArrangementRecord,
        ArrangementsDocument,
        FlowerRecord,
        FlowersDocument,
        FlowerDocument,
    )),
    tags(
        (name = "auth", description = "Sign-in against the external identity provider"),
        (name = "catalog", description = "Arrangement and flower views"),
        (name = "export", description = "Read-only JSON export")
    )
)]
pub struct ApiDoc;
