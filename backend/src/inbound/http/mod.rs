//! HTTP inbound adapter exposing the catalog and sign-in endpoints.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod export;
pub mod session;
pub mod state;
pub mod test_utils;

use actix_web::{http::header, web, HttpResponse};

pub use error::ApiResult;

/// `303 See Other` redirect used after successful form posts and for
/// anonymous requests to gated routes.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Register every route.
///
/// Order matters: resources whose tails are literal (`/new`, `/edit`,
/// `/JSON/`) must be registered before the generic
/// `/arrangements/{id}/{flower_id}` pattern so that literal segments win.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::show_login)
        .service(auth::gconnect)
        .service(auth::gdisconnect)
        .service(auth::disconnect)
        .service(catalog::home)
        .service(export::users_json)
        .service(export::arrangements_json)
        .service(catalog::list_arrangements)
        .service(catalog::new_arrangement_form)
        .service(catalog::create_arrangement)
        .service(export::arrangement_flowers_json)
        .service(catalog::edit_arrangement_form)
        .service(catalog::edit_arrangement)
        .service(catalog::delete_arrangement_form)
        .service(catalog::delete_arrangement)
        .service(catalog::new_flower_form)
        .service(catalog::add_flower)
        .service(catalog::show_arrangement)
        .service(export::flower_json)
        .service(catalog::delete_flower_form)
        .service(catalog::delete_flower)
        .service(catalog::edit_flower_form)
        .service(catalog::edit_flower);
}
