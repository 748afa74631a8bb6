//! Catalog handlers: arrangement and flower views, forms, and owner-gated
//! mutations.
//!
//! Views are JSON view models; templating is out of scope, so "public" versus
//! "owner" renderings differ only by the `can_edit` capability flag. Anonymous
//! requests to gated routes are redirected to `/login`. Ownership mismatches
//! render an inline warning with a `200` instead of aborting the request, so
//! the client can surface it in place.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Arrangement, ArrangementAttributes, ArrangementDetail, ArrangementId, ArrangementPatch,
    CatalogValidationError, Error, ErrorCode, Flower, FlowerAttributes, FlowerId, FlowerPatch,
    Price, UserId,
};

use super::session::SessionContext;
use super::state::HttpState;
use super::{see_other, ApiResult};

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// One arrangement as rendered in listings and detail pages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub base_price: String,
    pub picture: Option<String>,
    /// Whether the requesting session may edit or delete this arrangement.
    pub can_edit: bool,
}

fn arrangement_view(arrangement: &Arrangement, viewer: Option<UserId>) -> ArrangementView {
    ArrangementView {
        id: arrangement.id().as_i32(),
        name: arrangement.name().to_owned(),
        description: arrangement.description().to_owned(),
        base_price: arrangement.base_price().as_ref().to_owned(),
        picture: arrangement.picture().map(str::to_owned),
        can_edit: viewer.is_some_and(|viewer| arrangement.is_owned_by(viewer)),
    }
}

/// One flower as rendered on the arrangement detail page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowerView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub picture: Option<String>,
    pub can_edit: bool,
}

fn flower_view(flower: &Flower, viewer: Option<UserId>) -> FlowerView {
    FlowerView {
        id: flower.id().as_i32(),
        name: flower.name().to_owned(),
        description: flower.description().to_owned(),
        price: flower.price().as_ref().to_owned(),
        picture: flower.picture().map(str::to_owned),
        can_edit: viewer.is_some_and(|viewer| flower.owner() == viewer),
    }
}

/// Catalog listing, branching public/private only via capability flags.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub arrangements: Vec<ArrangementView>,
    /// Whether the requesting session is signed in.
    pub authenticated: bool,
    /// Flash notices queued by earlier requests, drained on render.
    pub notices: Vec<String>,
}

/// Creator block on the arrangement detail page.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorView {
    pub name: String,
    pub picture: Option<String>,
}

/// Arrangement detail page: the arrangement, its creator, and its flowers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementDetailView {
    pub arrangement: ArrangementView,
    pub creator: CreatorView,
    pub flowers: Vec<FlowerView>,
    pub notices: Vec<String>,
}

fn detail_view(
    detail: &ArrangementDetail,
    viewer: Option<UserId>,
    notices: Vec<String>,
) -> ArrangementDetailView {
    ArrangementDetailView {
        arrangement: arrangement_view(&detail.arrangement, viewer),
        creator: CreatorView {
            name: detail.creator.name().to_owned(),
            picture: detail.creator.picture().map(str::to_owned),
        },
        flowers: detail
            .flowers
            .iter()
            .map(|flower| flower_view(flower, viewer))
            .collect(),
        notices,
    }
}

/// Form view model, pre-populated with current values on edit.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementFormView {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub base_price: String,
    pub picture: Option<String>,
}

impl From<&Arrangement> for ArrangementFormView {
    fn from(arrangement: &Arrangement) -> Self {
        Self {
            id: Some(arrangement.id().as_i32()),
            name: arrangement.name().to_owned(),
            description: arrangement.description().to_owned(),
            base_price: arrangement.base_price().as_ref().to_owned(),
            picture: arrangement.picture().map(str::to_owned),
        }
    }
}

/// Flower form view model, pre-populated with current values on edit.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlowerFormView {
    pub arrangement_id: i32,
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub picture: Option<String>,
}

impl FlowerFormView {
    fn blank(arrangement_id: ArrangementId) -> Self {
        Self {
            arrangement_id: arrangement_id.as_i32(),
            id: None,
            name: String::new(),
            description: String::new(),
            price: String::new(),
            picture: None,
        }
    }

    fn from_flower(flower: &Flower) -> Self {
        Self {
            arrangement_id: flower.arrangement().as_i32(),
            id: Some(flower.id().as_i32()),
            name: flower.name().to_owned(),
            description: flower.description().to_owned(),
            price: flower.price().as_ref().to_owned(),
            picture: flower.picture().map(str::to_owned),
        }
    }
}

/// Inline warning rendered when an ownership check fails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WarningView {
    pub warning: String,
}

// ---------------------------------------------------------------------------
// Form payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ArrangementForm {
    name: Option<String>,
    description: Option<String>,
    base_price: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlowerForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    picture: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn require(value: Option<String>, field: &str) -> Result<String, Error> {
    non_empty(value).ok_or_else(|| Error::invalid_request(format!("{field} must not be empty")))
}

fn map_validation(error: CatalogValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

fn arrangement_attributes(form: ArrangementForm) -> Result<ArrangementAttributes, Error> {
    let name = require(form.name, "name")?;
    let base_price = Price::new(require(form.base_price, "base_price")?).map_err(map_validation)?;
    ArrangementAttributes::new(
        name,
        form.description.unwrap_or_default(),
        base_price,
        non_empty(form.picture),
    )
    .map_err(map_validation)
}

fn arrangement_patch(form: ArrangementForm) -> Result<ArrangementPatch, Error> {
    let base_price = non_empty(form.base_price)
        .map(Price::new)
        .transpose()
        .map_err(map_validation)?;
    ArrangementPatch::new(
        non_empty(form.name),
        non_empty(form.description),
        base_price,
        non_empty(form.picture),
    )
    .map_err(map_validation)
}

fn flower_attributes(form: FlowerForm) -> Result<FlowerAttributes, Error> {
    let name = require(form.name, "name")?;
    let price = Price::new(require(form.price, "price")?).map_err(map_validation)?;
    FlowerAttributes::new(
        name,
        form.description.unwrap_or_default(),
        price,
        non_empty(form.picture),
    )
    .map_err(map_validation)
}

fn flower_patch(form: FlowerForm) -> Result<FlowerPatch, Error> {
    let price = non_empty(form.price)
        .map(Price::new)
        .transpose()
        .map_err(map_validation)?;
    FlowerPatch::new(
        non_empty(form.name),
        non_empty(form.description),
        price,
        non_empty(form.picture),
    )
    .map_err(map_validation)
}

/// Render an ownership failure inline with a `200`; rethrow anything else.
fn inline_warning_or(error: Error) -> ApiResult<HttpResponse> {
    if error.code() == ErrorCode::Forbidden {
        return Ok(HttpResponse::Ok().json(WarningView {
            warning: error.message().to_owned(),
        }));
    }
    Err(error)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn render_catalog(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<web::Json<CatalogView>> {
    let viewer = session.user_id()?;
    let arrangements = state.catalog.list_arrangements().await?;
    let notices = session.take_notices()?;
    Ok(web::Json(CatalogView {
        arrangements: arrangements
            .iter()
            .map(|arrangement| arrangement_view(arrangement, viewer))
            .collect(),
        authenticated: viewer.is_some(),
        notices,
    }))
}

/// Catalog listing at the site root.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Catalog listing", body = CatalogView)
    ),
    tags = ["catalog"],
    operation_id = "home",
    security([])
)]
#[get("/")]
pub async fn home(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CatalogView>> {
    render_catalog(&state, &session).await
}

/// Catalog listing.
#[utoipa::path(
    get,
    path = "/arrangements",
    responses(
        (status = 200, description = "Catalog listing", body = CatalogView)
    ),
    tags = ["catalog"],
    operation_id = "listArrangements",
    security([])
)]
#[get("/arrangements")]
pub async fn list_arrangements(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CatalogView>> {
    render_catalog(&state, &session).await
}

/// Blank creation form for a new arrangement.
#[get("/arrangements/new")]
pub async fn new_arrangement_form(session: SessionContext) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(see_other("/login"));
    }
    Ok(HttpResponse::Ok().json(ArrangementFormView::default()))
}

/// Create an arrangement owned by the session user.
#[post("/arrangements/new")]
pub async fn create_arrangement(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<ArrangementForm>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let attributes = arrangement_attributes(form.into_inner())?;
    let created = state.catalog.create_arrangement(actor, attributes).await?;
    session.push_notice(format!(
        "New Arrangement {} Successfully Created",
        created.name()
    ))?;
    Ok(see_other("/arrangements"))
}

/// Arrangement detail with its flowers; public/private branch by capability.
#[utoipa::path(
    get,
    path = "/arrangements/{id}",
    params(("id" = i32, Path, description = "Arrangement id")),
    responses(
        (status = 200, description = "Arrangement detail", body = ArrangementDetailView),
        (status = 404, description = "No such arrangement", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "showArrangement",
    security([])
)]
#[get("/arrangements/{id}")]
pub async fn show_arrangement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ArrangementDetailView>> {
    let viewer = session.user_id()?;
    let detail = state
        .catalog
        .arrangement_detail(ArrangementId::new(path.into_inner()))
        .await?;
    let notices = session.take_notices()?;
    Ok(web::Json(detail_view(&detail, viewer, notices)))
}

/// Edit form pre-populated with the arrangement's current values.
#[get("/arrangements/{id}/edit")]
pub async fn edit_arrangement_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    match state
        .catalog
        .arrangement_for_edit(actor, ArrangementId::new(path.into_inner()))
        .await
    {
        Ok(arrangement) => Ok(HttpResponse::Ok().json(ArrangementFormView::from(&arrangement))),
        Err(error) => inline_warning_or(error),
    }
}

/// Apply a partial update to an owned arrangement.
#[post("/arrangements/{id}/edit")]
pub async fn edit_arrangement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<ArrangementForm>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let patch = arrangement_patch(form.into_inner())?;
    match state
        .catalog
        .edit_arrangement(actor, ArrangementId::new(path.into_inner()), patch)
        .await
    {
        Ok(updated) => {
            session.push_notice(format!(
                "Arrangement Successfully Edited {}",
                updated.name()
            ))?;
            Ok(see_other("/arrangements"))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Delete confirmation view for an owned arrangement.
#[get("/arrangements/{id}/delete")]
pub async fn delete_arrangement_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    match state
        .catalog
        .arrangement_for_delete(actor, ArrangementId::new(path.into_inner()))
        .await
    {
        Ok(arrangement) => {
            Ok(HttpResponse::Ok().json(arrangement_view(&arrangement, Some(actor))))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Delete an owned arrangement together with its flowers.
#[post("/arrangements/{id}/delete")]
pub async fn delete_arrangement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    match state
        .catalog
        .delete_arrangement(actor, ArrangementId::new(path.into_inner()))
        .await
    {
        Ok(deleted) => {
            session.push_notice(format!("{} Successfully Deleted", deleted.name()))?;
            Ok(see_other("/arrangements"))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Blank creation form for a flower in an owned arrangement.
#[get("/arrangements/{id}/new")]
pub async fn new_flower_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let id = ArrangementId::new(path.into_inner());
    match state.catalog.arrangement_for_new_flower(actor, id).await {
        Ok(arrangement) => {
            Ok(HttpResponse::Ok().json(FlowerFormView::blank(arrangement.id())))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Add a flower to an owned arrangement.
#[post("/arrangements/{id}/new")]
pub async fn add_flower(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<FlowerForm>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let id = ArrangementId::new(path.into_inner());
    let attributes = flower_attributes(form.into_inner())?;
    match state.catalog.add_flower(actor, id, attributes).await {
        Ok(flower) => {
            session.push_notice(format!("New Flower {} Successfully Added!", flower.name()))?;
            Ok(see_other(&format!("/arrangements/{id}")))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Edit form pre-populated with the flower's current values.
#[get("/arrangements/{id}/{flower_id}")]
pub async fn edit_flower_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let (arrangement_id, flower_id) = path.into_inner();
    match state
        .catalog
        .flower_for_edit(
            actor,
            ArrangementId::new(arrangement_id),
            FlowerId::new(flower_id),
        )
        .await
    {
        Ok(flower) => Ok(HttpResponse::Ok().json(FlowerFormView::from_flower(&flower))),
        Err(error) => inline_warning_or(error),
    }
}

/// Apply a partial update to a flower in an owned arrangement.
#[post("/arrangements/{id}/{flower_id}")]
pub async fn edit_flower(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
    form: web::Form<FlowerForm>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let (arrangement_id, flower_id) = path.into_inner();
    let patch = flower_patch(form.into_inner())?;
    match state
        .catalog
        .edit_flower(
            actor,
            ArrangementId::new(arrangement_id),
            FlowerId::new(flower_id),
            patch,
        )
        .await
    {
        Ok(_) => {
            session.push_notice("Flower Successfully Edited")?;
            Ok(see_other(&format!("/arrangements/{arrangement_id}")))
        }
        Err(error) => inline_warning_or(error),
    }
}

/// Delete confirmation view for a flower in an owned arrangement.
#[get("/arrangements/{id}/{flower_id}/delete")]
pub async fn delete_flower_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let (arrangement_id, flower_id) = path.into_inner();
    match state
        .catalog
        .flower_for_delete(
            actor,
            ArrangementId::new(arrangement_id),
            FlowerId::new(flower_id),
        )
        .await
    {
        Ok(flower) => Ok(HttpResponse::Ok().json(flower_view(&flower, Some(actor)))),
        Err(error) => inline_warning_or(error),
    }
}

/// Delete a flower from an owned arrangement.
#[post("/arrangements/{id}/{flower_id}/delete")]
pub async fn delete_flower(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i32, i32)>,
) -> ApiResult<HttpResponse> {
    let Some(actor) = session.user_id()? else {
        return Ok(see_other("/login"));
    };
    let (arrangement_id, flower_id) = path.into_inner();
    match state
        .catalog
        .delete_flower(
            actor,
            ArrangementId::new(arrangement_id),
            FlowerId::new(flower_id),
        )
        .await
    {
        Ok(_) => {
            session.push_notice("Flower Successfully Deleted!")?;
            Ok(see_other(&format!("/arrangements/{arrangement_id}")))
        }
        Err(error) => inline_warning_or(error),
    }
}
