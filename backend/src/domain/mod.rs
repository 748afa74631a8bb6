//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed entities and use-cases behind the HTTP
//! adapter, keep them free of transport concerns, and expose port traits the
//! outbound adapters implement. Serialization contracts and invariants are
//! documented on each type.

pub mod auth;
pub mod catalog;
pub mod catalog_service;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    ConnectAttempt, ConnectOutcome, ConnectService, EstablishedSession, LoginNonce,
    SessionIdentity, STATE_NONCE_LEN,
};
pub use self::catalog::{
    Arrangement, ArrangementAttributes, ArrangementId, ArrangementPatch, CatalogValidationError,
    Flower, FlowerAttributes, FlowerId, FlowerPatch, Price,
};
pub use self::catalog_service::{ArrangementDetail, CatalogService};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;
pub use self::user::{EmailAddress, NewUser, User, UserId, UserValidationError};
