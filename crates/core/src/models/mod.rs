//! Entity structs and request/response DTOs exchanged with the backend.
//!
//! Each submodule contains:
//! - The entity struct as returned by the REST API
//! - A create DTO for `POST` bodies
//! - An update DTO (all `Option` fields) for `PUT` bodies

pub mod manual;
pub mod project;
pub mod torisetsu;
pub mod upload;
pub mod user;
