//! Client library behind the CMS admin dashboard: multilingual drafts,
//! their validation and form-data encoding, the REST client and the
//! signed-in session.

pub mod api;
pub mod auth;
pub mod config;
pub mod entities;
pub mod form;
pub mod form_data;
pub mod i18n;
pub mod image;
pub mod routes;
pub mod validation;
