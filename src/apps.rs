//! Resource apps
//!
//! Each app groups the models, serializers and views of one area of the
//! API.

pub mod accounts;
pub mod issues;
pub mod projects;
