//! Issues and their comments

pub mod models;
pub mod serializers;
pub mod views;
