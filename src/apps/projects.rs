//! Projects and their contributors

pub mod models;
pub mod serializers;
pub mod views;
