//! HTTP handlers grouped by surface.

pub mod editors;
pub mod health;
pub mod subjects;
