//! egui panels. Rendering only; all state changes go through `AppState`.

pub mod panels;
pub mod plot;
