//! Infrared spectrum viewer: load `;`-separated transmission traces, overlay
//! them over a wavenumber range and report their strongest absorption minima.

pub mod app;
pub mod color;
pub mod data;
pub mod export;
pub mod report;
pub mod settings;
pub mod state;
pub mod ui;
