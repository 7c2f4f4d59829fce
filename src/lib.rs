//! Infinitely scrolling pseudo-3D image gallery for truecolor terminals.
//!
//! [`motion`] holds the frame-driven engine; everything else hosts it in a
//! terminal: decoding images ([`gallery`]), projecting planes into a pixel
//! canvas ([`raster`]), painting the canvas with cell renderers ([`render`]),
//! and falling back to a static grid ([`fallback`]) when the check in
//! [`capability`] rejects the terminal.

pub mod app;
pub mod capability;
pub mod config;
pub mod fallback;
pub mod gallery;
pub mod motion;
pub mod profile;
pub mod raster;
pub mod render;
pub mod terminal;
