//! Multi-floor tile map view.
//!
//! * [`world`] – positions, camera, the world-query seam and an in-memory
//!   reference world.
//! * [`engine`] – floor range, fading, visibility cache and the per-frame
//!   compositor behind [`engine::MapView`].
//! * [`renderer`] – the [`renderer::DrawPool`] seam plus recording and
//!   software back-ends.

pub mod config;
pub mod defs;
pub mod engine;
pub mod renderer;
pub mod world;
