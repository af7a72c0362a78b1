// This is free and unencumbered software released into the public domain.

//! Camera preview lifecycle: facing discovery, surface binding, still capture.
//!
//! The crate models the glue between a hardware camera service and a drawing
//! surface: [`shared::CameraDeviceHandle`] owns at most one open camera
//! device, and [`shared::PreviewLifecycleBinder`] keeps its preview running
//! across the surface's created/changed/destroyed lifecycle and front/back
//! facing switches. The platform seams are the [`shared::CameraDriver`] and
//! [`shared::SurfaceHost`] traits.

pub mod cli;
pub mod shared;
