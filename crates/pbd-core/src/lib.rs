//! Unified particle physics for real-time simulation.
//!
//! A position-based dynamics solver in the style of Macklin et al.,
//! "Unified Particle Physics for Real-Time Applications": rigid bodies,
//! granular matter and fluids are all particles, advanced through
//! sub-stepped constraint projection over a uniform neighbor grid.
//!
//! The crate is solver-only. Windowing, cameras and rendering live
//! elsewhere; the two integration points are [`scene::SceneDescription`]
//! consumed at construction and the packed position view returned by
//! [`solver::Solver::mapped_positions`] after each update.

pub mod config;
pub mod constraints;
pub mod error;
pub mod fluids;
pub mod grid;
pub mod math;
pub mod particle;
pub mod render;
pub mod scene;
pub mod solver;

pub use config::SolverConfig;
pub use constraints::plane::Plane;
pub use error::SceneError;
pub use scene::{ParticleGroupDesc, RigidBodyDesc, SceneDescription};
pub use solver::{Solver, StepStats};
