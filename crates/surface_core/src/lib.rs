/// The `surface_core` crate is a numerical calculus engine for real functions of
/// two variables, f(x, y). It works only by sampling f through an [`Oracle`],
/// so it keeps producing approximate answers when no exact solver is available.
///
/// Key components:
/// - **Derivatives**: central finite-difference gradient and Hessian.
/// - **Range**: a sampling-range heuristic driven by expression hints.
/// - **Critical points**: grid-seeded Newton refinement and the second-derivative test.
/// - **Lagrange**: constraint-curve tracing and gradient-parallelism search.
/// - **Integral**: midpoint-rule double integrals.
/// - **Domain**: domain masks, value ranges and limit probes.
/// - **Engine**: the `Mode` switch between an exact backend and these algorithms.
mod bisection;
pub mod cancel;
pub mod critical;
pub mod derivatives;
pub mod domain;
pub mod engine;
pub mod error;
pub mod grid;
pub mod integral;
pub mod lagrange;
pub mod range;
pub mod settings;
pub mod traits;

pub use traits::Oracle;
