//! Feature scaling applied between the feature engine and the windower.
//!
//! The pipeline never fits scaling parameters: they are established
//! externally, persisted as an artifact, and only *applied* here. The core
//! depends on scaling through the narrow [`Scaler`] trait (one `transform`
//! operation over an ordered feature matrix), so it carries no knowledge of
//! how the parameters were fit or stored.
//!
//! [`AffineScaler`] is the artifact-backed implementation: per-column
//! `x * scale + offset`, the form min-max and standard scalers reduce to at
//! application time. [`IdentityScaler`] passes values through for tests and
//! smoke runs.

mod scaler;

pub use scaler::{AffineScaler, IdentityScaler, Scaler};
