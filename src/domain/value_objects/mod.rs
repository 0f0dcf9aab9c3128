//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

pub mod amount;
mod casilla;
mod config_warning;
mod data_path;
mod hash;
pub mod iban;
pub mod nif;

pub use casilla::{
    Casilla, BASE_REAL_BASELINE, BASE_TEORICA_BASELINE, DEPENDENT_BASELINE, LIQUIDACION,
};
pub use config_warning::ConfigWarning;
pub use data_path::{DataPath, DataPathError, Segment};
pub use hash::ContentHash;
pub use iban::IbanPart;
