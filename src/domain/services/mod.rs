//! Domain Services
//!
//! Pure engine stages that operate on domain entities. None of them perform
//! I/O; each takes the data tree or its products and returns new values.

pub mod formatter;
mod layout;
mod normalizer;
mod recalculator;
mod resolver;
mod structure_validator;

pub use formatter::{FormatError, FormatOptions};
pub use layout::{check_page_range, off_page_fields, LayoutOptions, LayoutPlanner, PagePlan, PlacedText};
pub use normalizer::{
    LegacyReduction, NormalizedReductions, ReductionNormalizer, LEGACY_REDUCTIONS, TEORICO_SUFFIX,
};
pub use recalculator::{BoxChange, RecalcOptions, Recalculation, Recalculator, TotalsDiscrepancy};
pub use resolver::{evaluate, is_truthy, DataResolver};
pub use structure_validator::{
    is_absent, StructureValidator, ValidationReport, Violation, ViolationKind,
};
