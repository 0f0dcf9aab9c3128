//! Domain Entities
//!
//! - `MappingModel` - where and how each field is painted
//! - `DataStructure` - accepted shape of input data
//! - `Reduction` - canonical reduction entries and their totals
//! - `FieldTable` - resolved display values

mod data_structure;
mod field_mapping;
mod field_table;
mod reduction;

pub use data_structure::{Check, DataStructure, FieldSpec, SectionSpec, ValueType};
pub use field_mapping::{
    Align, FieldKind, FieldMapping, FontFace, Format, MappingModel, Predicate, Source,
};
pub use field_table::{FieldTable, FieldValue};
pub use reduction::{
    Reduction, ReductionShape, ReductionTotals, CANONICAL_KEYS, REDUCCIONES, TOTALES,
};
