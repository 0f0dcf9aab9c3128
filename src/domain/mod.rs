//! Domain Layer
//!
//! The core of Casilla: the overlay engine without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Mapping model, data structure, reductions, field table
//! - `value_objects/` - Amounts, data paths, boxes, IBAN, NIF, hashes
//! - `services/` - Validator, normalizer, recalculator, resolver, layout
//! - `ports/` - Template document and run event interfaces
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - PDF handling goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
