//! Fill runs
//!
//! - `options` - run knobs
//! - `report` - run outcome
//! - `use_case` - stage orchestration

mod options;
mod report;
mod use_case;

pub use options::{FillOptions, DEFAULT_AUTHOR, DEFAULT_MODEL};
pub use report::{FillReport, RunError, RunStatus};
pub use use_case::{default_output_path, output_file_name, FillJob, FillUseCase, PreparedRun};
