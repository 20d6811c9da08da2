//! Check results, documentation and rendering.
//!
//! - `CheckResult` / `Report`: the accumulated outcome of one run
//! - `lookup_doc`: the explanation attached to every check
//! - `format_report`: the sectioned text report

mod docs;
mod format;
mod model;

pub use docs::{lookup_doc, DocEntry};
pub use format::format_report;
pub use model::{CheckResult, CheckStatus, Report, Summary};
