//! Tokenguard core library.
//!
//! Audits a front-end codebase for adherence to its design-token registry:
//! every colour, spacing, typography, effect, border, breakpoint and motion
//! value should reference a registered token rather than a hardcoded literal.
//!
//! High-level modules:
//! - `registry`: loads the token stylesheet into a queryable `Registry`.
//! - `walker`: lazy discovery of CSS/TSX/TS sources.
//! - `extract`: per-category pattern extractors over four syntactic surfaces.
//! - `classify`: token reference / acceptable literal / violation decisions.
//! - `aggregate`: per-file results rolled into a `ComplianceReport`.
//! - `contrast`: WCAG relative luminance and contrast ratio.
//! - `scan`: the parallel pipeline tying the above together.
//! - `fix`: in-place rewrite of unambiguous literals.
//! - `config`, `cli`, `output`, `utils`: the command-line surface.
pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod contrast;
pub mod error;
pub mod extract;
pub mod fix;
pub mod models;
pub mod output;
pub mod registry;
pub mod scan;
pub mod utils;
pub mod values;
pub mod walker;

pub use aggregate::aggregate;
pub use classify::{classify, Classifier, Policy};
pub use contrast::{contrast_ratio, relative_luminance};
pub use error::{ConfigError, FileError};
pub use models::report::ComplianceReport;
pub use models::token::{Category, Token};
pub use registry::{load_registry, parse_registry, Registry, RegistryOptions};
pub use scan::{run_scan, scan_source, ScanOptions};
