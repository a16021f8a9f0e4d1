//! Core types for lambdapack
//!
//! Function settings, archive packaging and the error types shared by the
//! installer crates.

pub mod error;
pub mod function;
pub mod package;

pub use error::{InstallError, PackageError};
pub use function::{CreatedFunction, FunctionSettings};
pub use package::{create_function_package, package_entries, ArchiveGuard, PackageSummary};
