//! Typed argument structs for the external programs pkgcustom drives.

pub mod apt;
pub mod repository;
