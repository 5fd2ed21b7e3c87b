//! Installer implementations.

pub mod url;
