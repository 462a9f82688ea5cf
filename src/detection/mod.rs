//! Build-system detection from root-level marker files

pub mod detector;
pub mod kind;
pub mod rules;

pub use detector::{BuildSystemDetector, Detection};
pub use kind::BuildSystemKind;
pub use rules::{Marker, Signature, SIGNATURES};
