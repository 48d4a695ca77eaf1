//! Splice-region annotation of variants against transcript models.

pub mod aggregate;
pub mod cis;
pub mod splice;

pub use aggregate::{annotate_variant, AnnotatedVariant, MISSING_VALUE};
pub use cis::{cis_effect_window, extend_cis_effect_window};
pub use splice::classify;
