//! Domain models for the PAM yield prediction service

mod prediction;
mod record;
mod recommendation;

pub use prediction::*;
pub use record::*;
pub use recommendation::*;
