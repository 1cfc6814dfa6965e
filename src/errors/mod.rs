pub mod types;

pub use types::{ManifestError, RenditionContext, ResolveError};
