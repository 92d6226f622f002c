//! # vizcanvas-ir
//!
//! The canonical scene model and everything that produces it: recovering
//! JSON from generated text, normalizing the accepted payload shapes into a
//! [`Scene`], and resolving animated layer properties at a point in time.
//!
//! Every payload passes through [`Normalizer`] before anything is drawn.

pub mod animation;
pub mod builder;
pub mod extract;
pub mod interpolate;
pub mod layer;
pub mod normalize;
pub mod props;
pub mod scene;
pub mod validate;

pub use animation::Animation;
pub use builder::{sample_scene, LayerBuilder, SceneBuilder};
pub use extract::{extract, extract_from_str, ExtractStrategy};
pub use interpolate::resolve_props;
pub use layer::{Layer, LayerKind};
pub use normalize::{normalize, NormalizeTrace, Normalized, Normalizer};
pub use props::{PropKey, PropValue, Props};
pub use scene::{Scene, DEFAULT_DURATION_MS};
pub use validate::{validate_scene, SceneWarning};
