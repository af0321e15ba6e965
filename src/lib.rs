//! cgmerge pairs CG diff overlays with their base images, strips the diff's
//! flat background, finds the translation that lines the remaining artwork
//! up with the base, and composites the result.
//!
//! The stages are usable on their own:
//! - [`naming`], [`features`] and [`classify`] describe single images,
//! - [`pairing`] groups them and assigns diffs to bases,
//! - [`background`], [`border`], [`align`] and [`composite`] process one pair,
//! - [`pipeline`] chains the per-pair stages.
//!
//! Optional features: `rayon` for data-parallel kernels, `simd` for a `wide`
//! clear kernel, `image-io` for file loading and PNG output, and `tracing`
//! for spans and events.

pub mod align;
pub mod background;
pub mod border;
pub mod classify;
pub mod composite;
pub mod features;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod naming;
pub mod pairing;
pub mod pipeline;
mod trace;
pub mod util;

pub use align::{fit_percent, AlignMode, AlignParams, Aligner, AlignmentResult};
pub use background::{
    clear_color, detect_bg_color, BackgroundColor, BgKind, BgMode, DetectedBackground,
};
pub use border::{extract_border, BorderSet};
pub use classify::{Classification, ClassifierConfig, DiffClassifier};
pub use composite::composite_over;
pub use features::{extract_features, ImageFeatures};
pub use crate::image::{ImageView, OwnedImage, Rgb8, Rgba8};
pub use naming::{parse_name, NameInfo};
pub use pairing::{auto_jobs, build_pairs, Assignment, ImageRecord, MatchSource, PairJob};
pub use pipeline::{process_images, FailReason, PairConfig, PairError, PairOutcome, ProcessedPair};
pub use util::{CgError, CgResult};

#[cfg(feature = "image-io")]
pub use pairing::records_from_paths;
#[cfg(feature = "image-io")]
pub use pipeline::process_pair;
