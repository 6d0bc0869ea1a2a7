mod bitmap;
mod cancel;
mod engine;
mod levenshtein;
mod line;
mod read;
mod types;

pub use cancel::CancelToken;

pub use engine::similarities;

pub use types::{
    DEFAULT_MAX_EDIT_DISTANCE, Error, File, Occurrence, Options, Progress, Similarity,
    SimilarityLevel,
};
