pub mod config;
pub mod cosine;
pub mod dataset;
pub mod error;
pub mod features;
pub mod lemmatize;
pub mod normalize;
pub mod persistence;
pub mod protocol;
pub mod recommender;
pub mod scoring;
pub mod server;
pub mod similarity;
pub mod stopwords;
pub mod svd;
pub mod tfidf;
pub mod transport;
pub mod types;

pub use dataset::Dataset;
pub use error::RecommenderError;
pub use recommender::{FittedModel, RecommenderService};
pub use types::{Course, Rating, RecommendedCourse};
