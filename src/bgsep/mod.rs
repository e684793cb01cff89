pub mod cancellation;
pub mod classifier;
pub mod covariance;
pub mod em;
pub mod gaussian;
pub mod kmeans;
pub mod pipeline;
pub mod sample_extraction;
pub mod seeding;
pub mod silhouette;
