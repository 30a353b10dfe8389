pub mod cache;
pub mod cold_start;
pub mod contextual;
pub mod diversity;
pub mod enrichment;
pub mod events;
pub mod popularity;
pub mod segmentation;
pub mod similarity;
pub mod storage;
pub mod vectorizer;

pub use cold_start::ColdStartOrchestrator;
pub use diversity::MmrDiversifier;
pub use enrichment::EnrichmentService;
pub use popularity::PopularityEngine;
pub use segmentation::{SegmentBridge, SegmentClassifier};
pub use vectorizer::Vectorizer;
