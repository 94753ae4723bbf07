//! Detection stages
//!
//! This module turns an image into located objects:
//! - Edge extraction (multi-threshold gradient edges)
//! - Contour tracing (outer boundaries of connected edge components)
//! - Reference sheet detection (the paper quadrilateral)
//! - Subject detection (the foot inside the sheet)

/// Connected component labeling of edge maps
pub mod components;
/// Lazy outer-boundary contour tracing
pub mod contour;
/// Multi-sensitivity edge extraction
pub mod edges;
/// Reference sheet detection and scoring
pub mod reference;
/// Subject confidence signals
pub mod scoring;
/// Subject detection inside the reference frame
pub mod subject;

pub use contour::ContourTracer;
pub use edges::EdgeExtractor;
pub use reference::{ReferenceCandidate, ReferenceDetector, ReferenceMatch, ReferenceRejection};
pub use scoring::SignalScores;
pub use subject::{SubjectCandidate, SubjectDetector, SubjectMatch, SubjectRejection};
