pub mod contour;
pub mod edge_map;
pub mod frame;
pub mod rgb;
pub mod measurement;
pub mod point;

pub use contour::{BoundingBox, Contour, Polygon};
pub use edge_map::EdgeMap;
pub use frame::ReferenceFrame;
pub use rgb::ImageRgb;
pub use measurement::{CalibrationScale, ConfidenceLabel, Measurement, PaperSize};
pub use point::{Point, PointI};
