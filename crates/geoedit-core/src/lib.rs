//! geoedit core: the editable geometry model and the pure algorithms the
//! editor runs on every pointer event.
//!
//! - [`model`]: geometry sum type, dual screen/geographic vertices, edges
//! - [`project`]: structure-preserving coordinate walks and flattening
//! - [`index`]: bulk-loaded point and bounding-box indexes
//! - [`snap`]: vertex/edge snap resolution
//! - [`hit`]: point-in-polygon hit testing
//! - [`construct`]: click-by-click shape construction
//! - [`projection`]: the host projection boundary

pub mod config;
pub mod construct;
pub mod error;
pub mod hit;
pub mod index;
pub mod model;
pub mod project;
pub mod projection;
pub mod snap;

pub use config::{EditorConfig, Settings, SnapSettings};
pub use error::{GeometryError, parse_geometries};
pub use index::{BoxIndex, Indexes, PointIndex};
pub use model::{Coord, Geometry, LngLat, Ring, Segment, Vertex};
pub use project::{Collector, Flattened, flatten, insert_vertex, project, project_all, replace_vertex};
pub use projection::{LinearProjection, Projection};
pub use snap::{Snap, SnapMode};

// Re-export kurbo geometry so downstream crates share one `Point`/`Rect`.
pub use kurbo::{Point, Rect};
