// File-format independent representation of a placed-and-routed design.
// Geometry is carried in micrometres throughout.

pub mod design;
pub mod layer;
pub mod net;
pub mod point;
pub mod pwl;
pub mod rect;
pub mod rectset;
