//! Shared data contracts: tile catalog, sectors, and solved tile instances.
//!
//! Everything here is plain serializable data; the algorithms live in
//! `crate::generation`.

pub mod instance;
pub mod sector;
pub mod tile;

pub use instance::{Metadata, MetadataValue, Position, TileInstance};
pub use sector::{Axis, Bounds, Sector, SectorRole};
pub use tile::{AdjacencyRule, Direction, TileCatalog, TileDefinition};
