//! Centralized generation constants for the map procedural core.
//!
//! Defaults used when a config document omits a field, plus the numeric
//! constants of the reference random source.

// =====================================================
// Tiles
// =====================================================

/// Selection weight of a tile definition that does not declare one
pub const DEFAULT_TILE_WEIGHT: f64 = 1.0;

// =====================================================
// Map dimensions
// =====================================================

/// Default map width (X)
pub const DEFAULT_MAP_WIDTH: u32 = 64;

/// Default map height (Y)
pub const DEFAULT_MAP_HEIGHT: u32 = 64;

/// Default map depth (Z, floors)
pub const DEFAULT_MAP_DEPTH: u32 = 8;

// =====================================================
// Spatial partition (BSP)
// =====================================================

/// Default maximum recursion depth of the BSP tree
pub const DEFAULT_BSP_MAX_DEPTH: u32 = 6;

/// Default minimum sector edge length
pub const DEFAULT_MIN_EDGE_LENGTH: u32 = 8;

// =====================================================
// Constraint solver (WFC)
// =====================================================

/// Default advisory attempt bound for external retry loops
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

// =====================================================
// Reference LCG random source
// =====================================================

/// LCG multiplier: state = (state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS
pub const LCG_MULTIPLIER: i64 = 9301;

/// LCG increment
pub const LCG_INCREMENT: i64 = 49297;

/// LCG modulus (also the output divisor)
pub const LCG_MODULUS: i64 = 233280;

// =====================================================
// Envelope
// =====================================================

/// Envelope format version written by this crate; newer documents are rejected
pub const MAP_FORMAT_VERSION: u32 = 1;

/// Engine version stamped into generated map metadata
pub const ENGINE_VERSION: &str = concat!("mapgen-core/", env!("CARGO_PKG_VERSION"));
