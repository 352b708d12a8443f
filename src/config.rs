//! Parser-wide configuration. Kept deliberately small: behavior the spec
//! fixes (event ordering, binder semantics) is not configurable, only the
//! handful of knobs that are genuinely optional extras.

/// Controls optional, non-semantic parser behaviors.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Track the (large, rarely used) smoke voxel occupancy grid.
    /// Disabled by default since most consumers never read `Smoke::voxel()`.
    pub track_smoke_voxels: bool,

    /// Log level used for properties that silently no-op because their
    /// owning pawn/controller could not be resolved. `debug` by default so
    /// it doesn't drown out real warnings.
    pub silent_fallback_log_level: log::Level,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            track_smoke_voxels: false,
            silent_fallback_log_level: log::Level::Debug,
        }
    }
}
