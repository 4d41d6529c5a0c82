//! Per-format chunk handlers.
//!
//! Each module decodes one chunk family into its value types; the walker
//! decides which handler a chunk goes to.

pub mod car_type;
pub mod font;
pub mod frontend;
pub mod lights;
pub mod materials;
pub mod pca;
pub mod spline;
pub mod texture_pack;
