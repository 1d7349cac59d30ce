//! Asset loading for the engine: images, sounds, music and level tile maps.
//! Byte sources are pluggable per platform; the provider turns names into
//! decoded handles.

pub mod audio;
pub mod bitmap;
pub mod provider;
pub mod source;
pub mod tilemap;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod test_support;

pub use audio::{AudioContext, AudioOutput, Music, Sound};
pub use bitmap::Image;
pub use provider::{AssetProvider, ProviderConfig, ResourceProvider};
pub use source::{AssetSource, BundleSource, DirSource};
pub use tilemap::{TileMap, load_tile_map_from_path, parse_tile_map};
