//! Name → resource resolution for the engine.
//!
//! [`ResourceProvider`] is what engine code calls: every operation yields a
//! handle or nothing and never panics. [`AssetProvider`] implements it over
//! any [`AssetSource`] and keeps the fallible `try_*` variants public for
//! tooling that wants to know why a load failed.

use corelib::{ResourceError, ResourceResult};

use crate::{
    audio::{AudioOutput, Music, Sound},
    bitmap::Image,
    source::AssetSource,
    tilemap::{TileMap, parse_tile_map},
};

pub trait ResourceProvider {
    fn load_image(&self, name: &str) -> Option<Image>;
    fn load_sound(&self, name: &str) -> Option<Sound>;
    /// Always yields a handle bound to the ambient audio context.
    fn load_music(&self, name: &str) -> Music;
    fn load_tile_map(&self) -> Option<TileMap>;
}

/// Extensions appended to logical names, and the fixed level resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    pub image_extension: String,
    pub sound_extension: String,
    pub level_name: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            image_extension: "png".into(),
            sound_extension: "wav".into(),
            level_name: "level.map".into(),
        }
    }
}

pub struct AssetProvider<S> {
    source: S,
    audio: Option<AudioOutput>,
    config: ProviderConfig,
}

impl<S: AssetSource> AssetProvider<S> {
    pub fn new(source: S, audio: Option<AudioOutput>) -> Self {
        Self::with_config(source, audio, ProviderConfig::default())
    }

    pub fn with_config(source: S, audio: Option<AudioOutput>, config: ProviderConfig) -> Self {
        log::debug!(
            "Asset provider over {} (audio: {})",
            source.describe(),
            audio.is_some()
        );
        Self {
            source,
            audio,
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn try_load_image(&self, name: &str) -> ResourceResult<Image> {
        let file = format!("{}.{}", name, self.config.image_extension);
        let bytes = self.source.read_all(&file)?;
        Image::decode_png(&file, &bytes)
    }

    pub fn try_load_sound(&self, name: &str) -> ResourceResult<Sound> {
        let file = format!("{}.{}", name, self.config.sound_extension);
        let bytes = self.source.read_all(&file)?;
        Sound::from_clip(name, bytes, self.audio.clone())
    }

    /// Parses the level resource; the reader is released before returning.
    pub fn try_load_tile_map(&self) -> ResourceResult<TileMap> {
        let name = &self.config.level_name;
        let reader = self.source.open(name)?;
        parse_tile_map(reader).map_err(|e| match e {
            ResourceError::Corrupt { reason, .. } => ResourceError::corrupt(name.as_str(), reason),
            other => other,
        })
    }
}

/// Collapse a failed load to `None`, keeping a trace in the log.
fn absorb<T>(what: &str, name: &str, result: ResourceResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("No {} for '{}': {}", what, name, err);
            None
        }
    }
}

impl<S: AssetSource> ResourceProvider for AssetProvider<S> {
    fn load_image(&self, name: &str) -> Option<Image> {
        absorb("image", name, self.try_load_image(name))
    }

    fn load_sound(&self, name: &str) -> Option<Sound> {
        absorb("sound", name, self.try_load_sound(name))
    }

    fn load_music(&self, name: &str) -> Music {
        log::debug!("Music '{}' bound to ambient audio context", name);
        Music::new(name, self.audio.clone())
    }

    fn load_tile_map(&self) -> Option<TileMap> {
        absorb("tile map", &self.config.level_name, self.try_load_tile_map())
    }
}
