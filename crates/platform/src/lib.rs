//! Platform layer: picks the asset backend and opens audio once at startup.
//!
//! The engine only sees `&dyn ResourceProvider`; which byte source sits
//! behind it is decided here from [`PlatformConfig`].

use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::{Context, Result, bail};
use asset::{AssetProvider, AudioContext, BundleSource, DirSource, ProviderConfig, ResourceProvider};

/// Where assets are read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Files opened on demand from the asset root.
    #[default]
    Directory,
    /// Asset root read into memory up front.
    Bundle,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dir" | "directory" | "fs" => Ok(Self::Directory),
            "bundle" | "memory" | "mem" => Ok(Self::Bundle),
            other => bail!("Unknown asset backend '{}'", other),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::Bundle => f.write_str("bundle"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformConfig {
    pub backend: Backend,
    pub asset_root: PathBuf,
    /// Try to open an audio device. Sounds are inert when off or unavailable.
    pub audio: bool,
    pub provider: ProviderConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            asset_root: PathBuf::from("assets"),
            audio: true,
            provider: ProviderConfig::default(),
        }
    }
}

/// Host environment for one process. Owns the audio device, so it has to
/// outlive every sound handed out by its provider.
pub struct Platform {
    provider: Box<dyn ResourceProvider>,
    audio: Option<AudioContext>,
}

impl Platform {
    pub fn init(config: PlatformConfig) -> Result<Self> {
        let audio = if config.audio {
            match AudioContext::open() {
                Ok(ctx) => Some(ctx),
                Err(err) => {
                    log::warn!("Audio disabled: {}", err);
                    None
                }
            }
        } else {
            log::info!("Audio disabled by configuration");
            None
        };
        let output = audio.as_ref().map(AudioContext::output);

        let provider: Box<dyn ResourceProvider> = match config.backend {
            Backend::Directory => {
                if !config.asset_root.is_dir() {
                    log::warn!(
                        "Asset root {} is not a directory; every load will come back empty",
                        config.asset_root.display()
                    );
                }
                let source = DirSource::new(&config.asset_root);
                Box::new(AssetProvider::with_config(source, output, config.provider))
            }
            Backend::Bundle => {
                let source = BundleSource::from_dir(&config.asset_root).with_context(|| {
                    format!("Failed to bundle assets from {}", config.asset_root.display())
                })?;
                Box::new(AssetProvider::with_config(source, output, config.provider))
            }
        };

        log::info!(
            "Platform ready: backend={}, root={}, audio={}",
            config.backend,
            config.asset_root.display(),
            audio.is_some()
        );

        Ok(Self { provider, audio })
    }

    pub fn provider(&self) -> &dyn ResourceProvider {
        self.provider.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}
