//! Entry point for tileforge.
//! Boots the platform, loads the level and a few named assets.

use std::{path::PathBuf, thread, time::Duration};

use anyhow::Result;
use asset::{Image, TileMap};
use platform::{Backend, Platform, PlatformConfig};

/// Placeholder edge length when the requested image is missing.
const PLACEHOLDER_SIZE: u32 = 32;

#[derive(Debug)]
struct Args {
    platform: PlatformConfig,
    image: Option<String>,
    sound: Option<String>,
    music: Option<String>,
    play_ms: u64,
}

fn parse_args() -> Args {
    // Accept: --assets=DIR --backend=dir|bundle --no-audio
    //         --image=NAME --sound=NAME --music=NAME --play-ms=N
    let mut args = Args {
        platform: PlatformConfig::default(),
        image: None,
        sound: None,
        music: None,
        play_ms: 500,
    };

    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--assets=") {
            args.platform.asset_root = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--backend=") {
            args.platform.backend = v.parse().unwrap_or_else(|e| {
                log::warn!("{}, falling back to directory.", e);
                Backend::Directory
            });
        } else if arg == "--no-audio" {
            args.platform.audio = false;
        } else if let Some(v) = arg.strip_prefix("--image=") {
            args.image = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--sound=") {
            args.sound = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--music=") {
            args.music = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--play-ms=") {
            match v.parse::<u64>() {
                Ok(ms) => args.play_ms = ms,
                Err(_) => log::warn!("Ignoring bad --play-ms value '{}'", v),
            }
        } else {
            log::warn!("Unknown argument '{}'", arg);
        }
    }
    args
}

fn print_level(map: &TileMap) {
    log::info!("Level {}x{}", map.width(), map.height());
    // One line per y so the printout looks like the level.
    for y in 0..map.height() {
        let row: Vec<String> = (0..map.width())
            .filter_map(|x| map.get(x, y))
            .map(|id| format!("{id:>3}"))
            .collect();
        println!("{}", row.join(" "));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    log::info!(
        "Starting tileforge. Backend: {}, assets: {}",
        args.platform.backend,
        args.platform.asset_root.display()
    );

    let platform = Platform::init(args.platform)?;
    let provider = platform.provider();

    match provider.load_tile_map() {
        Some(map) => print_level(&map),
        None => log::warn!("No level could be loaded"),
    }

    if let Some(name) = args.image.as_deref() {
        let image = provider.load_image(name).unwrap_or_else(|| {
            log::warn!("Image '{}' missing, using placeholder", name);
            Image::placeholder(PLACEHOLDER_SIZE)
        });
        log::info!("Image '{}': {}x{}", name, image.width, image.height);
    }

    if let Some(name) = args.music.as_deref() {
        let music = provider.load_music(name);
        log::info!(
            "Music '{}' handle (audio available: {})",
            music.requested_name(),
            music.is_supported()
        );
    }

    if let Some(name) = args.sound.as_deref() {
        match provider.load_sound(name) {
            Some(sound) => {
                sound.play();
                if platform.has_audio() {
                    thread::sleep(Duration::from_millis(args.play_ms));
                }
            }
            None => log::warn!("Sound '{}' could not be loaded", name),
        }
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
