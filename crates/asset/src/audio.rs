//! Sound and music handles on top of rodio.
//!
//! A handle owns its playback: dropping a [`Sound`] stops whatever it is
//! playing. Handles built without an [`AudioOutput`] are inert.

use std::{fmt, io::Cursor, sync::Arc};

use corelib::{ResourceError, ResourceResult};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Owns the output device stream. Must outlive every handle created from it,
/// and stays on the thread that opened it.
pub struct AudioContext {
    _stream: OutputStream,
    output: AudioOutput,
}

impl AudioContext {
    /// Open the default output device.
    pub fn open() -> ResourceResult<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| ResourceError::UnsupportedFeature(format!("audio output: {e}")))?;
        log::info!("Opened default audio output");
        Ok(Self {
            _stream: stream,
            output: AudioOutput { handle },
        })
    }

    pub fn output(&self) -> AudioOutput {
        self.output.clone()
    }
}

impl fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioContext").finish_non_exhaustive()
    }
}

/// Cheap, cloneable handle to an open [`AudioContext`].
#[derive(Clone)]
pub struct AudioOutput {
    handle: OutputStreamHandle,
}

impl AudioOutput {
    fn new_sink(&self) -> Option<Sink> {
        match Sink::try_new(&self.handle) {
            Ok(sink) => Some(sink),
            Err(err) => {
                log::warn!("Failed to create audio sink: {err}");
                None
            }
        }
    }
}

/// Short clip that restarts from the beginning on every [`Sound::play`].
pub struct Sound {
    name: String,
    clip: Arc<[u8]>,
    output: Option<AudioOutput>,
    sink: Mutex<Option<Sink>>,
}

impl Sound {
    /// Wrap encoded clip bytes. Fails if the bytes do not decode.
    pub fn from_clip(
        name: impl Into<String>,
        clip: impl Into<Arc<[u8]>>,
        output: Option<AudioOutput>,
    ) -> ResourceResult<Self> {
        let name = name.into();
        let clip = clip.into();
        Decoder::new(Cursor::new(Arc::clone(&clip)))
            .map_err(|e| ResourceError::corrupt(name.as_str(), e))?;
        Ok(Self {
            name,
            clip,
            output,
            sink: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_supported(&self) -> bool {
        self.output.is_some()
    }

    /// Reset to the start and play. No-op when audio is unsupported.
    pub fn play(&self) {
        let Some(output) = self.output.as_ref() else {
            return;
        };

        let mut current = self.sink.lock();
        if let Err(err) = restart(&mut current, output.new_sink(), &self.clip) {
            log::warn!("Failed to restart sound '{}': {err}", self.name);
        }
    }

    /// `true` while the last [`Sound::play`] is still audible.
    pub fn is_playing(&self) -> bool {
        self.sink.lock().as_ref().is_some_and(|s| !s.empty())
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound")
            .field("name", &self.name)
            .field("clip_bytes", &self.clip.len())
            .field("supported", &self.is_supported())
            .finish()
    }
}

/// Stop whatever `slot` is playing, then start `clip` from the top on `fresh`.
/// The previous playback never overlaps the new one; on failure the slot is
/// left empty.
fn restart(slot: &mut Option<Sink>, fresh: Option<Sink>, clip: &Arc<[u8]>) -> ResourceResult<()> {
    if let Some(old) = slot.take() {
        old.stop();
    }
    let Some(sink) = fresh else {
        return Ok(());
    };
    let source = Decoder::new(Cursor::new(Arc::clone(clip)))
        .map_err(|e| ResourceError::corrupt("sound clip", e))?;
    sink.append(source);
    sink.play();
    *slot = Some(sink);
    Ok(())
}

/// Long-form track bound to the ambient audio context.
///
/// The requested name is kept but not resolved to any resource.
pub struct Music {
    requested_name: String,
    output: Option<AudioOutput>,
}

impl Music {
    pub fn new(requested_name: impl Into<String>, output: Option<AudioOutput>) -> Self {
        Self {
            requested_name: requested_name.into(),
            output,
        }
    }

    pub fn requested_name(&self) -> &str {
        &self.requested_name
    }

    pub fn is_supported(&self) -> bool {
        self.output.is_some()
    }
}

impl fmt::Debug for Music {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Music")
            .field("requested_name", &self.requested_name)
            .field("supported", &self.is_supported())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wav_fixture;

    fn clip() -> Arc<[u8]> {
        wav_fixture(&[0, 100, -100, 0]).into()
    }

    #[test]
    fn restart_fills_empty_slot() {
        let (sink, _queue) = Sink::new_idle();
        let mut slot = None;
        restart(&mut slot, Some(sink), &clip()).unwrap();
        let current = slot.as_ref().expect("sink installed");
        assert_eq!(current.len(), 1);
        assert!(!current.is_paused());
    }

    #[test]
    fn restart_replaces_previous_sink() {
        let (first, _first_queue) = Sink::new_idle();
        let (second, _second_queue) = Sink::new_idle();
        let mut slot = None;
        restart(&mut slot, Some(first), &clip()).unwrap();
        restart(&mut slot, Some(second), &clip()).unwrap();
        // Only the fresh sink is kept, holding exactly one copy of the clip.
        assert_eq!(slot.as_ref().map(Sink::len), Some(1));
    }

    #[test]
    fn restart_without_fresh_sink_only_stops() {
        let (sink, _queue) = Sink::new_idle();
        let mut slot = None;
        restart(&mut slot, Some(sink), &clip()).unwrap();
        restart(&mut slot, None, &clip()).unwrap();
        assert!(slot.is_none());
    }

    #[test]
    fn restart_with_bad_clip_leaves_slot_empty() {
        let (sink, _queue) = Sink::new_idle();
        let bad: Arc<[u8]> = b"not audio".to_vec().into();
        let mut slot = None;
        assert!(restart(&mut slot, Some(sink), &bad).is_err());
        assert!(slot.is_none());
    }

    #[test]
    fn unsupported_sound_play_is_noop() {
        let sound = Sound::from_clip("jump", wav_fixture(&[0, 100, -100, 0]), None).unwrap();
        assert!(!sound.is_supported());
        sound.play();
        sound.play();
        assert!(!sound.is_playing());
        assert_eq!(sound.name(), "jump");
    }

    #[test]
    fn undecodable_clip_is_corrupt() {
        let err = Sound::from_clip("jump", b"RIFF but not really".to_vec(), None).unwrap_err();
        assert!(matches!(err, ResourceError::Corrupt { .. }));
    }

    #[test]
    fn music_keeps_requested_name() {
        let music = Music::new("theme", None);
        assert_eq!(music.requested_name(), "theme");
        assert!(!music.is_supported());
    }
}
