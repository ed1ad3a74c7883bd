use escape_maze_core::{AudioCue, BackgroundCue};

/// Fire-and-forget audio playback.
pub trait AudioSink {
    /// Plays a one-shot effect.
    fn play(&mut self, cue: AudioCue);

    /// Starts a background loop, replacing the current one.
    fn play_looping(&mut self, cue: BackgroundCue);

    /// Stops the background loop.
    fn stop(&mut self);
}

/// Sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: AudioCue) {}

    fn play_looping(&mut self, _cue: BackgroundCue) {}

    fn stop(&mut self) {}
}
