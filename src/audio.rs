use anyhow::Result;

/// Best-effort sound output for the roll. Failures are logged and swallowed
/// by the session; absence of sound never blocks or alters the draw.
pub trait AudioCue {
    fn start_roll(&mut self) -> Result<()>;
    fn stop_roll(&mut self) -> Result<()>;
}

/// Fallback for hosts without sound output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioCue for NullAudio {
    fn start_roll(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop_roll(&mut self) -> Result<()> {
        Ok(())
    }
}
