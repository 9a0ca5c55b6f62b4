use std::sync::Arc;

use crate::sampler::SamplerState;

/// Audio capture backend driven by the microphone. Implementations read mute
/// and volume from the shared `SamplerState` on their own callback thread.
pub trait AudioBackend: Send {
    /// Called from the control path when the host selects a new master rate.
    fn set_sampling_rate(&mut self, rate: u32);

    /// Copies up to `buffer.len()` captured bytes into `buffer`, returning the count.
    fn read_into(&mut self, _buffer: &mut [u8]) -> usize {
        0
    }
}

/// Backend used until real capture is wired in: tracks the requested rate and
/// never produces samples.
#[derive(Debug)]
pub struct NullMicrophone {
    sampler: Arc<SamplerState>,
    sampling_rate: u32,
}

impl NullMicrophone {
    pub fn new(sampler: Arc<SamplerState>) -> NullMicrophone {
        let sampling_rate = sampler.sampling_rate(0);
        NullMicrophone { sampler, sampling_rate }
    }

    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }
}

impl AudioBackend for NullMicrophone {
    fn set_sampling_rate(&mut self, rate: u32) {
        debug!("NullMicrophone: sampling rate {} -> {} (muted={})", self.sampling_rate, rate, self.sampler.mute());
        self.sampling_rate = rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_microphone_tracks_rate() {
        let sampler = Arc::new(SamplerState::new(22050));
        let mut mic = NullMicrophone::new(sampler);
        assert_eq!(mic.sampling_rate(), 22050);
        mic.set_sampling_rate(8000);
        assert_eq!(mic.sampling_rate(), 8000);
        let mut buf = [0u8; 4];
        assert_eq!(mic.read_into(&mut buf), 0);
    }
}
