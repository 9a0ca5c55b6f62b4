use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8, Ordering};

pub const DEFAULT_SAMPLING_RATE: u32 = 48000;
pub const NUM_CHANNELS: usize = 2;

/// Microphone state shared between the control path and the audio backend's
/// callback context. Every field is its own atomic word; there is no
/// consistency guarantee across fields.
#[derive(Debug)]
pub struct SamplerState {
    sample_on: AtomicBool,
    mute: AtomicBool,
    vol: [AtomicU8; NUM_CHANNELS],
    srate: [AtomicU32; NUM_CHANNELS],
    freq: AtomicI32,
    gain: AtomicI32,
    ec_reset: AtomicBool,
    sp_on: AtomicBool,
}

impl SamplerState {
    pub fn new(sampling_rate: u32) -> SamplerState {
        SamplerState {
            sample_on: AtomicBool::new(false),
            mute: AtomicBool::new(false),
            vol: [AtomicU8::new(0), AtomicU8::new(0)],
            srate: [AtomicU32::new(sampling_rate), AtomicU32::new(sampling_rate)],
            freq: AtomicI32::new(0),
            gain: AtomicI32::new(0),
            ec_reset: AtomicBool::new(false),
            sp_on: AtomicBool::new(false),
        }
    }

    pub fn sample_on(&self) -> bool {
        self.sample_on.load(Ordering::Acquire)
    }

    pub fn set_sample_on(&self, on: bool) {
        self.sample_on.store(on, Ordering::Release);
    }

    pub fn mute(&self) -> bool {
        self.mute.load(Ordering::Acquire)
    }

    pub fn set_mute(&self, mute: bool) {
        self.mute.store(mute, Ordering::Release);
    }

    /// Linear 0-255 volume of `channel`. Out of range channels read as 0.
    pub fn volume(&self, channel: usize) -> u8 {
        self.vol.get(channel).map(|v| v.load(Ordering::Relaxed)).unwrap_or(0)
    }

    /// Stores `volume` for `channel`, returning true if the stored value changed.
    pub fn set_volume(&self, channel: usize, volume: u8) -> bool {
        match self.vol.get(channel) {
            Some(v) => v.swap(volume, Ordering::Relaxed) != volume,
            None => false,
        }
    }

    pub fn sampling_rate(&self, channel: usize) -> u32 {
        self.srate.get(channel).map(|v| v.load(Ordering::Relaxed)).unwrap_or(0)
    }

    /// Stores a 24-bit rate for `channel`, returning true if the stored value changed.
    pub fn set_sampling_rate(&self, channel: usize, rate: u32) -> bool {
        let rate = rate & 0x00ff_ffff;
        match self.srate.get(channel) {
            Some(v) => v.swap(rate, Ordering::Relaxed) != rate,
            None => false,
        }
    }

    pub fn freq(&self) -> i32 {
        self.freq.load(Ordering::Relaxed)
    }

    pub fn set_freq(&self, freq: i32) {
        self.freq.store(freq, Ordering::Relaxed);
    }

    pub fn gain(&self) -> i32 {
        self.gain.load(Ordering::Relaxed)
    }

    pub fn set_gain(&self, gain: i32) {
        self.gain.store(gain, Ordering::Relaxed);
    }

    pub fn ec_reset(&self) -> bool {
        self.ec_reset.load(Ordering::Relaxed)
    }

    pub fn set_ec_reset(&self, reset: bool) {
        self.ec_reset.store(reset, Ordering::Relaxed);
    }

    pub fn sp_on(&self) -> bool {
        self.sp_on.load(Ordering::Relaxed)
    }

    pub fn set_sp_on(&self, on: bool) {
        self.sp_on.store(on, Ordering::Relaxed);
    }
}

impl Default for SamplerState {
    fn default() -> SamplerState {
        SamplerState::new(DEFAULT_SAMPLING_RATE)
    }
}
