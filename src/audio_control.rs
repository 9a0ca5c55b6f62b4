use std::sync::Arc;

use anyhow::Error;

use crate::backend::AudioBackend;
use crate::descriptors::{ENDPOINT_AUDIO_IN, FEATURE_UNIT_ID};
use crate::memory::GuestMemory;
use crate::routing::aid;
use crate::sampler::SamplerState;
use crate::transfer::ControlMessage;
use crate::uac_proto::{read_u24_le, EndpointControlSelectors, FeatureUnitControlSelectors, UacRequestCodes, UacVolume};

/// Result of a class request handler. `Unhandled` becomes a STALL reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlOutcome {
    Transferred(u32),
    Unhandled,
}

pub const MASTER_CHANNEL: u8 = 0xff;

const FU_INDEX: u16 = (FEATURE_UNIT_ID as u16) << 8;
const EP_INDEX: u16 = ENDPOINT_AUDIO_IN as u16;

const MUTE: u8 = FeatureUnitControlSelectors::UacFuMute as u8;
const VOLUME: u8 = FeatureUnitControlSelectors::UacFuVolume as u8;
const AUTOMATIC_GAIN: u8 = FeatureUnitControlSelectors::UacFuAutomaticGain as u8;
const SAMPLING_FREQ: u8 = EndpointControlSelectors::UacEpSamplingFreq as u8;

const GET_CUR: u8 = UacRequestCodes::GetCur as u8;
const GET_MIN: u8 = UacRequestCodes::GetMin as u8;
const GET_MAX: u8 = UacRequestCodes::GetMax as u8;
const GET_RES: u8 = UacRequestCodes::GetRes as u8;
const SET_CUR: u8 = UacRequestCodes::SetCur as u8;

const AID_GET_MUTE: u32 = aid(MUTE, GET_CUR, FU_INDEX);
const AID_SET_MUTE: u32 = aid(MUTE, SET_CUR, FU_INDEX);
const AID_GET_VOLUME: u32 = aid(VOLUME, GET_CUR, FU_INDEX);
const AID_GET_VOLUME_MIN: u32 = aid(VOLUME, GET_MIN, FU_INDEX);
const AID_GET_VOLUME_MAX: u32 = aid(VOLUME, GET_MAX, FU_INDEX);
const AID_GET_VOLUME_RES: u32 = aid(VOLUME, GET_RES, FU_INDEX);
const AID_SET_VOLUME: u32 = aid(VOLUME, SET_CUR, FU_INDEX);
const AID_SET_AUTOMATIC_GAIN: u32 = aid(AUTOMATIC_GAIN, SET_CUR, FU_INDEX);
const AID_GET_SAMPLING_FREQ: u32 = aid(SAMPLING_FREQ, GET_CUR, EP_INDEX);
const AID_SET_SAMPLING_FREQ: u32 = aid(SAMPLING_FREQ, SET_CUR, EP_INDEX);

/// Volume applies to channels 0 and 1, or to both through the master channel.
fn is_volume_channel(cn: u8) -> bool {
    cn < 2 || cn == MASTER_CHANNEL
}

/// Feature unit and endpoint controls backed by the shared sampler state.
pub struct AudioControlUnit {
    sampler: Arc<SamplerState>,
    backend: Option<Box<dyn AudioBackend>>,
}

impl AudioControlUnit {
    pub fn new(sampler: Arc<SamplerState>) -> AudioControlUnit {
        AudioControlUnit { sampler, backend: None }
    }

    pub fn sampler(&self) -> &Arc<SamplerState> {
        &self.sampler
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn attach_backend(&mut self, backend: Box<dyn AudioBackend>) {
        self.backend = Some(backend);
    }

    pub fn backend_mut(&mut self) -> Option<&mut (dyn AudioBackend + 'static)> {
        self.backend.as_deref_mut()
    }

    pub fn get_audio_control(&self, memory: &mut dyn GuestMemory, cmd: &ControlMessage) -> Result<ControlOutcome, Error> {
        let cs = cmd.control_selector();
        let cn = cmd.channel_number();
        let id = aid(cs, cmd.request, cmd.index);
        info!("GetAudioControl: bCs={:02x} bCn={:02x} bRequestType={:02x} bRequest={:02x} bIndex={:02x} aid={:08x}",
              cs, cn, cmd.request_type, cmd.request, cmd.index, id);
        let outcome = match id {
            AID_GET_MUTE => {
                memory.write_u8(self.sampler.mute() as u8, cmd.data_address)?;
                ControlOutcome::Transferred(1)
            }
            AID_GET_VOLUME if is_volume_channel(cn) => {
                let channel = if cn == 1 { 1 } else { 0 };
                let vol = UacVolume::from_linear(self.sampler.volume(channel));
                memory.write_u16_le(vol, cmd.data_address)?;
                ControlOutcome::Transferred(2)
            }
            AID_GET_VOLUME_MIN if is_volume_channel(cn) => {
                memory.write_u16_le(UacVolume::MIN, cmd.data_address)?;
                ControlOutcome::Transferred(2)
            }
            AID_GET_VOLUME_MAX if is_volume_channel(cn) => {
                memory.write_u16_le(UacVolume::MAX, cmd.data_address)?;
                ControlOutcome::Transferred(2)
            }
            AID_GET_VOLUME_RES if is_volume_channel(cn) => {
                memory.write_u16_le(UacVolume::RES, cmd.data_address)?;
                ControlOutcome::Transferred(2)
            }
            _ => ControlOutcome::Unhandled,
        };
        Ok(outcome)
    }

    pub fn set_audio_control(&mut self, memory: &mut dyn GuestMemory, cmd: &ControlMessage) -> Result<ControlOutcome, Error> {
        let cs = cmd.control_selector();
        let cn = cmd.channel_number();
        let id = aid(cs, cmd.request, cmd.index);
        info!("SetAudioControl: bCs={:02x} bCn={:02x} bRequestType={:02x} bRequest={:02x} bIndex={:02x} aid={:08x}",
              cs, cn, cmd.request_type, cmd.request, cmd.index, id);
        let outcome = match id {
            AID_SET_MUTE => {
                let mute = memory.read_u8(cmd.data_address)? & 0x01 != 0;
                self.sampler.set_mute(mute);
                ControlOutcome::Transferred(0)
            }
            AID_SET_VOLUME if is_volume_channel(cn) => {
                let device = memory.read_u16_le(cmd.data_address)?;
                let vol = UacVolume::to_linear(device);
                let changed = if cn == MASTER_CHANNEL {
                    let left = self.sampler.set_volume(0, vol);
                    let right = self.sampler.set_volume(1, vol);
                    left || right
                } else {
                    self.sampler.set_volume(cn as usize, vol)
                };
                if changed {
                    info!("SetAudioControl: channel {:02x} volume {} ({:.2} dB)", cn, vol, UacVolume::to_db(device));
                }
                ControlOutcome::Transferred(0)
            }
            AID_SET_AUTOMATIC_GAIN => ControlOutcome::Transferred(0),
            _ => ControlOutcome::Unhandled,
        };
        Ok(outcome)
    }

    pub fn endpoint_audio_control(&mut self, memory: &mut dyn GuestMemory, cmd: &ControlMessage) -> Result<ControlOutcome, Error> {
        let cs = cmd.control_selector();
        let cn = cmd.channel_number();
        let id = aid(cs, cmd.request, cmd.index);
        info!("EndpointAudioControl: bCs={:02x} bCn={:02x} bRequestType={:02x} bRequest={:02x} bIndex={:02x} aid={:08x}",
              cs, cn, cmd.request_type, cmd.request, cmd.index, id);
        let outcome = match id {
            AID_SET_SAMPLING_FREQ => {
                if cn == MASTER_CHANNEL {
                    let mut bytes = [0u8; 3];
                    memory.read_bytes(cmd.data_address, &mut bytes)?;
                    let sr = read_u24_le(bytes);
                    if self.sampler.set_sampling_rate(0, sr) {
                        if let Some(backend) = self.backend.as_mut() {
                            info!("EndpointAudioControl: Setting sampling rate to {}, [0] {:02x} [1] {:02x} [2] {:02x}",
                                  sr, bytes[0], bytes[1], bytes[2]);
                            backend.set_sampling_rate(sr);
                        }
                    }
                } else if cn < 2 {
                    // TODO: apply per-channel rates once the backend can capture channels independently
                    warn!("EndpointAudioControl: per-channel sampling rate for channel {} is not supported", cn);
                }
                ControlOutcome::Transferred(0)
            }
            AID_GET_SAMPLING_FREQ => {
                let sr = self.sampler.sampling_rate(0);
                memory.write_bytes(cmd.data_address, &sr.to_le_bytes()[..3])?;
                ControlOutcome::Transferred(3)
            }
            _ => ControlOutcome::Unhandled,
        };
        Ok(outcome)
    }
}
