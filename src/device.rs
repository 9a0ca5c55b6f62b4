use std::sync::Arc;

use anyhow::Error;

use crate::audio_control::{AudioControlUnit, ControlOutcome};
use crate::backend::{AudioBackend, NullMicrophone};
use crate::descriptors::DescriptorSet;
use crate::iso_feeder::{IsochronousStreamFeeder, ISO_COMPLETION_DELAY};
use crate::routing::{route, Route};
use crate::sampler::{SamplerState, DEFAULT_SAMPLING_RATE};
use crate::transfer::{BulkMessage, ControlMessage, HostKernel, IntrMessage, IsoMessage, ReturnCode};
use crate::usb_proto::{DescriptorConfig, DescriptorDevice, DescriptorInterface, DeviceIdentity, UacDescriptorEndpoint, LOGITECH_MIC_PID, LOGITECH_VID};

/// Registry key class / subclass the host kernel files the microphone under.
const ID_CLASS: u8 = 0x09;
const ID_SUBCLASS: u8 = 0x01;

/// An emulated USB device as seen by the host kernel's device registry.
pub trait UsbDevice {
    fn id(&self) -> u64;
    fn device_descriptor(&self) -> DescriptorDevice;
    fn configurations(&self) -> Vec<DescriptorConfig>;
    fn interfaces(&self, config: u8) -> Vec<DescriptorInterface>;
    fn endpoints(&self, config: u8, interface: u8, alt: u8) -> Vec<UacDescriptorEndpoint>;
    fn attach(&mut self) -> Result<(), Error>;
    fn attach_and_change_interface(&mut self, interface: u8) -> Result<(), Error>;
    fn cancel_transfer(&mut self, endpoint: u8) -> Result<(), Error>;
    fn change_interface(&mut self, interface: u8) -> Result<(), Error>;
    fn get_number_of_alt_settings(&mut self, interface: u8) -> u8;
    fn set_alt_setting(&mut self, alt_setting: u8) -> Result<(), Error>;
    fn submit_control(&mut self, kernel: &mut dyn HostKernel, cmd: ControlMessage) -> Result<(), Error>;
    fn submit_bulk(&mut self, kernel: &mut dyn HostKernel, cmd: BulkMessage) -> Result<(), Error>;
    fn submit_interrupt(&mut self, kernel: &mut dyn HostKernel, cmd: IntrMessage) -> Result<(), Error>;
    fn submit_iso(&mut self, kernel: &mut dyn HostKernel, cmd: IsoMessage) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterfaceState {
    Detached,
    Attached(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MicConfig {
    /// Rate reported before the host selects one.
    pub sampling_rate: u32,
    /// Time units between an iso submission and its completion.
    pub iso_completion_delay: u64,
}

impl Default for MicConfig {
    fn default() -> MicConfig {
        MicConfig { sampling_rate: DEFAULT_SAMPLING_RATE, iso_completion_delay: ISO_COMPLETION_DELAY }
    }
}

/// Logitech USB microphone (046d:0a03), a UAC 1.0 device with one
/// audio control interface and a 1 or 2 channel streaming interface.
pub struct LogitechMic {
    identity: DeviceIdentity,
    descriptors: DescriptorSet,
    audio: AudioControlUnit,
    feeder: IsochronousStreamFeeder,
    active_interface: u8,
    attached: bool,
}

impl LogitechMic {
    pub fn new() -> Result<LogitechMic, Error> {
        LogitechMic::with_config(MicConfig::default())
    }

    pub fn with_config(config: MicConfig) -> Result<LogitechMic, Error> {
        let sampler = Arc::new(SamplerState::new(config.sampling_rate));
        Ok(LogitechMic {
            identity: DeviceIdentity::new(LOGITECH_VID, LOGITECH_MIC_PID, ID_CLASS, ID_SUBCLASS),
            descriptors: DescriptorSet::new()?,
            audio: AudioControlUnit::new(sampler),
            feeder: IsochronousStreamFeeder::new(config.iso_completion_delay),
            active_interface: 0,
            attached: false,
        })
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// State shared with the audio backend.
    pub fn sampler(&self) -> Arc<SamplerState> {
        self.audio.sampler().clone()
    }

    /// Installs a capture backend; `attach` only creates one if none is set.
    pub fn set_backend(&mut self, backend: Box<dyn AudioBackend>) {
        self.audio.attach_backend(backend);
    }

    pub fn state(&self) -> InterfaceState {
        if self.attached {
            InterfaceState::Attached(self.active_interface)
        } else {
            InterfaceState::Detached
        }
    }

    pub fn active_interface(&self) -> u8 {
        self.active_interface
    }

    fn reply_class(&self, kernel: &mut dyn HostKernel, cmd: ControlMessage, what: &str, outcome: Result<ControlOutcome, Error>) {
        match outcome {
            Ok(ControlOutcome::Transferred(len)) => cmd.reply(kernel, len as i32),
            Ok(ControlOutcome::Unhandled) => {
                error!("[{} {}] {} Failed index={:04x} value={:04x} ret={:?}",
                       self.identity, self.active_interface, what, cmd.index, cmd.value, ReturnCode::Stall);
                cmd.reply(kernel, ReturnCode::Stall as i32);
            }
            Err(e) => {
                error!("[{} {}] {} Failed index={:04x} value={:04x}: {}",
                       self.identity, self.active_interface, what, cmd.index, cmd.value, e);
                cmd.reply(kernel, ReturnCode::Stall as i32);
            }
        }
    }
}

impl UsbDevice for LogitechMic {
    fn id(&self) -> u64 {
        self.identity.key()
    }

    fn device_descriptor(&self) -> DescriptorDevice {
        self.descriptors.device()
    }

    fn configurations(&self) -> Vec<DescriptorConfig> {
        self.descriptors.configs().to_vec()
    }

    // The tables are keyed by the active interface only; `config` and `alt` are not consulted.
    fn interfaces(&self, _config: u8) -> Vec<DescriptorInterface> {
        self.descriptors.interfaces(self.active_interface).to_vec()
    }

    fn endpoints(&self, _config: u8, _interface: u8, _alt: u8) -> Vec<UacDescriptorEndpoint> {
        self.descriptors.endpoints(self.active_interface).to_vec()
    }

    fn attach(&mut self) -> Result<(), Error> {
        if self.attached {
            return Ok(());
        }
        debug!("[{}] Opening device", self.identity);
        if !self.audio.has_backend() {
            let mic = NullMicrophone::new(self.audio.sampler().clone());
            self.audio.attach_backend(Box::new(mic));
        }
        self.attached = true;
        Ok(())
    }

    fn attach_and_change_interface(&mut self, interface: u8) -> Result<(), Error> {
        self.attach()?;
        if interface != self.active_interface {
            self.change_interface(interface)?;
        }
        Ok(())
    }

    fn cancel_transfer(&mut self, endpoint: u8) -> Result<(), Error> {
        info!("[{} {}] Cancelling transfers (endpoint {:#x})", self.identity, self.active_interface, endpoint);
        Ok(())
    }

    fn change_interface(&mut self, interface: u8) -> Result<(), Error> {
        if interface as usize >= self.descriptors.num_interface_sets() {
            return Err(anyhow!("[{} {}] No interface {}", self.identity, self.active_interface, interface));
        }
        debug!("[{} {}] Changing interface to {}", self.identity, self.active_interface, interface);
        self.active_interface = interface;
        Ok(())
    }

    fn get_number_of_alt_settings(&mut self, _interface: u8) -> u8 {
        0
    }

    fn set_alt_setting(&mut self, alt_setting: u8) -> Result<(), Error> {
        debug!("[{} {}] Alternate setting {} acknowledged", self.identity, self.active_interface, alt_setting);
        Ok(())
    }

    fn submit_control(&mut self, kernel: &mut dyn HostKernel, cmd: ControlMessage) -> Result<(), Error> {
        info!("[{} {}] Control: bRequestType={:02x} bRequest={:02x} wValue={:04x} wIndex={:04x} wLength={:04x}",
              self.identity, self.active_interface, cmd.request_type, cmd.request, cmd.value, cmd.index, cmd.length);
        let route = match route(cmd.opcode()) {
            Some(route) => route,
            None => {
                warn!("[{} {}] Unknown command {:04x} ({:?} {:?} {:?})",
                      self.identity, self.active_interface, cmd.opcode(), cmd.direction(), cmd.xfer_type(), cmd.recipient());
                cmd.reply(kernel, ReturnCode::Stall as i32);
                return Ok(());
            }
        };

        match route {
            Route::GetDescriptor => {
                info!("[{} {}] REQUEST_GET_DESCRIPTOR index={:04x} value={:04x}", self.identity, self.active_interface, cmd.index, cmd.value);
                let full = self.descriptors.full_descriptor();
                let len = full.len().min(cmd.length as usize);
                match cmd.fill_buffer(kernel, &full[..len]) {
                    Ok(()) => cmd.reply(kernel, ReturnCode::Success as i32),
                    Err(e) => {
                        error!("[{} {}] REQUEST_GET_DESCRIPTOR failed: {}", self.identity, self.active_interface, e);
                        cmd.reply(kernel, ReturnCode::Stall as i32);
                    }
                }
            }
            Route::SetInterface => {
                info!("[{} {}] REQUEST_SET_INTERFACE index={:04x} value={:04x}", self.identity, self.active_interface, cmd.index, cmd.value);
                let interface = cmd.index as u8;
                if interface != self.active_interface {
                    if let Err(e) = self.change_interface(interface) {
                        error!("[{} {}] Failed to change interface to {}", self.identity, self.active_interface, cmd.index);
                        cmd.reply(kernel, ReturnCode::Stall as i32);
                        return Err(e);
                    }
                }
                match self.set_alt_setting(cmd.value as u8) {
                    Ok(()) => {
                        let len = cmd.length as i32;
                        cmd.reply(kernel, len);
                    }
                    Err(e) => {
                        cmd.reply(kernel, ReturnCode::Stall as i32);
                        return Err(e);
                    }
                }
            }
            Route::GetAudioControl => {
                info!("[{} {}] Get Control index={:04x} value={:04x}", self.identity, self.active_interface, cmd.index, cmd.value);
                let outcome = self.audio.get_audio_control(kernel.memory(), &cmd);
                self.reply_class(kernel, cmd, "Get Control", outcome);
            }
            Route::SetAudioControl => {
                info!("[{} {}] Set Control index={:04x} value={:04x}", self.identity, self.active_interface, cmd.index, cmd.value);
                let outcome = self.audio.set_audio_control(kernel.memory(), &cmd);
                self.reply_class(kernel, cmd, "Set Control", outcome);
            }
            Route::EndpointAudioControl => {
                info!("[{} {}] REC_ENDPOINT index={:04x} value={:04x}", self.identity, self.active_interface, cmd.index, cmd.value);
                let outcome = self.audio.endpoint_audio_control(kernel.memory(), &cmd);
                self.reply_class(kernel, cmd, "Endpoint Control", outcome);
            }
        }
        Ok(())
    }

    fn submit_bulk(&mut self, kernel: &mut dyn HostKernel, cmd: BulkMessage) -> Result<(), Error> {
        kernel.enqueue_ipc_reply(cmd.ios_request, ReturnCode::Success as i32);
        Ok(())
    }

    fn submit_interrupt(&mut self, kernel: &mut dyn HostKernel, cmd: IntrMessage) -> Result<(), Error> {
        kernel.enqueue_ipc_reply(cmd.ios_request, ReturnCode::Success as i32);
        Ok(())
    }

    fn submit_iso(&mut self, kernel: &mut dyn HostKernel, cmd: IsoMessage) -> Result<(), Error> {
        self.feeder.submit(kernel, self.audio.backend_mut(), cmd)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::descriptors::{ENDPOINT_AUDIO_IN, FULL_DESCRIPTOR_LEN};
    use crate::logger::setup_logger;
    use crate::memory::{GuestMemory, InvalidRange};
    use crate::transfer::test_kernel::{RecordingKernel, RAM_BASE};
    use crate::uac_proto::UacVolume;

    use super::*;

    fn setup() -> (LogitechMic, RecordingKernel) {
        setup_logger();
        let mut mic = LogitechMic::new().unwrap();
        mic.attach().unwrap();
        (mic, RecordingKernel::new())
    }

    fn ctrl(request_type: u8, request: u8, value: u16, index: u16, length: u16) -> ControlMessage {
        ControlMessage { request_type, request, value, index, length, data_address: RAM_BASE, ios_request: 0x55 }
    }

    fn snapshot(mic: &LogitechMic) -> (u8, bool, u8, u8, u32) {
        let s = mic.sampler();
        (mic.active_interface(), s.mute(), s.volume(0), s.volume(1), s.sampling_rate(0))
    }

    struct SharedBackend {
        rates: Arc<Mutex<Vec<u32>>>,
    }

    impl AudioBackend for SharedBackend {
        fn set_sampling_rate(&mut self, rate: u32) {
            self.rates.lock().unwrap().push(rate);
        }
    }

    #[test]
    fn test_identity() {
        let mic = LogitechMic::new().unwrap();
        assert_eq!(mic.id(), 0x046d_0a03_0901);
        assert_eq!(mic.device_descriptor().id_product, 0x0a03);
        assert_eq!(mic.configurations().len(), 1);
        assert_eq!(mic.configurations()[0].w_total_length, 0x00b1);
    }

    #[test]
    fn test_attach_lifecycle() {
        setup_logger();
        let mut mic = LogitechMic::new().unwrap();
        assert_eq!(mic.state(), InterfaceState::Detached);
        mic.attach().unwrap();
        assert_eq!(mic.state(), InterfaceState::Attached(0));
        mic.attach().unwrap();
        assert_eq!(mic.state(), InterfaceState::Attached(0));
        mic.attach_and_change_interface(1).unwrap();
        assert_eq!(mic.state(), InterfaceState::Attached(1));
        mic.attach_and_change_interface(1).unwrap();
        assert_eq!(mic.state(), InterfaceState::Attached(1));
        assert!(mic.attach_and_change_interface(4).is_err());
        assert_eq!(mic.state(), InterfaceState::Attached(1));
    }

    #[test]
    fn test_attach_keeps_installed_backend() {
        let mut mic = LogitechMic::new().unwrap();
        let rates = Arc::new(Mutex::new(vec![]));
        mic.set_backend(Box::new(SharedBackend { rates: rates.clone() }));
        mic.attach().unwrap();
        let mut kernel = RecordingKernel::new();
        kernel.ram.write_bytes(RAM_BASE, &[0x22, 0x56, 0x00]).unwrap();
        mic.submit_control(&mut kernel, ctrl(0x22, 0x01, 0x0100, 0x0081, 3)).unwrap();
        assert_eq!(kernel.only_reply(), 0);
        assert_eq!(*rates.lock().unwrap(), vec![22050]);
    }

    #[test]
    fn test_descriptor_tables_follow_active_interface() {
        let (mut mic, _) = setup();
        assert_eq!(mic.interfaces(0).len(), 1);
        assert_eq!(mic.endpoints(0, 0, 0)[0].w_max_packet_size, 100);
        mic.change_interface(1).unwrap();
        // config and alt arguments are not consulted
        assert_eq!(mic.interfaces(0).len(), 3);
        assert_eq!(mic.interfaces(9).len(), 3);
        assert_eq!(mic.endpoints(0, 0, 1)[0].w_max_packet_size, 200);
        assert_eq!(mic.endpoints(3, 1, 7)[0].w_max_packet_size, 200);
    }

    #[test]
    fn test_placeholders() {
        let (mut mic, _) = setup();
        assert!(mic.cancel_transfer(ENDPOINT_AUDIO_IN).is_ok());
        assert!(mic.set_alt_setting(2).is_ok());
        assert_eq!(mic.get_number_of_alt_settings(1), 0);
        assert_eq!(mic.state(), InterfaceState::Attached(0));
    }

    #[test]
    fn test_get_descriptor_lengths() {
        let (mut mic, mut kernel) = setup();
        let full = DescriptorSet::new().unwrap().full_descriptor().to_vec();
        for (requested, copied) in [(9usize, 9usize), (178, 178), (200, 178)] {
            kernel.ram.write_bytes(RAM_BASE, &[0xee; 256]).unwrap();
            kernel.replies.clear();
            mic.submit_control(&mut kernel, ctrl(0x80, 0x06, 0x0200, 0, requested as u16)).unwrap();
            assert_eq!(kernel.only_reply(), ReturnCode::Success as i32);
            let data = kernel.read(RAM_BASE, 256);
            assert_eq!(&data[..copied], &full[..copied]);
            assert!(data[copied..].iter().all(|b| *b == 0xee));
        }
        assert_eq!(full.len(), FULL_DESCRIPTOR_LEN);
    }

    #[test]
    fn test_set_interface() {
        let (mut mic, mut kernel) = setup();
        mic.submit_control(&mut kernel, ctrl(0x01, 0x0b, 0x0001, 0x0001, 0)).unwrap();
        assert_eq!(kernel.only_reply(), 0);
        assert_eq!(mic.active_interface(), 1);
        assert_eq!(mic.interfaces(0).len(), 3);
    }

    #[test]
    fn test_set_interface_replies_requested_length() {
        let (mut mic, mut kernel) = setup();
        mic.submit_control(&mut kernel, ctrl(0x01, 0x0b, 0x0002, 0x0001, 4)).unwrap();
        assert_eq!(kernel.only_reply(), 4);
    }

    #[test]
    fn test_set_same_interface_is_noop() {
        let (mut mic, mut kernel) = setup();
        mic.change_interface(1).unwrap();
        let before = snapshot(&mic);
        mic.submit_control(&mut kernel, ctrl(0x01, 0x0b, 0x0000, 0x0001, 0)).unwrap();
        assert_eq!(kernel.only_reply(), 0);
        assert_eq!(snapshot(&mic), before);
        assert!(mic.change_interface(1).is_ok());
        assert_eq!(snapshot(&mic), before);
    }

    #[test]
    fn test_set_missing_interface_stalls_once() {
        let (mut mic, mut kernel) = setup();
        let res = mic.submit_control(&mut kernel, ctrl(0x01, 0x0b, 0x0000, 0x0005, 0));
        assert!(res.is_err());
        assert_eq!(kernel.only_reply(), ReturnCode::Stall as i32);
        assert_eq!(mic.active_interface(), 0);
    }

    #[test]
    fn test_unknown_opcodes_stall_without_mutation() {
        let (mut mic, mut kernel) = setup();
        let before = snapshot(&mic);
        let requests = [
            ctrl(0x80, 0x00, 0x0000, 0x0000, 2), // GET_STATUS
            ctrl(0x00, 0x09, 0x0001, 0x0000, 0), // SET_CONFIGURATION
            ctrl(0x40, 0x01, 0x0100, 0x0300, 1), // vendor
            ctrl(0x21, 0x81, 0x0100, 0x0300, 1), // GET_CUR sent host-to-device
            ctrl(0x81, 0x06, 0x2200, 0x0000, 64), // HID report descriptor
        ];
        for (i, cmd) in requests.into_iter().enumerate() {
            mic.submit_control(&mut kernel, cmd).unwrap();
            assert_eq!(kernel.replies.len(), i + 1);
            assert_eq!(kernel.replies[i], (0x55, ReturnCode::Stall as i32));
        }
        assert_eq!(snapshot(&mic), before);
    }

    #[test]
    fn test_mute_through_dispatcher() {
        let (mut mic, mut kernel) = setup();
        kernel.ram.write_u8(1, RAM_BASE).unwrap();
        mic.submit_control(&mut kernel, ctrl(0x21, 0x01, 0x0100, 0x0300, 1)).unwrap();
        assert!(mic.sampler().mute());
        kernel.ram.write_u8(0, RAM_BASE).unwrap();
        mic.submit_control(&mut kernel, ctrl(0xa1, 0x81, 0x0100, 0x0300, 1)).unwrap();
        assert_eq!(kernel.replies, vec![(0x55, 0), (0x55, 1)]);
        assert_eq!(kernel.read(RAM_BASE, 1), vec![1]);
    }

    #[test]
    fn test_volume_through_dispatcher() {
        let (mut mic, mut kernel) = setup();
        // SET_CUR with the device-to-host request type is accepted too
        kernel.ram.write_u16_le(UacVolume::MAX, RAM_BASE).unwrap();
        mic.submit_control(&mut kernel, ctrl(0xa1, 0x01, 0x0200, 0x0300, 2)).unwrap();
        assert_eq!(mic.sampler().volume(0), 255);
        assert_eq!(mic.sampler().volume(1), 255);
        mic.submit_control(&mut kernel, ctrl(0xa1, 0x84, 0x0201, 0x0300, 2)).unwrap();
        assert_eq!(kernel.replies, vec![(0x55, 0), (0x55, 2)]);
        assert_eq!(kernel.read(RAM_BASE, 2), vec![0x88, 0x00]);
    }

    #[test]
    fn test_unhandled_class_request_stalls() {
        let (mut mic, mut kernel) = setup();
        let before = snapshot(&mic);
        // volume on channel 3
        kernel.ram.write_u16_le(0x0000, RAM_BASE).unwrap();
        mic.submit_control(&mut kernel, ctrl(0x21, 0x01, 0x0204, 0x0300, 2)).unwrap();
        // SET_MIN of volume
        mic.submit_control(&mut kernel, ctrl(0x21, 0x02, 0x0201, 0x0300, 2)).unwrap();
        assert_eq!(kernel.replies, vec![(0x55, ReturnCode::Stall as i32), (0x55, ReturnCode::Stall as i32)]);
        assert_eq!(snapshot(&mic), before);
    }

    #[test]
    fn test_bad_payload_address_stalls() {
        let (mut mic, mut kernel) = setup();
        let mut cmd = ctrl(0xa1, 0x81, 0x0100, 0x0300, 1);
        cmd.data_address = 0x4;
        mic.submit_control(&mut kernel, cmd).unwrap();
        assert_eq!(kernel.only_reply(), ReturnCode::Stall as i32);
    }

    #[test]
    fn test_sampling_rate_through_dispatcher() {
        let (mut mic, mut kernel) = setup();
        for sr in [8000u32, 11025, 22050, 44100, 48000] {
            kernel.replies.clear();
            kernel.ram.write_bytes(RAM_BASE, &sr.to_le_bytes()[..3]).unwrap();
            mic.submit_control(&mut kernel, ctrl(0x22, 0x01, 0x0100, 0x0081, 3)).unwrap();
            kernel.ram.write_bytes(RAM_BASE, &[0, 0, 0]).unwrap();
            mic.submit_control(&mut kernel, ctrl(0xa2, 0x81, 0x0100, 0x0081, 3)).unwrap();
            assert_eq!(kernel.replies, vec![(0x55, 0), (0x55, 3)]);
            assert_eq!(kernel.read(RAM_BASE, 3), sr.to_le_bytes()[..3].to_vec());
        }
    }

    #[test]
    fn test_bulk_and_interrupt_succeed() {
        let (mut mic, mut kernel) = setup();
        mic.submit_bulk(&mut kernel, BulkMessage { endpoint: 0x02, length: 8, data_address: RAM_BASE, ios_request: 1 }).unwrap();
        mic.submit_interrupt(&mut kernel, IntrMessage { endpoint: 0x83, length: 8, data_address: RAM_BASE, ios_request: 2 }).unwrap();
        assert_eq!(kernel.replies, vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn test_iso_through_device() {
        let (mut mic, mut kernel) = setup();
        let msg = IsoMessage::new(ENDPOINT_AUDIO_IN, vec![200, 200], RAM_BASE, 3);
        mic.submit_iso(&mut kernel, msg).unwrap();
        assert_eq!(kernel.completions.len(), 1);
        assert_eq!(kernel.completions[0].0.packet_results, vec![0, 0]);
        assert_eq!(kernel.completions[0].2, ISO_COMPLETION_DELAY);
        let data = kernel.read(RAM_BASE, 400);
        assert_eq!(data[150], 0xff);
        assert_eq!(data[250], 0x00);
    }

    #[test]
    fn test_iso_invalid_range() {
        let (mut mic, mut kernel) = setup();
        let msg = IsoMessage::new(ENDPOINT_AUDIO_IN, vec![100], RAM_BASE + 0x0fff, 3);
        let err = mic.submit_iso(&mut kernel, msg).unwrap_err();
        assert_eq!(ReturnCode::from_error(&err), ReturnCode::InvalidArgument);
        assert!(err.downcast_ref::<InvalidRange>().is_some());
        assert!(kernel.completions.is_empty());
    }

    #[test]
    fn test_configured_completion_delay() {
        setup_logger();
        let mut mic = LogitechMic::with_config(MicConfig { sampling_rate: 44100, iso_completion_delay: 250 }).unwrap();
        mic.attach().unwrap();
        assert_eq!(mic.sampler().sampling_rate(0), 44100);
        let mut kernel = RecordingKernel::new();
        mic.submit_iso(&mut kernel, IsoMessage::new(ENDPOINT_AUDIO_IN, vec![10], RAM_BASE, 1)).unwrap();
        assert_eq!(kernel.completions[0].2, 250);
    }
}
