//! Static descriptor tables of the emulated Logitech USB microphone.

use anyhow::Error;

use crate::uac_proto::{Uac1AcHeaderDescriptor, Uac1AsHeaderDescriptor, Uac1OutputTerminalDescriptor, UacEndpointSubtypes, UacFeatureUnitDescriptor, UacFormatTypeIDiscreteDescriptor, UacInputTerminalDescriptor, UacInterfaceSubclass, UacIsoEndpointDescriptor, UAC_INPUT_TERMINAL_MICROPHONE, UAC_TERMINAL_STREAMING};
use crate::usb_proto::{ep_attr_to_u8, DescriptorConfig, DescriptorDevice, DescriptorInterface, EndpointAttrSyncType, EndpointAttrTransferType, EndpointAttrUsageType, UacDescriptorEndpoint, LOGITECH_MIC_PID, LOGITECH_VID};

pub const ENDPOINT_AUDIO_IN: u8 = 0x81;
pub const FULL_DESCRIPTOR_LEN: usize = 178;
pub const SAMPLE_RATES: [u32; 5] = [8000, 11025, 22050, 44100, 48000];

const INPUT_TERMINAL_ID: u8 = 0x01;
const OUTPUT_TERMINAL_ID: u8 = 0x02;
pub const FEATURE_UNIT_ID: u8 = 0x03;

/// Immutable descriptor topology. Only the caller's active interface index
/// selects between the interface / endpoint tables.
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    device: DescriptorDevice,
    configs: Vec<DescriptorConfig>,
    interfaces: Vec<Vec<DescriptorInterface>>,
    endpoints: Vec<Vec<UacDescriptorEndpoint>>,
    full: Vec<u8>,
}

impl DescriptorSet {
    pub fn new() -> Result<DescriptorSet, Error> {
        let configs = vec![config_descriptor()];
        let interfaces = vec![
            vec![
                DescriptorInterface::audio(0, 0, 0, UacInterfaceSubclass::AudioControl),
            ],
            vec![
                DescriptorInterface::audio(1, 0, 0, UacInterfaceSubclass::AudioStreaming),
                DescriptorInterface::audio(1, 1, 1, UacInterfaceSubclass::AudioStreaming),
                DescriptorInterface::audio(1, 2, 1, UacInterfaceSubclass::AudioStreaming),
            ],
        ];
        let endpoints = vec![
            vec![audio_in_endpoint(100)],
            vec![audio_in_endpoint(200)],
        ];
        let full = build_full_descriptor()?;
        if full.len() != FULL_DESCRIPTOR_LEN {
            return Err(anyhow!("Configuration blob is {} bytes, expected {}", full.len(), FULL_DESCRIPTOR_LEN));
        }
        Ok(DescriptorSet { device: device_descriptor(), configs, interfaces, endpoints, full })
    }

    pub fn device(&self) -> DescriptorDevice {
        self.device
    }

    pub fn configs(&self) -> &[DescriptorConfig] {
        &self.configs
    }

    /// Number of interface / endpoint table entries an active index may select.
    pub fn num_interface_sets(&self) -> usize {
        self.interfaces.len()
    }

    pub fn interfaces(&self, active_interface: u8) -> &[DescriptorInterface] {
        self.interfaces.get(active_interface as usize).map(|v| &v[..]).unwrap_or(&[])
    }

    pub fn endpoints(&self, active_interface: u8) -> &[UacDescriptorEndpoint] {
        self.endpoints.get(active_interface as usize).map(|v| &v[..]).unwrap_or(&[])
    }

    /// The merged configuration descriptor returned for GET_DESCRIPTOR.
    pub fn full_descriptor(&self) -> &[u8] {
        &self.full
    }
}

fn device_descriptor() -> DescriptorDevice {
    DescriptorDevice {
        bcd_usb: 0x0110,
        b_device_class: 0x00,
        b_device_sub_class: 0x00,
        b_device_protocol: 0x00,
        b_max_packet_size0: 0x08,
        id_vendor: LOGITECH_VID,
        id_product: LOGITECH_MIC_PID,
        bcd_device: 0x0001,
        i_manufacturer: 0x01,
        i_product: 0x02,
        i_serial_number: 0x00,
        b_num_configurations: 0x01,
    }
}

fn config_descriptor() -> DescriptorConfig {
    // wTotalLength excludes the trailing zero-length terminator
    DescriptorConfig {
        w_total_length: FULL_DESCRIPTOR_LEN as u16 - 1,
        b_num_interfaces: 0x02,
        b_configuration_value: 0x01,
        i_configuration: 0x00,
        bm_attributes: 0x80,
        b_max_power: 0x2d,
    }
}

fn audio_in_endpoint(max_packet_size: u16) -> UacDescriptorEndpoint {
    UacDescriptorEndpoint {
        b_endpoint_address: ENDPOINT_AUDIO_IN,
        bm_attributes: ep_attr_to_u8(EndpointAttrTransferType::Isochronous, EndpointAttrSyncType::Async, EndpointAttrUsageType::Data),
        w_max_packet_size: max_packet_size,
        b_interval: 0x01,
        b_refresh: 0x00,
        b_synch_address: 0x00,
    }
}

fn build_streaming_alt(buffer: &mut Vec<u8>, alt: u8, channels: u8, max_packet_size: u16) -> Result<(), Error> {
    DescriptorInterface::audio(1, alt, 1, UacInterfaceSubclass::AudioStreaming).serialize(&mut *buffer)?;
    Uac1AsHeaderDescriptor { b_terminal_link: OUTPUT_TERMINAL_ID, b_delay: 0x01, w_format_tag: 0x0001 }.serialize(&mut *buffer)?;
    UacFormatTypeIDiscreteDescriptor {
        b_nr_channels: channels,
        b_subframe_size: 0x02,
        b_bit_resolution: 0x10,
        t_sam_freq: SAMPLE_RATES.to_vec(),
    }.serialize(&mut *buffer)?;
    audio_in_endpoint(max_packet_size).serialize(&mut *buffer)?;
    UacIsoEndpointDescriptor {
        b_descriptor_subtype: UacEndpointSubtypes::General as u8,
        bm_attributes: 0x01,
        b_lock_delay_units: 0x00,
        w_lock_delay: 0x0000,
    }.serialize(&mut *buffer)?;
    Ok(())
}

fn build_full_descriptor() -> Result<Vec<u8>, Error> {
    let mut buffer = vec![];
    config_descriptor().serialize(&mut buffer)?;

    // Interface 0, Audio Control
    DescriptorInterface::audio(0, 0, 0, UacInterfaceSubclass::AudioControl).serialize(&mut buffer)?;
    let mut units = vec![];
    UacInputTerminalDescriptor {
        b_terminal_id: INPUT_TERMINAL_ID,
        w_terminal_type: UAC_INPUT_TERMINAL_MICROPHONE,
        b_assoc_terminal: OUTPUT_TERMINAL_ID,
        b_nr_channels: 0x02,
        w_channel_config: 0x0003,
        i_channel_names: 0x00,
        i_terminal: 0x00,
    }.serialize(&mut units)?;
    Uac1OutputTerminalDescriptor {
        b_terminal_id: OUTPUT_TERMINAL_ID,
        w_terminal_type: UAC_TERMINAL_STREAMING,
        b_assoc_terminal: INPUT_TERMINAL_ID,
        b_source_id: FEATURE_UNIT_ID,
        i_terminal: 0x00,
    }.serialize(&mut units)?;
    // master: mute, channels 1 and 2: volume
    UacFeatureUnitDescriptor {
        b_unit_id: FEATURE_UNIT_ID,
        b_source_id: INPUT_TERMINAL_ID,
        b_control_size: 0x01,
        bma_controls: vec![0x01, 0x02, 0x02],
        i_feature: 0x00,
    }.serialize(&mut units)?;
    let mut header = vec![];
    Uac1AcHeaderDescriptor { bcd_adc: 0x0100, w_total_length: 0, b_in_collection: 1, ba_interface_nr: vec![1] }.serialize(&mut header)?;
    let ac_total = (header.len() + units.len()) as u16;
    Uac1AcHeaderDescriptor { bcd_adc: 0x0100, w_total_length: ac_total, b_in_collection: 1, ba_interface_nr: vec![1] }.serialize(&mut buffer)?;
    buffer.extend_from_slice(&units);

    // Interface 1, zero bandwidth
    DescriptorInterface::audio(1, 0, 0, UacInterfaceSubclass::AudioStreaming).serialize(&mut buffer)?;
    build_streaming_alt(&mut buffer, 1, 1, 100)?;
    build_streaming_alt(&mut buffer, 2, 2, 200)?;

    // Terminator
    buffer.push(0);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::logger::setup_logger;

    use super::*;

    fn read_bin_file(filename: &str) -> Vec<u8> {
        let filename = format!("test/fixtures/{}", filename);
        fs::read(&filename).expect("no file found")
    }

    #[test]
    fn test_full_descriptor_matches_fixture() {
        setup_logger();
        let set = DescriptorSet::new().unwrap();
        let expected = read_bin_file("046d_0a03_logitech_mic_config_desc_0.bin");
        assert_eq!(set.full_descriptor(), &expected[..]);
    }

    #[test]
    fn test_full_descriptor_header() {
        let set = DescriptorSet::new().unwrap();
        let full = set.full_descriptor();
        assert_eq!(full.len(), FULL_DESCRIPTOR_LEN);
        assert_eq!(&full[..9], &[0x09, 0x02, 0xb1, 0x00, 0x02, 0x01, 0x00, 0x80, 0x2d]);
        // audio control header declares 0x28 bytes of units
        assert_eq!(&full[18..27], &[0x09, 0x24, 0x01, 0x00, 0x01, 0x28, 0x00, 0x01, 0x01]);
        assert_eq!(full[FULL_DESCRIPTOR_LEN - 1], 0);
    }

    #[test]
    fn test_device_descriptor() {
        let set = DescriptorSet::new().unwrap();
        let mut buf = vec![];
        set.device().serialize(&mut buf).unwrap();
        assert_eq!(buf.len(), 18);
        assert_eq!(set.device().id_vendor, 0x046d);
        assert_eq!(set.device().id_product, 0x0a03);
        assert_eq!(set.configs().len(), 1);
    }

    #[test]
    fn test_interface_tables() {
        let set = DescriptorSet::new().unwrap();
        assert_eq!(set.num_interface_sets(), 2);
        let control = set.interfaces(0);
        assert_eq!(control.len(), 1);
        assert!(control[0].is_audio_control());
        let streaming = set.interfaces(1);
        assert_eq!(streaming.len(), 3);
        assert!(streaming.iter().all(|i| i.is_audio_streaming()));
        assert_eq!(streaming[0].b_num_endpoints, 0);
        assert_eq!(streaming[2].b_alternate_setting, 2);
        assert!(set.interfaces(7).is_empty());
    }

    #[test]
    fn test_endpoint_tables() {
        let set = DescriptorSet::new().unwrap();
        assert_eq!(set.endpoints(0)[0].w_max_packet_size, 100);
        assert_eq!(set.endpoints(1)[0].w_max_packet_size, 200);
        assert!(set.endpoints(1)[0].is_mic());
        assert_eq!(set.endpoints(0)[0].b_endpoint_address, ENDPOINT_AUDIO_IN);
    }
}
