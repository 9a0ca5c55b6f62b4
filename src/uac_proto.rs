use std::io::Write;

use anyhow::Error;
use structure::byteorder::WriteBytesExt;

use crate::usb_proto::UsbDescriptorTypes;

// UAC
// https://www.usb.org/sites/default/files/audio10.pdf
// https://github.com/torvalds/linux/blob/master/include/uapi/linux/usb/audio.h

// A.10.2 Feature Unit Control Selectors
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum FeatureUnitControlSelectors {
    UacFuMute = 0x01,
    UacFuVolume = 0x02,
    UacFuBass = 0x03,
    UacFuMid = 0x04,
    UacFuTreble = 0x05,
    UacFuGraphicEqualizer = 0x06,
    UacFuAutomaticGain = 0x07,
    UacFuDelay = 0x08,
    UacFuBassBoost = 0x09,
    UacFuLoudness = 0x0a,
}

// A.10.5 Endpoint Control Selectors
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum EndpointControlSelectors {
    UacEpSamplingFreq = 0x01,
    UacEpPitch = 0x02,
}

// A.9 Audio Class-Specific Request Codes
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum UacRequestCodes {
    Undefined = 0x00,
    SetCur = 0x01,
    SetMin = 0x02,
    SetMax = 0x03,
    SetRes = 0x04,
    SetMem = 0x05,
    GetCur = 0x81,
    GetMin = 0x82,
    GetMax = 0x83,
    GetRes = 0x84,
    GetMem = 0x85,
    GetStat = 0xff,
}

#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum UacInterfaceSubclass {
    AudioControl = 0x01,
    AudioStreaming = 0x02,
    MidiStreaming = 0x03,
}

#[derive(FromPrimitive)]
#[repr(u8)]
pub enum UacDescriptorSubtypes {
    Header = 0x01,
    InputTerminal = 0x02,
    OutputTerminal = 0x03,
    MixerUnit = 0x04,
    SelectorUnit = 0x05,
    FeatureUnit = 0x06,
    ProcessingUnit = 0x07,
    ExtensionUnit = 0x08,
}

#[derive(FromPrimitive)]
#[repr(u8)]
pub enum UacInterfaceSubtypes {
    General = 0x01,
    FormatType = 0x02,
    FormatSpecific = 0x03,
}

#[derive(FromPrimitive)]
#[repr(u8)]
pub enum UacEndpointSubtypes {
    General = 0x01,
}

#[derive(FromPrimitive)]
#[repr(u8)]
pub enum UacFormatTypeI {
    Undefined = 0x0,
    Pcm = 0x1,
    Pcm8 = 0x2,
    IeeeFloat = 0x3,
    Alaw = 0x4,
    Mulaw = 0x5,
}

// Terminal types, see "Universal Serial Bus Device Class Definition for Terminal Types"
pub const UAC_TERMINAL_STREAMING: u16 = 0x0101;
pub const UAC_INPUT_TERMINAL_MICROPHONE: u16 = 0x0201;

#[derive(Debug, Clone)]
pub struct Uac1AcHeaderDescriptor {
    pub bcd_adc: u16,
    pub w_total_length: u16,
    pub b_in_collection: u8,
    pub ba_interface_nr: Vec<u8>,
}

impl Uac1AcHeaderDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBHHB");
        let sz = format.size() as u8 + self.ba_interface_nr.len() as u8;
        format.pack_into(
            &mut buffer, sz, UsbDescriptorTypes::CsInterface as u8, UacDescriptorSubtypes::Header as u8,
            self.bcd_adc, self.w_total_length, self.b_in_collection
        )?;
        buffer.write_all(&self.ba_interface_nr)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Uac1OutputTerminalDescriptor {
    pub b_terminal_id: u8,
    pub w_terminal_type: u16,
    pub b_assoc_terminal: u8,
    pub b_source_id: u8,
    pub i_terminal: u8,
}

impl Uac1OutputTerminalDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBHBBB");
        let sz = format.size() as u8;
        format.pack_into(
            &mut buffer, sz, UsbDescriptorTypes::CsInterface as u8, UacDescriptorSubtypes::OutputTerminal as u8,
            self.b_terminal_id, self.w_terminal_type, self.b_assoc_terminal, self.b_source_id, self.i_terminal
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UacInputTerminalDescriptor {
    pub b_terminal_id: u8,
    pub w_terminal_type: u16,
    pub b_assoc_terminal: u8,
    pub b_nr_channels: u8,
    pub w_channel_config: u16,
    pub i_channel_names: u8,
    pub i_terminal: u8,
}

impl UacInputTerminalDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBHBBHBB");
        let sz = format.size() as u8;
        format.pack_into(
            &mut buffer, sz, UsbDescriptorTypes::CsInterface as u8, UacDescriptorSubtypes::InputTerminal as u8,
            self.b_terminal_id, self.w_terminal_type, self.b_assoc_terminal, self.b_nr_channels, self.w_channel_config, self.i_channel_names, self.i_terminal
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UacFeatureUnitDescriptor {
    pub b_unit_id: u8,
    pub b_source_id: u8,
    pub b_control_size: u8,
    pub bma_controls: Vec<u8>,
    pub i_feature: u8,
}

impl UacFeatureUnitDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBBB");
        let sz = format.size() as u8 + self.bma_controls.len() as u8 + 1;
        format.pack_into(
            &mut buffer, sz, UsbDescriptorTypes::CsInterface as u8, UacDescriptorSubtypes::FeatureUnit as u8,
            self.b_unit_id, self.b_source_id, self.b_control_size
        )?;
        buffer.write_all(&self.bma_controls)?;
        buffer.write_u8(self.i_feature)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Uac1AsHeaderDescriptor {
    pub b_terminal_link: u8,
    pub b_delay: u8,
    pub w_format_tag: u16,
}

impl Uac1AsHeaderDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBBH");
        format.pack_into(&mut buffer, format.size() as u8, UsbDescriptorTypes::CsInterface as u8, UacInterfaceSubtypes::General as u8, self.b_terminal_link, self.b_delay, self.w_format_tag)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct UacIsoEndpointDescriptor {
    pub b_descriptor_subtype: u8,
    pub bm_attributes: u8,
    pub b_lock_delay_units: u8,
    pub w_lock_delay: u16,
}

impl UacIsoEndpointDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBBH");
        format.pack_into(&mut buffer, format.size() as u8, UsbDescriptorTypes::CsEndpoint as u8, self.b_descriptor_subtype, self.bm_attributes, self.b_lock_delay_units, self.w_lock_delay)?;
        Ok(())
    }
}

/// Type I format with a discrete list of sampling frequencies (3 bytes each).
#[derive(Debug, Clone)]
pub struct UacFormatTypeIDiscreteDescriptor {
    pub b_nr_channels: u8,
    pub b_subframe_size: u8,
    pub b_bit_resolution: u8,
    pub t_sam_freq: Vec<u32>,
}

impl UacFormatTypeIDiscreteDescriptor {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBBBBB");
        let sz = format.size() as u8 + self.t_sam_freq.len() as u8 * 3u8;
        format.pack_into(&mut buffer, sz, UsbDescriptorTypes::CsInterface as u8, UacInterfaceSubtypes::FormatType as u8, UacFormatTypeI::Pcm as u8, self.b_nr_channels, self.b_subframe_size,
                         self.b_bit_resolution, self.t_sam_freq.len() as u8,
        )?;
        for freq in &self.t_sam_freq {
            write_u24_le(&mut buffer, *freq)?;
        }
        Ok(())
    }
}

pub fn write_u24_le(mut buffer: impl Write, value: u32) -> Result<(), Error> {
    buffer.write_u8((value >> 0) as u8)?;
    buffer.write_u8((value >> 8) as u8)?;
    buffer.write_u8((value >> 16) as u8)?;
    Ok(())
}

pub fn read_u24_le(bytes: [u8; 3]) -> u32 {
    (bytes[2] as u32) << 16 | (bytes[1] as u32) << 8 | (bytes[0] as u32)
}

/// Volume as reported over the wire: a 16-bit value in 1/256 dB steps, mapped
/// onto the device's linear 0-255 scale.
pub struct UacVolume;

impl UacVolume {
    /// Range and resolution advertised for GET_MIN / GET_MAX / GET_RES.
    pub const MIN: u16 = 0x8001;
    pub const MAX: u16 = 0x0800;
    pub const RES: u16 = 0x0088;

    /// Wire value of the lowest linear step. The top linear step wraps to MAX.
    const OFFSET: u16 = 0x8000;
    const SPAN: u32 = 0x8800;
    const LINEAR_MAX: u32 = 255;

    /// Linear 0-255 to wire value, rounded to nearest.
    pub fn from_linear(linear: u8) -> u16 {
        let scaled = (linear as u32 * UacVolume::SPAN + UacVolume::LINEAR_MAX / 2) / UacVolume::LINEAR_MAX;
        (scaled as u16).wrapping_add(UacVolume::OFFSET)
    }

    /// Wire value to linear 0-255, rounded to nearest and clamped.
    pub fn to_linear(device: u16) -> u8 {
        let offset = device.wrapping_sub(UacVolume::OFFSET) as u32;
        let linear = (offset * UacVolume::LINEAR_MAX + UacVolume::SPAN / 2) / UacVolume::SPAN;
        linear.min(UacVolume::LINEAR_MAX) as u8
    }

    /// Maximum decibel step resolution, from section 5.2.2.4.3.2 of
    /// USB Device Class Definition for Audio Devices v1.0 (Audio10.pdf)
    const DB_RES_MAX: f32 = 1f32 / 256f32;

    /// Converts a given wire volume to its decibel value.
    pub fn to_db(volume: u16) -> f32 {
        volume as i16 as f32 * UacVolume::DB_RES_MAX
    }
}

#[cfg(test)]
mod test {
    use crate::uac_proto::*;
    use float_eq::float_eq;

    #[test]
    fn uac_vol_min_test() {
        let actual = UacVolume::to_db(UacVolume::MIN);
        let expected = -127.9961f32;
        assert!(float_eq!(actual, expected, abs <= 0.000_1));
    }

    #[test]
    fn uac_vol_max_test() {
        let actual = UacVolume::to_db(UacVolume::MAX);
        let expected = 8.0f32;
        assert!(float_eq!(actual, expected, abs <= 0.000_1));
    }

    #[test]
    fn uac_vol_res_test() {
        let actual = UacVolume::to_db(UacVolume::RES);
        let expected = 0.53125f32;
        assert!(float_eq!(actual, expected, abs <= 0.000_1));
    }

    #[test]
    fn uac_vol_linear_endpoints() {
        assert_eq!(UacVolume::from_linear(0), 0x8000);
        assert_eq!(UacVolume::from_linear(255), UacVolume::MAX);
        assert_eq!(UacVolume::to_linear(0x8000), 0);
        assert_eq!(UacVolume::to_linear(UacVolume::MIN), 0);
        assert_eq!(UacVolume::to_linear(UacVolume::MAX), 255);
    }

    #[test]
    fn uac_vol_round_trip_within_one_step() {
        for v in 0..=255u8 {
            let back = UacVolume::to_linear(UacVolume::from_linear(v));
            assert!((back as i16 - v as i16).abs() <= 1, "v={} back={}", v, back);
        }
    }

    #[test]
    fn uac_vol_out_of_range_clamps() {
        // 0x7fff is far above MAX once shifted by the offset
        assert_eq!(UacVolume::to_linear(0x7fff), 255);
        assert_eq!(UacVolume::to_linear(0x1000), 255);
    }

    #[test]
    fn uac_u24_helpers() {
        let mut buf = vec![];
        write_u24_le(&mut buf, 44100).unwrap();
        assert_eq!(buf, vec![0x44, 0xac, 0x00]);
        assert_eq!(read_u24_le([0x80, 0xbb, 0x00]), 48000);
    }

    #[test]
    fn uac_format_type_i_layout() {
        let fmt = UacFormatTypeIDiscreteDescriptor { b_nr_channels: 1, b_subframe_size: 2, b_bit_resolution: 16, t_sam_freq: vec![8000, 48000] };
        let mut buf = vec![];
        fmt.serialize(&mut buf).unwrap();
        assert_eq!(buf, vec![0x0e, 0x24, 0x02, 0x01, 0x01, 0x02, 0x10, 0x02, 0x40, 0x1f, 0x00, 0x80, 0xbb, 0x00]);
    }
}
