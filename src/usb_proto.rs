// derived from /usr/include/linux/usb/ch9.h
#![allow(dead_code)]

use std::fmt::{Display, Formatter};
use std::io::Write;

use anyhow::Error;
use libusb1_sys::constants::*;

use crate::uac_proto::UacInterfaceSubclass;

pub const LOGITECH_VID: u16 = 0x046d;
pub const LOGITECH_MIC_PID: u16 = 0x0a03;

// 9.3 USB Device Requests
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum XferDir {
    ToDev = 0x00,
    ToHost = 0x80,
}
pub const USB_DIR_MASK: u8 = 0x1 << 7;

#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum XferType {
    Std = 0x00,
    Class = 0x20,
    Vendor = 0x40,
    Reserved = 0x60,
}
pub const USB_XFER_TYPE_MASK: u8 = 0x03 << 5;

#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum Recip {
    Dev = 0x00,
    Iface = 0x01,
    Ep = 0x02,
    Other = 0x03,
}
pub const USB_RECIP_MASK: u8 = 0x1f;

// 9.4 Standard Device Requests
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq)]
#[repr(u8)]
pub enum UsbStandardRequest {
    GetStatus = 0x00,
    ClearFeature = 0x01,
    SetFeature = 0x03,
    SetAddress = 0x05,
    GetDescriptor = 0x06,
    SetDescriptor = 0x07,
    GetConfiguration = 0x08,
    SetConfiguration = 0x09,
    GetInterface = 0x0a,
    SetInterface = 0x0b,
    SynchFrame = 0x0c,
}

/// Packs the bmRequestType fields and bRequest into the 16-bit opcode used for
/// top level control dispatch: `(request_type << 8) | request`.
pub const fn usb_hdr(dir: XferDir, xfer_type: XferType, recip: Recip, request: u8) -> u16 {
    let request_type = dir as u8 | xfer_type as u8 | recip as u8;
    (request_type as u16) << 8 | request as u16
}

pub fn request_dir(request_type: u8) -> Option<XferDir> {
    num_traits::FromPrimitive::from_u8(request_type & USB_DIR_MASK)
}

pub fn request_xfer_type(request_type: u8) -> Option<XferType> {
    num_traits::FromPrimitive::from_u8(request_type & USB_XFER_TYPE_MASK)
}

pub fn request_recip(request_type: u8) -> Option<Recip> {
    num_traits::FromPrimitive::from_u8(request_type & USB_RECIP_MASK)
}

#[derive(Debug, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum UsbDescriptorTypes {
    Device = 0x01,
    Config = 0x02,
    String = 0x03,
    Interface = 0x04,
    Endpoint = 0x05,
    DeviceQualifier = 0x06,
    OtherSpeedConfig = 0x07,
    InterfacePower = 0x08,
    CsDevice = 0x21,
    CsConfig = 0x22,
    CsString = 0x23,
    CsInterface = 0x24,
    CsEndpoint = 0x25,
}

/// Key under which the host kernel's device registry tracks an emulated device.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub struct DeviceIdentity {
    pub vid: u16,
    pub pid: u16,
    pub class: u8,
    pub subclass: u8,
}

impl DeviceIdentity {
    pub fn new(vid: u16, pid: u16, class: u8, subclass: u8) -> DeviceIdentity {
        DeviceIdentity { vid, pid, class, subclass }
    }

    pub fn key(&self) -> u64 {
        (self.vid as u64) << 32 | (self.pid as u64) << 16 | (self.class as u64) << 8 | self.subclass as u64
    }
}

impl Display for DeviceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vid, self.pid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorDevice {
    pub bcd_usb: u16,
    pub b_device_class: u8,
    pub b_device_sub_class: u8,
    pub b_device_protocol: u8,
    pub b_max_packet_size0: u8,
    pub id_vendor: u16,
    pub id_product: u16,
    pub bcd_device: u16,
    pub i_manufacturer: u8,
    pub i_product: u8,
    pub i_serial_number: u8,
    pub b_num_configurations: u8,
}

impl DescriptorDevice {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBHBBBBHHHBBBB");
        format.pack_into(&mut buffer, format.size() as u8, UsbDescriptorTypes::Device as u8,
                         self.bcd_usb, self.b_device_class, self.b_device_sub_class, self.b_device_protocol, self.b_max_packet_size0, self.id_vendor, self.id_product, self.bcd_device, self.i_manufacturer, self.i_product, self.i_serial_number, self.b_num_configurations,
        )?;
        Ok(())
    }
    pub fn size(&self) -> usize {
        structure!("<BBHBBBBHHHBBBB").size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorConfig {
    pub w_total_length: u16,
    pub b_num_interfaces: u8,
    pub b_configuration_value: u8,
    pub i_configuration: u8,
    pub bm_attributes: u8,
    pub b_max_power: u8,
}

impl DescriptorConfig {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBHBBBBB");
        format.pack_into(&mut buffer, format.size() as u8, UsbDescriptorTypes::Config as u8, self.w_total_length, self.b_num_interfaces, self.b_configuration_value, self.i_configuration,
                         self.bm_attributes, self.b_max_power,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptorInterface {
    pub b_interface_number: u8,
    pub b_alternate_setting: u8,
    pub b_num_endpoints: u8,
    pub b_interface_class: u8,
    pub b_interface_sub_class: u8,
    pub b_interface_protocol: u8,
    pub i_interface: u8,
}

impl DescriptorInterface {
    /// Audio class interface with no class protocol and no string.
    pub fn audio(number: u8, alt: u8, num_endpoints: u8, subclass: UacInterfaceSubclass) -> DescriptorInterface {
        DescriptorInterface {
            b_interface_number: number,
            b_alternate_setting: alt,
            b_num_endpoints: num_endpoints,
            b_interface_class: LIBUSB_CLASS_AUDIO,
            b_interface_sub_class: subclass as u8,
            b_interface_protocol: 0,
            i_interface: 0,
        }
    }
    pub fn is_audio(&self) -> bool {
        self.b_interface_class == LIBUSB_CLASS_AUDIO
    }
    pub fn is_audio_control(&self) -> bool {
        self.is_audio() && self.b_interface_sub_class == UacInterfaceSubclass::AudioControl as u8
    }
    pub fn is_audio_streaming(&self) -> bool {
        self.is_audio() && self.b_interface_sub_class == UacInterfaceSubclass::AudioStreaming as u8
    }
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBBBBBB");
        format.pack_into(&mut buffer, format.size() as u8, UsbDescriptorTypes::Interface as u8, self.b_interface_number, self.b_alternate_setting, self.b_num_endpoints, self.b_interface_class,
                         self.b_interface_sub_class, self.b_interface_protocol, self.i_interface,
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EndpointAttrTransferType {
    Control     = 0x00,
    Isochronous = 0x01,
    Bulk        = 0x02,
    Interrupt   = 0x03,
}

#[derive(Debug, Clone, Copy)]
pub enum EndpointAttrSyncType {
    NoSync  = 0x00,
    Async   = 0x01,
    Adapt   = 0x02,
    Sync    = 0x03,
}

#[derive(Debug, Clone, Copy)]
pub enum EndpointAttrUsageType {
    Data        = 0x00,
    Feedback    = 0x01,
    Implicit    = 0x02,
    Reserved    = 0x03,
}

pub fn ep_attr_to_u8(transfer: EndpointAttrTransferType, sync: EndpointAttrSyncType, usage: EndpointAttrUsageType) -> u8 {
    let mut res = 0u8;
    res |= transfer as u8;
    res |= (sync as u8) << 2;
    res |= (usage as u8) << 4;
    res
}

/// Audio class endpoint descriptor: the standard endpoint plus bRefresh and bSynchAddress (9 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UacDescriptorEndpoint {
    pub b_endpoint_address: u8,
    pub bm_attributes: u8,
    pub w_max_packet_size: u16,
    pub b_interval: u8,
    pub b_refresh: u8,
    pub b_synch_address: u8,
}

impl UacDescriptorEndpoint {
    pub fn serialize(&self, mut buffer: impl Write) -> Result<(), Error> {
        let format = structure!("<BBBBHBBB");
        format.pack_into(&mut buffer,
                         self.size() as u8, UsbDescriptorTypes::Endpoint as u8,
                         self.b_endpoint_address, self.bm_attributes, self.w_max_packet_size, self.b_interval, self.b_refresh, self.b_synch_address
        )?;
        Ok(())
    }
    pub fn size(&self) -> usize {
        structure!("<BBBBHBBB").size()
    }
    pub fn ep(&self) -> u8 {
        self.b_endpoint_address & LIBUSB_ENDPOINT_ADDRESS_MASK
    }
    pub fn is_in(&self) -> bool {
        self.b_endpoint_address & LIBUSB_ENDPOINT_DIR_MASK == LIBUSB_ENDPOINT_IN
    }
    pub fn is_iso_transfer(&self) -> bool {
        self.bm_attributes & LIBUSB_TRANSFER_TYPE_MASK == LIBUSB_TRANSFER_TYPE_ISOCHRONOUS
    }
    pub fn is_async(&self) -> bool {
        (self.bm_attributes & LIBUSB_ISO_SYNC_TYPE_MASK) >> 2 == LIBUSB_ISO_SYNC_TYPE_ASYNC
    }
    pub fn is_mic(&self) -> bool {
        self.is_iso_transfer() && self.is_in() && self.is_async()
    }
}
