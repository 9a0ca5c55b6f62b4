use anyhow::Error;

use crate::memory::{GuestMemory, InvalidRange};
use crate::usb_proto::{request_dir, request_recip, request_xfer_type, Recip, XferDir, XferType};

/// Opaque handle of the host request a transfer reply is delivered to.
pub type RequestHandle = u32;

/// Reply values understood by the host kernel. Positive values are byte counts.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq)]
#[repr(i32)]
pub enum ReturnCode {
    Success = 0,
    InvalidArgument = -4,
    Stall = -7008,
}

impl ReturnCode {
    pub fn from_error(err: &Error) -> ReturnCode {
        if err.downcast_ref::<InvalidRange>().is_some() {
            ReturnCode::InvalidArgument
        } else {
            ReturnCode::Stall
        }
    }
}

/// The emulation kernel side of the request/reply contract.
pub trait HostKernel {
    fn memory(&mut self) -> &mut dyn GuestMemory;

    /// Delivers the single reply of a control, bulk or interrupt transfer.
    fn enqueue_ipc_reply(&mut self, request: RequestHandle, return_value: i32);

    /// Completes `transfer` with `length` bytes, `delay` time units from now.
    fn schedule_iso_completion(&mut self, transfer: IsoMessage, length: u32, delay: u64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlMessage {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
    pub data_address: u32,
    pub ios_request: RequestHandle,
}

impl ControlMessage {
    /// Decodes the standard 8-byte SETUP packet.
    pub fn from_setup(setup: &[u8], data_address: u32, ios_request: RequestHandle) -> Result<ControlMessage, Error> {
        if setup.len() != 8 {
            return Err(anyhow!("SETUP packet must be 8 bytes, got {}", setup.len()));
        }
        let mut buffer = setup;
        let format = structure!("<BBHHH");
        let (request_type, request, value, index, length) = format.unpack_from(&mut buffer)?;
        Ok(ControlMessage { request_type, request, value, index, length, data_address, ios_request })
    }

    /// Top level routing key, `(bmRequestType << 8) | bRequest`.
    pub fn opcode(&self) -> u16 {
        (self.request_type as u16) << 8 | self.request as u16
    }

    pub fn direction(&self) -> Option<XferDir> {
        request_dir(self.request_type)
    }

    pub fn xfer_type(&self) -> Option<XferType> {
        request_xfer_type(self.request_type)
    }

    pub fn recipient(&self) -> Option<Recip> {
        request_recip(self.request_type)
    }

    /// Audio class control selector, the high byte of wValue.
    pub fn control_selector(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// Zero based channel number; 0xff addresses the master channel.
    pub fn channel_number(&self) -> u8 {
        (self.value as u8).wrapping_sub(1)
    }

    /// Copies `data` into the payload buffer.
    pub fn fill_buffer(&self, kernel: &mut dyn HostKernel, data: &[u8]) -> Result<(), Error> {
        kernel.memory().write_bytes(self.data_address, data)
    }

    /// Consumes the message, delivering its one reply.
    pub fn reply(self, kernel: &mut dyn HostKernel, return_value: i32) {
        kernel.enqueue_ipc_reply(self.ios_request, return_value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkMessage {
    pub endpoint: u8,
    pub length: u16,
    pub data_address: u32,
    pub ios_request: RequestHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntrMessage {
    pub endpoint: u8,
    pub length: u16,
    pub data_address: u32,
    pub ios_request: RequestHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IsoMessage {
    pub endpoint: u8,
    pub length: u16,
    pub packet_sizes: Vec<u16>,
    pub packet_results: Vec<u16>,
    pub data_address: u32,
    pub ios_request: RequestHandle,
}

impl IsoMessage {
    pub fn new(endpoint: u8, packet_sizes: Vec<u16>, data_address: u32, ios_request: RequestHandle) -> IsoMessage {
        let length = packet_sizes.iter().map(|s| *s as u32).sum::<u32>().min(u16::MAX as u32) as u16;
        let packet_results = vec![0; packet_sizes.len()];
        IsoMessage { endpoint, length, packet_sizes, packet_results, data_address, ios_request }
    }

    pub fn num_packets(&self) -> usize {
        self.packet_sizes.len()
    }

    pub fn set_packet_return_value(&mut self, packet: usize, value: u16) {
        if let Some(result) = self.packet_results.get_mut(packet) {
            *result = value;
        }
    }

    pub fn fill_buffer(&self, kernel: &mut dyn HostKernel, data: &[u8]) -> Result<(), Error> {
        kernel.memory().write_bytes(self.data_address, data)
    }

    pub fn schedule_transfer_completion(self, kernel: &mut dyn HostKernel, length: u32, delay: u64) {
        kernel.schedule_iso_completion(self, length, delay);
    }
}
