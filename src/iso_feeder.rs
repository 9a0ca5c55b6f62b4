use anyhow::Error;

use crate::backend::AudioBackend;
use crate::descriptors::ENDPOINT_AUDIO_IN;
use crate::memory::InvalidRange;
use crate::transfer::{HostKernel, IsoMessage};

pub const ISO_COMPLETION_DELAY: u64 = 100;

const PLACEHOLDER_RUN: usize = 100;

/// Square wave stand-in for captured audio: runs of 100 zero bytes alternating
/// with runs of 100 0xff bytes.
pub fn placeholder_sample(i: usize) -> u8 {
    if (i / PLACEHOLDER_RUN) % 2 == 1 { 0xff } else { 0x00 }
}

pub fn fill_placeholder(buffer: &mut [u8]) {
    buffer.iter_mut().enumerate().for_each(|(i, b)| *b = placeholder_sample(i));
}

/// Hands out `available` bytes across the packets left to right.
pub fn distribute_packets(mut available: usize, packet_sizes: &[u16]) -> Vec<u16> {
    packet_sizes.iter().map(|size| {
        let delivered = available.min(*size as usize);
        available -= delivered;
        delivered as u16
    }).collect()
}

/// Services isochronous IN transfers on the audio endpoint.
#[derive(Debug, Clone, Copy)]
pub struct IsochronousStreamFeeder {
    completion_delay: u64,
}

impl IsochronousStreamFeeder {
    pub fn new(completion_delay: u64) -> IsochronousStreamFeeder {
        IsochronousStreamFeeder { completion_delay }
    }

    pub fn submit(&self, kernel: &mut dyn HostKernel, backend: Option<&mut (dyn AudioBackend + 'static)>, mut cmd: IsoMessage) -> Result<(), Error> {
        let address = cmd.data_address;
        let length = cmd.length as usize;
        let mut packets = match kernel.memory().range_mut(address, length) {
            Some(range) => range.to_vec(),
            None => {
                error!("Logitech USB Microphone isochronous transfer invalid: address={:#010x} length={:#06x}", address, length);
                return Err(InvalidRange { address, length }.into());
            }
        };

        match cmd.endpoint {
            ENDPOINT_AUDIO_IN => {
                fill_placeholder(&mut packets);
                let available = match backend {
                    Some(backend) => backend.read_into(&mut packets),
                    None => 0,
                };
                let results = distribute_packets(available, &cmd.packet_sizes);
                for (i, delivered) in results.into_iter().enumerate() {
                    cmd.set_packet_return_value(i, delivered);
                }
            }
            _ => {
                info!("Logitech Mic isochronous transfer, unknown endpoint?: length={:04x} endpoint={:02x} num_packets={:02x}",
                      cmd.length, cmd.endpoint, cmd.num_packets());
            }
        }

        cmd.fill_buffer(kernel, &packets)?;
        cmd.schedule_transfer_completion(kernel, length as u32, self.completion_delay);
        Ok(())
    }
}

impl Default for IsochronousStreamFeeder {
    fn default() -> IsochronousStreamFeeder {
        IsochronousStreamFeeder::new(ISO_COMPLETION_DELAY)
    }
}
