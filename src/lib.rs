#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate structure;

pub mod audio_control;
pub mod backend;
pub mod descriptors;
pub mod device;
pub mod iso_feeder;
pub mod memory;
pub mod routing;
pub mod sampler;
pub mod transfer;
pub mod uac_proto;
pub mod usb_proto;
pub mod logger;

pub use crate::backend::{AudioBackend, NullMicrophone};
pub use crate::device::{InterfaceState, LogitechMic, MicConfig, UsbDevice};
pub use crate::memory::{GuestMemory, GuestRam, InvalidRange};
pub use crate::sampler::SamplerState;
pub use crate::transfer::{BulkMessage, ControlMessage, HostKernel, IntrMessage, IsoMessage, RequestHandle, ReturnCode};
pub use crate::usb_proto::DeviceIdentity;
