//! Control request routing keys.
//!
//! Top level dispatch uses the 16-bit opcode `(bmRequestType << 8) | bRequest`.
//! Audio class handlers key on the 32-bit audio id
//! `(control_selector << 24) | (bRequest << 16) | wIndex`.

use crate::uac_proto::UacRequestCodes;
use crate::usb_proto::{usb_hdr, Recip, UsbStandardRequest, XferDir, XferType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Route {
    GetDescriptor,
    SetInterface,
    GetAudioControl,
    SetAudioControl,
    EndpointAudioControl,
}

const fn std_req(dir: XferDir, recip: Recip, request: UsbStandardRequest) -> u16 {
    usb_hdr(dir, XferType::Std, recip, request as u8)
}

const fn class_req(dir: XferDir, recip: Recip, request: UacRequestCodes) -> u16 {
    usb_hdr(dir, XferType::Class, recip, request as u8)
}

pub static ROUTING_TABLE: [(u16, Route); 30] = [
    (std_req(XferDir::ToHost, Recip::Dev, UsbStandardRequest::GetDescriptor), Route::GetDescriptor),
    (std_req(XferDir::ToDev, Recip::Iface, UsbStandardRequest::SetInterface), Route::SetInterface),

    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::GetCur), Route::GetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::GetMin), Route::GetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::GetMax), Route::GetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::GetRes), Route::GetAudioControl),

    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::SetCur), Route::SetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::SetMin), Route::SetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::SetMax), Route::SetAudioControl),
    (class_req(XferDir::ToHost, Recip::Iface, UacRequestCodes::SetRes), Route::SetAudioControl),
    (class_req(XferDir::ToDev, Recip::Iface, UacRequestCodes::SetCur), Route::SetAudioControl),
    (class_req(XferDir::ToDev, Recip::Iface, UacRequestCodes::SetMin), Route::SetAudioControl),
    (class_req(XferDir::ToDev, Recip::Iface, UacRequestCodes::SetMax), Route::SetAudioControl),
    (class_req(XferDir::ToDev, Recip::Iface, UacRequestCodes::SetRes), Route::SetAudioControl),

    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::GetCur), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::GetMin), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::GetMax), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::GetRes), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::SetCur), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::SetMin), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::SetMax), Route::EndpointAudioControl),
    (class_req(XferDir::ToDev, Recip::Ep, UacRequestCodes::SetRes), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::GetCur), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::GetMin), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::GetMax), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::GetRes), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::SetCur), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::SetMin), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::SetMax), Route::EndpointAudioControl),
    (class_req(XferDir::ToHost, Recip::Ep, UacRequestCodes::SetRes), Route::EndpointAudioControl),
];

pub fn route(opcode: u16) -> Option<Route> {
    ROUTING_TABLE.iter().find(|(op, _)| *op == opcode).map(|(_, route)| *route)
}

/// Audio class routing key.
pub const fn aid(control_selector: u8, request: u8, index: u16) -> u32 {
    (control_selector as u32) << 24 | (request as u32) << 16 | index as u32
}
