use openflow::messages::*;
use std::error;
use std::fmt;
use std::io;
use std::result;

/// The failures the datapath recognizes.
///
/// The protocol variants are answered with an `OfpErrorMsg` of the same type and code.
/// The remaining ones stay local and are only logged.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    BadRequest(OfpBadRequestCode),
    BadAction(OfpBadActionCode),
    FlowModFailed(OfpFlowModFailedCode),
    PortModFailed(OfpPortModFailedCode),
    VportModFailed(OfpVportModFailedCode),
    /// A Packet-Out or Flow-Mod referenced a buffer that was consumed or recycled
    BufferUnknown(u32),
    /// No free slot is left to attach another port
    PortTableFull,
}

impl Error {
    /// Builds the error reply for the failed `request`.
    /// Local failures have no reply.
    pub fn to_error_msg(&self, request: &[u8]) -> Option<OfpErrorMsg> {
        let (typ, code) = match *self {
            Error::BadRequest(code) => (OfpErrorType::BadRequest, code as u16),
            Error::BadAction(code) => (OfpErrorType::BadAction, code as u16),
            Error::FlowModFailed(code) => (OfpErrorType::FlowModFailed, code as u16),
            Error::PortModFailed(code) => (OfpErrorType::PortModFailed, code as u16),
            Error::VportModFailed(code) => (OfpErrorType::VportModFailed, code as u16),
            Error::Io(_) | Error::BufferUnknown(_) | Error::PortTableFull => return None,
        };
        Some(OfpErrorMsg::new(typ, code, request))
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "OpenFlow datapath error"
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<OfpBadActionCode> for Error {
    fn from(code: OfpBadActionCode) -> Self {
        Error::BadAction(code)
    }
}

pub type Result<T> = result::Result<T, Error>;
