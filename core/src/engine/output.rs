// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use ledger_proto::ApduError;

use crate::apdu::{self, transaction::TransactionId};

use super::State;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Empty response
    None,

    /// Application version
    Version { major: u8, minor: u8, patch: u8 },

    /// Session state
    State { state: State },

    /// Transaction id for a new session
    TransactionId { id: TransactionId },
}

impl Output {
    /// Encode an [`Output`] object to an APDU
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None => Ok(0),
            Output::Version {
                major,
                minor,
                patch,
            } => apdu::version::VersionResp::new(*major, *minor, *patch).encode(buff),
            Output::State { state } => apdu::state::StateResp {
                state: state.swap_state(),
            }
            .encode(buff),
            Output::TransactionId { id } => {
                apdu::transaction::TransactionIdResp { id: *id }.encode(buff)
            }
        }
    }

    /// Fetch state from output if available
    pub fn state(&self) -> Option<State> {
        match self {
            Output::State { state } => Some(*state),
            _ => None,
        }
    }

    /// Fetch transaction id from output if available
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match self {
            Output::TransactionId { id } => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_outputs() {
        let mut buff = [0u8; 32];

        assert_eq!(Output::None.encode(&mut buff).ok(), Some(0));

        let n = Output::State {
            state: State::SignatureVerified,
        }
        .encode(&mut buff)
        .unwrap();
        assert_eq!(&buff[..n], &[0x04]);

        let id = TransactionId::new(*b"QWERTYUIOP").unwrap();
        let n = Output::TransactionId { id }.encode(&mut buff).unwrap();
        assert_eq!(&buff[..n], b"QWERTYUIOP");
    }

    #[test]
    fn encode_short_buffer() {
        let mut buff = [0u8; 4];
        let id = TransactionId::new(*b"QWERTYUIOP").unwrap();

        assert!(Output::TransactionId { id }.encode(&mut buff).is_err());
    }
}
