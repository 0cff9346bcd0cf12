// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;

use ledger_proto::{ApduError, ApduStatic};
use ledger_swap_apdu::{
    partner::PARTNER_KEY_LEN, prelude::*, state::STATE_RESP_LEN, transaction::TRANSACTION_ID_LEN,
    version::VERSION_RESP_LEN,
};

/// Address check target
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum AddressKind {
    /// Payout address, in the destination currency
    Payout,
    /// Refund address, in the source currency
    Refund,
}

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, Debug)]
pub enum Event<'a> {
    None,

    /// Fetch application version
    GetVersion,

    /// Fetch session state
    GetState,

    /// Start a new swap session
    StartNewTransaction,

    /// Declare partner identity
    SetPartnerKey {
        name: &'a [u8],
        public_key: [u8; PARTNER_KEY_LEN],
    },

    /// Authenticate partner identity
    CheckPartner { signature: &'a [u8] },

    /// Load transaction payload and expected payin fee
    ProcessTransaction { payload: &'a [u8], fee: &'a [u8] },

    /// Check transaction payload signature
    CheckTransactionSignature { signature: &'a [u8] },

    /// Check payout or refund address
    CheckAddress {
        kind: AddressKind,
        config: &'a [u8],
        config_signature: &'a [u8],
        address_params: &'a [u8],
    },
}

/// Helper for decoding APDUs to events, requests must consume the full buffer
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, ApduError>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    let (v, n) = T::decode(buff)?;
    if n != buff.len() {
        return Err(ApduError::InvalidLength);
    }
    Ok(Event::from(v))
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, ApduError> {
        match ins {
            GetVersionReq::INS => decode_event::<GetVersionReq>(buff),
            StateReq::INS => decode_event::<StateReq>(buff),
            StartNewTransactionReq::INS => decode_event::<StartNewTransactionReq>(buff),

            SetPartnerKeyReq::INS => decode_event::<SetPartnerKeyReq>(buff),
            CheckPartnerReq::INS => decode_event::<CheckPartnerReq>(buff),

            ProcessTransactionReq::INS => decode_event::<ProcessTransactionReq>(buff),
            CheckTransactionSignatureReq::INS => {
                decode_event::<CheckTransactionSignatureReq>(buff)
            }

            CheckPayoutAddressReq::INS => decode_event::<CheckPayoutAddressReq>(buff),
            CheckRefundAddressReq::INS => decode_event::<CheckRefundAddressReq>(buff),

            _ => Err(ApduError::InvalidEncoding),
        }
    }

    /// Maximum response length for an event, checked before the event is applied
    pub fn response_len(&self) -> usize {
        match self {
            Event::GetVersion => VERSION_RESP_LEN,
            Event::GetState => STATE_RESP_LEN,
            Event::StartNewTransaction => TRANSACTION_ID_LEN,
            _ => 0,
        }
    }
}

impl<'a> From<GetVersionReq> for Event<'a> {
    fn from(_: GetVersionReq) -> Self {
        Event::GetVersion
    }
}

impl<'a> From<StateReq> for Event<'a> {
    fn from(_: StateReq) -> Self {
        Event::GetState
    }
}

impl<'a> From<StartNewTransactionReq> for Event<'a> {
    fn from(_: StartNewTransactionReq) -> Self {
        Event::StartNewTransaction
    }
}

impl<'a> From<SetPartnerKeyReq<'a>> for Event<'a> {
    fn from(a: SetPartnerKeyReq<'a>) -> Self {
        Event::SetPartnerKey {
            name: a.name,
            public_key: a.public_key,
        }
    }
}

impl<'a> From<CheckPartnerReq<'a>> for Event<'a> {
    fn from(a: CheckPartnerReq<'a>) -> Self {
        Event::CheckPartner {
            signature: a.signature,
        }
    }
}

impl<'a> From<ProcessTransactionReq<'a>> for Event<'a> {
    fn from(a: ProcessTransactionReq<'a>) -> Self {
        Event::ProcessTransaction {
            payload: a.payload,
            fee: a.fee,
        }
    }
}

impl<'a> From<CheckTransactionSignatureReq<'a>> for Event<'a> {
    fn from(a: CheckTransactionSignatureReq<'a>) -> Self {
        Event::CheckTransactionSignature {
            signature: a.signature,
        }
    }
}

impl<'a> From<CheckPayoutAddressReq<'a>> for Event<'a> {
    fn from(a: CheckPayoutAddressReq<'a>) -> Self {
        Event::CheckAddress {
            kind: AddressKind::Payout,
            config: a.config,
            config_signature: a.config_signature,
            address_params: a.address_params,
        }
    }
}

impl<'a> From<CheckRefundAddressReq<'a>> for Event<'a> {
    fn from(a: CheckRefundAddressReq<'a>) -> Self {
        Event::CheckAddress {
            kind: AddressKind::Refund,
            config: a.config,
            config_signature: a.config_signature,
            address_params: a.address_params,
        }
    }
}

#[cfg(test)]
mod test {
    use encdec::Encode;

    use super::*;

    #[test]
    fn parse_address_events() {
        let req = CheckRefundAddressReq::new(&[0xaa; 4], &[0x30; 8], &[1, 0, 0, 0, 0]);

        let mut buff = [0u8; 64];
        let n = req.encode(&mut buff).unwrap();

        let evt = Event::parse(CheckRefundAddressReq::INS, &buff[..n]).unwrap();
        assert!(matches!(
            evt,
            Event::CheckAddress {
                kind: AddressKind::Refund,
                ..
            }
        ));

        let evt = Event::parse(CheckPayoutAddressReq::INS, &buff[..n]).unwrap();
        assert!(matches!(
            evt,
            Event::CheckAddress {
                kind: AddressKind::Payout,
                ..
            }
        ));
    }

    #[test]
    fn parse_rejects_trailing_bytes() {
        assert!(matches!(
            Event::parse(StartNewTransactionReq::INS, &[0x00]),
            Err(ApduError::InvalidLength)
        ));
        assert!(matches!(
            Event::parse(ProcessTransactionReq::INS, &[1, 0xaa, 0, 0xbb]),
            Err(ApduError::InvalidLength)
        ));
    }

    #[test]
    fn response_lengths() {
        assert_eq!(Event::StartNewTransaction.response_len(), TRANSACTION_ID_LEN);
        assert_eq!(Event::GetVersion.response_len(), 3);
        assert_eq!(Event::GetState.response_len(), 1);
        assert_eq!(
            Event::CheckPartner {
                signature: &[0x30; 8]
            }
            .response_len(),
            0
        );
    }

    #[test]
    fn parse_unknown_instruction() {
        assert!(matches!(
            Event::parse(0x0a, &[]),
            Err(ApduError::InvalidEncoding)
        ));
    }
}
