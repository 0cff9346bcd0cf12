#![allow(unused)]

use bip32::{ChildNumber, DerivationPath, XPrv};
use bip39::{Language, Mnemonic, Seed};
use encdec::Encode;
use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};
use log::{debug, trace};
use prost::Message;
use sha2::{Digest, Sha256};

use ledger_proto::ApduStatic;
use ledger_swap_apdu::{
    address::{AddressParams, HARDENED},
    config::{AddressFormat, Base58Alphabet, CoinConfig, ExtraIdPolicy},
    prelude::*,
    transaction::TransactionId,
    Subcommand, SWAP_APDU_CLA,
};
use ledger_swap_core::engine::{Driver, Engine, State, TrustRoots};

/// Speculos default seed phrase
pub const MNEMONIC: &str = "glory promote mansion idle axis finger extra february uncover one trip resource lawn turtle enact monster seven myth punch hobby comfort wild raise skin";

/// Partner trust root secret key
pub const PARTNER_ROOT_KEY: [u8; 32] = [0x11; 32];
/// Partner secret key
pub const PARTNER_KEY: [u8; 32] = [0x22; 32];
/// Configuration issuer secret key
pub const CONFIG_ISSUER_KEY: [u8; 32] = [0x33; 32];

pub const PARTNER_NAME: &str = "SWAP_TEST";

pub const XRP_PAYOUT_PATH: [u32; 5] = [44 | HARDENED, 144 | HARDENED, HARDENED, 0, 0];
pub const XRP_REFUND_PATH: [u32; 5] = [44 | HARDENED, 144 | HARDENED, HARDENED, 1, 0];
pub const BTC_PATH: [u32; 5] = [44 | HARDENED, HARDENED, HARDENED, 0, 0];
pub const BTC_SEGWIT_PATH: [u32; 5] = [84 | HARDENED, HARDENED, HARDENED, 0, 0];
pub const LTC_PATH: [u32; 5] = [44 | HARDENED, 2 | HARDENED, HARDENED, 0, 0];

/// Address for [`XRP_PAYOUT_PATH`]
pub const XRP_PAYOUT_ADDRESS: &str = "ra7Zr8ddy9tB88RaXL8B87YkqhEJG2vkAJ";
/// Address for [`XRP_REFUND_PATH`]
pub const XRP_REFUND_ADDRESS: &str = "rhBuYom8agWA4s7DFoM7AvsDA9XGkVCJz4";
/// Address for [`BTC_PATH`]
pub const BTC_ADDRESS: &str = "1KKLP5MNa9mmWnEziT5skyu7PZ8A4eFisB";
/// Address for [`BTC_SEGWIT_PATH`]
pub const BTC_SEGWIT_ADDRESS: &str = "bc1qqtl9jlrwcr3fsfcjj2du7pu6fcgaxl5dsw2vyg";
/// Address for [`LTC_PATH`]
pub const LTC_ADDRESS: &str = "LbSAY7xS2BB78yDx97z7L3PmqDVgAkNnRh";

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self { seed: b }
    }

    /// Create a driver from the default test mnemonic
    pub fn default_seed() -> Self {
        let m = Mnemonic::from_phrase(MNEMONIC, Language::English).unwrap();
        Self::new(Seed::new(&m, ""))
    }
}

impl Driver for TestDriver {
    fn secp256k1_public_key(&self, path: &[u32]) -> [u8; 33] {
        let mut p = DerivationPath::default();
        for c in path {
            p.push(ChildNumber(*c));
        }

        let k = XPrv::derive_from_path(self.seed, &p).unwrap();
        k.public_key().to_bytes()
    }
}

/// Trust roots matching the test fixture keys
pub fn trust_roots() -> TrustRoots {
    TrustRoots {
        partner_root: signing_key(&PARTNER_ROOT_KEY).verifying_key().clone(),
        config_root: signing_key(&CONFIG_ISSUER_KEY).verifying_key().clone(),
    }
}

pub fn signing_key(k: &[u8; 32]) -> SigningKey {
    SigningKey::from_slice(k).unwrap()
}

/// DER signature over SHA-256(data)
pub fn sign(k: &[u8; 32], data: &[u8]) -> Vec<u8> {
    let digest: [u8; 32] = Sha256::digest(data).into();
    let sig: Signature = signing_key(k).sign_prehash(&digest).unwrap();
    sig.to_der().as_bytes().to_vec()
}

/// Encode a request APDU payload
pub fn encode<A: Encode>(a: &A) -> Vec<u8>
where
    A::Error: core::fmt::Debug,
{
    let mut buff = vec![0u8; 255];
    let n = a.encode(&mut buff).unwrap();
    buff.truncate(n);
    buff
}

/// Uncompressed partner public key
pub fn partner_public_key() -> [u8; 65] {
    let p = signing_key(&PARTNER_KEY).verifying_key().to_encoded_point(false);

    let mut k = [0u8; 65];
    k.copy_from_slice(p.as_bytes());
    k
}

/// Partner credential signature by the partner root
pub fn partner_credential<N: AsRef<[u8]> + ?Sized>(name: &N, public_key: &[u8; 65]) -> Vec<u8> {
    let data = encode(&SetPartnerKeyReq::new(name, *public_key));
    sign(&PARTNER_ROOT_KEY, &data)
}

/// Encode a currency configuration
pub fn coin_config(
    ticker: &str,
    app_name: &str,
    coin_type: u32,
    format: AddressFormat,
    extra_id: ExtraIdPolicy,
) -> Vec<u8> {
    encode(&CoinConfig {
        ticker,
        app_name,
        coin_type,
        format,
        extra_id,
    })
}

pub fn base58(alphabet: Base58Alphabet, version: &[u8]) -> AddressFormat {
    AddressFormat::Base58Check {
        alphabet,
        version: heapless::Vec::from_slice(version).unwrap(),
    }
}

pub fn xrp_config() -> Vec<u8> {
    coin_config(
        "XRP",
        "XRP",
        144,
        base58(Base58Alphabet::Ripple, &[0x00]),
        ExtraIdPolicy::Optional,
    )
}

pub fn btc_config() -> Vec<u8> {
    coin_config(
        "BTC",
        "Bitcoin",
        0,
        base58(Base58Alphabet::Bitcoin, &[0x00]),
        ExtraIdPolicy::None,
    )
}

pub fn btc_segwit_config() -> Vec<u8> {
    coin_config(
        "BTC",
        "Bitcoin",
        0,
        AddressFormat::SegwitV0 {
            hrp: heapless::String::try_from("bc").unwrap(),
        },
        ExtraIdPolicy::None,
    )
}

pub fn ltc_config() -> Vec<u8> {
    coin_config(
        "LTC",
        "Litecoin",
        2,
        base58(Base58Alphabet::Bitcoin, &[0x30]),
        ExtraIdPolicy::None,
    )
}

/// Encode address parameters for a derivation path
pub fn path_params(path: &[u32]) -> Vec<u8> {
    encode(&AddressParams::new(path).unwrap())
}

/// Partner payload, as produced by exchange backends
#[derive(Clone, PartialEq, Message)]
pub struct NewTransactionResponse {
    #[prost(string, tag = "1")]
    pub payin_address: String,
    #[prost(string, tag = "2")]
    pub payin_extra_id: String,
    #[prost(string, tag = "3")]
    pub refund_address: String,
    #[prost(string, tag = "4")]
    pub refund_extra_id: String,
    #[prost(string, tag = "5")]
    pub payout_address: String,
    #[prost(string, tag = "6")]
    pub payout_extra_id: String,
    #[prost(string, tag = "7")]
    pub currency_from: String,
    #[prost(string, tag = "8")]
    pub currency_to: String,
    #[prost(bytes = "vec", tag = "9")]
    pub amount_to_provider: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub amount_to_wallet: Vec<u8>,
    #[prost(string, tag = "11")]
    pub device_transaction_id: String,
    #[prost(bytes = "vec", optional, tag = "12")]
    pub declared_fee: Option<Vec<u8>>,
}

/// BTC -> XRP swap template
pub fn btc_to_xrp(payout_address: &str) -> NewTransactionResponse {
    NewTransactionResponse {
        payin_address: "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq".into(),
        refund_address: BTC_ADDRESS.into(),
        payout_address: payout_address.into(),
        currency_from: "BTC".into(),
        currency_to: "XRP".into(),
        amount_to_provider: vec![0x01, 0x86, 0xa0],
        amount_to_wallet: vec![0x3b, 0x9a, 0xca, 0x00],
        ..Default::default()
    }
}

/// XRP -> XRP swap template
pub fn xrp_to_xrp(refund_address: &str) -> NewTransactionResponse {
    NewTransactionResponse {
        payin_address: "rUJMQ5cY9YUVBTbX2Qiwju6zV3hhDSQBLH".into(),
        payin_extra_id: "12345".into(),
        refund_address: refund_address.into(),
        payout_address: XRP_PAYOUT_ADDRESS.into(),
        currency_from: "XRP".into(),
        currency_to: "XRP".into(),
        amount_to_provider: vec![0x0f, 0x42, 0x40],
        amount_to_wallet: vec![0x0f, 0x42, 0x40],
        ..Default::default()
    }
}

/// Engine wrapper exchanging encoded APDUs
pub struct TestEngine {
    pub engine: Engine<TestDriver>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(TestDriver::default_seed(), trust_roots()),
        }
    }

    /// Exchange a request APDU, returning the response payload or status word
    pub fn exchange<A>(&mut self, req: &A) -> Result<Vec<u8>, StatusCode>
    where
        A: Encode + ApduStatic + core::fmt::Debug,
        A::Error: core::fmt::Debug,
    {
        debug!("cmd: {:?}", req);

        let data = encode(req);
        trace!("encoded: {:02x?}", data);

        let mut resp = [0u8; 255];
        let r = self
            .engine
            .apdu(A::CLA, A::INS, Subcommand::Swap as u8, &data, &mut resp);

        debug!("resp: {:02x?}", r.as_ref().map(|n| &resp[..*n]));

        r.map(|n| resp[..n].to_vec())
    }

    pub fn state(&self) -> State {
        self.engine.state()
    }

    /// Start a new transaction, returning the device transaction id
    pub fn start(&mut self) -> TransactionId {
        let r = self.exchange(&StartNewTransactionReq).unwrap();

        let mut id = [0u8; 10];
        id.copy_from_slice(&r);
        TransactionId::new(id).unwrap()
    }

    /// Declare and authenticate the test partner
    pub fn authenticate_partner(&mut self) {
        let key = partner_public_key();
        let sig = partner_credential(PARTNER_NAME, &key);

        self.exchange(&SetPartnerKeyReq::new(PARTNER_NAME, key))
            .unwrap();
        self.exchange(&CheckPartnerReq { signature: &sig })
            .unwrap();

        assert_eq!(self.state(), State::PartnerVerified);
    }

    /// Bind a transaction to the active session and check its signature
    pub fn load_transaction(&mut self, mut tx: NewTransactionResponse, fee: &[u8]) {
        let payload = self.bind(&mut tx);
        let sig = sign(&PARTNER_KEY, &payload);

        self.exchange(&ProcessTransactionReq::new(&payload, fee))
            .unwrap();
        self.exchange(&CheckTransactionSignatureReq { signature: &sig })
            .unwrap();

        assert_eq!(self.state(), State::SignatureVerified);
    }

    /// Set the session transaction id on a payload and encode it
    pub fn bind(&self, tx: &mut NewTransactionResponse) -> Vec<u8> {
        let id = self.engine.transaction_id().unwrap();
        tx.device_transaction_id = id.as_str().into();
        tx.encode_to_vec()
    }

    /// Run a swap through to signature verification
    pub fn verified(tx: NewTransactionResponse) -> Self {
        let mut e = Self::new();
        e.start();
        e.authenticate_partner();
        e.load_transaction(tx, &[0x10]);
        e
    }

    /// Check the payout address with a signed configuration
    pub fn check_payout(&mut self, config: &[u8], path: &[u32]) -> Result<Vec<u8>, StatusCode> {
        let sig = sign(&CONFIG_ISSUER_KEY, config);
        let params = path_params(path);

        self.exchange(&CheckPayoutAddressReq::new(config, &sig, &params))
    }

    /// Check the refund address with a signed configuration
    pub fn check_refund(&mut self, config: &[u8], path: &[u32]) -> Result<Vec<u8>, StatusCode> {
        let sig = sign(&CONFIG_ISSUER_KEY, config);
        let params = path_params(path);

        self.exchange(&CheckRefundAddressReq::new(config, &sig, &params))
    }
}

/// Initialise test logging
pub fn init_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}
