//! Push events and the pairing flow built on them.

mod hub;
mod pairing;

pub use hub::{EventHub, EventStream};
pub use pairing::{
    PairingSession, PairingStep, PairingView, QrCode, regenerate, run_pairing,
};
