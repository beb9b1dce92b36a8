use soroban_sdk::contracttype;

/// Transport used to deliver a transfer message to the destination chain
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MessengerProtocol {
    /// Validator-signed messenger
    Allbridge = 1,
    /// Attestation-based messenger
    Wormhole = 2,
}

impl MessengerProtocol {
    /// Tag byte appended to the transfer hash preimage
    pub fn tag(&self) -> u8 {
        *self as u8
    }
}
