use soroban_sdk::{contracttype, Address};

/// Administrative roles of a contract.
///
/// Loaded once per call and handed to the capability checks below.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminConfig {
    /// Authorizes configuration changes and restarts after a stop
    pub owner: Address,
    /// Authorizes the stop switches
    pub stop_authority: Address,
}

impl AdminConfig {
    pub fn new(owner: Address) -> Self {
        Self {
            stop_authority: owner.clone(),
            owner,
        }
    }

    pub fn require_owner(&self) {
        self.owner.require_auth();
    }

    pub fn require_stop_authority(&self) {
        self.stop_authority.require_auth();
    }
}
