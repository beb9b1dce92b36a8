use soroban_sdk::contracterror;

/// Error codes shared by every bridge contract.
///
/// Codes are stable: a pool error surfaced through the bridge keeps its value.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,

    // Circuit breakers
    SwapProhibited = 3,
    DepositProhibited = 4,
    WithdrawProhibited = 5,

    // Replay protection
    TokensAlreadySent = 6,
    MessageProcessed = 7,
    MessageAlreadySent = 8,

    // Liquidity and market conditions
    SlippageExceeded = 9,
    LowVUsdBalance = 10,
    LowTokenBalance = 11,
    InsufficientReserves = 12,

    // Arguments and arithmetic
    ZeroAmount = 13,
    ZeroChanges = 14,
    AmountTooLowForFee = 15,
    NotEnoughFee = 16,
    NotEnoughAmount = 17,
    FeeTooHigh = 18,
    PoolOverflow = 19,
    ZeroRecipient = 20,
    InvalidParameter = 21,

    // Routing
    SourceNotRegistered = 22,
    NoMessage = 23,
    UnknownChain = 24,
    UnknownChainOrToken = 25,
    UnsupportedToken = 26,
    UnknownMessenger = 27,
    WrongDestinationChain = 28,
    WrongSourceChain = 29,
    InvalidChainId = 30,
    UnsupportedAddress = 31,
    WrongSecondaryValidator = 32,

    Reentrancy = 33,

    MathOverflow = 34,
    DivisionByZero = 35,
    ExternalCallFailed = 36,
}
