use spl_program_error::spl_program_error;

/// Errors returned by the Silo program.
///
/// The discriminant of each variant is the `ProgramError::Custom` code.
#[spl_program_error]
pub enum SiloError {
    /// Deposits, withdrawals and transfers must move a non-zero amount.
    #[error("Amount must be greater than 0")]
    ZeroAmount,

    /// The token entry does not exist or is malformed.
    #[error("Unknown silo token")]
    UnknownToken,

    /// The token is no longer accepting deposits.
    #[error("Token is not whitelisted")]
    TokenNotWhitelisted,

    /// Re-pricing is only available for unripe tokens.
    #[error("Token does not use the unripe pro-rata policy")]
    NotUnripeToken,

    /// No crate exists for the given season.
    #[error("Crate not found")]
    CrateNotFound,

    #[error("Crate balance too low")]
    InsufficientCrateBalance,

    #[error("Seasons and amounts have different lengths")]
    LengthMismatch,

    /// The external price source could not be read or returned a
    /// non-positive value.
    #[error("Price oracle unavailable")]
    OracleUnavailable,

    #[error("Withdrawal is not yet claimable")]
    NotYetClaimable,

    #[error("Nothing to claim")]
    NothingToClaim,

    /// A stalk or seeds debit exceeded the recorded balance. This is never
    /// expected and indicates a broken ledger invariant.
    #[error("Balance underflow")]
    Underflow,

    #[error("Invalid authority")]
    InvalidAuthority,

    #[error("Invalid mint")]
    InvalidMint,

    #[error("Invalid token owner")]
    InvalidTokenOwner,

    #[error("Incorrect vault account")]
    IncorrectVaultAccount,

    #[error("Invalid account data length")]
    InvalidAccountDataLength,

    /// The price source account does not match the one registered for the token.
    #[error("Invalid BDV source")]
    InvalidBdvSource,

    #[error("Invalid destination account")]
    InvalidDestinationAccount,

    /// Re-pricing an unripe crate may only keep or raise its BDV.
    #[error("Re-priced BDV is lower than the current BDV")]
    BdvDecreased,
}

#[macro_export]
macro_rules! err {
    ( $error:expr ) => {{
        Err($error.into())
    }};
    ( $error:expr, $msg:expr ) => {{
        solana_program::msg!("[ERROR] {}", $msg);
        Err($error.into())
    }};
    ( $error:expr, $msg:literal, $($args:tt)+ ) => {{
        err!($error, &format!($msg, $($args)+))
    }};
}
