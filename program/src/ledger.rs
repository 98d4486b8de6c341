//! Crate ledger operations.
//!
//! These functions hold the accounting rules of the Silo and operate on
//! already validated account states. Each one mows the farmer first, then
//! updates the crate, the token totals and the rewards together.

use solana_program::program_error::ProgramError;

use crate::{
    bdv::{compute_bdv, BdvSource},
    err,
    error::SiloError,
    require,
    rewards::{credit, debit, mow, rewards_for, RewardDelta},
    state::{Config, Deposit, Farmer, SiloToken, Withdrawal},
};

/// Amount and value taken out of a crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Removal {
    pub amount: u64,
    pub bdv: u64,
    pub rewards: RewardDelta,
}

/// Adds `amount` with `bdv` to `deposit` and credits the matching rewards.
///
/// Used for new deposits, for the receiving side of a transfer and when a
/// re-priced amount is put back into its crate.
pub fn add_deposit(
    config: &mut Config,
    token: &mut SiloToken,
    farmer: &mut Farmer,
    deposit: &mut Deposit,
    amount: u64,
    bdv: u64,
) -> Result<RewardDelta, ProgramError> {
    require!(amount > 0, SiloError::ZeroAmount, "amount");

    mow(config, farmer)?;

    let rewards = rewards_for(token, bdv, deposit.season(), config.current_season())?;

    deposit.amount = deposit
        .amount()
        .checked_add(amount)
        .ok_or(ProgramError::ArithmeticOverflow)?
        .into();
    deposit.bdv = deposit
        .bdv()
        .checked_add(bdv)
        .ok_or(ProgramError::ArithmeticOverflow)?
        .into();

    token.add_deposited(amount, bdv)?;
    credit(config, farmer, rewards)?;

    Ok(rewards)
}

/// BDV carried by `amount` of `deposit`: `bdv * amount / deposited`,
/// truncated toward zero.
fn removed_bdv(deposit: &Deposit, amount: u64) -> Result<u64, ProgramError> {
    require!(amount > 0, SiloError::ZeroAmount, "amount");

    let season = deposit.season();
    let deposited = deposit.amount();

    if deposit.is_empty() {
        return err!(
            SiloError::CrateNotFound,
            "no crate for {} at season {}",
            deposit.owner,
            season
        );
    }

    if amount > deposited {
        return err!(
            SiloError::InsufficientCrateBalance,
            "crate at season {}: requested {}, available {}",
            season,
            amount,
            deposited
        );
    }

    (deposit.bdv() as u128)
        .checked_mul(amount as u128)
        .map(|value| value / deposited as u128)
        .and_then(|value| u64::try_from(value).ok())
        .ok_or(ProgramError::ArithmeticOverflow)
}

/// Removes `amount` from `deposit` together with its proportional BDV.
///
/// The removed BDV is `bdv * amount / deposited`, truncated toward zero.
pub fn remove_deposit(
    config: &mut Config,
    token: &mut SiloToken,
    farmer: &mut Farmer,
    deposit: &mut Deposit,
    amount: u64,
) -> Result<Removal, ProgramError> {
    let bdv = removed_bdv(deposit, amount)?;
    let season = deposit.season();
    let deposited = deposit.amount();

    mow(config, farmer)?;

    let rewards = rewards_for(token, bdv, season, config.current_season())?;
    debit(config, farmer, rewards)?;

    deposit.amount = (deposited - amount).into();
    deposit.bdv = deposit
        .bdv()
        .checked_sub(bdv)
        .ok_or(SiloError::Underflow)?
        .into();

    token.remove_deposited(amount, bdv)?;

    Ok(Removal {
        amount,
        bdv,
        rewards,
    })
}

/// Removes `amount` from `deposit` and queues it on `withdrawal`.
pub fn withdraw_deposit(
    config: &mut Config,
    token: &mut SiloToken,
    farmer: &mut Farmer,
    deposit: &mut Deposit,
    withdrawal: &mut Withdrawal,
    amount: u64,
) -> Result<Removal, ProgramError> {
    let removal = remove_deposit(config, token, farmer, deposit, amount)?;

    token.add_withdrawn(removal.amount)?;
    withdrawal.enqueue(removal.amount)?;

    Ok(removal)
}

/// Moves `amount` from one crate to the crate with the same season of
/// another farmer, keeping the proportional BDV.
pub fn transfer_deposit(
    config: &mut Config,
    token: &mut SiloToken,
    sender: &mut Farmer,
    sender_deposit: &mut Deposit,
    recipient: &mut Farmer,
    recipient_deposit: &mut Deposit,
    amount: u64,
) -> Result<Removal, ProgramError> {
    require!(
        sender_deposit.season() == recipient_deposit.season(),
        ProgramError::InvalidArgument,
        "recipient crate season"
    );

    let removal = remove_deposit(config, token, sender, sender_deposit, amount)?;
    add_deposit(
        config,
        token,
        recipient,
        recipient_deposit,
        removal.amount,
        removal.bdv,
    )?;

    Ok(removal)
}

/// Re-prices `amount` of an unripe crate at the current ratio.
///
/// The amount is removed with its proportional BDV and added back with the
/// BDV given by `source`. The new BDV may not be lower than the removed one,
/// so a ratio that fell since the deposit leaves the crate untouched. Returns
/// the removal and the new BDV.
pub fn reprice_deposit(
    config: &mut Config,
    token: &mut SiloToken,
    farmer: &mut Farmer,
    deposit: &mut Deposit,
    source: &BdvSource,
    amount: u64,
) -> Result<(Removal, u64), ProgramError> {
    require!(
        matches!(source, BdvSource::Unripe { .. }),
        SiloError::NotUnripeToken,
        "crate at season {}",
        deposit.season()
    );

    let bdv = compute_bdv(source, amount)?;
    let current_bdv = removed_bdv(deposit, amount)?;

    if bdv < current_bdv {
        return err!(
            SiloError::BdvDecreased,
            "crate at season {}: bdv {} would drop to {}",
            deposit.season(),
            current_bdv,
            bdv
        );
    }

    let removal = remove_deposit(config, token, farmer, deposit, amount)?;
    add_deposit(config, token, farmer, deposit, amount, bdv)?;

    Ok((removal, bdv))
}

/// Empties a claimable withdrawal and returns the amount to pay out.
pub fn claim_withdrawal(
    config: &Config,
    token: &mut SiloToken,
    withdrawal: &mut Withdrawal,
) -> Result<u64, ProgramError> {
    let amount = withdrawal.claim(config.current_season())?;
    token.remove_withdrawn(amount)?;

    Ok(amount)
}
