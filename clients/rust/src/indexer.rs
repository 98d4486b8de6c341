//! Off-chain aggregation of Silo events.
//!
//! [`SiloIndexer`] folds the events logged by the program into per-token
//! totals, per-farmer balances and hourly/daily snapshots. Events are keyed
//! by an id chosen by the caller (usually the transaction signature plus the
//! log index), and replaying an id that was already applied has no effect.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use silo_program::events::SiloEvent;
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};
use thiserror::Error;

pub const SECONDS_PER_HOUR: i64 = 3_600;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Invalid event data")]
    InvalidEvent,
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] std::io::Error),
}

/// Per-token totals.
///
/// Values are signed so that deltas can be stored with the same type.
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenTotals {
    pub deposited: i128,
    pub deposited_bdv: i128,
    pub withdrawn: i128,
}

impl TokenTotals {
    fn add(&mut self, other: &TokenTotals) {
        self.deposited += other.deposited;
        self.deposited_bdv += other.deposited_bdv;
        self.withdrawn += other.withdrawn;
    }
}

#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FarmerBalances {
    pub stalk: i128,
    pub seeds: i128,
}

/// State of a token at the end of an hour or a day.
#[derive(BorshDeserialize, BorshSerialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenSnapshot {
    /// Cumulative totals after the latest event of the period.
    pub totals: TokenTotals,
    /// Changes accumulated within the period.
    pub deltas: TokenTotals,
    /// Timestamp of the latest event of the period.
    pub last_update: UnixTimestamp,
}

#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct SiloIndexer {
    applied: BTreeSet<String>,
    tokens: BTreeMap<Pubkey, TokenTotals>,
    farmers: BTreeMap<Pubkey, FarmerBalances>,
    hourly: BTreeMap<(Pubkey, i64), TokenSnapshot>,
    daily: BTreeMap<(Pubkey, i64), TokenSnapshot>,
}

impl SiloIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `event` unless `event_id` was already applied.
    ///
    /// Returns `true` when the event changed the indexer state.
    pub fn apply(&mut self, event_id: &str, timestamp: UnixTimestamp, event: &SiloEvent) -> bool {
        if !self.applied.insert(event_id.to_string()) {
            return false;
        }

        match event {
            SiloEvent::AddDeposit {
                token, amount, bdv, ..
            } => self.update_token(
                token,
                timestamp,
                TokenTotals {
                    deposited: *amount as i128,
                    deposited_bdv: *bdv as i128,
                    withdrawn: 0,
                },
            ),
            SiloEvent::RemoveDeposit {
                token, amount, bdv, ..
            } => self.update_token(
                token,
                timestamp,
                TokenTotals {
                    deposited: -(*amount as i128),
                    deposited_bdv: -(*bdv as i128),
                    withdrawn: 0,
                },
            ),
            SiloEvent::RemoveDeposits {
                token,
                bdvs,
                total,
                ..
            } => {
                let bdv: i128 = bdvs.iter().map(|bdv| *bdv as i128).sum();
                self.update_token(
                    token,
                    timestamp,
                    TokenTotals {
                        deposited: -(*total as i128),
                        deposited_bdv: -bdv,
                        withdrawn: 0,
                    },
                )
            }
            SiloEvent::AddWithdrawal { token, amount, .. } => self.update_token(
                token,
                timestamp,
                TokenTotals {
                    withdrawn: *amount as i128,
                    ..Default::default()
                },
            ),
            SiloEvent::RemoveWithdrawal { token, amount, .. }
            | SiloEvent::RemoveWithdrawals { token, amount, .. } => self.update_token(
                token,
                timestamp,
                TokenTotals {
                    withdrawn: -(*amount as i128),
                    ..Default::default()
                },
            ),
            SiloEvent::StalkBalanceChanged { account, delta } => {
                self.farmers.entry(*account).or_default().stalk += delta;
            }
            SiloEvent::SeedsBalanceChanged { account, delta } => {
                self.farmers.entry(*account).or_default().seeds += delta;
            }
        }

        true
    }

    /// Decodes a `sol_log_data` payload and applies it.
    pub fn apply_log(
        &mut self,
        event_id: &str,
        timestamp: UnixTimestamp,
        data: &[u8],
    ) -> Result<bool, IndexerError> {
        let event = SiloEvent::unpack(data).map_err(|_| IndexerError::InvalidEvent)?;
        Ok(self.apply(event_id, timestamp, &event))
    }

    pub fn token_totals(&self, token: &Pubkey) -> TokenTotals {
        self.tokens.get(token).copied().unwrap_or_default()
    }

    pub fn farmer_balances(&self, account: &Pubkey) -> FarmerBalances {
        self.farmers.get(account).copied().unwrap_or_default()
    }

    /// Snapshot of `token` for the hour containing `timestamp`.
    pub fn hourly_snapshot(
        &self,
        token: &Pubkey,
        timestamp: UnixTimestamp,
    ) -> Option<&TokenSnapshot> {
        self.hourly.get(&(*token, timestamp.div_euclid(SECONDS_PER_HOUR)))
    }

    /// Snapshot of `token` for the day containing `timestamp`.
    pub fn daily_snapshot(
        &self,
        token: &Pubkey,
        timestamp: UnixTimestamp,
    ) -> Option<&TokenSnapshot> {
        self.daily.get(&(*token, timestamp.div_euclid(SECONDS_PER_DAY)))
    }

    pub fn is_applied(&self, event_id: &str) -> bool {
        self.applied.contains(event_id)
    }

    /// Serializes the indexer state so it can be restored later.
    pub fn checkpoint(&self) -> Result<Vec<u8>, IndexerError> {
        Ok(self.try_to_vec()?)
    }

    pub fn restore(data: &[u8]) -> Result<Self, IndexerError> {
        Ok(Self::try_from_slice(data)?)
    }

    fn update_token(&mut self, token: &Pubkey, timestamp: UnixTimestamp, delta: TokenTotals) {
        let totals = self.tokens.entry(*token).or_default();
        totals.add(&delta);
        let totals = *totals;

        for (snapshots, period) in [
            (&mut self.hourly, SECONDS_PER_HOUR),
            (&mut self.daily, SECONDS_PER_DAY),
        ] {
            let snapshot = snapshots
                .entry((*token, timestamp.div_euclid(period)))
                .or_default();
            snapshot.totals = totals;
            snapshot.deltas.add(&delta);
            snapshot.last_update = timestamp;
        }
    }
}
