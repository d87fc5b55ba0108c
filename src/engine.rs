// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account ledger and transfer engine.
//!
//! The [`Engine`] validates requests, converts currencies through the
//! [`ExchangeTable`] and applies balance changes to the [`AccountStore`].
//!
//! # Operations
//!
//! - **Create account**: Opens an account with any opening balance in a supported currency.
//! - **Get account**: Returns a snapshot of an account.
//! - **Transfer**: Debits the sender and credits the receiver, converting the
//!   transfer amount into each account's currency.
//!
//! # Thread Safety
//!
//! The engine is `Send + Sync`. A transfer holds the sender and receiver
//! records locked from read to write, lower identifier first, so concurrent
//! transfers over the same accounts serialize and cannot deadlock.

use crate::LedgerError;
use crate::account::Account;
use crate::base::{AccountId, Currency};
use crate::exchange::ExchangeTable;
use crate::money::{Money, Operation};
use crate::store::AccountStore;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Ledger engine owning the account store and the exchange table.
///
/// # Invariants
///
/// - Every stored balance is in a supported currency.
/// - A transfer never leaves either balance below zero.
/// - A failed transfer leaves both accounts untouched.
pub struct Engine {
    store: AccountStore,
    rates: ExchangeTable,
}

impl Engine {
    /// Creates an engine with no accounts and the reference exchange table.
    pub fn new() -> Self {
        Engine {
            store: AccountStore::new(),
            rates: ExchangeTable::new(),
        }
    }

    /// Opens an account holding `amount` in `currency`.
    ///
    /// The currency code is case-insensitive and stored uppercase. Opening
    /// balances are not sign-checked.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UnsupportedCurrency`] - Empty or unknown currency code.
    pub fn create_account(&self, amount: Decimal, currency: &str) -> Result<Account, LedgerError> {
        let balance = Money::parse(amount, currency).inspect_err(|_| {
            debug!(currency, "rejected account creation: unsupported currency");
        })?;
        let account = self.store.create(balance);
        info!(
            account_id = %account.id(),
            amount = %balance.amount(),
            currency = %balance.currency(),
            "account created"
        );
        Ok(account)
    }

    /// Returns a snapshot of an account.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::AccountNotFound`] - No account has this identifier.
    pub fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.store.get(id).inspect_err(|_| {
            debug!(account_id = %id, "account lookup failed");
        })
    }

    /// Returns snapshots of all accounts ordered by identifier.
    pub fn accounts(&self) -> Vec<Account> {
        self.store.snapshot()
    }

    /// Moves `amount` of `currency` from `sender` to `receiver`.
    ///
    /// Checks run in this order, and the first failure is returned:
    ///
    /// | Check | Error |
    /// |-------|-------|
    /// | Sender and receiver differ | [`LedgerError::InvalidReceiver`] |
    /// | Sender exists | [`LedgerError::AccountNotFound`] |
    /// | Receiver exists | [`LedgerError::AccountNotFound`] |
    /// | Currency is supported | [`LedgerError::UnsupportedCurrency`] |
    /// | Sender balance stays non-negative | [`LedgerError::InsufficientBalance`] |
    /// | Receiver balance stays non-negative | [`LedgerError::InsufficientBalance`] |
    ///
    /// Both new balances are computed before either is written, so a failure
    /// leaves both accounts unchanged.
    pub fn transfer(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Decimal,
        currency: &str,
    ) -> Result<(), LedgerError> {
        // Identity check first: self-transfer is rejected even for unknown ids.
        if sender == receiver {
            debug!(account_id = %sender, "rejected self-transfer");
            return Err(LedgerError::InvalidReceiver);
        }

        self.store
            .update_pair(sender, receiver, |sender_account, receiver_account| {
                let change = Money::parse(amount, currency)?;
                let sender_balance =
                    self.apply_delta(&sender_account.balance(), &change, Operation::Debit)?;
                let receiver_balance =
                    self.apply_delta(&receiver_account.balance(), &change, Operation::Credit)?;

                Ok((
                    sender_account.with_balance(sender_balance),
                    receiver_account.with_balance(receiver_balance),
                ))
            })
            .inspect(|_| {
                info!(%sender, %receiver, %amount, currency, "transfer completed");
            })
            .inspect_err(|e| {
                debug!(%sender, %receiver, %amount, currency, error = %e, "transfer rejected");
            })
    }

    /// Converts `amount` between two currency codes.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::UnsupportedCurrency`] - Either code is unsupported.
    /// - [`LedgerError::AmountOverflow`] - Converted value does not fit.
    pub fn convert(&self, amount: Decimal, source: &str, target: &str) -> Result<Money, LedgerError> {
        let source: Currency = source.parse()?;
        let target: Currency = target.parse()?;
        self.rates.convert(amount, source, target)
    }

    /// Applies `change` to `base`, converting it into the base currency first.
    ///
    /// The result is always in `base`'s currency. Same-currency changes skip
    /// conversion entirely.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientBalance`] - Result is below zero (for
    ///   credits as well as debits).
    /// - [`LedgerError::AmountOverflow`] - Result does not fit.
    pub fn apply_delta(
        &self,
        base: &Money,
        change: &Money,
        operation: Operation,
    ) -> Result<Money, LedgerError> {
        let delta = if change.currency() == base.currency() {
            change.amount()
        } else {
            self.rates
                .convert(change.amount(), change.currency(), base.currency())?
                .amount()
        };

        let result = base.apply(delta, operation)?;
        if result.is_negative() {
            return Err(LedgerError::InsufficientBalance);
        }
        Ok(result)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
