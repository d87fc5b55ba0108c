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

//! Ledger accounts.
//!
//! An [`Account`] is a snapshot of a stored record. Balances change only
//! through [`Engine::transfer`](crate::Engine::transfer); holding an `Account`
//! never aliases the store.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use money_transfer_rs::{AccountId, Currency, Engine};
//!
//! let engine = Engine::new();
//! let account = engine.create_account(dec!(250.00), "eur").unwrap();
//! assert_eq!(account.id(), AccountId(1_000_000));
//! assert_eq!(account.balance().currency(), Currency::Eur);
//! ```

use crate::base::AccountId;
use crate::money::Money;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Ledger account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: Money,
}

impl Account {
    pub(crate) const DECIMAL_PRECISION: u32 = 4;

    pub(crate) fn new(id: AccountId, balance: Money) -> Self {
        Self { id, balance }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Returns a copy of this record carrying a new balance.
    pub fn with_balance(&self, balance: Money) -> Self {
        Self {
            id: self.id,
            balance,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account {{ id={}, amount={} }}", self.id, self.balance)
    }
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rounded = Money::new(
            self.balance.amount().round_dp(Account::DECIMAL_PRECISION),
            self.balance.currency(),
        );
        let mut state = serializer.serialize_struct("Account", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("balance", &rounded)?;
        state.end()
    }
}
