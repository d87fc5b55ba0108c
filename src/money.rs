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

//! Monetary amounts.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use money_transfer_rs::{Currency, Money, Operation};
//!
//! let balance = Money::new(dec!(100.00), Currency::Gbp);
//! let debited = balance.apply(dec!(30.00), Operation::Debit).unwrap();
//! assert_eq!(debited.amount(), dec!(70.00));
//! assert_eq!(debited.currency(), Currency::Gbp);
//! ```

use crate::LedgerError;
use crate::base::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Increases the balance.
    Credit,
    /// Decreases the balance.
    Debit,
}

/// An exact decimal amount in one currency.
///
/// Values are immutable; arithmetic returns a new `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Builds a `Money` from an untyped currency code.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnsupportedCurrency`] for codes outside the supported set.
    pub fn parse(amount: Decimal, currency: &str) -> Result<Self, LedgerError> {
        Ok(Self::new(amount, currency.parse()?))
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Adds or subtracts a raw amount, keeping this currency.
    ///
    /// The caller is responsible for `delta` already being expressed in
    /// `self.currency()`. Sign of the result is not checked here.
    pub fn apply(&self, delta: Decimal, operation: Operation) -> Result<Money, LedgerError> {
        let amount = match operation {
            Operation::Credit => self.amount.checked_add(delta),
            Operation::Debit => self.amount.checked_sub(delta),
        }
        .ok_or(LedgerError::AmountOverflow)?;
        Ok(Money::new(amount, self.currency))
    }

    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.amount, self.currency)
    }
}
