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

//! Error types for ledger operations.
//!
//! The `Display` text of each variant is surfaced verbatim to API clients.

use crate::base::AccountId;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Currency code outside GBP, EUR and USD
    #[error("Supported currencies are GBP, EUR, and USD.")]
    UnsupportedCurrency,

    /// Referenced account was never created
    #[error("Account cannot be found - {0}")]
    AccountNotFound(AccountId),

    /// Sender and receiver are the same account
    #[error("Sender and receiver cannot be the same account.")]
    InvalidReceiver,

    /// Balance would go below zero
    #[error("Insufficient balance. Cannot process the request.")]
    InsufficientBalance,

    /// Result does not fit the 96-bit decimal range
    #[error("Amount exceeds the supported range.")]
    AmountOverflow,
}
