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

//! Static currency exchange table.
//!
//! `rate(A, B)` converts one unit of `A` into `B`:
//!
//! | from \ to | GBP  | EUR  | USD  |
//! |-----------|------|------|------|
//! | GBP       | 1.00 | 1.15 | 1.31 |
//! | EUR       | 0.87 | 1.00 | 1.13 |
//! | USD       | 0.77 | 0.88 | 1.00 |
//!
//! The table is not round-trip consistent: 100 GBP converts to 115 EUR, which
//! converts back to 100.05 GBP.

use crate::LedgerError;
use crate::base::Currency;
use crate::money::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Read-only rate matrix indexed by [`Currency`].
#[derive(Debug, Clone)]
pub struct ExchangeTable {
    rates: [[Decimal; 3]; 3],
}

impl ExchangeTable {
    pub fn new() -> Self {
        Self {
            rates: [
                [dec!(1.00), dec!(1.15), dec!(1.31)],
                [dec!(0.87), dec!(1.00), dec!(1.13)],
                [dec!(0.77), dec!(0.88), dec!(1.00)],
            ],
        }
    }

    pub fn rate(&self, source: Currency, target: Currency) -> Decimal {
        self.rates[source.index()][target.index()]
    }

    /// Converts `amount` from `source` into `target`.
    ///
    /// Same-currency conversion returns the amount untouched so that its scale
    /// is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if the product does not fit.
    pub fn convert(
        &self,
        amount: Decimal,
        source: Currency,
        target: Currency,
    ) -> Result<Money, LedgerError> {
        if source == target {
            return Ok(Money::new(amount, target));
        }
        let converted = amount
            .checked_mul(self.rate(source, target))
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(Money::new(converted, target))
    }
}

impl Default for ExchangeTable {
    fn default() -> Self {
        Self::new()
    }
}
