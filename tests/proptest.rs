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

//! Property-based tests for the ledger engine.
//!
//! These tests verify invariants that should hold for any sequence of
//! transfers.

use money_transfer_rs::{AccountId, Currency, Engine, ExchangeTable, LedgerError, Money, Operation};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate a non-negative amount (0 to 10000 with 2 decimal places).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Gbp),
        Just(Currency::Eur),
        Just(Currency::Usd),
    ]
}

/// A transfer between two of `accounts` accounts, possibly the same one.
fn arb_transfer(accounts: u64) -> impl Strategy<Value = (u64, u64, Decimal, Currency)> {
    (0..accounts, 0..accounts, arb_amount(), arb_currency())
}

fn open_accounts(engine: &Engine, balances: &[(Decimal, Currency)]) -> Vec<AccountId> {
    balances
        .iter()
        .map(|(amount, currency)| engine.create_account(*amount, currency.code()).unwrap().id())
        .collect()
}

// =============================================================================
// Balance Invariant Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// No sequence of transfers drives a non-negative balance below zero.
    #[test]
    fn balances_never_negative(
        balances in prop::collection::vec((arb_amount(), arb_currency()), 2..6),
        transfers in prop::collection::vec(arb_transfer(6), 0..30),
    ) {
        let engine = Engine::new();
        let ids = open_accounts(&engine, &balances);

        for (from, to, amount, currency) in transfers {
            let from = ids[from as usize % ids.len()];
            let to = ids[to as usize % ids.len()];
            let _ = engine.transfer(from, to, amount, currency.code());
        }

        for account in engine.accounts() {
            prop_assert!(account.balance().amount() >= Decimal::ZERO);
        }
    }

    /// Account currencies never change, whatever currency transfers use.
    #[test]
    fn account_currency_is_fixed(
        balances in prop::collection::vec((arb_amount(), arb_currency()), 2..6),
        transfers in prop::collection::vec(arb_transfer(6), 0..30),
    ) {
        let engine = Engine::new();
        let ids = open_accounts(&engine, &balances);

        for (from, to, amount, currency) in transfers {
            let from = ids[from as usize % ids.len()];
            let to = ids[to as usize % ids.len()];
            let _ = engine.transfer(from, to, amount, currency.code());
        }

        for (id, (_, currency)) in ids.iter().zip(&balances) {
            prop_assert_eq!(engine.get_account(*id).unwrap().balance().currency(), *currency);
        }
    }

    /// Transfers within one currency conserve the total.
    #[test]
    fn same_currency_transfers_conserve_total(
        balances in prop::collection::vec(arb_amount(), 2..6),
        transfers in prop::collection::vec(arb_transfer(6), 0..30),
    ) {
        let engine = Engine::new();
        let ids: Vec<AccountId> = balances
            .iter()
            .map(|amount| engine.create_account(*amount, "EUR").unwrap().id())
            .collect();
        let total_before: Decimal = balances.iter().sum();

        for (from, to, amount, _) in transfers {
            let from = ids[from as usize % ids.len()];
            let to = ids[to as usize % ids.len()];
            let _ = engine.transfer(from, to, amount, "EUR");
        }

        let total_after: Decimal = engine
            .accounts()
            .iter()
            .map(|a| a.balance().amount())
            .sum();
        prop_assert_eq!(total_before, total_after);
    }

    /// A failed transfer leaves both balances exactly as they were.
    #[test]
    fn failed_transfer_mutates_nothing(
        sender_balance in arb_amount(),
        receiver_balance in arb_amount(),
        amount in arb_amount(),
        currency in arb_currency(),
    ) {
        let engine = Engine::new();
        let sender = engine.create_account(sender_balance, "GBP").unwrap().id();
        let receiver = engine.create_account(receiver_balance, "USD").unwrap().id();

        let before = (engine.get_account(sender).unwrap(), engine.get_account(receiver).unwrap());
        let result = engine.transfer(sender, receiver, amount, currency.code());
        let after = (engine.get_account(sender).unwrap(), engine.get_account(receiver).unwrap());

        match result {
            Ok(()) => prop_assert!(after.0.balance().amount() <= before.0.balance().amount()),
            Err(e) => {
                prop_assert_eq!(e, LedgerError::InsufficientBalance);
                prop_assert_eq!(
                    after.0.balance().amount().serialize(),
                    before.0.balance().amount().serialize()
                );
                prop_assert_eq!(
                    after.1.balance().amount().serialize(),
                    before.1.balance().amount().serialize()
                );
            }
        }
    }

    /// Debit succeeds exactly when the converted amount fits in the balance.
    #[test]
    fn debit_fails_iff_balance_too_small(
        balance in arb_amount(),
        amount in arb_amount(),
        currency in arb_currency(),
    ) {
        let engine = Engine::new();
        let base = Money::new(balance, Currency::Gbp);
        let change = Money::new(amount, currency);
        let converted = ExchangeTable::new()
            .convert(amount, currency, Currency::Gbp)
            .unwrap()
            .amount();

        let result = engine.apply_delta(&base, &change, Operation::Debit);
        if converted > balance {
            prop_assert_eq!(result, Err(LedgerError::InsufficientBalance));
        } else {
            prop_assert_eq!(result, Ok(Money::new(balance - converted, Currency::Gbp)));
        }
    }
}

// =============================================================================
// Conversion Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Converting to the same currency returns the amount bit for bit.
    #[test]
    fn identity_conversion_preserves_scale(
        amount in arb_amount(),
        currency in arb_currency(),
    ) {
        let converted = ExchangeTable::new().convert(amount, currency, currency).unwrap();
        prop_assert_eq!(converted.amount().serialize(), amount.serialize());
    }

    /// Conversion is exact decimal multiplication by the table rate.
    #[test]
    fn conversion_is_exact_product(
        amount in arb_amount(),
        source in arb_currency(),
        target in arb_currency(),
    ) {
        let table = ExchangeTable::new();
        let converted = table.convert(amount, source, target).unwrap();
        prop_assert_eq!(converted.currency(), target);
        prop_assert_eq!(converted.amount(), amount * table.rate(source, target));
    }
}
