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

//! # Money Transfer
//!
//! This library provides an in-memory account ledger that moves funds between
//! accounts held in GBP, EUR or USD, converting at a static exchange table.
//!
//! ## Core Components
//!
//! - [`Engine`]: Account creation, lookup and transfers
//! - [`AccountStore`]: Owns account records and issues identifiers
//! - [`ExchangeTable`]: Static GBP/EUR/USD rate matrix
//! - [`Money`]: Exact decimal amount paired with a [`Currency`]
//! - [`LedgerError`]: Failures reported to callers
//!
//! ## Example
//!
//! ```
//! use money_transfer_rs::{Currency, Engine};
//! use rust_decimal_macros::dec;
//!
//! let engine = Engine::new();
//! let alice = engine.create_account(dec!(1000), "GBP").unwrap();
//! let bob = engine.create_account(dec!(500), "GBP").unwrap();
//!
//! // 300 EUR converts to 261 GBP on both sides.
//! engine.transfer(alice.id(), bob.id(), dec!(300), "EUR").unwrap();
//!
//! let alice = engine.get_account(alice.id()).unwrap();
//! assert_eq!(alice.balance().amount(), dec!(739));
//! assert_eq!(alice.balance().currency(), Currency::Gbp);
//! ```
//!
//! ## Thread Safety
//!
//! The engine can be shared across threads. Transfers lock both accounts in
//! identifier order for their whole read-compute-write sequence.

pub mod account;
pub mod api;
mod base;
mod engine;
pub mod error;
mod exchange;
mod money;
mod store;

pub use account::Account;
pub use base::{AccountId, Currency};
pub use engine::Engine;
pub use error::LedgerError;
pub use exchange::ExchangeTable;
pub use money::{Money, Operation};
pub use store::AccountStore;
