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

//! In-memory account storage.
//!
//! Each record sits behind its own [`parking_lot::Mutex`] inside a
//! [`DashMap`], so reads and writes to different accounts proceed in parallel
//! while operations on the same account serialize.

use crate::LedgerError;
use crate::account::Account;
use crate::base::AccountId;
use crate::money::Money;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Owns every account record and issues account identifiers.
///
/// # Invariants
///
/// - Identifiers start at [`AccountStore::FIRST_ID`], increase by one per
///   creation and are never reused.
/// - Unknown identifiers are reported as [`LedgerError::AccountNotFound`].
/// - `replace` never inserts. Transfers write through the same overwrite
///   path, so a record's identifier never changes.
#[derive(Debug)]
pub struct AccountStore {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
    next_id: AtomicU64,
}

impl AccountStore {
    pub const FIRST_ID: AccountId = AccountId(1_000_000);

    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            next_id: AtomicU64::new(Self::FIRST_ID.0),
        }
    }

    /// Allocates the next identifier and stores a new account.
    pub fn create(&self, balance: Money) -> Account {
        let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let account = Account::new(id, balance);
        self.accounts.insert(id, Arc::new(Mutex::new(account.clone())));
        account
    }

    /// Returns a snapshot of the stored account.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if `id` was never issued.
    pub fn get(&self, id: AccountId) -> Result<Account, LedgerError> {
        Ok(self.slot(id)?.lock().clone())
    }

    /// Overwrites the stored record with the same identifier.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if no record exists for `account.id()`.
    pub fn replace(&self, account: Account) -> Result<(), LedgerError> {
        let slot = self.slot(account.id())?;
        let mut record = slot.lock();
        Self::overwrite(&mut *record, account)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshots of all accounts ordered by identifier.
    pub fn snapshot(&self) -> Vec<Account> {
        let slots: Vec<Arc<Mutex<Account>>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut accounts: Vec<Account> = slots.iter().map(|slot| slot.lock().clone()).collect();
        accounts.sort_by_key(Account::id);
        accounts
    }

    /// Reads both records, computes their replacements with `f` and stores
    /// them, holding both locks throughout.
    ///
    /// Locks are taken in ascending identifier order. `first` is looked up
    /// before `second`, so a missing `first` is reported even when both are
    /// missing. Nothing is written if `f` fails.
    pub(crate) fn update_pair<F>(
        &self,
        first: AccountId,
        second: AccountId,
        f: F,
    ) -> Result<(), LedgerError>
    where
        F: FnOnce(&Account, &Account) -> Result<(Account, Account), LedgerError>,
    {
        if first == second {
            // Mutex is not reentrant.
            return Err(LedgerError::InvalidReceiver);
        }
        let first_slot = self.slot(first)?;
        let second_slot = self.slot(second)?;

        let (mut first_guard, mut second_guard) = if first < second {
            let a = first_slot.lock();
            let b = second_slot.lock();
            (a, b)
        } else {
            let b = second_slot.lock();
            let a = first_slot.lock();
            (a, b)
        };

        let (first_record, second_record) = f(&*first_guard, &*second_guard)?;
        if second_record.id() != second {
            return Err(LedgerError::AccountNotFound(second_record.id()));
        }
        Self::overwrite(&mut *first_guard, first_record)?;
        Self::overwrite(&mut *second_guard, second_record)
    }

    /// Replaces a locked record wholesale. The replacement must carry the
    /// record's identifier.
    fn overwrite(record: &mut Account, account: Account) -> Result<(), LedgerError> {
        if record.id() != account.id() {
            return Err(LedgerError::AccountNotFound(account.id()));
        }
        *record = account;
        Ok(())
    }

    /// Clones the record handle out of the map so no shard lock is held
    /// while the record mutex is taken.
    fn slot(&self, id: AccountId) -> Result<Arc<Mutex<Account>>, LedgerError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
