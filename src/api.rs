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

//! HTTP adapter for the ledger engine.
//!
//! ## Endpoints
//!
//! - `POST /create` - Open an account
//! - `POST /transfer` - Move funds between two accounts
//! - `GET /accounts` - List all accounts
//! - `GET /accounts/{id}` - Get an account by ID
//!
//! ## Example Usage
//!
//! ```bash
//! # Create
//! curl -X POST http://localhost:8080/create \
//!   -H "Content-Type: application/json" \
//!   -d '{"amount": 1000, "currency": "GBP"}'
//!
//! # Transfer
//! curl -X POST http://localhost:8080/transfer \
//!   -H "Content-Type: application/json" \
//!   -d '{"sender": 1000000, "receiver": 1000001, "amount": "300.00", "currency": "EUR"}'
//!
//! # Get account
//! curl http://localhost:8080/accounts/1000000
//! ```

use crate::{Account, AccountId, Engine, LedgerError};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};

// === Request/Response DTOs ===

/// Request body for `POST /create`.
///
/// ```json
/// {"amount": 1000, "currency": "GBP"}
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(deserialize_with = "amount_format::deserialize")]
    pub amount: Decimal,
    pub currency: String,
}

/// Request body for `POST /transfer`.
///
/// ```json
/// {"sender": 1000000, "receiver": 1000001, "amount": "200", "currency": "GBP"}
/// ```
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(deserialize_with = "id_format::deserialize")]
    pub sender: u64,
    #[serde(deserialize_with = "id_format::deserialize")]
    pub receiver: u64,
    #[serde(deserialize_with = "amount_format::deserialize")]
    pub amount: Decimal,
    pub currency: String,
}

/// Response body for a completed transfer, read back after it was applied.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub sender: Account,
    pub receiver: Account,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Amounts are accepted as JSON numbers or decimal strings.
mod amount_format {
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use serde::de::{self, Deserializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(de::Error::custom)
    }
}

/// Account ids are accepted as JSON integers or digit strings.
mod id_format {
    use serde::Deserialize;
    use serde::de::{self, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

// === Application State ===

/// Shared application state containing the ledger engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

/// Failures surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A rejected transfer. Answered with 400 whatever the cause, including
    /// unknown accounts.
    #[error(transparent)]
    Rejected(LedgerError),

    #[error("Incorrect request body format. Please refer to API Document for correct input format.")]
    IncorrectInput,

    #[error("Incorrect HTTP method. Only POST is allowed for this request.")]
    MethodNotAllowed,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(%rejection, "malformed request body");
        AppError::IncorrectInput
    }
}

fn ledger_code(error: &LedgerError) -> &'static str {
    match error {
        LedgerError::UnsupportedCurrency => "UNSUPPORTED_CURRENCY",
        LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
        LedgerError::InvalidReceiver => "INVALID_RECEIVER",
        LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
        LedgerError::AmountOverflow => "AMOUNT_OVERFLOW",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Ledger(e @ LedgerError::AccountNotFound(_)) => {
                (StatusCode::NOT_FOUND, ledger_code(e))
            }
            AppError::Ledger(e) | AppError::Rejected(e) => {
                (StatusCode::BAD_REQUEST, ledger_code(e))
            }
            AppError::IncorrectInput => (StatusCode::BAD_REQUEST, "INCORRECT_INPUT"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
        };

        debug!(status = status.as_u16(), code, error = %self, "request failed");

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /create - Open a new account.
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<Account>, AppError> {
    let Json(request) = payload?;
    let account = state
        .engine
        .create_account(request.amount, &request.currency)?;
    Ok(Json(account))
}

/// POST /transfer - Move funds and return both accounts.
async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let Json(request) = payload?;
    let sender = AccountId(request.sender);
    let receiver = AccountId(request.receiver);

    state
        .engine
        .transfer(sender, receiver, request.amount, &request.currency)
        .map_err(AppError::Rejected)?;

    Ok(Json(TransferResponse {
        sender: state.engine.get_account(sender)?,
        receiver: state.engine.get_account(receiver)?,
    }))
}

/// GET /accounts/{id} - Get account by ID.
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.engine.get_account(AccountId(id))?))
}

/// GET /accounts - List all accounts.
async fn list_accounts(State(state): State<AppState>) -> Json<Vec<Account>> {
    Json(state.engine.accounts())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

// === Router ===

/// Builds the API router over a shared engine.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/create", post(create_account).fallback(method_not_allowed))
        .route("/transfer", post(transfer).fallback(method_not_allowed))
        .route("/accounts", get(list_accounts))
        .route("/accounts/{id}", get(get_account))
        .with_state(AppState { engine })
}

/// Serves the API on an already-bound listener until the server stops.
pub async fn serve(listener: TcpListener, engine: Arc<Engine>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "ledger API listening");
    }
    axum::serve(listener, router(engine)).await
}
