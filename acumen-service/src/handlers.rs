//! Axum route handlers for the wallet service.
//!
//! All three endpoints are thin wrappers: they validate input, delegate to
//! the core wallet stack, and shape the JSON response. No wallet logic lives
//! here.

use std::sync::Arc;

use alloy_primitives::Address;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use acumen::balance::PortfolioSnapshot;
use acumen::chain::{Chain, Token};
use acumen::identity::{DepositAddressSet, UserIdentifier, resolve_deposit_addresses};
use acumen::portfolio::Aggregator;
use acumen::pseudo;
use acumen_evm::EvmBalanceSource;
use acumen_http::{CoinGeckoClient, PrivyIdentityClient};

use crate::error::ServiceError;

/// Shared application state for the wallet service.
#[derive(Debug)]
pub struct AppState {
    /// Identity-provider client for session resolution.
    pub identity: PrivyIdentityClient,
    /// Balance aggregator over the EVM transport and the price oracle.
    pub aggregator: Aggregator<EvmBalanceSource, CoinGeckoClient>,
    /// Chains offered for deposits and balance aggregation.
    pub supported_chains: Vec<Chain>,
    /// Tokens offered for deposits.
    pub supported_tokens: Vec<Token>,
    /// Deposit-address strategy label echoed in session responses.
    pub strategy: String,
}

/// Shared state handle.
pub type ServiceState = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SessionRequest {
    user_id: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    #[serde(flatten)]
    addresses: DepositAddressSet,
    strategy: String,
}

/// `POST /session` — Resolves per-user deposit addresses.
///
/// Accepts `{userId}` or `{email}`; with neither, resolves the `anonymous`
/// placeholder. Never fails: identity-provider problems degrade to
/// deterministic addresses.
pub(crate) async fn post_session(
    State(state): State<ServiceState>,
    body: Option<Json<SessionRequest>>,
) -> Json<SessionResponse> {
    let Json(request) = body.unwrap_or_default();
    let identifier = UserIdentifier::from_parts(request.user_id, request.email);
    let addresses = resolve_deposit_addresses(
        &state.identity,
        &identifier,
        &state.supported_chains,
        &state.supported_tokens,
    )
    .await;
    Json(SessionResponse { addresses, strategy: state.strategy.clone() })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DepositAddressQuery {
    account: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DepositAddressResponse {
    address: String,
}

/// `GET /deposit-address?account=` — Mints a deterministic pseudo deposit
/// address for free-form input.
pub(crate) async fn get_deposit_address(
    Query(query): Query<DepositAddressQuery>,
) -> Json<DepositAddressResponse> {
    let account = query.account.as_deref().filter(|a| !a.is_empty()).unwrap_or("anonymous");
    Json(DepositAddressResponse { address: pseudo::generate_address(account) })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BalanceRequest {
    address: String,
    #[serde(default)]
    chains: Option<Vec<String>>,
}

/// `POST /balance` — Aggregates balances for an address across chains.
///
/// # Errors
///
/// Returns 400 for a malformed address or an unsupported chain identifier.
/// Per-chain and per-token fetch failures do not error; they appear as zero
/// balances in the snapshot.
pub(crate) async fn post_balance(
    State(state): State<ServiceState>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<PortfolioSnapshot>, ServiceError> {
    if request.address.parse::<Address>().is_err() {
        return Err(ServiceError::InvalidAddress(request.address));
    }
    let chains = match request.chains {
        Some(ids) => ids
            .iter()
            .map(|id| id.parse::<Chain>())
            .collect::<Result<Vec<_>, _>>()?,
        None => state.supported_chains.clone(),
    };
    let snapshot = state.aggregator.aggregate(&request.address, &chains).await;
    Ok(Json(snapshot))
}

/// Health check endpoint.
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Creates an axum [`axum::Router`] with all wallet service endpoints.
///
/// Endpoints:
/// - `POST /session` — resolve per-user deposit addresses
/// - `GET /deposit-address` — mint a deterministic pseudo-address
/// - `POST /balance` — aggregate balances across chains
/// - `GET /health` — liveness check
pub fn service_router(state: ServiceState) -> axum::Router {
    axum::Router::new()
        .route("/session", axum::routing::post(post_session))
        .route("/deposit-address", axum::routing::get(get_deposit_address))
        .route("/balance", axum::routing::post(post_balance))
        .route("/health", axum::routing::get(health))
        .with_state(state)
}
