//! Paymeter wallet client.

use serde::Serialize;
use serde_json::Value;

use crate::clients::common::{require, to_json, PlatformApi};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::response::take_field;
use crate::http::{OperationDescriptor, Payload};

/// Parameters for a new wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateWallet {
    /// `ETH`, `ERC20`, ...
    pub coin_type: String,
    pub wallet_name: String,
    /// `testnet` or `mainnet`.
    pub network: String,
    pub password: String,
    /// ERC20 only.
    pub contract_address: Option<String>,
    /// ERC20 only.
    pub token_symbol: Option<String>,
}

/// Parameters for a token transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendTokens {
    pub from_wallet_id: String,
    pub to_address: String,
    /// Decimal amount, at most 5 decimal places.
    pub amount: String,
    pub password: String,
    /// ERC20 only: wallet paying the fee.
    pub fee_wallet: Option<String>,
    pub fee_wallet_password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletOptions<'a> {
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_symbol: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateWalletBody<'a> {
    coin_type: &'a str,
    wallet_name: &'a str,
    network: &'a str,
    options: WalletOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOptions<'a> {
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_wallet: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_wallet_password: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBody<'a> {
    from_wallet_id: &'a str,
    to_address: &'a str,
    amount: &'a str,
    options: SendOptions<'a>,
}

#[derive(Debug, Clone)]
pub struct Paymeter {
    api: PlatformApi,
}

impl Paymeter {
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: PlatformApi::new(&config.platform.host, api_key, &config.http)?,
        })
    }

    /// Create a wallet and return its `data` (the wallet id).
    pub async fn create_wallet(&self, wallet: &CreateWallet) -> Result<Value> {
        if [&wallet.coin_type, &wallet.wallet_name, &wallet.network, &wallet.password]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(Error::invalid(
                "coinType, walletName, network and password are required fields",
            ));
        }

        let erc20 = wallet.coin_type.eq_ignore_ascii_case("erc20");
        let body = CreateWalletBody {
            coin_type: &wallet.coin_type,
            wallet_name: &wallet.wallet_name,
            network: &wallet.network,
            options: WalletOptions {
                password: &wallet.password,
                contract_address: wallet.contract_address.as_deref().filter(|_| erc20),
                token_symbol: wallet.token_symbol.as_deref().filter(|_| erc20),
            },
        };

        let response = self
            .api
            .call(
                "paymeter.create_wallet",
                OperationDescriptor::POST,
                "/api/paymeter/wallets",
                Payload::Json(to_json(&body)?),
            )
            .await?;
        tracing::info!(coin_type = %wallet.coin_type, network = %wallet.network, "Wallet created");
        take_field(response, "data")
    }

    /// Every wallet, or one wallet when `wallet_id` is given.
    pub async fn get_wallets(&self, wallet_id: Option<&str>) -> Result<Value> {
        let path = match wallet_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("/api/paymeter/wallets/{}", id),
            None => "/api/paymeter/wallets".to_string(),
        };

        let response = self
            .api
            .call("paymeter.get_wallets", OperationDescriptor::GET, &path, Payload::Empty)
            .await?;
        take_field(response, "data")
    }

    pub async fn get_withdrawals(&self, wallet_id: &str) -> Result<Value> {
        require("walletId", wallet_id)?;

        let path = format!("/api/paymeter/wallets/{}/withdrawals", wallet_id);
        let response = self
            .api
            .call("paymeter.get_withdrawals", OperationDescriptor::GET, &path, Payload::Empty)
            .await?;
        take_field(response, "data")
    }

    /// Transfer tokens and return the transaction id.
    pub async fn send(&self, transfer: &SendTokens) -> Result<Value> {
        require("walletId", &transfer.from_wallet_id)?;
        if [&transfer.to_address, &transfer.amount, &transfer.password]
            .iter()
            .any(|v| v.trim().is_empty())
        {
            return Err(Error::invalid(
                "fromWalletId, toAddress, amount and password are required fields",
            ));
        }

        let body = SendBody {
            from_wallet_id: &transfer.from_wallet_id,
            to_address: &transfer.to_address,
            amount: &transfer.amount,
            options: SendOptions {
                password: &transfer.password,
                fee_wallet: transfer.fee_wallet.as_deref(),
                fee_wallet_password: transfer
                    .fee_wallet
                    .as_ref()
                    .and(transfer.fee_wallet_password.as_deref()),
            },
        };

        let path = format!("/api/paymeter/wallets/{}/send", transfer.from_wallet_id);
        let response = self
            .api
            .call("paymeter.send", OperationDescriptor::POST, &path, Payload::Json(to_json(&body)?))
            .await?;
        take_field(response, "data")
    }
}
