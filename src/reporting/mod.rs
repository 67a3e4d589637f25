use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt::Display;
use std::str::FromStr;

use crate::chain::{Explorer, TokenBalance};

/// A confirmed launch transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub label: &'static str,
    #[serde(serialize_with = "as_display")]
    pub signature: Signature,
    pub explorer_url: String,
}

impl TransactionRecord {
    pub fn new(label: &'static str, signature: Signature, explorer: &Explorer) -> Self {
        Self {
            label,
            signature,
            explorer_url: explorer.transaction_url(&signature),
        }
    }
}

/// Outcome of a completed token launch
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    #[serde(serialize_with = "as_display")]
    pub mint: Pubkey,
    #[serde(serialize_with = "as_display")]
    pub associated_token_account: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    /// Base units minted to the associated token account
    pub minted_amount: u64,
    /// Balance string reported by the ledger after minting
    pub balance: String,
    /// Whether the reported balance equals the minted amount
    pub balance_verified: bool,
    pub transactions: Vec<TransactionRecord>,
    pub mint_explorer_url: String,
    pub created_at: DateTime<Utc>,
}

impl LaunchReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Whether `balance` shows exactly `amount` base units at `decimals`
pub fn balance_matches(balance: &TokenBalance, amount: u64, decimals: u8) -> bool {
    let expected = Decimal::from_i128_with_scale(amount as i128, decimals as u32);
    let reported = Decimal::from_str(&balance.ui_amount_string).ok();

    balance.amount == amount && balance.decimals == decimals && reported == Some(expected)
}

/// Human-readable amount for `amount` base units at `decimals`
pub fn ui_amount(amount: u64, decimals: u8) -> String {
    Decimal::from_i128_with_scale(amount as i128, decimals as u32)
        .normalize()
        .to_string()
}

/// Render a launch report for the terminal
pub fn format_report(report: &LaunchReport) -> String {
    let mut out = String::new();

    out.push_str("# Token Launch Report\n\n");
    out.push_str(&format!("- Name: {} ({})\n", report.name, report.symbol));
    out.push_str(&format!("- Metadata URI: {}\n", report.uri));
    out.push_str(&format!("- Mint: {}\n", report.mint));
    out.push_str(&format!("  {}\n", report.mint_explorer_url));
    out.push_str(&format!(
        "- Associated token account: {}\n",
        report.associated_token_account
    ));
    out.push_str(&format!(
        "- Minted: {} ({} base units, {} decimals)\n",
        ui_amount(report.minted_amount, report.decimals),
        report.minted_amount,
        report.decimals
    ));
    out.push_str(&format!(
        "- Balance: {}{}\n",
        report.balance,
        if report.balance_verified { "" } else { " (does not match minted amount)" }
    ));
    out.push_str(&format!("- Created at: {}\n\n", report.created_at.to_rfc3339()));

    out.push_str("## Transactions\n\n");
    for (idx, tx) in report.transactions.iter().enumerate() {
        out.push_str(&format!("{}. {}: {}\n", idx + 1, tx.label, tx.explorer_url));
    }

    out
}

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
