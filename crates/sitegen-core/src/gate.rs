//! Token gate
//!
//! Every action that consumes backend AI compute requires a minimum balance.
//! The gate is a pure predicate: it never fetches, callers keep the balance
//! fresh. Each gate re-checks the threshold, so a balance that drops between
//! analyze and generate blocks the second step.

use crate::error::CoreError;
use std::fmt;

/// Minimum raw balance for any gated action (35.0 in display units)
pub const MINIMUM_TOKENS: u64 = 35_000;

/// Raw backend units per display token
pub const DISPLAY_UNIT: u64 = 1_000;

/// Format a raw balance for display: `raw / 1000`, one decimal, half-up.
///
/// `format_tokens(35_000) == "35.0"`, `format_tokens(12_345) == "12.3"`.
/// Ties round up, so `format_tokens(12_350) == "12.4"` where JavaScript's
/// `(12.35).toFixed(1)` gives `"12.3"`.
pub fn format_tokens(raw: u64) -> String {
    let tenths = raw.saturating_add(DISPLAY_UNIT / 20) / (DISPLAY_UNIT / 10);
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Format a package size without padding: `100_000 -> "100"`, `2_500 -> "2.5"`
pub fn format_tokens_compact(raw: u64) -> String {
    let whole = raw / DISPLAY_UNIT;
    let frac = raw % DISPLAY_UNIT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:03}", frac);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Actions that require a minimum token balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Analyze,
    Generate,
    OpenEdit,
    ApplyEdit,
}

impl GatedAction {
    /// Phrase used in the refusal message ("... tokens to {purpose}")
    pub fn purpose(&self) -> &'static str {
        match self {
            GatedAction::Analyze | GatedAction::Generate => "generate a website",
            GatedAction::OpenEdit | GatedAction::ApplyEdit => "edit a website",
        }
    }
}

/// Details of a refused gated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenShortfall {
    pub action: GatedAction,
    pub required: u64,
    pub current: u64,
}

impl TokenShortfall {
    /// Raw tokens still missing
    pub fn missing(&self) -> u64 {
        self.required.saturating_sub(self.current)
    }
}

impl fmt::Display for TokenShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Insufficient tokens. You need at least {} tokens to {}. You currently have {} tokens. Please purchase more tokens.",
            format_tokens(self.required),
            self.action.purpose(),
            format_tokens(self.current)
        )
    }
}

/// Minimum-balance policy shared by both workflows and the preview screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenGate {
    minimum: u64,
}

impl Default for TokenGate {
    fn default() -> Self {
        Self::new(MINIMUM_TOKENS)
    }
}

impl TokenGate {
    pub fn new(minimum: u64) -> Self {
        Self { minimum }
    }

    pub fn minimum(&self) -> u64 {
        self.minimum
    }

    pub fn allows(&self, balance: u64) -> bool {
        balance >= self.minimum
    }

    /// Check a gated action against the current balance
    pub fn check(&self, action: GatedAction, balance: u64) -> Result<(), CoreError> {
        if self.allows(balance) {
            return Ok(());
        }
        Err(CoreError::InsufficientTokens(TokenShortfall {
            action,
            required: self.minimum,
            current: balance,
        }))
    }
}
