//! Account tiers, credits and export gating
//!
//! All operations here are pure: they take an account by reference and
//! return a decision or a new account value.

use crate::export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "Free Tier"),
            Tier::Pro => write!(f, "Pro Plan"),
        }
    }
}

/// A user's tier and remaining generation credits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub tier: Tier,
    pub credits: u32,
}

impl Account {
    pub fn free(credits: u32) -> Self {
        Self {
            tier: Tier::Free,
            credits,
        }
    }

    pub fn pro(credits: u32) -> Self {
        Self {
            tier: Tier::Pro,
            credits,
        }
    }

    pub fn is_pro(&self) -> bool {
        self.tier == Tier::Pro
    }

    /// Whether a generation may start. Zero credits blocks generation.
    pub fn can_generate(&self) -> bool {
        self.credits > 0
    }
}

/// Outcome of an export entitlement check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allowed,
    /// The caller should offer an upgrade instead of exporting
    Denied,
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed)
    }
}

/// Decide whether `account` may export `format`.
///
/// GLB is the baseline format and always allowed; OBJ and FBX require Pro.
pub fn authorize(format: ExportFormat, account: &Account) -> Authorization {
    match format {
        ExportFormat::Glb => Authorization::Allowed,
        ExportFormat::Obj | ExportFormat::Fbx if account.is_pro() => Authorization::Allowed,
        ExportFormat::Obj | ExportFormat::Fbx => Authorization::Denied,
    }
}

/// Debit one credit for a completed generation. Saturates at zero.
pub fn spend(account: &Account) -> Account {
    Account {
        credits: account.credits.saturating_sub(1),
        ..*account
    }
}

/// Move the account to the Pro tier, keeping its credits
pub fn upgrade(account: &Account) -> Account {
    Account {
        tier: Tier::Pro,
        ..*account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_accounts() -> Vec<Account> {
        vec![
            Account::free(0),
            Account::free(5),
            Account::pro(0),
            Account::pro(100),
        ]
    }

    #[test]
    fn test_glb_always_allowed() {
        for account in sample_accounts() {
            assert_eq!(authorize(ExportFormat::Glb, &account), Authorization::Allowed);
        }
    }

    #[test]
    fn test_pro_formats_denied_on_free() {
        let free = Account::free(5);
        assert_eq!(authorize(ExportFormat::Obj, &free), Authorization::Denied);
        assert_eq!(authorize(ExportFormat::Fbx, &free), Authorization::Denied);
    }

    #[test]
    fn test_pro_formats_allowed_on_pro() {
        let pro = Account::pro(0);
        assert!(authorize(ExportFormat::Obj, &pro).is_allowed());
        assert!(authorize(ExportFormat::Fbx, &pro).is_allowed());
    }

    #[test]
    fn test_spend_decrements_by_one() {
        let before = Account::free(5);
        let after = spend(&before);
        assert_eq!(after.credits, 4);
        assert_eq!(after.tier, Tier::Free);
        assert_eq!(before.credits, 5);
    }

    #[test]
    fn test_spend_at_zero_stays_at_zero() {
        // Credits are unsigned; a debit at zero must not wrap or go negative.
        let broke = Account::free(0);
        assert_eq!(spend(&broke).credits, 0);
        assert!(!broke.can_generate());
    }

    #[test]
    fn test_upgrade_keeps_credits() {
        let free = Account::free(3);
        let pro = upgrade(&free);
        assert!(pro.is_pro());
        assert_eq!(pro.credits, 3);
        assert_eq!(upgrade(&pro), pro);
    }

    #[test]
    fn test_account_toml_shape() {
        let toml_str = toml::to_string(&Account::pro(7)).unwrap();
        assert!(toml_str.contains("tier = \"pro\""));
        assert!(toml_str.contains("credits = 7"));
    }
}
