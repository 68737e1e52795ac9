//! Account commands

use anyhow::Result;
use clap::Subcommand;
use forge_gen::{upgrade, Account, AccountStore, ExportFormat, ForgeConfig};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show tier, credits and export formats
    Show,

    /// Upgrade to the Pro plan
    Upgrade,

    /// Reset to a fresh account
    Reset {
        /// Starting credits (defaults to the configured amount)
        #[arg(long)]
        credits: Option<u32>,
    },
}

pub fn run(cmd: AccountCommands) -> Result<()> {
    let config = ForgeConfig::load()?;
    let store = AccountStore::default_store();

    match cmd {
        AccountCommands::Show => {
            let account = store.load_or(config.initial_account())?;
            print_account(&account);
        }
        AccountCommands::Upgrade => {
            let account = store.load_or(config.initial_account())?;
            if account.is_pro() {
                println!("Already on the {}.", account.tier);
                return Ok(());
            }
            let upgraded = upgrade(&account);
            store.save(&upgraded)?;
            println!("Upgraded to the {}.", upgraded.tier);
            print_account(&upgraded);
        }
        AccountCommands::Reset { credits } => {
            let mut account = config.initial_account();
            if let Some(credits) = credits {
                account.credits = credits;
            }
            store.save(&account)?;
            println!("Account reset.");
            print_account(&account);
        }
    }
    Ok(())
}

fn print_account(account: &Account) {
    println!("Account: {}", account.tier);
    println!("  Credits: {}", account.credits);
    let formats: Vec<String> = ExportFormat::ALL
        .iter()
        .filter(|f| forge_gen::authorize(**f, account).is_allowed())
        .map(|f| f.to_string())
        .collect();
    println!("  Export formats: {}", formats.join(", "));
    if !account.can_generate() {
        println!("  No credits left; generation is blocked.");
    }
}
