use crate::config::Config;
use crate::wallet::Wallet;
use crate::MinicoinError;
use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

const MENU: &[&str] = &[
    "Create account",
    "Show balance",
    "Mint",
    "Send",
    "Show chain",
    "Validate chain",
    "List accounts",
    "Export keys",
    "Exit",
];

/// Menu-driven shell over one in-memory wallet. Recoverable failures
/// (wrong credential, insufficient funds) are printed and the loop
/// continues; only prompt/terminal errors abort.
pub fn run(config: Config) -> Result<()> {
    println!(
        "{}",
        style("minicoin shell - the ledger lives in memory and dies with the process").dim()
    );

    let prompt = config.shell.prompt.clone();
    let show_keys = config.shell.show_key_material;
    let mut wallet = Wallet::in_memory(config.chain)?;
    let theme = ColorfulTheme::default();

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt(&prompt)
            .items(MENU)
            .default(0)
            .interact()?;

        let outcome = match choice {
            0 => create_account(&mut wallet, &theme),
            1 => show_balance(&mut wallet, &theme),
            2 => mint(&mut wallet, &theme),
            3 => send(&mut wallet, &theme),
            4 => show_chain(&wallet),
            5 => validate_chain(&wallet),
            6 => list_accounts(&wallet),
            7 => export_keys(&wallet, &theme, show_keys),
            _ => return Ok(()),
        };

        if let Err(e) = outcome {
            if e.is::<dialoguer::Error>() {
                return Err(e);
            }
            println!("{} {}", style("error:").red().bold(), e);
        }
    }
}

fn ask_name(theme: &ColorfulTheme) -> Result<String> {
    Ok(Input::with_theme(theme)
        .with_prompt("Account name")
        .interact_text()?)
}

fn ask_credential(theme: &ColorfulTheme) -> Result<String> {
    Ok(Password::with_theme(theme)
        .with_prompt("Credential")
        .interact()?)
}

fn ask_amount(theme: &ColorfulTheme) -> Result<u64> {
    Ok(Input::with_theme(theme)
        .with_prompt("Amount")
        .interact_text()?)
}

fn create_account(wallet: &mut Wallet, theme: &ColorfulTheme) -> Result<()> {
    let name = ask_name(theme)?;
    let credential = ask_credential(theme)?;
    let owner = wallet.create_account(&name, &credential)?.owner_id();
    println!("account {} created, funds lock to {}", style(&name).green(), owner);
    Ok(())
}

fn show_balance(wallet: &mut Wallet, theme: &ColorfulTheme) -> Result<()> {
    let name = ask_name(theme)?;
    let credential = ask_credential(theme)?;
    let balance = wallet.balance_of(&name, &credential)?;
    println!("{} holds {}", name, style(balance).cyan().bold());
    Ok(())
}

fn mint(wallet: &mut Wallet, theme: &ColorfulTheme) -> Result<()> {
    let name = ask_name(theme)?;
    let credential = ask_credential(theme)?;
    let amount = ask_amount(theme)?;
    wallet.mint(&name, &credential, amount)?;
    println!("minted {} to {} (mining done)", amount, name);
    Ok(())
}

fn send(wallet: &mut Wallet, theme: &ColorfulTheme) -> Result<()> {
    let from = ask_name(theme)?;
    let credential = ask_credential(theme)?;
    let to: String = Input::with_theme(theme)
        .with_prompt("Recipient")
        .interact_text()?;
    let amount = ask_amount(theme)?;
    wallet.transfer(&from, &credential, &to, amount)?;
    println!("sent {} from {} to {} (mining done)", amount, from, to);
    Ok(())
}

fn show_chain(wallet: &Wallet) -> Result<()> {
    for (i, block) in wallet.chain().blocks().iter().enumerate() {
        println!("{}", style(format!("--- block {} ---", i)).dim());
        print!("{}", block);
    }
    Ok(())
}

fn validate_chain(wallet: &Wallet) -> Result<()> {
    if wallet.is_valid() {
        println!("{}", style("chain is valid").green());
    } else {
        println!("{}", style("chain is INVALID").red().bold());
    }
    Ok(())
}

fn list_accounts(wallet: &Wallet) -> Result<()> {
    let names = wallet.account_names();
    if names.is_empty() {
        println!("no accounts yet");
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn export_keys(wallet: &Wallet, theme: &ColorfulTheme, show_keys: bool) -> Result<()> {
    if !show_keys {
        return Err(MinicoinError::Auth("key export disabled by configuration".to_string()).into());
    }
    let name = ask_name(theme)?;
    let credential = ask_credential(theme)?;
    let account = wallet.authenticate(&name, &credential)?;
    println!("public key  {}", account.keypair.public_key.to_hex());
    println!("private WIF {}", account.keypair.private_key.to_wif());
    println!("owner hash  {}", account.owner_id());
    Ok(())
}
