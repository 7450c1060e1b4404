//! Command execution

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;
use vault_core::{
    generate, score, CredentialUpdate, JsonFileStorage, MasterKey, NewCredential, SearchFilter,
    SecretString, SettingsManager, StrengthLabel, Vault, VaultKey,
};

use crate::cli::{AddArgs, Cli, Command, EditArgs, SettingsAction};
use crate::output;
use crate::profile;

/// Run `cli`, writing results to `out`
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let dir = match cli.data_dir {
        Some(dir) => dir,
        None => JsonFileStorage::default_dir()?,
    };
    debug!("Using vault directory {:?}", dir);

    // Commands that never touch stored records
    match &cli.command {
        Command::Score { password } => {
            let password = match password {
                Some(p) => SecretString::new(p.clone()),
                None => prompt("Password: ")?,
            };
            let value = score(password.expose());
            if cli.json {
                let label = StrengthLabel::from_score(value);
                output::json(out, &json!({ "score": value, "label": label }))?;
            } else {
                output::strength(out, value)?;
            }
            return Ok(());
        }
        Command::Generate(args) if args.no_record => {
            let settings = SettingsManager::new(&dir);
            let options = args.options(&settings.get().generator);
            let password = SecretString::new(generate(&options)?);
            let value = score(password.expose());
            if cli.json {
                output::json(out, &json!({ "password": password.expose(), "score": value }))?;
            } else {
                writeln!(out, "{}", password.expose())?;
                output::strength(out, value)?;
            }
            return Ok(());
        }
        Command::Settings { action } => return settings(&dir, action.as_ref(), out).await,
        _ => {}
    }

    let key = match (cli.raw_key, cli.key) {
        (Some(hex), _) => {
            let hex = SecretString::new(hex);
            let key = MasterKey::from_hex(hex.expose())
                .context("--raw-key must be 64 hex characters")?;
            VaultKey::Raw(key)
        }
        (None, Some(key)) => VaultKey::Passphrase(SecretString::new(key)),
        (None, None) => VaultKey::Passphrase(prompt("Vault key: ")?),
    };
    let vault = Vault::open_in_dir(&dir, &key)
        .await
        .with_context(|| format!("Failed to open vault at {}", dir.display()))?;
    let owner = match cli.owner {
        Some(owner) => owner,
        None => profile::local_owner(&dir).await?,
    };

    execute(&vault, owner, cli.command, cli.json, out).await
}

async fn settings(
    dir: &Path,
    action: Option<&SettingsAction>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut manager = SettingsManager::new(dir);
    match action {
        None | Some(SettingsAction::Show) => {}
        Some(SettingsAction::Set(args)) => {
            if !args.apply(manager.get_mut()) {
                bail!("Nothing to change");
            }
            manager.save().await.context("Failed to save settings")?;
        }
        Some(SettingsAction::Reset) => {
            manager.reset().await.context("Failed to reset settings")?;
        }
    }
    output::json(out, manager.get())?;
    Ok(())
}

fn prompt(label: &str) -> Result<SecretString> {
    let value = rpassword::prompt_password(label).context("Failed to read from terminal")?;
    Ok(SecretString::new(value))
}

async fn execute(
    vault: &Vault,
    owner: Uuid,
    command: Command,
    as_json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Generate(args) => {
            let options = args.options(&vault.settings().generator);
            let generated = vault.generate(owner, Some(&options)).await?;
            if as_json {
                output::json(
                    out,
                    &json!({
                        "password": generated.password.expose(),
                        "score": generated.strength,
                        "label": generated.label,
                        "historyId": generated.entry.id,
                    }),
                )?;
            } else {
                writeln!(out, "{}", generated.password.expose())?;
                output::strength(out, generated.strength)?;
            }
        }

        Command::Add(args) => add(vault, owner, args, as_json, out).await?,

        Command::List { category, query } => {
            let filter = SearchFilter { category, query };
            let records = vault.search(owner, &filter).await?;
            if as_json {
                output::json(out, &records)?;
            } else if records.is_empty() {
                writeln!(out, "No credentials found")?;
            } else {
                for record in &records {
                    output::credential_line(out, record)?;
                }
            }
        }

        Command::Show { id, reveal } => {
            let Some(record) = vault.credentials.get(owner, id).await? else {
                bail!("Credential not found: {}", id);
            };
            let password = if reveal {
                Some(vault.credentials.decrypt_record(&record)?)
            } else {
                None
            };
            if as_json {
                output::credential_json(out, &record, password.as_ref())?;
            } else {
                output::credential_detail(out, &record, password.as_ref())?;
            }
        }

        Command::Edit(args) => edit(vault, owner, args, as_json, out).await?,

        Command::Delete { id } => {
            let record = vault.delete_credential(owner, id).await?;
            if as_json {
                output::json(out, &json!({ "deleted": record.id }))?;
            } else {
                writeln!(out, "Deleted '{}'", record.title)?;
            }
        }

        Command::Share { id, to, from } => {
            let record = vault.share(owner, id, &to, from.as_deref()).await?;
            if as_json {
                output::json(out, &record)?;
            } else {
                writeln!(
                    out,
                    "Recorded share of '{}' with {}",
                    record.title, record.recipient_email
                )?;
                writeln!(out, "Subject: {}", record.subject)?;
            }
        }

        Command::Shares => {
            let records = vault.shares.sent_by(owner).await?;
            if as_json {
                output::json(out, &records)?;
            } else {
                output::shares(out, &records)?;
            }
        }

        Command::History { reveal } => {
            let mut entries = Vec::new();
            for entry in vault.recent_history(owner).await? {
                let password = if reveal {
                    Some(vault.history.reveal(&entry)?)
                } else {
                    None
                };
                entries.push((entry, password));
            }

            if as_json {
                let values: Vec<_> = entries
                    .iter()
                    .map(|(entry, password)| {
                        json!({
                            "id": entry.id,
                            "strength": entry.strength,
                            "createdAt": entry.created_at,
                            "password": password.as_ref().map(SecretString::expose),
                        })
                    })
                    .collect();
                output::json(out, &values)?;
            } else {
                output::history(out, &entries)?;
            }
        }

        Command::Activity => {
            let entries = vault.recent_activity(owner).await?;
            if as_json {
                output::json(out, &entries)?;
            } else {
                output::activity(out, &entries)?;
            }
        }

        Command::Audit => {
            let report = vault.audit(owner, chrono::Utc::now()).await?;
            if as_json {
                output::json(out, &report)?;
            } else {
                output::audit(out, &report)?;
            }
        }

        Command::Encrypt { plaintext } => {
            writeln!(out, "{}", vault.cipher().encrypt(&plaintext)?)?;
        }

        Command::Decrypt { ciphertext } => {
            writeln!(out, "{}", vault.cipher().decrypt(&ciphertext)?)?;
        }

        Command::Score { .. } | Command::Settings { .. } => {
            bail!("This command does not use the vault")
        }
    }

    Ok(())
}

async fn add(
    vault: &Vault,
    owner: Uuid,
    args: AddArgs,
    as_json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let password = match (args.password, args.generate) {
        (Some(password), _) => SecretString::new(password),
        (None, true) => vault.generate(owner, None).await?.password,
        (None, false) => prompt("Password: ")?,
    };
    let strength = score(password.expose());

    let record = vault
        .add_credential(
            owner,
            NewCredential {
                title: args.title,
                username: args.username,
                password,
                url: args.url,
                category: args.category,
                notes: args.notes,
            },
        )
        .await?;

    if as_json {
        output::json(out, &record)?;
    } else {
        writeln!(out, "Saved '{}' as {}", record.title, record.id)?;
        output::strength(out, strength)?;
    }
    Ok(())
}

async fn edit(
    vault: &Vault,
    owner: Uuid,
    args: EditArgs,
    as_json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let update = CredentialUpdate {
        title: args.title,
        username: args.username,
        password: args.password.map(SecretString::new),
        url: args.url,
        category: args.category,
        notes: args.notes,
    };
    if update.is_empty() {
        bail!("Nothing to change");
    }

    let record = vault.update_credential(owner, args.id, update).await?;
    if as_json {
        output::json(out, &record)?;
    } else {
        writeln!(out, "Updated '{}'", record.title)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const KEY: &str = "test-vault-key";

    /// A vault directory with cheap key stretching
    fn temp_vault() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"kdf": {"memoryCost": 8192, "timeCost": 1, "parallelism": 1}}"#,
        )
        .unwrap();
        temp_dir
    }

    async fn run_with(dir: &TempDir, key_args: &[&str], args: &[&str]) -> Result<String> {
        let mut argv = vec!["arkvault", "--data-dir", dir.path().to_str().unwrap()];
        argv.extend_from_slice(key_args);
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        run(cli, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    async fn run_args(dir: &TempDir, args: &[&str]) -> Result<String> {
        run_with(dir, &["--key", KEY], args).await
    }

    #[tokio::test]
    async fn test_score_without_vault() {
        let dir = temp_vault();
        let output = run_args(&dir, &["score", "Abcdefgh12!@"]).await.unwrap();
        assert_eq!(output.trim(), "Strength: Excellent (90%)");
        assert!(!dir.path().join("vault.json").exists());
    }

    #[tokio::test]
    async fn test_generate_no_record() {
        let dir = temp_vault();
        let output = run_args(&dir, &["generate", "--length", "24", "--no-record"])
            .await
            .unwrap();
        let password = output.lines().next().unwrap();
        assert_eq!(password.chars().count(), 24);
        assert!(!dir.path().join("vault.json").exists());
    }

    #[tokio::test]
    async fn test_generate_empty_charset_fails() {
        let dir = temp_vault();
        let result = run_args(
            &dir,
            &[
                "generate",
                "--no-uppercase",
                "--no-lowercase",
                "--no-numbers",
                "--no-symbols",
                "--no-record",
            ],
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_add_show_reveal_delete() {
        let dir = temp_vault();

        let output = run_args(
            &dir,
            &[
                "--json",
                "add",
                "--title",
                "GitHub",
                "--username",
                "octo",
                "--password",
                "gh-S3cret!",
            ],
        )
        .await
        .unwrap();
        let record: serde_json::Value = serde_json::from_str(&output).unwrap();
        let id = record["id"].as_str().unwrap().to_string();
        assert_eq!(record["category"], "Personal");
        assert_ne!(record["encrypted_password"], "gh-S3cret!");

        let hidden = run_args(&dir, &["show", &id]).await.unwrap();
        assert!(!hidden.contains("gh-S3cret!"));

        let revealed = run_args(&dir, &["show", &id, "--reveal"]).await.unwrap();
        assert!(revealed.contains("Password: gh-S3cret!"));

        let listed = run_args(&dir, &["list", "--query", "git"]).await.unwrap();
        assert!(listed.contains("GitHub"));

        run_args(&dir, &["delete", &id]).await.unwrap();
        let listed = run_args(&dir, &["list"]).await.unwrap();
        assert_eq!(listed.trim(), "No credentials found");
    }

    #[tokio::test]
    async fn test_wrong_key_fails_to_open() {
        let dir = temp_vault();
        run_args(&dir, &["history"]).await.unwrap();

        let cli = Cli::try_parse_from([
            "arkvault",
            "--data-dir",
            dir.path().to_str().unwrap(),
            "--key",
            "another-key",
            "history",
        ])
        .unwrap();
        let mut out = Vec::new();
        let err = run(cli, &mut out).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<vault_core::VaultError>(),
            Some(vault_core::VaultError::InvalidKey)
        ));
    }

    #[tokio::test]
    async fn test_encrypt_decrypt_commands() {
        let dir = temp_vault();
        let ciphertext = run_args(&dir, &["encrypt", "plain value"]).await.unwrap();
        let plaintext = run_args(&dir, &["decrypt", ciphertext.trim()]).await.unwrap();
        assert_eq!(plaintext.trim(), "plain value");

        assert!(run_args(&dir, &["decrypt", "garbage"]).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_records_history_and_audit() {
        let dir = temp_vault();
        run_args(&dir, &["generate", "--preset", "basic"]).await.unwrap();

        let history = run_args(&dir, &["--json", "history", "--reveal"]).await.unwrap();
        let entries: serde_json::Value = serde_json::from_str(&history).unwrap();
        assert_eq!(entries.as_array().unwrap().len(), 1);
        assert_eq!(entries[0]["password"].as_str().unwrap().len(), 12);

        run_args(&dir, &["add", "--title", "Old", "--username", "me", "--password", "abcdefgh"])
            .await
            .unwrap();
        let audit = run_args(&dir, &["--json", "audit"]).await.unwrap();
        let report: serde_json::Value = serde_json::from_str(&audit).unwrap();
        assert_eq!(report["total"], 1);
        assert_eq!(report["strength"]["weak"], 1);
    }

    #[tokio::test]
    async fn test_share_and_activity() {
        let dir = temp_vault();
        let output = run_args(
            &dir,
            &["--json", "add", "--title", "Netflix", "--username", "fam", "--password", "n"],
        )
        .await
        .unwrap();
        let record: serde_json::Value = serde_json::from_str(&output).unwrap();
        let id = record["id"].as_str().unwrap().to_string();

        let shared = run_args(&dir, &["share", &id, "--to", "friend@example.com"])
            .await
            .unwrap();
        assert!(shared.contains("Subject: Sharing a password with you: Netflix"));

        let shares = run_args(&dir, &["shares"]).await.unwrap();
        assert!(shares.contains("friend@example.com"));

        let activity = run_args(&dir, &["activity"]).await.unwrap();
        assert!(activity.contains("shared"));
        assert!(activity.contains("password_created"));
    }

    #[tokio::test]
    async fn test_raw_key_vault() {
        let dir = temp_vault();
        let raw = "ab".repeat(32);
        let raw_args = ["--raw-key", raw.as_str()];

        let output = run_with(
            &dir,
            &raw_args,
            &["--json", "add", "--title", "Bank", "--username", "me", "--password", "b4nk"],
        )
        .await
        .unwrap();
        let record: serde_json::Value = serde_json::from_str(&output).unwrap();
        let id = record["id"].as_str().unwrap().to_string();

        let shown = run_with(&dir, &raw_args, &["show", &id, "--reveal"]).await.unwrap();
        assert!(shown.contains("Password: b4nk"));

        let other = "cd".repeat(32);
        let err = run_with(&dir, &["--raw-key", other.as_str()], &["list"])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<vault_core::VaultError>(),
            Some(vault_core::VaultError::InvalidKey)
        ));

        assert!(run_with(&dir, &["--raw-key", "abcd"], &["list"]).await.is_err());
    }

    #[tokio::test]
    async fn test_settings_set_and_reset() {
        let dir = temp_vault();
        run_args(&dir, &["add", "--title", "Mail", "--username", "me", "--password", "m41l"])
            .await
            .unwrap();

        let output = run_args(&dir, &["settings", "set", "--history-limit", "3"])
            .await
            .unwrap();
        let settings: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(settings["historyLimit"], 3);
        assert_eq!(settings["kdf"]["memoryCost"], 8192);

        assert!(run_args(&dir, &["settings", "set"]).await.is_err());

        let output = run_args(&dir, &["settings", "reset"]).await.unwrap();
        let settings: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(settings["historyLimit"], 10);
        assert!(!dir.path().join("settings.json").exists());

        // The vault keeps the key derivation costs it was created with
        let listed = run_args(&dir, &["list"]).await.unwrap();
        assert!(listed.contains("Mail"));
    }

    #[tokio::test]
    async fn test_execute_rejects_commands_without_vault_use() {
        let dir = temp_vault();
        let vault = Vault::open_in_dir(dir.path(), &VaultKey::Raw(MasterKey::new([3u8; 32])))
            .await
            .unwrap();

        let mut out = Vec::new();
        let result = execute(
            &vault,
            Uuid::new_v4(),
            Command::Settings { action: None },
            false,
            &mut out,
        )
        .await;
        assert!(result.is_err());
        assert!(out.is_empty());
    }
}
