//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;
use vault_core::{GeneratorOptions, Preset, Settings};

/// ArkVault - store, generate, share and audit passwords
#[derive(Parser, Debug)]
#[command(name = "arkvault")]
#[command(version)]
#[command(about = "ArkVault - store, generate, share and audit passwords")]
pub struct Cli {
    /// Vault directory (defaults to the per-user data directory)
    #[arg(long, global = true, env = "ARKVAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Vault key. Prompted for when not set.
    #[arg(long, global = true, env = "ARKVAULT_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Raw 256-bit vault key as 64 hex characters, used without stretching
    #[arg(
        long,
        global = true,
        env = "ARKVAULT_RAW_KEY",
        hide_env_values = true,
        conflicts_with = "key"
    )]
    pub raw_key: Option<String>,

    /// Account the records belong to (defaults to this machine's local profile)
    #[arg(long, global = true, env = "ARKVAULT_OWNER")]
    pub owner: Option<Uuid>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a password and record it in history
    Generate(GenerateArgs),

    /// Score a password without storing anything
    Score {
        /// Password to score (prompted for when omitted)
        password: Option<String>,
    },

    /// Save a new credential
    Add(AddArgs),

    /// List credentials
    List {
        /// Only this category ("All" for every category)
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive match on title or username
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Show one credential
    Show {
        id: Uuid,
        /// Include the decrypted password
        #[arg(long)]
        reveal: bool,
    },

    /// Edit a credential
    Edit(EditArgs),

    /// Delete a credential
    Delete { id: Uuid },

    /// Record that a credential was shared by email
    Share {
        id: Uuid,
        /// Recipient email address
        #[arg(long)]
        to: String,
        /// Sender email address
        #[arg(long)]
        from: Option<String>,
    },

    /// List share events
    Shares,

    /// Recently generated passwords
    History {
        /// Include the decrypted passwords
        #[arg(long)]
        reveal: bool,
    },

    /// Recent activity
    Activity,

    /// Strength and expiry report over all credentials
    Audit,

    /// Encrypt a value with the vault key
    Encrypt { plaintext: String },

    /// Decrypt a value produced by `encrypt`
    Decrypt { ciphertext: String },

    /// Print or change the settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the effective settings (the default)
    Show,
    /// Change settings and save them
    Set(SettingsArgs),
    /// Restore the defaults
    Reset,
}

/// Settings to change. Key derivation costs only apply to vaults created
/// afterwards.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub history_limit: Option<usize>,

    #[arg(long)]
    pub activity_limit: Option<usize>,

    /// Days before an unchanged password counts as expired
    #[arg(long)]
    pub expiry_days: Option<u32>,

    /// Default generated password length
    #[arg(long)]
    pub length: Option<usize>,

    /// Argon2id memory cost in KiB
    #[arg(long)]
    pub kdf_memory_cost: Option<u32>,

    #[arg(long)]
    pub kdf_time_cost: Option<u32>,

    #[arg(long)]
    pub kdf_parallelism: Option<u32>,
}

impl SettingsArgs {
    /// Apply the changes to `settings`; returns whether anything was given
    pub fn apply(&self, settings: &mut Settings) -> bool {
        let mut changed = false;
        if let Some(limit) = self.history_limit {
            settings.history_limit = limit;
            changed = true;
        }
        if let Some(limit) = self.activity_limit {
            settings.activity_limit = limit;
            changed = true;
        }
        if let Some(days) = self.expiry_days {
            settings.expiry_days = days;
            changed = true;
        }
        if let Some(length) = self.length {
            settings.generator.length = length;
            changed = true;
        }
        if let Some(cost) = self.kdf_memory_cost {
            settings.kdf.memory_cost = cost;
            changed = true;
        }
        if let Some(cost) = self.kdf_time_cost {
            settings.kdf.time_cost = cost;
            changed = true;
        }
        if let Some(parallelism) = self.kdf_parallelism {
            settings.kdf.parallelism = parallelism;
            changed = true;
        }
        changed
    }
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Start from a preset (high-security, medium-security, basic, pin-code)
    #[arg(long)]
    pub preset: Option<Preset>,

    #[arg(long, short)]
    pub length: Option<usize>,

    #[arg(long)]
    pub no_uppercase: bool,

    #[arg(long)]
    pub no_lowercase: bool,

    #[arg(long)]
    pub no_numbers: bool,

    #[arg(long)]
    pub no_symbols: bool,

    /// Drop look-alike characters (il1Lo0O)
    #[arg(long, overrides_with = "allow_similar")]
    pub exclude_similar: bool,

    #[arg(long)]
    pub allow_similar: bool,

    /// Drop brackets, quotes and separators
    #[arg(long)]
    pub exclude_ambiguous: bool,

    /// Extra characters to include
    #[arg(long, default_value = "")]
    pub custom: String,

    /// Characters to leave out
    #[arg(long, default_value = "")]
    pub exclude: String,

    /// Only print the password; do not open the vault or record history
    #[arg(long)]
    pub no_record: bool,
}

impl GenerateArgs {
    /// Apply the flags on top of `base` (or the preset, if one was given)
    pub fn options(&self, base: &GeneratorOptions) -> GeneratorOptions {
        let mut options = match self.preset {
            Some(preset) => preset.options(),
            None => base.clone(),
        };

        if let Some(length) = self.length {
            options.length = length;
        }
        if self.no_uppercase {
            options.uppercase = false;
        }
        if self.no_lowercase {
            options.lowercase = false;
        }
        if self.no_numbers {
            options.numbers = false;
        }
        if self.no_symbols {
            options.symbols = false;
        }
        if self.exclude_similar {
            options.exclude_similar = true;
        }
        if self.allow_similar {
            options.exclude_similar = false;
        }
        if self.exclude_ambiguous {
            options.exclude_ambiguous = true;
        }
        if !self.custom.is_empty() {
            options.custom_chars = self.custom.clone();
        }
        if !self.exclude.is_empty() {
            options.exclude_chars = self.exclude.clone();
        }
        options
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long, short)]
    pub username: String,

    /// Password to store (prompted for unless --generate is given)
    #[arg(long, conflicts_with = "generate")]
    pub password: Option<String>,

    /// Generate the password with the default generator settings
    #[arg(long)]
    pub generate: bool,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: Uuid,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short)]
    pub username: Option<String>,

    /// New password
    #[arg(long)]
    pub password: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Pass an empty string to clear
    #[arg(long)]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_preset() {
        let cli = Cli::parse_from(["arkvault", "generate", "--preset", "pin-code", "--no-record"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.preset, Some(Preset::PinCode));

        let options = args.options(&GeneratorOptions::default());
        assert_eq!(options.length, 6);
        assert!(!options.uppercase);
    }

    #[test]
    fn test_generate_flags_override_base() {
        let args = GenerateArgs {
            length: Some(30),
            no_symbols: true,
            allow_similar: true,
            exclude: "xyz".to_string(),
            ..Default::default()
        };
        let options = args.options(&GeneratorOptions::default());
        assert_eq!(options.length, 30);
        assert!(!options.symbols);
        assert!(!options.exclude_similar);
        assert_eq!(options.exclude_chars, "xyz");
    }

    #[test]
    fn test_raw_key_conflicts_with_key() {
        let result = Cli::try_parse_from([
            "arkvault", "--key", "k", "--raw-key", "00", "audit",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_args_apply() {
        let cli = Cli::parse_from(["arkvault", "settings", "set", "--expiry-days", "30"]);
        let Command::Settings {
            action: Some(SettingsAction::Set(args)),
        } = cli.command
        else {
            panic!("expected settings set");
        };

        let mut settings = Settings::default();
        assert!(args.apply(&mut settings));
        assert_eq!(settings.expiry_days, 30);
        assert_eq!(settings.history_limit, 10);

        assert!(!SettingsArgs::default().apply(&mut settings));
    }

    #[test]
    fn test_add_password_conflicts_with_generate() {
        let result = Cli::try_parse_from([
            "arkvault", "add", "--title", "t", "--username", "u", "--password", "p", "--generate",
        ]);
        assert!(result.is_err());
    }
}
