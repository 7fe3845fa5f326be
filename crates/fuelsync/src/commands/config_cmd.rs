//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use fuelsync_core::OfflineMutationPolicy;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("********".into());
        }
    }
    cfg
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("fuelsync configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Backend URL
            let base_url: String = Input::new()
                .with_prompt("API base URL")
                .default("http://localhost:8080/api".into())
                .interact_text()
                .map_err(prompt_err)?;

            if url::Url::parse(&base_url).is_err() {
                return Err(CliError::Validation {
                    field: "base_url".into(),
                    reason: format!("invalid URL: {base_url}"),
                });
            }

            // 3. Bearer token (optional)
            let token = Password::new()
                .with_prompt("Bearer token (leave empty for none)")
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_err)?;

            let plaintext_token = if token.is_empty() {
                None
            } else {
                let store_choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let store_selection = Select::new()
                    .with_prompt("Where to store the token?")
                    .items(store_choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;

                if store_selection == 0 {
                    fuelsync_config::store_token(&profile_name, &SecretString::from(token))?;
                    eprintln!("   Token stored in system keyring");
                    None
                } else {
                    Some(token)
                }
            };

            // 4. Offline behavior
            let policy_choices = &[
                "Apply changes locally when the backend is down",
                "Refuse changes when the backend is down",
            ];
            let policy_selection = Select::new()
                .with_prompt("Offline mutations")
                .items(policy_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let offline_policy = if policy_selection == 0 {
                OfflineMutationPolicy::ApplyLocally
            } else {
                OfflineMutationPolicy::Reject
            };

            // 5. Merge into the existing config
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    token: plaintext_token,
                    offline_policy: Some(offline_policy),
                    ..Profile::new(base_url)
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: fuelsync health");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("<unrenderable: {e}>")),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: fuelsync config init");
            } else {
                let mut names: Vec<&String> = cfg.profiles.keys().collect();
                names.sort_unstable();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(config::profile_not_found(profile_name, &cfg));
            }

            let token = Password::new()
                .with_prompt(format!("Bearer token for '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;

            fuelsync_config::store_token(&profile_name, &SecretString::from(token))?;
            eprintln!("Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
