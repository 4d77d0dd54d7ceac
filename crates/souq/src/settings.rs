// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq settings` subcommands.

use clap::Subcommand;
use souq_bus::{EventBus, StoreSettings};
use souq_config::model::SouqConfig;
use souq_core::{Language, SessionStatus, SouqError};

use crate::context::settings_store;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the resolved storefront settings.
    Show {
        /// Render in this language instead of `app.language`.
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        json: bool,
    },
}

/// Settings as they apply to this invocation.
pub fn resolve(config: &SouqConfig, language: Option<Language>) -> StoreSettings {
    let store = settings_store(config, EventBus::default());
    if let Some(language) = language {
        store.set_language(language);
    }
    store.current()
}

pub fn run_settings(command: SettingsCommand, config: &SouqConfig, use_color: bool) -> Result<(), SouqError> {
    match command {
        SettingsCommand::Show { language, json } => {
            let settings = resolve(config, language);
            if json {
                return output::print_json(&serde_json::json!({
                    "store_name": settings.store_name,
                    "language": settings.language,
                    "direction": settings.text_direction(),
                }));
            }
            println!("  store      {}", settings.store_name);
            println!("  language   {}", settings.language);
            println!("  direction  {}", settings.text_direction());
            let labels: Vec<String> = [SessionStatus::Waiting, SessionStatus::Active, SessionStatus::Closed]
                .into_iter()
                .map(|s| output::status_label(s, settings.language, use_color))
                .collect();
            println!("  statuses   {}", labels.join(" / "));
        }
    }
    Ok(())
}
