// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genzsmart models` command implementation. Reads the static catalog only.

use clap::Args;
use colored::Colorize;
use genzsmart_core::GenzsmartError;
use genzsmart_providers::{ProviderId, ProviderInfo, all_providers, catalog};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Show a single provider.
    pub provider: Option<String>,
}

/// Runs the `genzsmart models` command.
pub fn run_models(args: ModelsArgs) -> Result<(), GenzsmartError> {
    let providers = match args.provider.as_deref() {
        Some(id) => vec![catalog(ProviderId::parse(id)?)],
        None => all_providers(),
    };
    for info in &providers {
        println!("{}", render(info));
    }
    Ok(())
}

fn render(info: &ProviderInfo) -> String {
    let mut out = format!("{} ({})\n", info.name.bold(), info.id);
    for model in &info.models {
        let marker = if model.id == info.default_model { "*" } else { " " };
        let vision = if model.supports_vision { ", vision" } else { "" };
        out.push_str(&format!(
            " {marker} {:<40} {} tokens{vision}\n",
            model.id, model.max_tokens
        ));
    }
    out
}
