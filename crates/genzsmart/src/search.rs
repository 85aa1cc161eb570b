// SPDX-FileCopyrightText: 2026 GenzSmart Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `genzsmart search` command implementation.

use std::str::FromStr;

use clap::Args;
use colored::Colorize;
use genzsmart_config::GenzsmartConfig;
use genzsmart_core::{GenzsmartError, SearchType};
use genzsmart_search::{SearchRequest, SearchService};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// What to search for.
    pub query: String,

    /// Search backend id (brave, serpapi, duckduckgo, duckduckgo_lite).
    #[arg(long)]
    pub provider: Option<String>,

    /// Number of results.
    #[arg(long, short = 'n')]
    pub num_results: Option<usize>,

    /// general, news or images.
    #[arg(long = "type", default_value = "general")]
    pub search_type: String,

    /// Print the raw response as JSON.
    #[arg(long)]
    pub json: bool,

    /// List backends and whether they are usable, then exit.
    #[arg(long)]
    pub list_providers: bool,
}

/// Runs the `genzsmart search` command.
pub async fn run_search(config: &GenzsmartConfig, args: SearchArgs) -> Result<(), GenzsmartError> {
    let service = SearchService::from_config(&config.search)?;

    if args.list_providers {
        for status in service.available_providers() {
            let mark = if status.available { "available".green() } else { "unavailable".red() };
            println!("{:<16} {:<24} {mark}", status.id, status.name);
        }
        return Ok(());
    }

    let request = build_request(&args)?;
    let response = service.search_web(request).await?;
    if args.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| GenzsmartError::Internal(format!("failed to encode response: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", response.format_for_context());
    }
    Ok(())
}

fn build_request(args: &SearchArgs) -> Result<SearchRequest, GenzsmartError> {
    let search_type = SearchType::from_str(&args.search_type).map_err(|_| {
        GenzsmartError::validation(
            "type",
            format!("unsupported search type: {}", args.search_type),
        )
    })?;

    let mut request = SearchRequest::new(args.query.clone()).search_type(search_type);
    if let Some(provider) = &args.provider {
        request = request.provider(provider.clone());
    }
    if let Some(n) = args.num_results {
        request = request.num_results(n);
    }
    Ok(request)
}
