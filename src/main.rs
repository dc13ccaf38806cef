//! openapi-typegraph - command-line front end.
//!
//! # Usage
//!
//! ```bash
//! openapi-typegraph [-v] generate <PROJECT_PATH> --manifest <FILE> [-f yaml|json] [-o FILE]
//! openapi-typegraph [-v] diff <LEFT> <RIGHT> [--filter-paths] [--exclude-prefix P]... [-o FILE]
//! ```
//!
//! # Examples
//!
//! Generate JSON documentation:
//! ```bash
//! openapi-typegraph generate ./harbour --manifest harbour-api.yaml -f json -o swagger.json
//! ```
//!
//! Compare a published spec against a freshly generated one:
//! ```bash
//! openapi-typegraph diff https://api.example.com/v2/api-docs swagger.json -o changes.md
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_typegraph::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-typegraph starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
