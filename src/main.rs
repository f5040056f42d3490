// This file is part of the product Lingod.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger};
use lingod::config::{self, ValidatedConfig};
use lingod::store::Datastore;
use lingod::{AppServices, configure_api, seed};
use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let parsed_args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("Invalid command line arguments: {}", error);
            eprintln!("Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    if matches!(parsed_args.mode, RunMode::Help) {
        print!("{}", help_text());
        return 0;
    }

    if let Err(error) = config::ensure_config(&parsed_args.runtime_root) {
        eprintln!("Bootstrap error: {}", error);
        return 1;
    }
    let validated_config = match config::Config::load_and_validate(&parsed_args.runtime_root) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            eprintln!("Application cannot start with invalid configuration.");
            return 1;
        }
    };

    if let Err(error) = init_logger(&validated_config) {
        eprintln!("Failed to initialize logger: {}", error);
        return 1;
    }

    let data_path = validated_config.data_file_path(&parsed_args.runtime_root);
    let store = match Datastore::open(data_path.clone()) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            eprintln!("Failed to open datastore {}: {}", data_path.display(), error);
            return 1;
        }
    };

    match parsed_args.mode {
        RunMode::Seed { translations, tags } => run_seed(&store, translations, tags),
        RunMode::Server => {
            let result =
                System::new().block_on(run_server(validated_config, store, data_path));
            match result {
                Ok(()) => 0,
                Err(error) => {
                    eprintln!("Server failed to start: {}", error);
                    1
                }
            }
        }
        RunMode::Help => 0,
    }
}

fn run_seed(store: &Datastore, translations: usize, tags: usize) -> i32 {
    info!(
        "Seeding {} translations and {} tags",
        translations, tags
    );
    match seed::run(store, translations, tags) {
        Ok(summary) => {
            println!(
                "Seeded {} tags and {} translations",
                summary.tags_created, summary.translations_created
            );
            0
        }
        Err(error) => {
            eprintln!("Seeding failed: {}", error);
            1
        }
    }
}

async fn run_server(
    config: ValidatedConfig,
    store: Arc<Datastore>,
    data_path: PathBuf,
) -> std::io::Result<()> {
    let workers = config.server.workers;
    let host = config.server.host.clone();
    let port = config.server.port;
    let services = AppServices::new(store, &config);

    info!("Data file: {}", data_path.display());
    info!("Listening on {}:{} with {} workers", host, port, workers);

    let factory = move || {
        let services = services.clone();
        App::new()
            .configure(move |cfg| services.register(cfg))
            .wrap(Logger::new("%a \"%r\" %s %b %Dms"))
            .configure(configure_api)
    };

    HttpServer::new(factory)
        .workers(workers)
        .bind((host.as_str(), port))?
        .run()
        .await
}

fn init_logger(config: &ValidatedConfig) -> Result<(), log::SetLoggerError> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
}

#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    Server,
    Seed { translations: usize, tags: usize },
    Help,
}

#[derive(Debug)]
struct ParsedArgs {
    runtime_root: PathBuf,
    mode: RunMode,
}

fn parse_args() -> Result<ParsedArgs, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<ParsedArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.iter().any(|arg| is_help_flag(arg)) {
        return Ok(ParsedArgs {
            runtime_root: PathBuf::from("."),
            mode: RunMode::Help,
        });
    }

    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");
    let mut tokens = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            continue;
        } else if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            tokens.push(arg);
        }
    }

    let runtime_root = make_runtime_root_absolute(runtime_root)?;

    let mode = parse_mode(tokens)?;
    Ok(ParsedArgs { runtime_root, mode })
}

fn parse_mode(tokens: Vec<String>) -> Result<RunMode, String> {
    let mut tokens = tokens.into_iter();
    let Some(command) = tokens.next() else {
        return Ok(RunMode::Server);
    };

    if command.eq_ignore_ascii_case("help") {
        return Ok(RunMode::Help);
    }
    if !command.eq_ignore_ascii_case("seed") {
        return Err(format!("Unknown subcommand: {}", command));
    }

    let mut translations = seed::DEFAULT_TRANSLATIONS;
    let mut tags = seed::DEFAULT_TAGS;
    while let Some(flag) = tokens.next() {
        let value = tokens
            .next()
            .ok_or_else(|| format!("Missing value for {}", flag))?;
        let parsed: usize = value
            .parse()
            .map_err(|_| format!("Invalid value for {}: {}", flag, value))?;
        match flag.as_str() {
            "--translations" => translations = parsed,
            "--tags" => tags = parsed,
            other => return Err(format!("Unknown seed option: {}", other)),
        }
    }

    Ok(RunMode::Seed { translations, tags })
}

fn is_help_flag(arg: &str) -> bool {
    arg == "-h" || arg == "--help"
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }

    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}

fn help_text() -> String {
    [
        "lingod - localization string service",
        "",
        "Usage:",
        "  lingod [-C <root>]                      start the API server",
        "  lingod [-C <root>] seed [options]       generate sample data",
        "  lingod help                             show this help",
        "",
        "Options:",
        "  -C <root>            runtime directory (config.yaml, data.json)",
        "  --translations <n>   seed: number of translations (default 100000)",
        "  --tags <n>           seed: number of tags (default 1000)",
        "",
    ]
    .join("\n")
}
