// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow};
use config::Config;
use std::env;
use std::path::PathBuf;
use tasklist_app::{ListController, ListVariant};
use tasklist_csv::{CsvStorage, TASK_HEADER};
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tasklist --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let variant = if options.contacts {
        ListVariant::Contacts
    } else {
        config.variant()
    };

    let csv_path = if variant.supports_persistence() {
        Some(resolve_csv_path(&options, &config)?)
    } else {
        None
    };
    if options.print_csv_path {
        match &csv_path {
            Some(path) => println!("{}", path.display()),
            None => println!("the {} list has no CSV file", variant.noun()),
        }
        return Ok(());
    }

    let storage = CsvStorage::new(variant.headers()).with_strict_header(config.strict_header());

    if options.init {
        let path = csv_path.as_deref().ok_or_else(|| {
            anyhow!("--init applies to the tasks list; drop --contacts or set [ui].variant = \"tasks\"")
        })?;
        if tasklist_csv::init_file(path, TASK_HEADER)? {
            println!("created {}", path.display());
        } else {
            println!("{} already exists; left unchanged", path.display());
        }
        return Ok(());
    }

    if options.check_only {
        if let Some(path) = &csv_path {
            tasklist_csv::load_file(path, storage.policy())?;
        }
        return Ok(());
    }

    logging::init(&config.log_dir()?, config.log_level())?;
    info!(
        variant = variant.as_str(),
        csv = ?csv_path,
        config = %options.config_path.display(),
        "starting"
    );

    let mut controller = ListController::new(variant, storage);
    tasklist_tui::run_app(&mut controller, csv_path)
}

fn resolve_csv_path(options: &CliOptions, config: &Config) -> Result<PathBuf> {
    match &options.csv_path {
        Some(path) => {
            tasklist_csv::validate_csv_path(&path.to_string_lossy())
                .context("invalid --csv value")?;
            Ok(path.clone())
        }
        None => config.csv_path(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    csv_path: Option<PathBuf>,
    contacts: bool,
    init: bool,
    print_config_path: bool,
    print_csv_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        csv_path: None,
        contacts: false,
        init: false,
        print_config_path: false,
        print_csv_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--csv" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--csv requires a file path"))?;
                options.csv_path = Some(PathBuf::from(value.as_ref()));
            }
            "--contacts" => {
                options.contacts = true;
            }
            "--init" => {
                options.init = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_csv_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("tasklist");
    println!("  --config <path>          Use a specific config path");
    println!("  --csv <path>             Use a specific task CSV file");
    println!("  --contacts               Open the contact list instead of tasks");
    println!("  --init                   Create an empty task CSV if none exists");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved task CSV path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and load the task CSV, then exit");
    println!("  --help                   Show this help");
    println!();
    println!("keys: tab focus | enter add | ctrl+s save | ctrl+q quit | ? help (table)");
}
