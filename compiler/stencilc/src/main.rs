//! Stencil template CLI.

use std::io::IsTerminal;
use std::path::PathBuf;

use stencil_diagnostic::emitter::ColorMode;
use stencil_diagnostic::ErrorCode;
use stencilc::commands::report;
use stencilc::{check_sources, eval_source, init_tracing, render_page, CliOptions};

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "render" => {
            let options = parse_options(&args[2..]);
            let [path] = options.positional.as_slice() else {
                eprintln!("Usage: stencil render <file> [--arg name=value]... [--config file.json] [--debug]");
                std::process::exit(1);
            };
            match render_page(&PathBuf::from(path), &options) {
                Ok(output) => print!("{output}"),
                Err(err) => {
                    report(&err);
                    std::process::exit(1);
                }
            }
        }
        "eval" => {
            let options = parse_options(&args[2..]);
            let [source] = options.positional.as_slice() else {
                eprintln!("Usage: stencil eval \"<template>\" [--arg name=value]... [--config file.json]");
                std::process::exit(1);
            };
            match eval_source(source, &options) {
                Ok(output) => println!("{output}"),
                Err(err) => {
                    report(&err);
                    std::process::exit(1);
                }
            }
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: stencil check <file>...");
                std::process::exit(1);
            }
            let paths: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
            let report = check_sources(&paths);
            let mut stdout = std::io::stdout().lock();
            let is_tty = std::io::stdout().is_terminal();
            report.emit(&mut stdout, ColorMode::Auto, is_tty);
            if report.has_errors() {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => match args.get(2) {
            Some(code) => explain_code(code),
            None => print_usage(),
        },
        "version" | "--version" | "-V" => {
            println!("stencil {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> CliOptions {
    CliOptions::parse(args).unwrap_or_else(|message| {
        eprintln!("error: {message}");
        std::process::exit(1);
    })
}

fn explain_code(code: &str) {
    match code.parse::<ErrorCode>() {
        Ok(code) => println!("{code}: {}", code.description()),
        Err(_) => {
            eprintln!("Unknown error code: {code}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Stencil template engine");
    println!();
    println!("Usage: stencil <command> [options]");
    println!();
    println!("Commands:");
    println!("  render <file>        Render a page with its layouts");
    println!("  eval \"<template>\"    Render template text");
    println!("  check <file>...      Compile pages and report syntax errors");
    println!("  help [code]          Show this help, or explain an error code (e.g. E1004)");
    println!("  version              Show version information");
    println!();
    println!("Render and eval options:");
    println!("  --arg, -a <name=value>   Bind a global argument; JSON values are parsed");
    println!("  --config, -c <file>      Load context settings from a JSON file");
    println!("  --debug                  Enable debug mode");
    println!();
    println!("Logging:");
    println!("  RUST_LOG=stencil_eval=debug  Trace compilation and rendering");
    println!("  STENCIL_LOG_TREE=1           Print spans as a tree");
}
