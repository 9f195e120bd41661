mod cli;
mod config;
mod generate;
mod index;
mod loader;
mod mcp;
mod output;
mod tui;
mod utils;

use anyhow::{Context, Result};
use cli::{Cli, Commands, ConfigActions, OutputFormat, SortArg};
use config::Config;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use generate::GenerateOptions;
use index::{path, DirectoryIndex, ListOptions, SortOrder};
use loader::{LoadReport, ManifestLoader};
use output::{ListingResult, StatsResult};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tui::App;
use utils::{format_size_with, format_timestamp, FileCategory};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(&cli);

    let result = match Config::load() {
        Ok(config) => run(cli, config),
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Stderr belongs to the terminal UI while it runs, so it stays quiet unless
/// RUST_LOG asks otherwise.
fn init_logging(cli: &Cli) {
    let default_filter = match cli.command {
        None | Some(Commands::Browse { .. }) => "off",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    match cli.command {
        None => run_tui(None, config)?,
        Some(Commands::Browse { source }) => run_tui(source, config)?,
        Some(Commands::Ls {
            source,
            path,
            search,
            sort,
            page,
            page_size,
            format,
            out,
        }) => {
            let request = LsRequest {
                path,
                search,
                sort,
                page,
                page_size,
            };
            return run_ls(source, request, &config, format, out.as_deref());
        }
        Some(Commands::Stats { source, format }) => run_stats(source, &config, format)?,
        Some(Commands::Generate {
            root,
            out,
            part_size,
            gzip,
            exclude,
        }) => run_generate(&root, &out, part_size, gzip, exclude, &config)?,
        Some(Commands::Config { action }) => run_config(action, config)?,
        Some(Commands::Mcp { source }) => {
            let loader = open_source(source, &config)?;
            new_runtime()?.block_on(mcp::run_mcp_server(loader, config))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn new_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))
}

fn open_source(source: Option<String>, config: &Config) -> Result<ManifestLoader> {
    let location = source
        .or_else(|| config.source.default_manifest.clone())
        .context(
            "No manifest given. Pass a SOURCE or run `dirlens config set -k default_manifest -v <path>`",
        )?;
    ManifestLoader::open(&location, config.loader.concurrency)
}

fn run_tui(source: Option<String>, config: Config) -> Result<()> {
    let loader = open_source(source, &config)?;
    let runtime = new_runtime()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, loader, runtime);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

struct LsRequest {
    path: String,
    search: Option<String>,
    sort: Option<SortArg>,
    page: Option<usize>,
    page_size: Option<usize>,
}

fn run_ls(
    source: Option<String>,
    request: LsRequest,
    config: &Config,
    format: OutputFormat,
    out: Option<&str>,
) -> Result<ExitCode> {
    let loader = open_source(source, config)?;
    let dir = path::normalize(&request.path);

    let mut index = DirectoryIndex::new();
    let report = new_runtime()?.block_on(loader.load_for(&dir, &mut index))?;

    let sort = request
        .sort
        .map(SortOrder::from)
        .unwrap_or(config.browse.sort);
    let mut options = ListOptions::default().sort_by(sort);
    if let Some(text) = &request.search {
        options = options.search(text.clone());
    }
    if request.page.is_some() || request.page_size.is_some() {
        options = options.page(
            request.page.unwrap_or(1),
            request.page_size.unwrap_or(config.browse.page_size),
        );
    }
    let listing = index.list_directory(&dir, &options);

    match format {
        OutputFormat::Json => {
            let mut result = ListingResult::new(
                loader.location().display().to_string(),
                path::display(&dir),
                request.search.clone(),
                &listing,
            );
            result.failed_partitions = report.failed.iter().map(|(id, _)| id.clone()).collect();
            write_json(&result, out)?;
        }
        OutputFormat::Human => {
            println!(
                "{}  ({} folders, {} files)",
                path::display(&dir),
                listing.dir_count,
                listing.file_count
            );
            println!();

            if listing.entries.is_empty() {
                match request.search.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => println!("No matches for \"{}\"", text),
                    _ => println!("Folder is empty"),
                }
            }
            for entry in &listing.entries {
                let size = if entry.is_dir() {
                    String::new()
                } else {
                    format_size_with(entry.size, config.ui.show_sizes_in_bytes)
                };
                let modified = entry.modified().map(format_timestamp).unwrap_or_default();
                println!(
                    "  {} {:<40} {:>10}  {}",
                    FileCategory::of(entry).icon(),
                    entry.name,
                    size,
                    modified
                );
            }

            if let Some(page) = listing.page {
                println!();
                println!(
                    "Page {}/{} ({} items)",
                    page.page, page.total_pages, listing.total_items
                );
            }
            print_failures(&report);
        }
    }

    Ok(if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn run_stats(source: Option<String>, config: &Config, format: OutputFormat) -> Result<()> {
    let loader = open_source(source, config)?;
    let mut index = DirectoryIndex::new();
    let report = new_runtime()?.block_on(loader.load_all(&mut index))?;
    let stats = index.stats();

    match format {
        OutputFormat::Json => {
            let result = StatsResult::new(
                loader.location().display().to_string(),
                loader.index_document().is_some(),
                stats,
                index.warnings().iter().map(|w| w.to_string()).collect(),
            );
            write_json(&result, None)?;
        }
        OutputFormat::Human => {
            println!("Manifest: {}", loader.location().display());
            if let Some(document) = loader.index_document() {
                println!("  Parts: {} ({} loaded)", document.parts.len(), stats.partitions);
            }
            println!("  Folders: {}", stats.directories);
            println!("  Files: {}", stats.files);
            println!(
                "  Size: {}",
                format_size_with(stats.total_size, config.ui.show_sizes_in_bytes)
            );
            if stats.warnings > 0 {
                println!("  Skipped records: {}", stats.warnings);
                for warning in index.warnings().iter().take(10) {
                    println!("    - {}", warning);
                }
            }
            print_failures(&report);
        }
    }

    Ok(())
}

fn print_failures(report: &LoadReport) {
    if let Some(summary) = report.failure_summary() {
        eprintln!();
        eprintln!("{}", summary);
        for (id, reason) in &report.failed {
            eprintln!("  - {}: {}", id, reason);
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&str>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(path) = out {
        fs::write(path, &json)?;
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn run_generate(
    root: &str,
    out: &str,
    part_size: Option<usize>,
    gzip: bool,
    exclude: Vec<String>,
    config: &Config,
) -> Result<()> {
    let mut excluded = config.generate.excluded.clone();
    excluded.extend(exclude);
    let options = GenerateOptions {
        part_size: part_size.unwrap_or(config.generate.part_size),
        gzip: gzip || config.generate.gzip,
        excluded,
    };

    let report = generate::generate(Path::new(root), Path::new(out), &options)?;

    println!("Indexed {}", root);
    println!("  Folders: {}", report.folders);
    println!("  Files: {}", report.files);
    println!(
        "  Size: {}",
        format_size_with(report.total_size, config.ui.show_sizes_in_bytes)
    );
    if report.parts > 0 {
        println!("  Parts: {}", report.parts);
    }
    println!("Wrote {} file(s) to {}", report.written.len(), out);
    Ok(())
}

fn run_config(action: ConfigActions, mut config: Config) -> Result<()> {
    match action {
        ConfigActions::Show => {
            println!("Current configuration ({}):", Config::config_path().display());
            println!(
                "  Default manifest: {}",
                config.source.default_manifest.as_deref().unwrap_or("(none)")
            );
            println!("  Page size: {}", config.browse.page_size);
            println!("  Sort: {}", config.browse.sort.label());
            println!("  Loader concurrency: {}", config.loader.concurrency);
            println!("  Part size: {}", config.generate.part_size);
            println!("  Gzip: {}", config.generate.gzip);
            println!("  Excluded patterns:");
            for pattern in &config.generate.excluded {
                println!("    - {}", pattern);
            }
            println!("  Sizes in bytes: {}", config.ui.show_sizes_in_bytes);
        }
        ConfigActions::Set { key, value } => {
            if config.set(&key, &value)? {
                config.save()?;
                println!("Set {} to {}", key, value);
            } else {
                println!("Unknown key: {}", key);
                println!(
                    "Available keys: default_manifest, page_size, sort, concurrency, part_size, gzip, show_sizes_in_bytes"
                );
            }
        }
        ConfigActions::AddExclude { pattern } => {
            config.add_excluded_pattern(pattern.clone());
            config.save()?;
            println!("Added exclusion: {}", pattern);
        }
    }

    Ok(())
}
