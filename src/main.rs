use atelier_sync::loader::{ContentLoader, Fetcher, FileFetcher, HttpFetcher};
use atelier_sync::notify::LogNotifier;
use atelier_sync::publish::{GitHubTransport, Publisher};
use atelier_sync::sync::SyncTarget;
use atelier_sync::types::PageContentDocument;
use atelier_sync::{catalog, config, naming, output, pages, populate, sheet, sync};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier-sync")]
#[command(about = "Sync the atelier spreadsheet to the website")]
#[command(long_about = "\
Sync the atelier spreadsheet to the website

Two sheets drive the site. Each sync exports a sheet as CSV, converts it to
JSON, and commits both files to the site's GitHub repository.

  Products  →  assets/data/products.csv + products.json
  Pages     →  assets/data/pages-content.csv + pages-content.json

The spreadsheet is an .xlsx/.xls/.ods workbook, or a directory holding one
<Sheet>.csv per sheet (source.path in atelier.toml).

If the JSON step fails after the CSV is published, the sync reports a
partial update; the next sync regenerates the JSON.

Run 'atelier-sync gen-config' to generate a documented atelier.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish the Products sheet as CSV and catalog JSON
    Sync,
    /// Publish the Pages sheet as CSV and page-content JSON
    SyncPages,
    /// Fill the Products sheet from the published CSV (or sample rows)
    Setup,
    /// Fill the Pages sheet from the published CSV (or sample rows)
    SetupPages,
    /// Print one sheet as CSV
    Export {
        /// Sheet name
        sheet: String,
    },
    /// Convert a products CSV file to catalog JSON
    Convert(ConvertArgs),
    /// Convert a pages CSV file to page-content JSON
    ConvertPages(ConvertArgs),
    /// Show what a page would be populated with
    Preview {
        /// Page URL path, e.g. /pages/made-to-measure.html
        page_path: String,
        /// Read page content from this JSON file instead of the live site
        #[arg(long, conflicts_with = "site")]
        content: Option<PathBuf>,
        /// Site root URL, overriding site.base_url
        #[arg(long)]
        site: Option<String>,
    },
    /// Validate config and both sheets without publishing
    Check,
    /// Print a stock atelier.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input CSV file
    csv: PathBuf,
    /// Write JSON here and print a summary; without it JSON goes to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Command::Sync => run_sync(&cli.config, SyncTarget::products)?,
        Command::SyncPages => run_sync(&cli.config, SyncTarget::pages)?,
        Command::Setup => run_setup(&cli.config, SyncTarget::products)?,
        Command::SetupPages => run_setup(&cli.config, SyncTarget::pages)?,
        Command::Export { sheet: name } => {
            let config = config::load_config(&cli.config)?;
            let source = sheet::open_source(Path::new(&config.source.path))?;
            println!("{}", sheet::sheet_to_csv(source.as_ref(), &name)?);
        }
        Command::Convert(args) => {
            let text = std::fs::read_to_string(&args.csv)?;
            let json = catalog::transform_to_json(&text)?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    output::print_catalog_summary(&catalog::transform(&text));
                    println!("==> Wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::ConvertPages(args) => {
            let text = std::fs::read_to_string(&args.csv)?;
            let json = pages::transform_pages_to_json(&text)?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    output::print_pages_summary(&pages::transform_pages(&text));
                    println!("==> Wrote {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Preview {
            page_path,
            content,
            site,
        } => match content {
            Some(file) => {
                let dir = file.parent().unwrap_or(Path::new("."));
                let name = file
                    .file_name()
                    .ok_or_else(|| format!("not a file: {}", file.display()))?
                    .to_string_lossy()
                    .into_owned();
                preview(FileFetcher::new(dir), &name, &page_path);
            }
            None => {
                let base = match site {
                    Some(url) => url,
                    None => config::load_config(&cli.config)?.site.base_url,
                };
                let url = naming::json_path_for(&page_path, naming::PAGES_JSON);
                preview(HttpFetcher::new(&base)?, &url, &page_path);
            }
        },
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", config.source.path);
            let source = sheet::open_source(Path::new(&config.source.path))?;

            let products = SyncTarget::products(&config);
            let text = sheet::sheet_to_csv(source.as_ref(), &products.sheet_name)?;
            output::print_catalog_summary(&catalog::transform(&text));

            let page_target = SyncTarget::pages(&config);
            let text = sheet::sheet_to_csv(source.as_ref(), &page_target.sheet_name)?;
            output::print_pages_summary(&pages::transform_pages(&text));

            match config.require_github() {
                Ok(gh) => println!("==> Publishing to {}/{} ({})", gh.owner, gh.repo, gh.branch),
                Err(e) => println!("==> Not ready to publish: {e}"),
            }
            println!("==> Sheets are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "reqwest=warn,calamine=warn,{}",
            log_level
        )))
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn run_sync(
    config_path: &Path,
    target_for: fn(&config::SyncConfig) -> SyncTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let target = target_for(&config);
    let source = sheet::open_source(Path::new(&config.source.path))?;
    let publisher = Publisher::new(
        GitHubTransport::new(config.require_github()?)?,
        config.github.branch.clone(),
    );
    let notifier = LogNotifier::new(
        format!("Atelier {}", target.label),
        config.notification_email(),
    );

    println!("==> Syncing sheet '{}'", target.sheet_name);
    let report = sync::sync(&target, source.as_ref(), &publisher, &notifier)?;
    output::print_sync_report(&report);
    Ok(())
}

fn run_setup(
    config_path: &Path,
    target_for: fn(&config::SyncConfig) -> SyncTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let target = target_for(&config);
    let sink = sheet::open_source(Path::new(&config.source.path))?;
    let publisher = Publisher::new(
        GitHubTransport::new(config.require_github()?)?,
        config.github.branch.clone(),
    );

    let outcome = sync::setup(&target, sink.as_ref(), &publisher)?;
    output::print_setup(&target, outcome);
    Ok(())
}

/// Load the page-content document at `url` and print the plan for `page_path`.
fn preview<F: Fetcher>(fetcher: F, url: &str, page_path: &str) {
    let page_id = naming::page_id_for_path(page_path);
    let mut loader: ContentLoader<PageContentDocument, F> = ContentLoader::new(fetcher, url);

    if loader.load().is_none() {
        println!("==> No page content available; {page_path} keeps its static content");
        return;
    }
    let assignments = populate::plan(page_id, &loader.view());
    output::print_plan(page_id, &assignments);
}
