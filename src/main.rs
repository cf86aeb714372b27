use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use retinai::archive::{ImageArchive, Persisted, PruneMode};
use retinai::classify::{ApWeightedClassifier, Classifier};
use retinai::cli::{Cli, Command};
use retinai::config::Config;
use retinai::export::Exporter;
use retinai::history::HistoryStore;
use retinai::maps;
use retinai::report::{self, table};
use retinai::share::{self, NoShare, ShareOutcome, ShareSink, SystemOpener};
use retinai::store::SqliteStore;
use retinai::util;
use retinai::{Error, Result};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "retinai=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn open_history(config: &Config) -> Result<HistoryStore<SqliteStore>> {
    let kv = SqliteStore::open(&config.db_path)?;
    Ok(HistoryStore::new(kv, config.history_key.clone()))
}

fn share_document(config: &Config, path: &std::path::Path) {
    let sink: Box<dyn ShareSink> = if config.share {
        Box::new(SystemOpener::new(config.platform))
    } else {
        Box::new(NoShare)
    };

    match share::share_or_surface(sink.as_ref(), path, share::JSON_MIME) {
        ShareOutcome::Shared => println!("Shared {}", path.display()),
        ShareOutcome::Surfaced(path) => println!("Saved to: {}", path.display()),
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let archive = ImageArchive::new(&config.images_dir);
    let exporter = Exporter::new(&config.export_dir);

    match command {
        Command::Scan(args) => {
            if !args.image.is_file() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no image at {}", args.image.display()),
                )));
            }

            let mut history = open_history(config)?;

            let persisted = archive.persist(&args.image);
            if let Persisted::Transient { error, .. } = &persisted {
                eprintln!("warning: {error}");
                eprintln!("warning: the record points at the original file, which may not last");
            }

            let classification = ApWeightedClassifier::new().classify();
            let record = classification.to_record(persisted.path().to_string_lossy());
            let id = record.id.clone();
            history.add(record)?;

            report::print(&classification, args.json, table::render_classification)?;
            if !args.json {
                println!("\nrecorded as {id}");
            }

            if args.share {
                let path = exporter.write_results(&classification)?;
                share_document(config, &path);
            }
        }
        Command::History(args) => {
            let records = open_history(config)?.list();
            report::print(records.as_slice(), args.json, table::render_history)?;
        }
        Command::Show(args) => match open_history(config)?.get(&args.id) {
            Some(record) => report::print(&record, args.json, table::render_record)?,
            None => println!("No scan with id '{}'.", args.id),
        },
        Command::Delete(args) => {
            let mut history = open_history(config)?;
            match history.delete(&args.id, !args.keep_image, &archive)? {
                Some(record) => println!("deleted: {} ({})", record.id, record.main_condition),
                None => println!("No scan with id '{}', nothing deleted.", args.id),
            }
        }
        Command::Clear => {
            open_history(config)?.clear()?;
            println!("History cleared.");
        }
        Command::Export(args) => match open_history(config)?.export(&exporter)? {
            None => println!("Nothing to export."),
            Some(path) if args.share => share_document(config, &path),
            Some(path) => println!("Exported history to {}", path.display()),
        },
        Command::Prune(args) => {
            let records = open_history(config)?.list();
            let mode = if args.dry_run { PruneMode::DryRun } else { PruneMode::Execute };

            let result = archive.prune(&records, mode)?;

            for path in &result.removed {
                if args.dry_run {
                    println!("[dry-run] would delete: {}", path.display());
                } else {
                    println!("deleted: {}", path.display());
                }
            }

            if !result.errors.is_empty() {
                eprintln!("\nerrors encountered:");
                for error in &result.errors {
                    eprintln!("  {error}");
                }
            }

            let freed = util::format_bytes(result.bytes_freed);
            if args.dry_run {
                println!("\nwould free: {freed}");
            } else {
                println!("\nfreed: {freed}");
            }
        }
        Command::Specialist(args) => {
            if args.print {
                println!("{}", maps::platform_url(config.platform, &config.search_term));
            } else {
                let opener = SystemOpener::new(config.platform);
                match maps::open_find_specialist(&opener, config.platform, &config.search_term) {
                    Ok(url) => println!("Opened {url}"),
                    Err(e) => {
                        eprintln!("Unable to open maps. Please try again or search for ophthalmologists in your maps app.");
                        return Err(e);
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_cli(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
