use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fdic::container::{read_container_file, write_container_file};
use fdic::strategies::{all_strategies, compare, StrategyReport};
use fdic::word_list::{format_word_list, parse_word_list};
use fdic::{CodecConfig, FrequencyBuilder, FrequencyDictionary, Result};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(about = "Store word-frequency lists in a Huffman-compressed binary dictionary")]
struct Args {
    /// JSON file with codec settings (terminator, decode_capacity)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Longest term, in characters, accepted when reading a dictionary
    #[arg(long, global = true)]
    max_term_len: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a "<term> <count>" word list into a dictionary file
    Pack {
        /// The plain-text word list
        source_name: PathBuf,
        /// The destination dictionary file
        dest_name: PathBuf,
    },
    /// Print the word list stored in a dictionary file
    Unpack {
        /// The dictionary file
        source_name: PathBuf,
    },
    /// Compare sizes and load times of every storage strategy
    Compare {
        /// The plain-text word list
        source_name: PathBuf,
        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fdic=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CodecConfig::from_json_file(path)?,
        None => CodecConfig::default(),
    };
    if let Some(max_term_len) = args.max_term_len {
        config = config.with_decode_capacity(max_term_len);
    }

    match args.command {
        Command::Pack {
            source_name,
            dest_name,
        } => {
            let dict = load_word_list(&source_name)?;
            let codec = FrequencyBuilder::from_dictionary(&dict).build(config)?;
            let written = write_container_file(&dest_name, &codec, &dict)?;
            info!(
                entries = dict.len(),
                symbols = codec.code_table().len(),
                bytes = written,
                dest = %dest_name.display(),
                "packed dictionary"
            );
        }
        Command::Unpack { source_name } => {
            let (_, dict) = read_container_file(&source_name, config)?;
            print!("{}", format_word_list(&dict));
        }
        Command::Compare { source_name, json } => {
            let dict = load_word_list(&source_name)?;
            let reports = compare(&dict, &all_strategies(config));
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                print_reports(&reports);
            }
        }
    }
    Ok(())
}

fn load_word_list(path: &Path) -> Result<FrequencyDictionary> {
    let text = std::fs::read_to_string(path)?;
    let dict = parse_word_list(&text)?;
    info!(entries = dict.len(), source = %path.display(), "loaded word list");
    Ok(dict)
}

fn print_reports(reports: &[StrategyReport]) {
    println!("Binary Frequency Dictionary Compression");
    println!("---------------------------------------");
    println!();
    println!("Speed:");
    println!("------");
    for report in reports {
        println!(
            "{:>8} took {:.3}ms to load",
            report.name,
            report.load_nanos as f64 / 1_000_000.0
        );
    }

    let (Some(txt), Some(fdic)) = (
        reports.iter().find(|r| r.name == "txt"),
        reports.iter().find(|r| r.name == "fdic"),
    ) else {
        return;
    };

    println!();
    let speed = fdic.load_ratio(txt);
    if speed > 1.0 {
        println!("fdic was {} slower than txt", percent(speed - 1.0));
    } else {
        println!("fdic was {} faster than txt", percent(1.0 - speed));
    }

    println!();
    println!("Compression:");
    println!("------------");
    for report in reports {
        println!("{:>8} size: {} KB", report.name, report.size_bytes / 1024);
    }

    println!();
    let ratio = fdic.size_ratio(txt);
    println!("fdic was {} of the original size", percent(ratio));
    println!(
        "a reduction of {} ({} B)",
        percent(1.0 - ratio),
        txt.size_bytes as i64 - fdic.size_bytes as i64
    );

    println!();
    println!("----");
    for report in reports {
        let status = if report.valid { "valid" } else { "INVALID" };
        println!("{:>8} is {}", report.name, status);
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
