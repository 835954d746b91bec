use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use xml2json::{ConvertOptions, DEFAULT_OUTPUT_FILE, FormatConfig, XmlConfig};

#[derive(Debug, Parser)]
#[command(name = "xml2json", version, about = "Convert XML documents to JSON")]
struct Args {
    /// Input XML file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Region code recorded as metadata.countryCode
    #[arg(short, long, value_name = "CODE")]
    country: Option<String>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT", conflicts_with = "download")]
    output: Option<PathBuf>,
    /// Write the result to converted-data.json in the current directory
    #[arg(short, long)]
    download: bool,
    /// Emit compact single-line JSON
    #[arg(long)]
    compact: bool,
    /// Maximum element nesting depth (0 means unlimited)
    #[arg(long, default_value_t = XmlConfig::default().max_depth)]
    max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    #[arg(long, default_value_t = XmlConfig::default().max_size)]
    max_size: usize,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            xml: XmlConfig::new(self.max_depth, self.max_size),
            region: self.country.clone().filter(|c| !c.trim().is_empty()),
        }
    }

    fn format(&self) -> FormatConfig {
        if self.compact {
            FormatConfig::compact()
        } else {
            FormatConfig::pretty()
        }
    }

    fn target(&self) -> Option<PathBuf> {
        if self.download {
            Some(PathBuf::from(DEFAULT_OUTPUT_FILE))
        } else {
            self.output.clone()
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let input_data = read_input(&args.input)?;
    let mut output = xml2json::xml_to_json(&input_data, &args.options(), &args.format())
        .context("failed to convert XML input")?;
    output.push('\n');

    let target = args.target();
    write_output(&target, output.as_bytes())?;
    if let Some(path) = &target {
        info!(path = %path.display(), bytes = output.len(), "wrote json");
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
