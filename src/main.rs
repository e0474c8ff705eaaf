//! request-digest CLI.
//!
//! Computes the cache fingerprint of a request described on the command line,
//! or validates a configuration file.
//!
//! ```text
//! request-digest --config digest.toml compute \
//!     --address http://svc/order -H "Content-Type: text/xml" --body order.xml
//! request-digest check digest.toml
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use request_digest::config::{load_config, DigestServiceConfig};
use request_digest::observability::logging::init_logging;
use request_digest::{DigestGenerator, FingerprintGenerator, RequestBody, RequestView};

#[derive(Parser)]
#[command(name = "request-digest")]
#[command(about = "Compute request fingerprints used as cache keys", long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of a request, or "none" when it has no body
    Compute {
        /// Destination address of the request
        #[arg(short, long)]
        address: Option<String>,

        /// Header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Body file, or "-" for stdin
        #[arg(short, long)]
        body: Option<PathBuf>,

        /// Media type of the body (selects the XML or JSON parser)
        #[arg(long, default_value = "application/xml")]
        content_type: String,

        /// Extra header to exclude (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Validate a configuration file
    Check {
        /// File to validate
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DigestServiceConfig::default(),
    };
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Compute {
            address,
            headers,
            body,
            content_type,
            exclude,
        } => {
            let mut generator_config = config.generator.clone();
            generator_config.headers_to_exclude.extend(exclude);
            let generator = FingerprintGenerator::new(&generator_config).with_metrics(false);

            let mut view = RequestView::new();
            view.destination_address = address;
            for header in &headers {
                let (name, value) = parse_header(header)?;
                view = view.with_header(name, value);
            }
            if let Some(path) = body {
                let bytes = read_body(&path)?;
                if !bytes.is_empty() {
                    view = view.with_body(RequestBody::raw(Some(&content_type), bytes));
                }
            }

            match generator.compute_digest(&view)? {
                Some(digest) => println!("{}", digest),
                None => println!("none"),
            }
        }
        Commands::Check { path } => {
            let checked = load_config(&path)?;
            tracing::info!(path = ?path, "Configuration is valid");
            println!("{}", toml::to_string_pretty(&checked)?);
        }
    }

    Ok(())
}

fn parse_header(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once(':')
        .map(|(n, v)| (n.trim(), v.trim()))
        .filter(|(n, _)| !n.is_empty())
        .ok_or_else(|| format!("invalid header '{}', expected \"Name: value\"", raw))
}

fn read_body(path: &Path) -> std::io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}
