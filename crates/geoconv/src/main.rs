use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use geoconv::convert::datacube::{datacube_to_geocroissant, Datacube};
use geoconv::convert::geodcat::{
    check_document, geocroissant_to_geodcat, GeoDcatOptions, RdfFormat,
};
use geoconv::convert::stac::stac_to_geocroissant;
use geoconv::convert::stac_item::geocroissant_to_stac_item;
use geoconv::convert::tdml::{geocroissant_to_tdml, tdml_to_geocroissant, TrainingDataset};
use geoconv::emitter::jsonld::JsonLdEmitter;
use geoconv::emitter::ntriples::NTriplesEmitter;
use geoconv::emitter::turtle::TurtleEmitter;
use geoconv::loader::{load_json, save_json};

/// Transcode geospatial dataset metadata between STAC, GeoCroissant,
/// GeoDCAT, OGC-TDML and datacube descriptions.
#[derive(Parser)]
#[command(name = "geoconv", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// STAC collection or item JSON to GeoCroissant JSON-LD.
    StacToGeocroissant(IoArgs),

    /// GeoCroissant JSON-LD to a STAC Item.
    GeocroissantToStac(IoArgs),

    /// GeoCroissant JSON-LD to GeoDCAT RDF.
    GeocroissantToGeodcat {
        #[command(flatten)]
        args: IoArgs,

        /// Output format: turtle, ntriples, jsonld.
        #[arg(short, long, value_name = "FORMAT", default_value = "turtle")]
        format: String,

        /// Base URI for minted IRIs.
        #[arg(short, long, value_name = "URI", default_value = "https://example.org")]
        base_uri: String,
    },

    /// OGC Training Data Markup Language JSON to GeoCroissant.
    TdmlToGeocroissant(IoArgs),

    /// GeoCroissant JSON-LD to OGC Training Data Markup Language JSON.
    GeocroissantToTdml(IoArgs),

    /// Datacube attribute dictionary JSON to GeoCroissant.
    DatacubeToGeocroissant {
        #[command(flatten)]
        args: IoArgs,

        /// URL of the Zarr store the datacube is served from.
        #[arg(long, value_name = "URL")]
        zarr_url: String,
    },
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input JSON file.
    input: PathBuf,

    /// Output file path [default: stdout].
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "geoconv=debug"
    } else if cli.quiet {
        "geoconv=warn"
    } else {
        "geoconv=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Write JSON to `output`, or pretty-print it to stdout.
fn write_json(value: &Value, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => save_json(value, path)?,
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

fn output_writer(output: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::StacToGeocroissant(args) => {
            let doc = stac_to_geocroissant(args.input.as_path(), args.output.as_deref())?;
            if args.output.is_none() {
                write_json(&doc, None)?;
            }
        }
        Command::GeocroissantToStac(args) => {
            let doc = load_json(&args.input)?;
            let item = geocroissant_to_stac_item(&doc);
            write_json(&item, args.output.as_deref())?;
        }
        Command::GeocroissantToGeodcat {
            args,
            format,
            base_uri,
        } => {
            let options = GeoDcatOptions {
                base_uri,
                format: format.parse::<RdfFormat>()?,
            };
            let doc = load_json(&args.input)?;
            check_document(&doc)?;
            let writer = output_writer(args.output.as_deref())?;
            let triple_count = match options.format {
                RdfFormat::Turtle => {
                    geocroissant_to_geodcat(&doc, &mut TurtleEmitter::new(writer), &options)?
                }
                RdfFormat::NTriples => {
                    geocroissant_to_geodcat(&doc, &mut NTriplesEmitter::new(writer), &options)?
                }
                RdfFormat::JsonLd => {
                    geocroissant_to_geodcat(&doc, &mut JsonLdEmitter::new(writer), &options)?
                }
            };
            info!("Wrote {triple_count} GeoDCAT triples");
        }
        Command::TdmlToGeocroissant(args) => {
            let tdml: TrainingDataset = serde_json::from_value(load_json(&args.input)?)?;
            write_json(&tdml_to_geocroissant(&tdml), args.output.as_deref())?;
        }
        Command::GeocroissantToTdml(args) => {
            let doc = load_json(&args.input)?;
            let tdml = serde_json::to_value(geocroissant_to_tdml(&doc)?)?;
            write_json(&tdml, args.output.as_deref())?;
        }
        Command::DatacubeToGeocroissant { args, zarr_url } => {
            let cube: Datacube = serde_json::from_value(load_json(&args.input)?)?;
            let doc = datacube_to_geocroissant(&cube, &zarr_url)?;
            write_json(&doc, args.output.as_deref())?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
