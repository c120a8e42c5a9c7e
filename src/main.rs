//! # pixgds CLI
//!
//! Command-line interface for converting images to GDSII layouts.
//!
//! ## Usage
//!
//! ```bash
//! # 2 µm cells on layer 4, writes image.gds and image.bmp
//! pixgds convert logo.png 2 4
//!
//! # Half size, dithered, darker threshold
//! pixgds convert logo.png 0.5 10 --scale 0.5 -d --threshold-offset -20
//!
//! # Swap black and white, custom output location
//! pixgds convert logo.png 1 4 --invert --out-dir build --name logo
//!
//! # Show the cells of a generated file
//! pixgds inspect build/logo.gds
//! ```
//!
//! Set `RUST_LOG=pixgds=debug` for per-stage details.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pixgds::{
    ConvertConfig, Error, ImageSource,
    convert::convert,
    layout::{boundaries, open_layout, references},
    output::{DEFAULT_STEM, OutputPaths},
};

/// pixgds - Convert raster images to GDSII layouts
#[derive(Parser, Debug)]
#[command(name = "pixgds")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image into a GDSII layout and a BMP preview
    Convert {
        /// Input image (png, jpeg, bmp, ...)
        image: PathBuf,

        /// Size of one unit cell (minimum width and space) in µm
        cell_size_um: f64,

        /// GDSII layer number of the unit cell (0..=32767)
        #[arg(allow_hyphen_values = true)]
        layer: i64,

        /// Resampling factor; invalid values fall back to 1.0
        #[arg(long, allow_hyphen_values = true)]
        scale: Option<f64>,

        /// Apply Floyd-Steinberg dithering
        #[arg(short = 'd', long)]
        dither: bool,

        /// Offset added to the Otsu threshold (negative: fewer white pixels)
        #[arg(
            long,
            alias = "threshold_offset",
            default_value_t = 0.0,
            allow_hyphen_values = true
        )]
        threshold_offset: f64,

        /// Swap black and white before building the layout
        #[arg(long)]
        invert: bool,

        /// Directory for the output files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// File stem of the output files
        #[arg(long, default_value = DEFAULT_STEM)]
        name: String,

        /// LIBNAME written to the GDSII file
        #[arg(long, default_value = "LIBRARY")]
        library: String,
    },

    /// Print the cells of a GDSII file
    Inspect {
        /// GDSII file to read
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixgds=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            image,
            cell_size_um,
            layer,
            scale,
            dither,
            threshold_offset,
            invert,
            out_dir,
            name,
            library,
        } => {
            let config = ConvertConfig {
                cell_size_um,
                layer,
                scale,
                dither,
                threshold_offset,
                invert,
                library_name: library,
                timestamp: None,
            };
            config.validate()?;

            let paths = OutputPaths::in_dir(&out_dir, &name);
            println!("Converting {}...", image.display());
            let report = convert(ImageSource::Path(image), &config, &paths)?;

            let (width, height) = report.dimensions;
            println!("Size: {}x{}", width, height);
            println!(
                "Threshold: otsu {} + offset {} = {}",
                report.threshold.otsu, report.threshold.offset, report.threshold.effective
            );
            println!(
                "Placed {} cells ({} corner fills)",
                report.references, report.corner_fills
            );
            println!("Saved {}", paths.layout.display());
            println!("Saved {}", paths.preview.display());
        }
        Commands::Inspect { file } => {
            let library = open_layout(&file)?;

            println!("Library: {} (stream version {})", library.name, library.version);
            println!("Database unit: {:e} m", library.units.db_unit());
            for structure in &library.structs {
                println!(
                    "  {:<8} {} polygons, {} references",
                    structure.name,
                    boundaries(structure).count(),
                    references(structure).count()
                );
                for reference in references(structure) {
                    if let Some(mag) = reference.strans.as_ref().and_then(|s| s.mag) {
                        println!("           -> {} x{}", reference.name, mag);
                    }
                }
            }
        }
    }

    Ok(())
}
