//! Entry point for the tomoprep application.
//! Parses the command line, sets up logging and dispatches to the requested command.

use clap::Parser;
use std::path::PathBuf;
use tomo_prep::pipelines::{self, NormalizeOptions, PreprocessOptions};
use tomo_prep::{combine_vertical_stack, logging, CombineOptions, Result, VolumeFormat};
use tracing::{error, info};

mod cli;

use cli::{Args, Command};

fn run(command: Command) -> Result<()> {
    match command {
        Command::Combine(args) => {
            let options = CombineOptions {
                zstart: args.zstart,
                binning: args.binning,
                reduction: args.reduction,
                extension: args.suffix,
                ..CombineOptions::default()
            }
            .with_tokens(&args.extensions);
            let mut format = VolumeFormat::from_path(&options.extension);
            info!("Volume format {}", format);
            combine_vertical_stack(
                &mut format,
                &args.base_file,
                args.num_files,
                args.pixel_overlap,
                &options,
            )?;
        }
        Command::Normalize(args) => {
            let options = NormalizeOptions {
                first_image: args.first_image,
                last_image: args.last_image,
                xshift: args.xshift,
                yshift: args.yshift,
                dark_value: args.dark_value,
                zinger_threshold: args.zinger_threshold,
                zinger_filter_size: args.zinger_filter_size,
            };
            pipelines::normalize_radiographs(&args.flat_file, &args.radiography_file, &options)?;
        }
        Command::Preprocess(args) => {
            let options = PreprocessOptions {
                dark_value: args.dark_value,
                zinger_threshold: args.zinger_threshold,
                zinger_filter_size: args.zinger_filter_size,
            };
            pipelines::preprocess_13bm(&args.filename, &options)?;
        }
        Command::ReplaceFlats(args) => {
            pipelines::replace_flat_fields(&args.bad_file, &args.good_file)?;
        }
    }
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Normalization keeps a log next to its output
    let log_file = match &args.command {
        Command::Normalize(normalize) => Some(PathBuf::from(pipelines::normalized_log_name(
            &normalize.radiography_file,
        ))),
        _ => None,
    };
    logging::init(args.verbose, log_file.as_deref())?;

    if let Err(e) = run(args.command) {
        error!("{}", e);
        return Err(e.into());
    }
    info!("Done");
    Ok(())
}
