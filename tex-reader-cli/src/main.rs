use std::{
    fs,
    io::{Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;

use tex_reader::{LatexReader, ReaderOptions};

mod config_file;

/// Converts LaTeX documents to a JSON document tree
#[derive(Parser, Debug)]
#[command(version, about = "Converts LaTeX documents to a JSON document tree", long_about = None)]
struct Args {
    /// The LaTeX file to read; stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Read options from a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the JSON output here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Preserve unknown LaTeX as raw inlines and blocks
    #[arg(long)]
    raw_tex: bool,

    /// Disable user-defined macro expansion
    #[arg(long)]
    no_macros: bool,

    /// Disable smart quotes
    #[arg(long)]
    no_smart: bool,

    /// Treat |...| as inline code (literate Haskell)
    #[arg(long)]
    literate_haskell: bool,

    /// Extension appended to image paths without one
    #[arg(long, value_name = "EXT")]
    default_image_extension: Option<String>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let mut options = match &args.config {
        Some(path) => {
            config_file::load(path)
                .map_err(|e| format!("could not load config {}: {e}", path.display()))?
                .reader
        }
        None => ReaderOptions::default(),
    };
    if args.raw_tex {
        options.extensions.raw_tex = true;
    }
    if args.no_macros {
        options.extensions.latex_macros = false;
    }
    if args.no_smart {
        options.extensions.smart = false;
    }
    if args.literate_haskell {
        options.extensions.literate_haskell = true;
    }
    if let Some(ext) = &args.default_image_extension {
        options.default_image_extension = ext.clone();
    }

    let input = match &args.file {
        Some(path) => {
            options.input_sources = vec![path.clone()];
            fs::read_to_string(path)
                .map_err(|e| format!("could not read {}: {e}", path.display()))?
        }
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("could not read stdin: {e}"))?;
            buffer
        }
    };

    let reader = LatexReader::new(options);
    let outcome = reader.read(&input).map_err(|e| e.to_string())?;
    for log in &outcome.logs {
        eprintln!("warning: {log}");
    }

    let json = if args.compact {
        serde_json::to_string(&outcome.document)
    } else {
        serde_json::to_string_pretty(&outcome.document)
    }
    .map_err(|e| format!("could not serialize document: {e}"))?;

    match &args.output {
        Some(path) => {
            fs::write(path, json.as_bytes())
                .map_err(|e| format!("could not write {}: {e}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .map_err(|e| format!("could not write output: {e}"))?;
        }
    }
    Ok(())
}
