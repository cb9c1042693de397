mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use edge_ascii::Converter;
use std::fs::File;
use std::io::{self, BufWriter, Write};

fn main() -> Result<()> {
    // Stage progress shows with RUST_LOG=info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            run(&args, &mut BufWriter::new(file))
        }
        None => run(&args, &mut io::stdout().lock()),
    }
}

/// Decode the image, convert it and write one line per character row
fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let converter = Converter::new(args.to_config()).context("Invalid configuration")?;

    let img = image::open(&args.image)
        .with_context(|| format!("Failed to decode image {}", args.image.display()))?
        .to_rgba8();
    log::info!(
        "Loaded {} ({}x{})",
        args.image.display(),
        img.width(),
        img.height()
    );

    let art = converter
        .convert(&img)
        .context("Failed to convert to ascii")?;

    for row in art.rows() {
        let line: String = row.iter().collect();
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}
