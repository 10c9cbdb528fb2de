use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "framemark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a shapes JSON array from a display size into reference space.
    Normalize(NormalizeArgs),
    /// Convert a persisted canvas envelope back to a display size.
    Denormalize(DenormalizeArgs),
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Input shapes JSON (array of objects).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Display width the shapes were drawn at.
    #[arg(long)]
    width: f64,

    /// Display height the shapes were drawn at.
    #[arg(long)]
    height: f64,

    /// Output path for the canvas envelope; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DenormalizeArgs {
    /// Input canvas envelope JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target display width.
    #[arg(long)]
    width: f64,

    /// Target display height.
    #[arg(long)]
    height: f64,

    /// Output path for the shapes array; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Normalize(args) => cmd_normalize(args),
        Command::Denormalize(args) => cmd_denormalize(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    let value = serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))?;
    Ok(value)
}

fn write_json<T: serde::Serialize>(value: &T, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("write json '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let shapes: Vec<framemark::Shape> = read_json(&args.in_path, "shapes")?;
    for shape in &shapes {
        shape.validate()?;
    }
    let canvas = framemark::normalize(&shapes, args.width, args.height)?;
    write_json(&canvas, args.out.as_deref())
}

fn cmd_denormalize(args: DenormalizeArgs) -> anyhow::Result<()> {
    let canvas: framemark::CanvasData = read_json(&args.in_path, "canvas envelope")?;
    let shapes = framemark::denormalize(&canvas, args.width, args.height)?;
    write_json(&shapes, args.out.as_deref())
}
