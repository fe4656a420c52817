//! Pixelbin CLI - build, inspect and generate LED board containers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};

use pixelbin::{
    animation::{self, ContainerReader},
    project,
    schema::{Pattern, ProjectConfig},
    source,
};

#[derive(Parser, Debug)]
#[command(
    name = "pixelbin",
    version,
    about = "Convert pixel art directories to LED board containers"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build `<dir>/<dirname>_sequence.bin` from images and config.json.
    Build(BuildArgs),
    /// Build every subdirectory of ROOT that has a config.json, in parallel.
    Batch {
        root: PathBuf,
    },
    /// Validate a container and extract sample frames.
    Inspect(InspectArgs),
    /// Print header information and playable length.
    Info {
        file: PathBuf,
    },
    /// Render a pattern JSON file to a container.
    Pattern(PatternArgs),
    /// Print example config.json and pattern files.
    ExampleConfig,
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Image directories.
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// Output path (single directory only).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    file: PathBuf,

    /// Save sampled frames as PNG into this directory.
    #[arg(long)]
    extract: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PatternArgs {
    /// Pattern JSON (see `example-config`).
    pattern: PathBuf,

    #[arg(long, default_value_t = 12)]
    width: u32,

    #[arg(long, default_value_t = 12)]
    height: u32,

    #[arg(long, default_value_t = 5)]
    fps: u32,

    /// Output container path.
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Batch { root } => cmd_batch(&root),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Info { file } => cmd_info(&file),
        Command::Pattern(args) => cmd_pattern(args),
        Command::ExampleConfig => cmd_example_config(),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    if args.output.is_some() && args.dirs.len() > 1 {
        bail!("--output can only be used with a single directory");
    }
    for dir in &args.dirs {
        let summary = project::build_directory(dir, args.output.as_deref())
            .with_context(|| format!("build '{}'", dir.display()))?;
        println!("{}", summary);
    }
    Ok(())
}

fn cmd_batch(root: &Path) -> anyhow::Result<()> {
    let results = project::build_all(root).with_context(|| format!("scan '{}'", root.display()))?;
    let mut failed = 0;
    for (dir, result) in &results {
        match result {
            Ok(summary) => println!("ok   {}", summary),
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {}", dir.display(), e);
            }
        }
    }
    println!("{} built, {} failed", results.len() - failed, failed);
    if failed > 0 {
        bail!("{} project(s) failed", failed);
    }
    Ok(())
}

fn read_container(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read container '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = read_container(&args.file)?;
    let inspection = animation::inspect(&bytes).context("inspect container")?;
    let header = inspection.report.header;

    println!("Testing binary file: {}", args.file.display());
    println!(
        "Header: {} frames, {}x{}, {} fps",
        header.total_frames, header.width, header.height, header.fps
    );
    println!("{}", inspection.report);

    if let Some(dir) = &args.extract {
        fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
    }
    for sample in &inspection.samples {
        let note = if sample.is_delay { " (black / delay frame)" } else { "" };
        println!("Frame {}{}", sample.index, note);
        if let Some(dir) = &args.extract {
            let path = dir.join(format!("frame_{:06}.png", sample.index));
            source::save_png(&sample.frame, &path)
                .with_context(|| format!("save '{}'", path.display()))?;
            println!("  saved {}", path.display());
        }
    }

    if inspection.report.is_valid() {
        println!("Container OK");
        Ok(())
    } else {
        for defect in inspection.report.defects() {
            println!("Defect: {}", defect);
        }
        bail!("container has {} defect(s)", inspection.report.defects().len())
    }
}

fn cmd_info(file: &Path) -> anyhow::Result<()> {
    let bytes = read_container(file)?;
    let reader = ContainerReader::new(&bytes).context("read header")?;
    println!("{}", reader.info());
    if reader.is_truncated() {
        println!(
            "Warning: header declares {} frames, file holds {}",
            reader.frame_count(),
            reader.usable_frame_count()
        );
    }
    Ok(())
}

fn cmd_pattern(args: PatternArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.pattern)
        .with_context(|| format!("read pattern '{}'", args.pattern.display()))?;
    let pattern: Pattern = serde_json::from_str(&text).context("parse pattern JSON")?;
    let frames = pattern.render(args.width, args.height, args.fps)?;
    let stats = animation::write_container(&args.output, &frames, args.fps)
        .with_context(|| format!("write '{}'", args.output.display()))?;
    println!("{}: {}", args.output.display(), stats);
    Ok(())
}

fn cmd_example_config() -> anyhow::Result<()> {
    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&ProjectConfig::default())?);
    println!();
    println!("Example pattern (pattern.json):");
    println!("{}", serde_json::to_string_pretty(&Pattern::default())?);
    Ok(())
}
