use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use fractime::{
    ConstantTable, FractalParameters, LocalTime, ParameterMapper, RenderOptions, SeedResolver,
    SizeClass, render,
};

#[derive(Parser, Debug)]
#[command(name = "fractime", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single Julia-set PNG for a location.
    Render(RenderArgs),
    /// Print the fractal constants a seed maps to.
    Params(ParamsArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Region (country) name.
    #[arg(long)]
    region: String,

    /// City name.
    #[arg(long)]
    city: String,

    /// Size class (xs, s, m, l, xl, xxl).
    #[arg(long, default_value = "m")]
    size: String,

    /// Time-source base URL; omit to render with the fallback constants.
    #[arg(long)]
    time_source: Option<String>,

    /// Zoom factor.
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// Iteration budget per pixel.
    #[arg(long, default_value_t = 1000)]
    max_iter: u16,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ParamsArgs {
    /// Seed date, e.g. 2024-01-01.
    #[arg(long)]
    date: String,

    /// Seed time, e.g. 00:00:00.
    #[arg(long)]
    time: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("build tokio runtime")?;
    let mapper = ParameterMapper::new(ConstantTable::builtin()?);

    let seed = match &args.time_source {
        Some(base) => {
            let resolver = SeedResolver::new(base.clone())?;
            runtime.block_on(resolver.resolve(&args.region, &args.city))
        }
        None => None,
    };
    let params = mapper.map(seed.as_ref());

    let size = SizeClass::parse_or_default(&args.size);
    let options = RenderOptions {
        zoom: args.zoom,
        max_iter: args.max_iter,
        ..RenderOptions::default()
    };
    let artifact = render(params, size.resolution(), &options)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, artifact.to_png_bytes()?)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, c = {} + {}i)",
        args.out.display(),
        artifact.width,
        artifact.height,
        artifact.params.real,
        artifact.params.imaginary
    );
    Ok(())
}

fn cmd_params(args: ParamsArgs) -> anyhow::Result<()> {
    let mapper = ParameterMapper::new(ConstantTable::builtin()?);
    let seed = LocalTime {
        date: args.date,
        time: args.time,
    };
    let FractalParameters { real, imaginary } = mapper.map(Some(&seed));
    println!("{real} {imaginary}");
    Ok(())
}
