use crate::config::load_config;
use crate::diagram::{Diagram, parse_document};
use crate::drag::DragController;
use crate::palette::PairPalette;
use crate::path_dump::{PathDump, write_path_dump};
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "relroute", version, about = "Route relationship edges of a diagram document")]
pub struct Args {
    /// Input document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (routing constants, theme, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Recompute parallelIndex/parallelCount from the edge endpoints
    #[arg(long = "assign-parallel")]
    pub assign_parallel: bool,

    /// Exit with an error when the document has integrity problems
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let document = parse_document(&input)?;
    let mut diagram = Diagram::from_document(&document);
    if args.assign_parallel {
        diagram.assign_parallel_slots();
    }

    let problems = diagram.validate();
    for problem in &problems {
        eprintln!("warning: {problem}");
    }
    if args.strict && !problems.is_empty() {
        return Err(anyhow::anyhow!("{} integrity problem(s) in input", problems.len()));
    }

    let routed = diagram.frame(
        &config.routing,
        &DragController::new(),
        &document.selection,
        document.hovered_group.as_deref(),
    );

    match args.output_format {
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_path_dump(path, &diagram, &routed)?,
            None => {
                let dump = PathDump::from_frame(&diagram, &routed);
                let mut stdout = io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &dump)?;
                writeln!(stdout)?;
            }
        },
        OutputFormat::Svg => {
            let palette = PairPalette::for_edges(diagram.edges());
            let svg = render_svg(&diagram, &routed, &config.theme, &palette, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let palette = PairPalette::for_edges(diagram.edges());
            let svg = render_svg(&diagram, &routed, &config.theme, &palette, &config.render);
            write_png(&svg, &output, &config)?;
        }
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &crate::config::Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &crate::config::Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
