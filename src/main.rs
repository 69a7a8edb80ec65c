use anyhow::{Context, Result};
use chainplot::csv_reader;
use chainplot::graph;
use chainplot::parser;
use chainplot::runtime::Session;
use chainplot::{Chain, ChartOptions, Dataset};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chainplot")]
#[command(about = "Explore CSV data through a chain of linked, brushable charts", long_about = None)]
struct Args {
    /// CSV file to load
    file: PathBuf,

    /// Treat the file as time-series data (date columns from the fifth column on)
    #[arg(long)]
    timeseries: bool,

    /// Session commands, e.g. 'color group | brush 50 50 400 400'
    #[arg(long, conflicts_with = "script_file")]
    script: Option<String>,

    /// Read session commands from a file
    #[arg(long)]
    script_file: Option<PathBuf>,

    /// JSON file with chart options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render a link to a .png or .svg file
    #[arg(long)]
    render: Option<PathBuf>,

    /// Link to render; defaults to the focused link
    #[arg(long)]
    link: Option<usize>,

    /// Log every recomputation to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let options = match &args.config {
        Some(path) => ChartOptions::from_json_file(path)?,
        None => ChartOptions::default(),
    };

    let csv_data = csv_reader::read_csv_file(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let data = Dataset::from_csv(csv_data);
    let chain = Chain::new(data, options, args.timeseries).context("Failed to build the first chart")?;

    let script_text = match (&args.script, &args.script_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        (None, None) => String::new(),
    };
    let script = parser::parse(&script_text)?;

    let mut session = Session::new(chain);
    session.execute(&script);

    if let Some(path) = &args.render {
        let index = args.link.unwrap_or_else(|| session.focus());
        let state = session
            .chain()
            .link(index)
            .with_context(|| format!("Cannot render link {}", index))?;
        graph::save(state, path)?;
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &session.report()).context("Failed to write summary")?;
    writeln!(handle).context("Failed to write summary")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
