use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use env_logger::Target;
use log::info;
use rtc_stats_demos::{BUNDLED_FIXTURE, FixtureHost};
use stats::{Capability, NormalizerConfigBuilder, RenderDimensions, SimpleStats};
use std::time::Duration;
use std::{fs, fs::OpenOptions, io::Write, str::FromStr};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum HostPath {
    Track,
    Connection,
    None,
}

impl From<HostPath> for Capability {
    fn from(path: HostPath) -> Self {
        match path {
            HostPath::Track => Capability::TrackScoped,
            HostPath::Connection => Capability::ConnectionScoped,
            HostPath::None => Capability::Unsupported,
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-stats")]
#[command(author = "Rusty Rain <y@liu.mx>")]
#[command(version = "0.0.0")]
#[command(about = "Normalizes host WebRTC stats from a JSON fixture into a simple summary.")]
struct Cli {
    #[arg(short, long)]
    debug: bool,
    #[arg(short, long, default_value_t = format!("INFO"))]
    log_level: String,
    #[arg(short, long, default_value_t = format!(""))]
    input_file: String,
    #[arg(short, long, default_value_t = format!(""))]
    output_log_file: String,
    #[arg(short, long, value_enum, default_value_t = HostPath::Track)]
    path: HostPath,
    /// Size of the local video surface, as WIDTHxHEIGHT.
    #[arg(short, long)]
    render: Option<String>,
    #[arg(short, long, default_value_t = 10_000)]
    timeout_ms: u64,
}

fn parse_render(render: &str) -> Result<RenderDimensions> {
    let (width, height) = render
        .split_once('x')
        .ok_or_else(|| anyhow!("render must look like 640x480, got {render}"))?;
    Ok(RenderDimensions::new(width.parse()?, height.parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    if cli.debug {
        env_logger::Builder::new()
            .target(if !cli.output_log_file.is_empty() {
                Target::Pipe(Box::new(
                    OpenOptions::new()
                        .create(true)
                        .write(true)
                        .truncate(true)
                        .open(&cli.output_log_file)?,
                ))
            } else {
                Target::Stdout
            })
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}:{} [{}] {} - {}",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.level(),
                    chrono::Local::now().format("%H:%M:%S.%6f"),
                    record.args()
                )
            })
            .filter(None, log_level)
            .init();
    }

    let fixture = if cli.input_file.is_empty() {
        BUNDLED_FIXTURE.to_owned()
    } else {
        fs::read_to_string(&cli.input_file)?
    };
    let render = cli.render.as_deref().map(parse_render).transpose()?;

    let host = FixtureHost::from_json(cli.path.into(), &fixture)?;
    let config = NormalizerConfigBuilder::new()
        .with_timeout(Duration::from_millis(cli.timeout_ms))
        .build();
    let simple_stats = SimpleStats::new(host, config)?;
    info!("normalizing {} stats", simple_stats.source());

    simple_stats
        .get_simple_stats(render, |summary| {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("failed to encode summary: {err}"),
            }
        })
        .await?;

    Ok(())
}
