use clap::{Parser, Subcommand};
use rgbe_preview::config;
use rgbe_preview::imaging::RustCodec;
use rgbe_preview::pipeline::{self, RenderSettings};
use rgbe_preview::samples::{self, Sample};
use rgbe_preview::{output, rgbe, viewer};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "rgbe-preview")]
#[command(about = "Render Radiance HDR files and gain-map previews as PNG")]
#[command(long_about = "\
Render Radiance HDR files and gain-map previews as PNG

Samples are discovered in the assets directory:

  assets/
  ├── HDR_041_Path_Ref.hdr         # HDR sample \"HDR_041_Path_Ref\"
  ├── street_sdr.jpg               # ┐ gain-map pair sample \"street\"
  └── street_hdr.jpg               # ┘

Outputs land in the output directory:

  generated/
  ├── HDR_041_Path_Ref.png         # render, batch
  ├── HDR_041_Path_Ref.html        # render
  ├── street-{sdr,hdr,gain,base,boosted}.png
  └── street-viewer.html           # gain-map (self-contained)

Log verbosity follows -v / -vv, or RUST_LOG when set.

Run 'rgbe-preview gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Assets directory (overrides samples.dir from config)
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "generated", global = true)]
    output: PathBuf,

    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tone-map one .hdr file to PNG plus an HTML page
    Render {
        /// Sample id (defaults to samples.default from config)
        sample: Option<String>,
        /// Render this .hdr file instead of a sample
        #[arg(long, conflicts_with = "sample")]
        input: Option<PathBuf>,
        /// Linear exposure multiplier
        #[arg(long)]
        exposure: Option<f32>,
    },
    /// Estimate a gain map from an SDR/HDR pair and write the viewer
    GainMap {
        /// Pair sample id (defaults to the first pair found)
        sample: Option<String>,
        /// SDR JPEG path
        #[arg(long, requires = "hdr")]
        sdr: Option<PathBuf>,
        /// HDR JPEG path
        #[arg(long, requires = "sdr")]
        hdr: Option<PathBuf>,
        /// EV shift for the reconstructed image
        #[arg(long, allow_hyphen_values = true)]
        ev: Option<f32>,
    },
    /// Render every .hdr sample in parallel
    Batch,
    /// List discovered samples
    Samples,
    /// Print the header of an .hdr file
    Info {
        /// Path to the .hdr file
        path: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> CliResult {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config)?;
    let assets = cli
        .assets
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.samples.dir));
    let codec = RustCodec::new();

    match cli.command {
        Command::Render {
            sample,
            input,
            exposure,
        } => {
            let settings = RenderSettings {
                exposure: exposure.unwrap_or(config.tone_map.exposure),
            };
            check_exposure(settings.exposure)?;

            let (id, input) = match input {
                Some(path) => (file_id(&path), path),
                None => {
                    let found = samples::discover(&assets)?;
                    let id = sample.unwrap_or_else(|| config.samples.default.clone());
                    let sample = samples::resolve(&found, &id)?;
                    (sample.id.clone(), sample.require_hdr()?.to_path_buf())
                }
            };

            let png_name = format!("{id}.png");
            let report =
                pipeline::render_file(&codec, &input, &cli.output.join(&png_name), &settings)?;

            let page = viewer::render_hdr_page(
                &report.header,
                &png_name,
                settings.exposure,
                &config.viewer,
                &id,
            );
            let page_path = cli.output.join(format!("{id}.html"));
            pipeline::write_output(&page_path, page.into_string().as_bytes())?;

            output::print_render_output(&id, &report, settings.exposure, Some(&page_path));
        }
        Command::GainMap {
            sample,
            sdr,
            hdr,
            ev,
        } => {
            let ev = ev.unwrap_or(config.gain_map.ev_boost);
            check_ev(ev)?;

            let (id, sdr, hdr) = match (sdr, hdr) {
                (Some(sdr), Some(hdr)) => {
                    let id = sample.unwrap_or_else(|| pair_id(&sdr));
                    (id, sdr, hdr)
                }
                _ => {
                    let found = samples::discover(&assets)?;
                    let sample = pick_pair(&found, sample.as_deref(), &assets)?;
                    let (sdr, hdr) = sample.require_pair()?;
                    (sample.id.clone(), sdr.to_path_buf(), hdr.to_path_buf())
                }
            };

            let render = pipeline::gain_map_files(&codec, &sdr, &hdr, ev)?;
            for (suffix, png) in [
                ("sdr", &render.sdr_png),
                ("hdr", &render.hdr_png),
                ("gain", &render.gain_png),
                ("base", &render.base_png),
                ("boosted", &render.boosted_png),
            ] {
                pipeline::write_output(&cli.output.join(format!("{id}-{suffix}.png")), png)?;
            }

            let html = viewer::render_viewer(&render, &config.viewer, &id).into_string();
            let viewer_path = cli.output.join(format!("{id}-viewer.html"));
            pipeline::write_output(&viewer_path, html.as_bytes())?;

            output::print_gain_map_output(
                &id,
                &sdr,
                &hdr,
                &render,
                &viewer_path,
                html.len() as u64,
            );
        }
        Command::Batch => {
            let found = samples::discover(&assets)?;
            init_thread_pool(&config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::render_batch(
                &codec,
                &found,
                &cli.output,
                &RenderSettings::from_config(&config),
                Some(tx),
            );
            printer.join().ok();
            output::print_batch_summary(&result?);
        }
        Command::Samples => {
            let found = samples::discover(&assets)?;
            output::print_samples_output(&found, &assets);
        }
        Command::Info { path } => {
            let bytes = std::fs::read(&path)?;
            let header = rgbe::read_header(&bytes)?;
            output::print_info_output(&path, &header);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` picks the level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn check_exposure(exposure: f32) -> CliResult {
    if !exposure.is_finite() || exposure <= 0.0 {
        return Err(format!("--exposure must be a positive finite number, got {exposure}").into());
    }
    Ok(())
}

fn check_ev(ev: f32) -> CliResult {
    let max = config::MAX_EV_BOOST;
    if !ev.is_finite() || ev.abs() > max {
        return Err(format!("--ev must be within [-{max}, {max}], got {ev}").into());
    }
    Ok(())
}

/// Output id for an explicit input path: its file stem.
fn file_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string())
}

/// Output id for an explicit pair: the SDR stem without its `_sdr` suffix.
fn pair_id(sdr: &Path) -> String {
    let stem = file_id(sdr);
    match stem.strip_suffix("_sdr").or_else(|| stem.strip_suffix("_SDR")) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => stem,
    }
}

fn pick_pair<'a>(found: &'a [Sample], id: Option<&str>, assets: &Path) -> CliResult<&'a Sample> {
    match id {
        Some(id) => Ok(samples::resolve(found, id)?),
        None => found
            .iter()
            .find(|s| s.pair_paths().is_some())
            .ok_or_else(|| format!("no gain-map pairs in {}", assets.display()).into()),
    }
}
