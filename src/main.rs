use anyhow::Result;
use clap::Parser;
use simarium_core::config::GalleryConfig;
use simarium_data::SimulationKind;
use simarium_lib::app::{App, Tui};

#[derive(Parser, Debug)]
#[command(author, version, about = "A gallery of small real-time 2D simulations", long_about = None)]
struct Args {
    /// Simulation to open (see --list)
    #[arg(short, long, default_value = "flocking")]
    sim: String,

    /// Custom config file path
    #[arg(short, long, default_value = "simarium.toml")]
    config: String,

    /// Seed for deterministic replay (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// List the available simulations and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        for kind in SimulationKind::ALL {
            println!("{:10}  {}", kind.slug(), kind.title());
        }
        return Ok(());
    }

    simarium_core::init_logging();

    let config = match std::fs::read_to_string(&args.config) {
        Ok(text) => GalleryConfig::from_toml(&text)?,
        Err(_) => GalleryConfig::default(),
    };
    let kind: SimulationKind = args.sim.parse().map_err(anyhow::Error::msg)?;
    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    tracing::info!(seed, fingerprint = %config.fingerprint(), "Starting gallery");

    let mut tui = Tui::new()?;
    tui.init()?;

    let mut app = App::new(config, seed, kind);
    let result = app.run(&mut tui);

    tui.exit()?;

    if let Err(e) = &result {
        eprintln!("Application error: {e}");
    }
    result
}
