use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use adex_decoding::config::ExperimentConfig;
use adex_decoding::discrimination::{discrimination_combinations, DiscriminabilityGrid};
use adex_decoding::error::DecodingError;
use adex_decoding::persistence::{save, SimType};
use adex_decoding::population::Population;
use adex_decoding::sweep::{evaluate_amplitude_discrimination, evaluate_frequency_discrimination};

#[derive(Parser, Debug)]
struct Args {
    /// The experiment configuration file (JSON)
    #[arg(short, long)]
    config: PathBuf,
    /// Override the seed of the nuisance parameter draws
    #[arg(long)]
    seed: Option<u64>,
    /// The directory of the log files
    #[arg(long, default_value = "log")]
    log_dir: PathBuf,
    /// Don't save the sweep results
    #[arg(long)]
    no_save: bool,
}

fn init_logging(log_path: PathBuf) -> Result<(), DecodingError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {l} - {m}\n")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(log_path)
        .map_err(|e| DecodingError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(LevelFilter::Info),
        )
        .map_err(|e| DecodingError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| DecodingError::IOError(e.to_string()))?;
    Ok(())
}

fn log_grid(label: &str, grid: &DiscriminabilityGrid) {
    log::info!("{} discriminability over levels {:?}", label, grid.levels);
    for (i, level) in grid.levels.iter().enumerate() {
        let row: Vec<String> = (0..grid.size())
            .map(|j| format!("{:.3}", grid.zz[(i, j)]))
            .collect();
        log::info!("{:>10.3} | {}", level, row.join(" "));
    }
}

fn main() -> Result<(), DecodingError> {
    let args = Args::parse();
    let mut config = ExperimentConfig::load_from(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    init_logging(args.log_dir.join(format!("{}.log", config.sim_name)))?;
    log::info!("{:?}", config);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut model = Population::build(config.population.clone())?;

    if let Some(sweep) = &config.amplitude {
        log::info!("Amplitude sweep: started");
        let (spike_trains, inferred) =
            evaluate_amplitude_discrimination(&mut model, sweep, &mut rng)?;
        log::info!("Amplitude sweep: done!");

        if !args.no_save {
            let path = save(
                &config.save_dir,
                &config.sim_name,
                SimType::Amplitude,
                &spike_trains,
                &inferred,
            )?;
            log::info!("Amplitude sweep saved to {}", path.display());
        }
        log_grid("Amplitude", &discrimination_combinations(&inferred));
    }

    if let Some(sweep) = &config.frequency {
        log::info!("Frequency sweep: started");
        let (spike_trains, inferred) =
            evaluate_frequency_discrimination(&mut model, sweep, &mut rng)?;
        log::info!("Frequency sweep: done!");

        if !args.no_save {
            let path = save(
                &config.save_dir,
                &config.sim_name,
                SimType::Frequency,
                &spike_trains,
                &inferred,
            )?;
            log::info!("Frequency sweep saved to {}", path.display());
        }
        if inferred.is_empty() {
            log::warn!("Frequency sweep ran without inference parameters, nothing to discriminate");
        } else {
            log_grid("Frequency", &discrimination_combinations(&inferred));
        }
    }

    Ok(())
}
