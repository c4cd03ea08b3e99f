use burstperm::config::TrainerConfig;
use burstperm::data::DatasetAggregator;
use burstperm::error::{BurstPermError, Result};
use burstperm::ml::training::Trainer;
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match TrainerConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        },
        None => TrainerConfig::default(),
    };

    if let Err(e) = run(config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: TrainerConfig) -> Result<()> {
    let paths = DatasetAggregator::discover(&config.batch_pattern)?;
    let aggregate = match DatasetAggregator::aggregate(&paths) {
        Ok(aggregate) => aggregate,
        // Only the zero-qualifying-batches case gets the no-files notice;
        // later EmptyInput errors mean files were fine but rows were not.
        Err(BurstPermError::EmptyInput(detail)) => {
            eprintln!("{}", detail);
            println!("No valid burst files found.");
            process::exit(1);
        }
        Err(e) => return Err(e),
    };

    for report in &aggregate.reports {
        println!("{}", report);
    }
    println!();

    let trainer = Trainer::new(config)?;
    let output = trainer.train(&aggregate.frame)?;
    println!("{}", output.report);

    Ok(())
}
