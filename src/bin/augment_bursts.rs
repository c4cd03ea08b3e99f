use burstperm::data::{CsvConnector, SchemaValidator};
use burstperm::error::Result;
use burstperm::ml::labeling::{AugmentOutcome, LabelAugmenter};
use burstperm::types::{column, PREVIEW_COLUMNS};
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let path = match args.get(1) {
        Some(path) => path.clone(),
        None => {
            eprintln!("Usage: augment-bursts <bursts_file>");
            eprintln!("  bursts_file: CSV produced by the burst detector (must have a CloseMid column)");
            process::exit(2);
        }
    };

    if let Err(e) = run(&path) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(path: &str) -> Result<()> {
    let df = CsvConnector::load(path)?;

    match LabelAugmenter::new().augment(&df)? {
        AugmentOutcome::AlreadyLabeled => {
            println!(
                "{} already has a {} column. Skipping.",
                path,
                column::PERM_CLOSE
            );
        }
        AugmentOutcome::Labeled(mut labeled) => {
            CsvConnector::write(&mut labeled, path)?;
            println!("Updated {} with {} bursts", path, labeled.height());

            let preview = CsvConnector::create_preview(&labeled, &PREVIEW_COLUMNS, 10)?;
            print!("{}", preview);

            let nulls = SchemaValidator::check_nulls(&labeled)?;
            if !nulls.is_empty() {
                log::warn!("Labeled batch contains nulls: {:?}", nulls);
            }
        }
    }

    Ok(())
}
