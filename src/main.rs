use std::env;
use std::process;

use tribarrier::config::ConfigManager;
use tribarrier::progress::ConsoleProgress;
use tribarrier::PipelineRunner;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let csv_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: tribarrier <data.csv> [config.toml]");
            process::exit(2);
        }
    };

    let manager = ConfigManager::new();
    if let Some(config_path) = args.next() {
        manager.load_from_file(&config_path)?;
    }

    let runner = PipelineRunner::new(manager.get());
    let report = runner.run_csv(&csv_path, ConsoleProgress)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
