//! `berth providers` command

use anyhow::Result;

use crate::cli::ProvidersArgs;
use berth::util::config::load_for;
use berth::ProjectSystemFactory;

pub fn execute(args: ProvidersArgs) -> Result<()> {
    let config = load_for(&args.solution_dir);
    let factory = ProjectSystemFactory::new()?;

    for (i, name) in factory.provider_names().into_iter().enumerate() {
        if config.is_provider_disabled(name) {
            println!("{}. {} (disabled)", i + 1, name);
        } else {
            println!("{}. {}", i + 1, name);
        }
    }

    Ok(())
}
