use std::error::Error;

use clap::Args;
use twiss_optics::SPECIES;

#[derive(Args, Debug)]
pub struct SpeciesArgs {
    /// Emit the table as JSON instead of aligned text.
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &SpeciesArgs) -> Result<(), Box<dyn Error>> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(SPECIES)?);
        return Ok(());
    }
    println!("{:<12} {:>12} {:>16}", "name", "pdg_id", "rest_mass_gev");
    for species in SPECIES {
        println!(
            "{:<12} {:>12} {:>16.9}",
            species.name, species.pdg_id, species.rest_mass
        );
    }
    Ok(())
}
