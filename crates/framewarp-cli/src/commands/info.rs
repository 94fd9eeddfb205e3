use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::scenario;

#[derive(Args)]
pub struct InfoArgs {
    /// Scenario file (TOML)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let scenario = scenario::load(&args.file)?;

    println!("File:         {}", args.file.display());
    println!("Path:         {:?}", scenario.stream.path);
    println!(
        "Dimensions:   {}x{}",
        scenario.stream.width, scenario.stream.height
    );
    println!(
        "Margins:      {}x{}",
        scenario.stream.margin_width, scenario.stream.margin_height
    );
    println!("MCTF (EIS):   {}", scenario.stream.stabilization_mctf);
    println!("Tuning grid:  {}", scenario.stream.grid_from_tuning);
    println!("Frames:       {}", scenario.frames.len());

    let with_perspective = scenario
        .frames
        .iter()
        .filter(|f| f.perspective.is_some())
        .count();
    let with_grid = scenario.frames.iter().filter(|f| f.grid.is_some()).count();
    println!("  perspective: {}", with_perspective);
    println!("  grid:        {}", with_grid);

    Ok(())
}
