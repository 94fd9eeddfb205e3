use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use framewarp_core::engine::{CvpFrameConfig, CvpScratch, PassthroughEngine};
use framewarp_core::path::{dump_state, CvpBuffers, IcaPath, PathModule};
use framewarp_core::tuning::TuningRecord;

use crate::scenario;

#[derive(Args)]
pub struct ReplayArgs {
    /// Scenario file (TOML)
    pub file: PathBuf,

    /// Print the path state dump after the last frame
    #[arg(long)]
    pub dump: bool,

    /// Stop at the first failed frame instead of continuing
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: &ReplayArgs) -> Result<()> {
    let scenario = scenario::load(&args.file)?;
    let tuning = TuningRecord::default();
    let engine = PassthroughEngine;

    let path = scenario.stream.path.to_path();
    let mut module = if scenario.stream.grid_from_tuning {
        PathModule::with_grid_from_tuning(path)
    } else {
        PathModule::new(path)
    };
    module.diagnostics = args.dump;

    let bar = ProgressBar::new(scenario.frames.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] frame {pos}/{len}")?.progress_chars("=> "),
    );

    let mut committed = 0usize;
    let mut failed = 0usize;
    for frame in &scenario.frames {
        let input = frame.to_input(&scenario.stream, &tuning);
        let result = if path == IcaPath::Cvp {
            let mut buffers = CvpBuffers {
                scratch: Some(CvpScratch { data: vec![0; 256] }),
                config: Some(CvpFrameConfig::default()),
            };
            module.execute(&engine, &input, Some(&mut buffers)).map(|_| ())
        } else {
            module.execute(&engine, &input, None).map(|_| ())
        };

        match result {
            Ok(()) => committed += 1,
            Err(err) => {
                failed += 1;
                warn!(frame_num = frame.frame_num, %err, "frame failed");
                if args.strict {
                    bar.finish_and_clear();
                    return Err(err.into());
                }
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!(
        "{} {} committed, {} failed ({:?} path)",
        style("Replay:").bold(),
        style(committed).green(),
        if failed > 0 {
            style(failed).red()
        } else {
            style(failed).dim()
        },
        scenario.stream.path,
    );

    if let Some(output) = module.committed_output() {
        println!(
            "Final params: grid={} perspective={} ({}x{})",
            output.params.grid_enable,
            output.params.perspective_enable,
            output.params.perspective_rows,
            output.params.perspective_columns,
        );
    }
    if args.dump {
        if let Some(text) = dump_state(&module) {
            print!("{}", text);
        }
    }

    Ok(())
}
