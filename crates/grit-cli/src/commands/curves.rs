//! Curve listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use grit_config::{factory_presets, list_user_presets, preset_name_from_path};
use grit_core::{CurveKind, Nonlinearity};

#[derive(Args)]
pub struct CurvesArgs {
    /// Also list factory and user presets
    #[arg(long)]
    presets: bool,
}

pub fn run(args: CurvesArgs) -> anyhow::Result<()> {
    println!("Available Curves");
    println!("================");
    println!();
    println!("  {:12}  {:44}  {}", "Name", "Description", "Peak |f|");
    println!("  {:12}  {:44}  {}", "----", "-----------", "--------");

    for kind in CurveKind::ALL {
        println!(
            "  {:12}  {:44}  {:.2}",
            kind.name(),
            kind.description(),
            peak_output(kind)
        );
    }

    println!();
    println!("Orders: direct, first, second (default)");
    println!("Example:");
    println!("  grit process input.wav output.wav --curve hard_clip --order second --tables");

    if args.presets {
        println!();
        println!("Factory Presets");
        println!("===============");
        for preset in factory_presets() {
            println!(
                "  {:12}  {}",
                preset.name,
                preset.description.as_deref().unwrap_or("")
            );
        }

        let user = list_user_presets();
        if !user.is_empty() {
            println!();
            println!("User Presets");
            println!("============");
            for path in user {
                if let Some(name) = preset_name_from_path(&path) {
                    println!("  {:12}  {}", name, path.display());
                }
            }
        }
    }

    Ok(())
}

/// Largest output magnitude over the table domain, gain included.
fn peak_output(kind: CurveKind) -> f64 {
    let curve = grit_core::Curve::new(kind);
    (-1000..=1000)
        .map(|i| f64::from(i) * 0.01)
        .map(|x| (curve.func(x) * curve.output_gain()).abs())
        .fold(0.0, f64::max)
}
