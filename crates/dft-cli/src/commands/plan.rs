use crate::{print_info, print_success};
use dft_core::rows::load_rows;
use dft_core::{build_plan, CanisterLayout, IdentityBook, PlanFlags};
use std::path::Path;

pub fn handle(
    rows_path: &Path,
    identities: Option<&Path>,
    layout: Option<&Path>,
    flags: PlanFlags,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let book = match identities {
        Some(path) => IdentityBook::load_from_file(path)
            .map_err(|e| format!("Failed to load identities from {}: {}", path.display(), e))?,
        None => {
            print_info("No identity book given; every owner alias will be unknown");
            IdentityBook::new()
        }
    };
    let layout = match layout {
        Some(path) => CanisterLayout::load_from_file(path)
            .map_err(|e| format!("Failed to load layout from {}: {}", path.display(), e))?,
        None => CanisterLayout::default(),
    };

    let rows = load_rows(rows_path)?;
    log::debug!("loaded {} rows from {}", rows.len(), rows_path.display());

    let plan = build_plan(&rows, &layout, flags, &book)?;
    let json = plan.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            print_success(&format!(
                "Plan with {} canisters written to {}",
                plan.canisters.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// TESTS
// ─────────────────────────────────────────────────────────────────
