// Entry point and high-level CLI flow.
//
// - Option [1] reads the source exports, normalizes and merges them,
//   printing load diagnostics.
// - Option [2] writes the two CSV tables plus the JSON summary and prints
//   previews.
// - After exporting, the user can choose to go back to the selection menu
//   or exit.
use once_cell::sync::Lazy;
use sekolah_pipeline::types::{LoadReport, MergeOutcome};
use sekolah_pipeline::{loader, output, reports, util};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

const DATA_DIR: &str = "data";

// Simple in-memory app state so we only load/merge the sources once but can
// export multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { merged: None }));

struct AppState {
    merged: Option<(MergeOutcome, LoadReport)>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after exporting.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load, normalize and merge all source files.
fn handle_load() {
    let (outcome, report) = loader::load_and_merge(Path::new(DATA_DIR));

    for skipped in &report.skipped_files {
        eprintln!("Warning: {} {}", skipped.path, skipped.reason);
    }
    println!(
        "Processing sources... ({} raw records, {} schools after merge)",
        util::format_int(report.raw_records as i64),
        util::format_int(outcome.schools.len() as i64)
    );
    println!(
        "Note: {} duplicate school records discarded (first source wins).",
        util::format_int(outcome.diagnostics.duplicate_schools as i64)
    );
    if report.synthetic_identifiers > 0 {
        println!(
            "Info: assigned placeholder identifiers to {} records without NPSN.",
            util::format_int(report.synthetic_identifiers as i64)
        );
    }
    println!(
        "Activities: {} read, {} dropped, {} referenced unknown schools.",
        util::format_int(report.activity_records as i64),
        util::format_int(outcome.diagnostics.dropped_activities as i64),
        util::format_int(outcome.diagnostics.unmatched_identifiers.len() as i64)
    );
    println!();

    let mut state = APP_STATE.lock().unwrap();
    state.merged = Some((outcome, report));
}

/// Handle option [2]: write both CSV tables and the JSON summary.
///
/// This function is intentionally side-effectful: it writes three files and
/// prints markdown previews of each table to the console.
fn handle_export() {
    let merged = {
        let state = APP_STATE.lock().unwrap();
        state.merged.clone()
    };
    let Some((outcome, report)) = merged else {
        println!("Error: No data loaded. Please load the source files first (option 1).\n");
        return;
    };

    println!("Generating exports...\n");

    let schools = reports::school_rows(&outcome.schools);
    let file1 = "schools.csv";
    match output::write_csv(file1, &schools) {
        Ok(n) => println!("Schools table: {} rows exported to {}", util::format_int(n as i64), file1),
        Err(e) => eprintln!("Write error: {}", e),
    }
    output::preview_table_rows(&schools, 3);

    let conditions = reports::classroom_rows(&outcome.schools);
    let file2 = "kondisi_kelas.csv";
    match output::write_csv(file2, &conditions) {
        Ok(n) => println!("Classroom conditions: {} rows exported to {}", util::format_int(n as i64), file2),
        Err(e) => eprintln!("Write error: {}", e),
    }
    output::preview_table_rows(&conditions, 3);

    let summary = reports::generate_summary(&outcome, &report);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Summary (summary.json): {} schools, {} with location, {} rehab units, {} new-construction units\n",
        util::format_int(summary.total_schools as i64),
        util::format_int(summary.schools_with_location as i64),
        util::format_int(summary.rehab_units_total as i64),
        util::format_int(summary.new_construction_units_total as i64)
    );
}

fn main() {
    loop {
        println!("School Data Pipeline:");
        println!("[1] Load & merge source files");
        println!("[2] Export tables\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_export();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
