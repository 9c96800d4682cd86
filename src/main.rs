// Project Ksheersagar - TNS Self-Assessment wizard launcher

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific page and exits 0.
    // Usage: --tui-smoke or --tui-smoke=consent|section|review|confirmation
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        // Smoke mode logs to stdout; there is no live terminal UI to corrupt.
        if let Err(e) = assessment_wizard::init_logging(true) {
            eprintln!("Logging setup failed: {:#}", e);
        }
        if let Err(e) = assessment_wizard::run_tui_smoke(target) {
            eprintln!("TUI smoke failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Non-interactive bulk export of the accumulated response table.
    // Usage: --export or --export=/path/to/copy.csv
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--export" || a.starts_with("--export="))
    {
        let dest = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        if let Err(e) = assessment_wizard::init_logging(true) {
            eprintln!("Logging setup failed: {:#}", e);
        }
        if let Err(e) = assessment_wizard::run_export(dest) {
            eprintln!("Export failed: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Interactive wizard. File-only logging: stdout would corrupt the TUI.
    if let Err(e) = assessment_wizard::init_logging(false) {
        eprintln!("Logging setup failed: {:#}", e);
    }
    if let Err(e) = assessment_wizard::run_tui() {
        eprintln!("The survey wizard exited with an error: {:#}", e);
        std::process::exit(1);
    }
}
