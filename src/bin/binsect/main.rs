//! BinSect CLI - inspect and validate section containers.

use std::env;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use binsect::container::Container;
use binsect::export::{ExportMode, ExportOptions, ScenePipeline};
use binsect::scene::{MaterialData, MeshData, SceneData};
use binsect::validate::{path_validate, structural_check, ByteDiff};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let mut filtered: Vec<&str> = Vec::new();
    let mut level = "info";
    let mut json = false;
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            "--json" => json = true,
            _ => filtered.push(arg),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .init();

    if filtered.is_empty() {
        print_help();
        return ExitCode::SUCCESS;
    }

    match filtered[0] {
        "info" | "i" => {
            let Some(file) = filtered.get(1) else {
                return usage("info <file>");
            };
            cmd_info(file)
        }
        "check" | "c" => {
            let Some(file) = filtered.get(1) else {
                return usage("check <file> [--json]");
            };
            cmd_check(file, json)
        }
        "diff" | "d" => {
            let (Some(actual), Some(expected)) = (filtered.get(1), filtered.get(2)) else {
                return usage("diff <file> <reference> [--max N] [--json]");
            };
            let max = parse_flag_value(&filtered, "--max").unwrap_or(100);
            cmd_diff(actual, expected, max, json)
        }
        "paths" | "p" => {
            let (Some(file), Some(root)) = (filtered.get(1), filtered.get(2)) else {
                return usage("paths <file> <root> [--fix] [--json]");
            };
            let fix = filtered.contains(&"--fix");
            cmd_paths(file, root, fix, json)
        }
        "sample" => {
            let Some(out) = filtered.get(1) else {
                return usage("sample <out-file>");
            };
            cmd_sample(out)
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("BinSect container tool");
    println!();
    println!("Usage: binsect-cli [flags] <command> [args]");
    println!();
    println!("Commands:");
    println!("  info <file>                    Show header and section table");
    println!("  check <file>                   Structural check against the registry");
    println!("  diff <file> <reference>        Byte-for-byte comparison (--max N)");
    println!("  paths <file> <root> [--fix]    Resource path integrity check");
    println!("  sample <out-file>              Write the reference cube container");
    println!();
    println!("Flags: -v/--verbose, -vv/--trace, -q/--quiet, --json");
}

fn usage(text: &str) -> ExitCode {
    eprintln!("Usage: binsect-cli {text}");
    ExitCode::FAILURE
}

fn parse_flag_value(args: &[&str], flag: &str) -> Option<usize> {
    let at = args.iter().position(|a| *a == flag)?;
    args.get(at + 1)?.parse().ok()
}

fn cmd_info(file: &str) -> ExitCode {
    info!("Opening container: {}", file);
    let container = match Container::open(file) {
        Ok(container) => container,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("{file}: version {}, {} sections", container.version(), container.records().len());
    for record in container.records() {
        let name = record.section_id().map(|id| id.name()).unwrap_or("?");
        println!(
            "  {:#06x} {:<12} offset {:>8}  length {:>8}",
            record.id, name, record.offset, record.length
        );
    }
    ExitCode::SUCCESS
}

fn cmd_check(file: &str, json: bool) -> ExitCode {
    let report = match structural_check(file) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        println!("{}: {} sections", file, report.sections.len());
        for violation in &report.violations {
            println!("  violation: {violation}");
        }
        println!("{}", if report.is_pass() { "PASS" } else { "FAIL" });
    }
    if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_diff(actual: &str, expected: &str, max: usize, json: bool) -> ExitCode {
    let report = match ByteDiff::with_max_records(max).compare(actual, expected) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        print!("{}", report.format_report());
    }
    if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_paths(file: &str, root: &str, fix: bool, json: bool) -> ExitCode {
    let report = match path_validate(file, root, fix) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        println!("{}: {} paths checked", file, report.checked);
        for issue in &report.issues {
            let fixed = issue.fixed.as_deref().unwrap_or("-");
            println!("  {:?} {} = '{}' -> {}", issue.problem, issue.field, issue.value, fixed);
        }
        if report.rewritten {
            println!("container rewritten");
        }
        println!("{}", if report.is_pass() { "PASS" } else { "FAIL" });
    }
    if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Write the fixed minimal scene (one cube, one material) used as the
/// reference-equivalence fixture.
fn cmd_sample(out: &str) -> ExitCode {
    let mut scene = SceneData::new("cube");
    scene.mesh = Some(sample_cube());
    scene.materials.push(MaterialData::new("default"));

    let pipeline = ScenePipeline::new(ExportOptions::with_mode(ExportMode::Static));
    match pipeline.collect(scene).export(out) {
        Ok(report) if report.is_success() => {
            info!("Wrote {} ({} sections)", out, report.sections.len());
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for error in &report.errors {
                eprintln!("export error: {error}");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn sample_cube() -> MeshData {
    use glam::Vec3;
    MeshData::new(
        vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ],
        vec![
            0, 2, 1, 0, 3, 2, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 1, 5, 0, 5, 4, // -Y
            2, 3, 7, 2, 7, 6, // +Y
            1, 2, 6, 1, 6, 5, // +X
            0, 4, 7, 0, 7, 3, // -X
        ],
    )
}
