// Biodex CLI - registry deduplication pipeline, headless

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use biodex_dedup::crossref::{mapping_lookup, operator_lookup, reproject, CoverageSummary};
use biodex_dedup::engine::{load_operator_rows, load_plant_rows, run, DedupInput};
use biodex_dedup::model::DedupResult;
use biodex_dedup::DedupConfig;
use biodex_io::csv::{read_table, write_mapping_table, write_operator_table, write_plant_table};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "biodex")]
#[command(about = "Deduplicate registry market actors and re-key plant tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run deduplication from a TOML config file
    #[command(after_help = "\
Examples:
  biodex run biogas.toml
  biodex run biogas.toml --json
  biodex run biogas.toml --output-dir out/")]
    Run {
        /// Path to the .toml config file
        config: PathBuf,

        /// Output JSON result to stdout in addition to the tables
        #[arg(long)]
        json: bool,

        /// Directory for output tables (defaults to the config's directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  biodex validate biogas.toml")]
    Validate {
        /// Path to the .toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, output_dir } => cmd_run(config, json, output_dir),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

fn invalid_config(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_INVALID_CONFIG, message: msg.into(), hint: None }
}

fn runtime(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_RUNTIME, message: msg.into(), hint: None }
}

/// Output table names inside the chosen output directory.
fn output_paths(out_dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    (
        out_dir.join("operators_consolidated.csv"),
        out_dir.join("operator_mapping.csv"),
        out_dir.join("plants_consolidated.csv"),
    )
}

fn cmd_run(config_path: PathBuf, json: bool, output_dir: Option<PathBuf>) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| runtime(format!("cannot read config: {e}")))?;
    let config = DedupConfig::from_toml(&config_str).map_err(|e| invalid_config(e.to_string()))?;

    // Extract paths resolve relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let out_dir = output_dir.unwrap_or_else(|| base_dir.to_path_buf());
    let (operators_path, mapping_path, plants_path) = output_paths(&out_dir);

    let extract = read_table(&base_dir.join(&config.operators.file))
        .map_err(|e| runtime(e.to_string()))?;
    let operators = load_operator_rows(&extract.content, extract.delimiter, &config.operators.columns)
        .map_err(|e| runtime(e.to_string()))?;
    eprintln!("loaded {} operator records", operators.len());

    let input = DedupInput { operators };
    let result = run(&config, &input).map_err(|e| runtime(e.to_string()))?;

    write_operator_table(&operators_path, &result.operators)
        .map_err(|e| runtime(e.to_string()))?;
    write_mapping_table(&mapping_path, &result.mapping).map_err(|e| runtime(e.to_string()))?;

    let s = &result.summary;
    eprintln!(
        "dedup: {} records -> {} operators ({} groups merged {} records, {} generic kept separate)",
        s.total_records, s.canonical_operators, s.merged_groups, s.merged_records, s.generic_records,
    );
    eprintln!(
        "contacts: {} email, {} phone, {} website, {} with any",
        s.with_email, s.with_phone, s.with_website, s.with_any_contact,
    );
    eprintln!("wrote {}", operators_path.display());
    eprintln!("wrote {}", mapping_path.display());

    let coverage = match config.plants {
        Some(ref plant_source) => {
            let extract = read_table(&base_dir.join(&plant_source.file))
                .map_err(|e| runtime(e.to_string()))?;
            let plants =
                load_plant_rows(&extract.content, extract.delimiter, &plant_source.columns)
                    .map_err(|e| runtime(e.to_string()))?;

            let operator_by_id = operator_lookup(&result.operators);
            let out = reproject(&plants, &mapping_lookup(&result.mapping), &operator_by_id);
            write_plant_table(&plants_path, &out.plants, &operator_by_id)
                .map_err(|e| runtime(e.to_string()))?;

            let c = &out.coverage;
            eprintln!(
                "plants: {} total - {} resolved, {} unresolved, {} with operator contact",
                c.total_plants, c.resolved, c.unresolved, c.with_contact,
            );
            eprintln!("wrote {}", plants_path.display());
            Some(out.coverage)
        }
        None => None,
    };

    if json {
        let report = json_report(&result, coverage.as_ref());
        println!("{report}");
    }

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| runtime(format!("cannot read config: {e}")))?;
    let config = DedupConfig::from_toml(&config_str).map_err(|e| invalid_config(e.to_string()))?;

    eprintln!("config '{}' is valid", config.name);
    Ok(())
}

fn json_report(result: &DedupResult, coverage: Option<&CoverageSummary>) -> String {
    let report = serde_json::json!({
        "meta": result.meta,
        "summary": result.summary,
        "operators": result.operators,
        "mapping": result.mapping,
        "coverage": coverage,
    });
    serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_tables_land_in_output_dir() {
        let (ops, mapping, plants) = output_paths(Path::new("out"));
        assert_eq!(ops, Path::new("out/operators_consolidated.csv"));
        assert_eq!(mapping, Path::new("out/operator_mapping.csv"));
        assert_eq!(plants, Path::new("out/plants_consolidated.csv"));
    }

    #[test]
    fn json_report_includes_coverage_when_present() {
        use biodex_dedup::model::{DedupSummary, RunMeta};

        let result = DedupResult {
            meta: RunMeta {
                config_name: "test".into(),
                engine_version: "0.0.0".into(),
                run_at: "2026-01-01T00:00:00Z".into(),
            },
            summary: DedupSummary {
                total_records: 0,
                canonical_operators: 0,
                merged_groups: 0,
                merged_records: 0,
                generic_records: 0,
                with_email: 0,
                with_phone: 0,
                with_website: 0,
                with_any_contact: 0,
            },
            operators: vec![],
            mapping: vec![],
        };

        let without = json_report(&result, None);
        assert!(without.contains("\"coverage\": null"));

        let coverage = CoverageSummary {
            total_plants: 2,
            resolved: 1,
            unresolved: 1,
            with_contact: 1,
        };
        let with = json_report(&result, Some(&coverage));
        assert!(with.contains("\"unresolved\": 1"));
    }
}
