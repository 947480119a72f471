//! section-solver-cli: command-line interface for the section-set
//! constraint solver.
//!
//! # Commands
//!
//! - `solve`: compile and solve a problem file
//! - `validate`: parse and build a problem file without solving it
//! - `schema`: print the JSON Schema for the problem file format

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use section_solver_contracts::{problem_file_schema, ProblemFile};
use section_solver_core::model::BacktrackingModel;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "section-solver-cli")]
#[command(version = "0.1.0")]
#[command(about = "Section-set constraint solver CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and solve a problem file
    Solve {
        /// Input JSON/YAML file path (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Parse and build a problem file without solving it
    Validate {
        /// Input JSON/YAML file path
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },

    /// Print the JSON Schema for the problem file format
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { input, stdin, output, pretty } => cmd_solve(input, stdin, output, pretty),
        Commands::Validate { input, stdin } => cmd_validate(input, stdin),
        Commands::Schema => cmd_schema(),
    }
}

fn read_input(file: Option<PathBuf>, use_stdin: bool) -> Result<String> {
    if use_stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(path) = file {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path))
    } else {
        anyhow::bail!("Either provide an input file or use --stdin")
    }
}

fn parse_problem_file(text: &str, path: Option<&PathBuf>) -> Result<ProblemFile> {
    let looks_like_yaml = path.map(|p| {
        matches!(p.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
    });
    match looks_like_yaml {
        Some(true) => serde_yaml::from_str(text).context("Failed to parse problem file as YAML"),
        _ => serde_json::from_str(text)
            .context("Failed to parse problem file as JSON")
            .or_else(|_| serde_yaml::from_str(text).context("Failed to parse problem file as JSON or YAML")),
    }
}

fn cmd_solve(input: Option<PathBuf>, stdin: bool, output: Option<PathBuf>, pretty: bool) -> Result<()> {
    let text = read_input(input.clone(), stdin)?;
    let problem = parse_problem_file(&text, input.as_ref())?;
    let (constraint, items) = problem.into_parts().map_err(|e| anyhow::anyhow!("Invalid problem file: {e}"))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("solving...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut model = BacktrackingModel::new();
    let result = section_solver_core::solve(&constraint, items, &mut model);

    spinner.finish_and_clear();

    let solution = result.map_err(|e| anyhow::anyhow!("Solver error: {e}"))?;

    let output_json = if pretty {
        serde_json::to_string_pretty(&solution)?
    } else {
        serde_json::to_string(&solution)?
    };

    if let Some(output_path) = output {
        fs::write(&output_path, &output_json).with_context(|| format!("Failed to write output to {:?}", output_path))?;
        eprintln!("Result written to {:?}", output_path);
    } else {
        println!("{}", output_json);
    }

    Ok(())
}

fn cmd_validate(input: Option<PathBuf>, stdin: bool) -> Result<()> {
    let text = read_input(input.clone(), stdin)?;
    let problem = parse_problem_file(&text, input.as_ref()).context("JSON/YAML parse error")?;

    match problem.into_parts() {
        Ok((constraint, items)) => {
            println!(
                "{{\"valid\": true, \"sections\": {}, \"items\": {}}}",
                constraint.section_count(),
                items.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("{{\"valid\": false, \"error\": \"{}\"}}", e.to_string().replace('"', "\\\""));
            Ok(())
        }
    }
}

fn cmd_schema() -> Result<()> {
    let schema = problem_file_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_json() -> &'static str {
        r#"{
            "sections": [{"uri": "section:a"}],
            "items": [{"uri": "item:1", "score": 3.0}],
            "count_constraints": {"section:a": [{"constraint_type": "leq", "count": 1}]}
        }"#
    }

    #[test]
    fn parses_a_json_problem_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{}", sample_json()).unwrap();

        let text = read_input(Some(file.path().to_path_buf()), false).unwrap();
        let problem = parse_problem_file(&text, Some(&file.path().to_path_buf())).unwrap();
        let (constraint, items) = problem.into_parts().unwrap();

        assert_eq!(constraint.section_count(), 1);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn parses_a_yaml_problem_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "sections:\n  - uri: section:a\nitems:\n  - uri: item:1\n    score: 1.0").unwrap();

        let text = read_input(Some(file.path().to_path_buf()), false).unwrap();
        let problem = parse_problem_file(&text, Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(problem.sections.len(), 1);
        assert_eq!(problem.items.len(), 1);
    }

    #[test]
    fn missing_input_without_stdin_is_an_error() {
        assert!(read_input(None, false).is_err());
    }
}
