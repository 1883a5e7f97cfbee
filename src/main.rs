use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tuition_reconciliation::settings::{self, ProgramKey};
use tuition_reconciliation::{generate_report, AppError, ErrorKind, GenerateRequest};

#[derive(Parser)]
#[command(name = "tuition-recon", version, about = "Tuition income reconciliation reports")]
struct Cli {
  /// Settings file (defaults to the user config directory)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build the report workbook from daily Detail exports
  Generate {
    #[arg(long, value_enum, ignore_case = true)]
    program: ProgramKey,

    #[arg(long, short)]
    output: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    #[arg(required = true)]
    files: Vec<PathBuf>,
  },
  /// List configured programs
  Programs,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) if err.kind() == ErrorKind::EmptyResult => {
      eprintln!("No records for the selected program.");
      ExitCode::from(2)
    }
    Err(err) => {
      tracing::error!(code = err.code(), "{err}");
      eprintln!("Error in generating report: {err}");
      ExitCode::from(1)
    }
  }
}

fn run(cli: Cli) -> Result<(), AppError> {
  let settings = settings::load_settings(cli.config.as_deref())?;

  match cli.command {
    Command::Programs => {
      for key in ProgramKey::ALL {
        let info = settings.programs.get(key);
        println!("{}\t{}\t{}\t{}", key.label(), info.code, info.campus, info.display_name);
      }
      Ok(())
    }
    Command::Generate {
      program,
      output,
      json,
      files,
    } => {
      let info = settings.programs.get(program).clone();
      tracing::info!(program = program.label(), code = info.code, campus = %info.campus, files = files.len(), "generating report");
      let summary = generate_report(&GenerateRequest {
        files,
        output_path: output,
        program: info,
        style: settings.style.clone(),
      })?;
      if json {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(AppError::Summary)?);
      } else {
        for warning in &summary.warnings {
          eprintln!("Warning: {warning}");
        }
        println!("File processed and output saved to {}.", summary.output_path.display());
      }
      Ok(())
    }
  }
}
