use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cpyxlsx_export::{
    ExportError, SpecExportOptions, derive_default_export_options, export_table_from_files,
};
use tracing_subscriber::EnvFilter;

/// Exit status for bad parameters.
const N_EXIT_PARAMETER: u8 = 2;
/// Exit status for every other failure.
const N_EXIT_FAILURE: u8 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "cpyxlsx",
    version,
    about = "Copy a database file to a formatted XLSX workbook."
)]
struct Args {
    /// File to copy, as FILE or LIBRARY/FILE.
    qualified_name: String,

    /// Output workbook.
    path_file_out: PathBuf,

    /// Bold title rows written above the column headings (at most 38).
    title_rows: Vec<String>,

    /// Field descriptions of the file, as a JSON array.
    #[arg(long, value_name = "PATH")]
    metadata: PathBuf,

    /// Rows of the file, as an Arrow IPC file.
    #[arg(long, value_name = "PATH")]
    data: PathBuf,

    /// Worksheet name (defaults to the file name).
    #[arg(long)]
    sheet_name: Option<String>,
}

impl Args {
    fn to_export_options(&self) -> SpecExportOptions {
        let mut options = derive_default_export_options();
        options.title_rows = self.title_rows.clone();
        options.sheet_name = self.sheet_name.clone();
        options
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // clap exits with status 2 on usage errors
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(derive_exit_code(&err))
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let report = export_table_from_files(
        &args.qualified_name,
        &args.metadata,
        &args.data,
        &args.path_file_out,
        &args.to_export_options(),
    )
    .with_context(|| {
        format!(
            "failed to copy {} to {}",
            args.qualified_name,
            args.path_file_out.display()
        )
    })?;

    for c_warning in &report.warnings {
        tracing::warn!("{c_warning}");
    }
    tracing::info!("{report}");
    Ok(())
}

fn derive_exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ExportError>() {
        Some(ExportError::InvalidQualifiedName(_) | ExportError::InvalidTitleRows(_)) => {
            N_EXIT_PARAMETER
        }
        _ => N_EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positionals_and_titles() {
        let args = Args::try_parse_from([
            "cpyxlsx",
            "mylib/orders",
            "out.xlsx",
            "Open orders",
            "Region 1",
            "--metadata",
            "fields.json",
            "--data",
            "orders.arrow",
        ])
        .unwrap();
        assert_eq!(args.qualified_name, "mylib/orders");
        assert_eq!(args.path_file_out, PathBuf::from("out.xlsx"));
        assert_eq!(args.title_rows, vec!["Open orders", "Region 1"]);
        assert_eq!(args.sheet_name, None);

        let options = args.to_export_options();
        assert_eq!(options.title_rows.len(), 2);
    }

    #[test]
    fn test_missing_output_path_is_rejected() {
        let err = Args::try_parse_from([
            "cpyxlsx",
            "orders",
            "--metadata",
            "fields.json",
            "--data",
            "orders.arrow",
        ])
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::new(ExportError::InvalidQualifiedName("a/b/c".to_string()))
            .context("failed to copy");
        assert_eq!(derive_exit_code(&err), N_EXIT_PARAMETER);

        let err = anyhow::Error::new(ExportError::Sink("xlsx write error: disk full".to_string()));
        assert_eq!(derive_exit_code(&err), N_EXIT_FAILURE);
    }
}
