use border_crossing::crossings::{BatchImporter, ClassifiedRow};
use border_crossing::error::AppError;
use border_crossing::{classify, format_rut, validate_rut, Priority, RiskInput, RiskLevel};
use clap::{Args, Subcommand};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub(crate) enum RutCommand {
    /// Check a RUT's mod-11 digit (exits non-zero when invalid)
    Validate { rut: String },
    /// Print a RUT as NN.NNN.NNN-D
    Format { rut: String },
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Declared priority: normal, alta, or baja
    #[arg(long, default_value = "normal")]
    pub(crate) priority: String,
    /// Free-text observations recorded at the checkpoint
    #[arg(long, default_value = "")]
    pub(crate) observations: String,
    /// Number of documents presented
    #[arg(long)]
    pub(crate) documents: usize,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV with driver_name,driver_rut,vehicle_plate,direction,priority,observations,document_count
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_rut(command: RutCommand) -> Result<(), AppError> {
    match command {
        RutCommand::Validate { rut } => {
            let formatted = format_rut(&rut);
            if validate_rut(&rut) {
                println!("{formatted}: valid");
                Ok(())
            } else {
                Err(AppError::InvalidInput(format!(
                    "{formatted} is not a valid RUT"
                )))
            }
        }
        RutCommand::Format { rut } => {
            println!("{}", format_rut(&rut));
            Ok(())
        }
    }
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let level = classify_args(&args)?;
    println!("{level}");
    Ok(())
}

fn classify_args(args: &ClassifyArgs) -> Result<RiskLevel, AppError> {
    let priority: Priority = args
        .priority
        .parse()
        .map_err(|err: border_crossing::risk::UnknownPriority| {
            AppError::InvalidInput(err.to_string())
        })?;

    Ok(classify(&RiskInput {
        priority,
        observations: args.observations.clone(),
        document_count: args.documents,
    }))
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let rows = BatchImporter::from_path(&args.csv)?;
    print!("{}", render_queue(&rows));
    Ok(())
}

fn render_queue(rows: &[ClassifiedRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Crossing review queue ({} requests)", rows.len());

    for level in RiskLevel::ordered().into_iter().rev() {
        let count = rows.iter().filter(|row| row.risk_level == level).count();
        let _ = writeln!(out, "- {level}: {count}");
    }

    if rows.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\nRequests by risk");
    for row in rows {
        let rut_note = if row.rut_valid { "" } else { " (RUT invalid)" };
        let plate_note = if row.plate_valid { "" } else { " (plate invalid)" };
        let _ = writeln!(
            out,
            "- [{}] line {} | {} | {}{} | {} {}{}",
            row.risk_level,
            row.line,
            row.driver_name,
            row.driver_rut,
            rut_note,
            row.direction,
            row.vehicle_plate,
            plate_note
        );
    }
    out
}
