use clap::Parser;
use primer_tiling::{
    dna_sequence::DNAsequence,
    exclusion::{ExclusionZone, ExclusionZoneSet},
    output::{RunReport, fasta_dump, order_sheet, write_order_sheet_csv},
    parameters::TilingParameters,
    primer_engine::HeuristicPrimerEngine,
    tiling::{TilingDriver, TilingState},
    window::ConstraintCarry,
};
use std::{fs, fs::File, io};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Tile a template into overlapping primer pairs",
    long_about = None
)]
struct Args {
    /// Main sequence file (GenBank or FASTA)
    #[arg(short, long, value_name = "FILE")]
    template: String,

    /// Insert sequence used for overhangs (FASTA)
    #[arg(short, long, value_name = "FILE")]
    insert: Option<String>,

    /// Exclusion zone as START:END, may be repeated
    #[arg(short = 'x', long = "exclude", value_name = "START:END")]
    exclude: Vec<String>,

    /// Ask for exclusion zones on stdin
    #[arg(long)]
    interactive_zones: bool,

    /// Parameter JSON, as a path or @path
    #[arg(short, long, value_name = "JSON")]
    params: Option<String>,

    /// Start every window from the configured product size instead of the previous window's
    #[arg(long)]
    reset_window_constraints: bool,

    #[arg(long, value_name = "FILE")]
    fasta_out: Option<String>,

    /// CSV order sheet (Name, Sequence, Scale, Purification)
    #[arg(long, value_name = "FILE")]
    order_sheet: Option<String>,

    /// JSON report of the run
    #[arg(long, value_name = "FILE")]
    report: Option<String>,

    /// Only print the summary and the primer listing
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn collect_zones(args: &Args) -> Result<ExclusionZoneSet, String> {
    let (mut zones, rejected) =
        ExclusionZoneSet::parse_entries(args.exclude.iter().map(String::as_str));
    for e in rejected {
        eprintln!("{}", e.message);
    }
    if args.interactive_zones {
        let stdin = io::stdin();
        let more: Vec<ExclusionZone> = ExclusionZoneSet::prompt_zones(stdin.lock(), io::stdout())
            .map_err(|e| e.to_string())?;
        zones.extend(more);
    }
    ExclusionZoneSet::new(zones).map_err(|e| e.to_string())
}

fn load_params(args: &Args) -> Result<TilingParameters, String> {
    let mut params = match &args.params {
        Some(path) => {
            let path = path.strip_prefix('@').unwrap_or(path);
            TilingParameters::load_from_path(path).map_err(|e| e.to_string())?
        }
        None => TilingParameters::default(),
    };
    if args.reset_window_constraints {
        params.constraint_carry = ConstraintCarry::ResetEachWindow;
    }
    Ok(params)
}

fn write_text(path: &str, text: &str) -> Result<(), String> {
    fs::write(path, text).map_err(|e| format!("Could not write '{path}': {e}"))
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let params = load_params(&args)?;
    let zones = collect_zones(&args)?;

    println!("Settings summary:");
    println!("Main sequence file: {}", args.template);
    println!(
        "Insert sequence: {}",
        args.insert.as_deref().unwrap_or("Not used")
    );
    println!("Exclusion zones: {zones}");

    let template = DNAsequence::from_file(&args.template).map_err(|e| e.to_string())?;
    println!("Genome length: {}", template.len());
    if template.is_circular() {
        eprintln!("Template is circular; tiling it as a linear sequence.");
    }
    let insert = match &args.insert {
        Some(path) => Some(DNAsequence::from_file(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let engine = HeuristicPrimerEngine::new();
    let driver = TilingDriver::new(
        template.forward(),
        &zones,
        &engine,
        &params,
        insert.as_ref().map(|i| i.forward()),
    )
    .map_err(|e| e.to_string())?;
    let run = driver.run();

    if !args.quiet {
        for message in &run.messages {
            println!("{message}");
        }
    }
    for warning in &run.warnings {
        eprintln!("{warning}");
    }
    match &run.state {
        TilingState::Completed => println!("Tiling completed with {} pair(s).", run.records.len()),
        TilingState::Halted(reason) => {
            println!("Tiling halted with {} pair(s): {reason:?}", run.records.len())
        }
        TilingState::Scanning => {}
    }

    let fasta = fasta_dump(&run);
    println!("\n{fasta}");
    if let Some(path) = &args.fasta_out {
        write_text(path, &fasta)?;
    }
    if let Some(path) = &args.order_sheet {
        let file = File::create(path).map_err(|e| format!("Could not create '{path}': {e}"))?;
        write_order_sheet_csv(&order_sheet(&run, &params), file).map_err(|e| e.to_string())?;
    }
    if let Some(path) = &args.report {
        let json = RunReport::new(&run).to_json().map_err(|e| e.to_string())?;
        write_text(path, &json)?;
    }
    Ok(())
}
