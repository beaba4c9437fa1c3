use log::{debug, info, warn};

use section_mapping::registry::parse_registry;
use section_mapping::roster::load_roster;
use section_mapping::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::mapping::config_reader::*;
use crate::mapping::export::*;

mod config_reader;
mod export;
mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum MapError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {worksheet} in {path}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of CSV file {path}"))]
    CsvLine {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number, got {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Cannot understand the column {value}"))]
    BadColumn { value: String },
    #[snafu(display("Unknown provider {provider:?} for file {path}"))]
    UnknownProvider {
        provider: Option<String>,
        path: String,
    },
    #[snafu(display("Unknown roster layout {layout}"))]
    UnknownLayout { layout: String },
    #[snafu(display("Error writing the output file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No registry of BOs was provided"))]
    MissingRegistry {},
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Cannot access the working directory"))]
    WorkingDir { source: std::io::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MapResult<T> = Result<T, MapError>;
pub type BMapResult<T> = Result<T, Box<MapError>>;

/// Where an artifact is written.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// A fully resolved mapping run: all the paths are ready to use.
#[derive(PartialEq, Debug, Clone)]
pub struct MappingJob {
    pub root: PathBuf,
    pub bo_source: FileSource,
    pub roster_sources: Vec<FileSource>,
    pub rules: MatchRules,
    pub min_coverage_percent: f64,
    pub summary: Option<OutputTarget>,
    pub access_config: Option<PathBuf>,
    pub employee_mapping: Option<PathBuf>,
    pub reference: Option<PathBuf>,
}

const DEFAULT_MIN_COVERAGE: f64 = 85.0;

fn output_target(s: &str) -> Option<OutputTarget> {
    match s {
        "" => None,
        "stdout" => Some(OutputTarget::Stdout),
        p => Some(OutputTarget::File(PathBuf::from(p))),
    }
}

// Outputs of the configuration file are relative to its output directory.
fn config_output(
    root: &Path,
    settings: &Option<OutputSettings>,
    file: impl Fn(&OutputSettings) -> Option<String>,
) -> Option<PathBuf> {
    let os = settings.as_ref()?;
    let f = file(os)?;
    if f.is_empty() {
        return None;
    }
    let dir = match &os.output_directory {
        Some(d) => root.join(d),
        None => root.to_path_buf(),
    };
    Some(dir.join(f))
}

/// Combines the configuration file, if any, with the command line.
///
/// The options passed on the command line take precedence.
pub fn job_from_args(args: &Args) -> BMapResult<MappingJob> {
    let (root, config) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (root, Some(config))
        }
        None => (PathBuf::from("."), None),
    };
    debug!("job_from_args: root: {:?} config: {:?}", root, config);

    // Command line sources are relative to the working directory.
    let cwd = std::env::current_dir().context(WorkingDirSnafu {})?;
    let bo_source = match (&args.registry, &config) {
        (Some(p), _) => FileSource {
            excel_worksheet_name: args.registry_worksheet.clone(),
            ..FileSource::from_path(cwd.join(p))
        },
        (None, Some(c)) => c.bo_source.clone(),
        (None, None) => return Err(Box::new(MapError::MissingRegistry {})),
    };
    let roster_sources: Vec<FileSource> = if !args.roster.is_empty() {
        args.roster
            .iter()
            .map(|p| FileSource {
                excel_worksheet_name: args.roster_worksheet.clone(),
                layout: args.roster_layout.clone(),
                ..FileSource::from_path(cwd.join(p))
            })
            .collect()
    } else {
        config
            .as_ref()
            .map(|c| c.roster_sources.clone())
            .unwrap_or_default()
    };

    let config_rules = config.as_ref().and_then(|c| c.rules.clone());
    let mut rules = match &config_rules {
        Some(r) => r.match_rules()?,
        None => MatchRules::DEFAULT_RULES,
    };
    if let Some(l) = args.min_part_length {
        rules.min_part_len = l;
    }
    let min_coverage_percent = config_rules
        .and_then(|r| r.min_coverage_percent)
        .unwrap_or(DEFAULT_MIN_COVERAGE);

    let settings = config.as_ref().and_then(|c| c.output_settings.clone());
    let summary = match &args.out {
        Some(o) => output_target(o),
        None => config_output(&root, &settings, |os| os.summary_file.clone())
            .map(OutputTarget::File)
            .or(Some(OutputTarget::Stdout)),
    };
    let access_config = match &args.access_config {
        Some(p) => Some(PathBuf::from(p)),
        None => config_output(&root, &settings, |os| os.access_config_file.clone()),
    };
    let employee_mapping = match &args.employee_mapping {
        Some(p) => Some(PathBuf::from(p)),
        None => config_output(&root, &settings, |os| os.employee_mapping_file.clone()),
    };

    Ok(MappingJob {
        root,
        bo_source,
        roster_sources,
        rules,
        min_coverage_percent,
        summary,
        access_config,
        employee_mapping,
        reference: args.reference.as_ref().map(PathBuf::from),
    })
}

/// The registry and the roster, as read from all the sources.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MappingInputs {
    pub registry: Vec<BoRecord>,
    pub roster: Vec<PersonRecord>,
}

fn read_rows(root: &Path, source: &FileSource) -> BMapResult<Vec<Vec<String>>> {
    let path = root.join(&source.file_path);
    let path_s = path.display().to_string();
    let provider = source.provider_name(&path);
    debug!("read_rows: {:?} provider: {:?}", path_s, provider);
    match provider.as_deref() {
        Some("csv") => io_csv::read_csv_rows(&path),
        Some("xlsx") => io_excel::read_excel_rows(&path, &source.excel_worksheet_name),
        _ => Err(Box::new(MapError::UnknownProvider {
            provider: provider.clone(),
            path: path_s,
        })),
    }
}

pub fn read_inputs(job: &MappingJob) -> BMapResult<MappingInputs> {
    let registry_rows = read_rows(&job.root, &job.bo_source)?;
    let parsed = parse_registry(&registry_rows, &job.bo_source.registry_layout()?);
    for e in parsed.rejected.iter() {
        warn!(
            "read_inputs: {}: rejected registry row: {}",
            job.bo_source.file_path, e
        );
    }
    info!(
        "read_inputs: {} BOs read from {}",
        parsed.records.len(),
        job.bo_source.file_path
    );

    let mut roster: Vec<PersonRecord> = Vec::new();
    for source in job.roster_sources.iter() {
        let rows = read_rows(&job.root, source)?;
        let layout = source.roster_layout()?;
        match load_roster(&rows, &layout) {
            Ok(mut people) => {
                info!(
                    "read_inputs: {} people read from {}",
                    people.len(),
                    source.file_path
                );
                roster.append(&mut people);
            }
            // A source that does not have the expected shape is left out.
            Err(e) => warn!("read_inputs: skipping {}: {}", source.file_path, e),
        }
    }
    Ok(MappingInputs {
        registry: parsed.records,
        roster,
    })
}

fn report(inputs: &MappingInputs, res: &MappingResult) {
    let c = &res.coverage;
    info!(
        "report: {} BOs, {} people, {} mapped, {} unmapped ({} without section)",
        c.total_bos, c.total_people, c.mapped_people, c.unmapped_people, c.unsectioned_people
    );
    for bo in inputs.registry.iter() {
        if let Some(bc) = c.per_bo.get(&bo.id) {
            info!(
                "report: BO {} ({}): {} people in {} sections",
                bo.id,
                bo.display_name,
                bc.people_count,
                bc.distinct_sections.len()
            );
        }
    }
    let idle = c.bos_without_people();
    if !idle.is_empty() {
        info!("report: BOs without anybody: {:?}", idle);
    }
    for (group, gc) in c.per_group.iter() {
        info!("report: group {}: {}/{} mapped", group, gc.mapped, gc.people);
    }
}

fn write_output(target: &OutputTarget, js: &JSValue) -> BMapResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    match target {
        OutputTarget::Stdout => {
            println!("{}", pretty);
        }
        OutputTarget::File(p) => {
            let path = p.display().to_string();
            if let Some(dir) = p.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir).context(WritingOutputSnafu { path: path.clone() })?;
                }
            }
            fs::write(p, pretty).context(WritingOutputSnafu { path: path.clone() })?;
            info!("write_output: written {}", path);
        }
    }
    Ok(())
}

/// Runs the mapping and returns the summary.
pub fn run_mapping_job(job: &MappingJob) -> BMapResult<JSValue> {
    info!("run_mapping_job: {:?}", job);
    let inputs = read_inputs(job)?;
    let res = run_mapping(&inputs.registry, &inputs.roster, &job.rules);

    if let Err(e) = res.coverage.check() {
        warn!("run_mapping_job: {}", e);
    }
    report(&inputs, &res);
    let pct = res.coverage.mapping_percentage();
    if pct < job.min_coverage_percent {
        warn!(
            "run_mapping_job: only {}% of the staff is mapped to a BO (expected at least {}%)",
            pct, job.min_coverage_percent
        );
    }

    let summary_js = summary_json(&inputs.registry, &res);
    if let Some(target) = &job.summary {
        write_output(target, &summary_js)?;
    }
    if let Some(p) = &job.access_config {
        write_output(
            &OutputTarget::File(p.clone()),
            &access_config_json(&inputs.registry, &res),
        )?;
    }
    if let Some(p) = &job.employee_mapping {
        write_output(
            &OutputTarget::File(p.clone()),
            &employee_mapping_json(&inputs.roster),
        )?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = &job.reference {
        check_reference(reference_p, &summary_js)?;
    }
    Ok(summary_js)
}

fn check_reference(reference_p: &Path, summary_js: &JSValue) -> MapResult<()> {
    let summary_ref = read_summary(reference_p)?;
    let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty_stats = serde_json::to_string_pretty(summary_js).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_ref.as_str(), pretty_stats.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("check_reference: the summary matches {:?}", reference_p);
    Ok(())
}

pub fn run_job(args: &Args) -> BMapResult<()> {
    let job = job_from_args(args)?;
    run_mapping_job(&job)?;
    Ok(())
}
