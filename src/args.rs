use clap::Parser;

/// Maps each section of a staff roster to the branch officer (BO) responsible for it.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the inputs and outputs of the mapping.
    /// All the paths in this file are relative to its directory. See the documentation of
    /// the section_mapping crate (module manual) for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The registry of BOs, in CSV or Excel format. Setting this option overrides
    /// the boSource of the --config option.
    #[clap(long, value_parser)]
    pub registry: Option<String>,

    /// (file path, repeatable) A staff roster, in CSV or Excel format. Setting this option
    /// overrides the rosterSources of the --config option.
    #[clap(long, value_parser)]
    pub roster: Vec<String>,

    /// (default combined) The layout of the --roster files: administration, fund, accounts
    /// or combined.
    #[clap(long, value_parser)]
    pub roster_layout: Option<String>,

    /// When the registry is an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub registry_worksheet: Option<String>,

    /// When the rosters are Excel files, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub roster_worksheet: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the mapping will be written in
    /// JSON format to the given location. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) If specified, the access configuration (the sections each BO account can see)
    /// is written to this location.
    #[clap(long, value_parser)]
    pub access_config: Option<String>,

    /// (file path) If specified, the section of each employee and the attendance ids of each
    /// section are written to this location.
    #[clap(long, value_parser)]
    pub employee_mapping: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, bomap will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 3) The parts of a compound section name shorter than this are never matched.
    #[clap(long, value_parser)]
    pub min_part_length: Option<usize>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
