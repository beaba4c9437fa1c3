use crate::mapping::*;

use section_mapping::registry::RegistryLayout;
use section_mapping::roster::{GroupSource, RosterLayout};
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
    #[serde(rename = "accessConfigFile")]
    pub access_config_file: Option<String>,
    #[serde(rename = "employeeMappingFile")]
    pub employee_mapping_file: Option<String>,
}

/// One input table.
///
/// The row and column options accept numbers or strings, they are decoded
/// on demand.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub layout: Option<String>,
    #[serde(rename = "headerRowIndex")]
    pub header_row_index: Option<JSValue>,
    #[serde(rename = "firstRowIndex")]
    pub first_row_index: Option<JSValue>,
    #[serde(rename = "serialColumnIndex")]
    pub serial_column_index: Option<JSValue>,
    #[serde(rename = "nameColumnIndex")]
    pub name_column_index: Option<JSValue>,
    #[serde(rename = "designationColumnIndex")]
    pub designation_column_index: Option<JSValue>,
    #[serde(rename = "sectionColumnIndex")]
    pub section_column_index: Option<JSValue>,
    #[serde(rename = "groupColumnIndex")]
    pub group_column_index: Option<JSValue>,
    #[serde(rename = "divisionColumnIndex")]
    pub division_column_index: Option<JSValue>,
    #[serde(rename = "attendanceIdColumnIndex")]
    pub attendance_id_column_index: Option<JSValue>,
    pub group: Option<String>,
}

const DEFAULT_ROSTER_LAYOUT: &str = "combined";
const GROUP_FROM_TITLE: &str = "fromTitle";

impl FileSource {
    pub fn from_path(path: PathBuf) -> FileSource {
        FileSource {
            file_path: path.display().to_string(),
            ..Default::default()
        }
    }

    /// The declared provider, or the extension of the file.
    pub fn provider_name(&self, path: &Path) -> Option<String> {
        self.provider.clone().or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
        })
    }

    pub fn registry_layout(&self) -> MapResult<RegistryLayout> {
        let mut layout = RegistryLayout::DEFAULT_LAYOUT;
        if let Some(first_row) = read_row_index(&self.first_row_index)? {
            layout.skip_rows = first_row;
        }
        if let Some(c) = read_position(&self.serial_column_index)? {
            layout.serial = c;
        }
        if let Some(c) = read_position(&self.name_column_index)? {
            layout.name = c;
        }
        if let Some(c) = read_position(&self.section_column_index)? {
            layout.sections = c;
        }
        debug!("registry_layout: {:?}: {:?}", self.file_path, layout);
        Ok(layout)
    }

    /// The preset named by `layout`, with the overrides of this source.
    pub fn roster_layout(&self) -> MapResult<RosterLayout> {
        let name = self
            .layout
            .clone()
            .unwrap_or_else(|| DEFAULT_ROSTER_LAYOUT.to_string());
        let mut layout =
            RosterLayout::preset(name.as_str()).context(UnknownLayoutSnafu { layout: name })?;

        let header_row = read_row_index(&self.header_row_index)?;
        if let Some(h) = header_row {
            layout.header_row = Some(h);
        }
        match (read_row_index(&self.first_row_index)?, header_row) {
            (Some(f), _) => layout.first_data_row = f,
            (None, Some(h)) => layout.first_data_row = h + 1,
            (None, None) => {}
        }

        if let Some(c) = read_column(&self.name_column_index)? {
            layout.name = c;
        }
        if let Some(c) = read_column(&self.designation_column_index)? {
            layout.designation = Some(c);
        }
        if let Some(c) = read_column(&self.section_column_index)? {
            layout.section = Some(c);
        }
        if let Some(c) = read_column(&self.attendance_id_column_index)? {
            layout.attendance_id = Some(c);
        }
        if let Some(c) = read_column(&self.division_column_index)? {
            layout.group = GroupSource::Division(c);
        }
        if let Some(c) = read_column(&self.group_column_index)? {
            layout.group = GroupSource::Column(c);
        }
        match self.group.as_deref() {
            Some(GROUP_FROM_TITLE) => layout.group = GroupSource::Title,
            Some(g) => layout.group = GroupSource::Fixed(g.to_string()),
            None => {}
        }
        debug!("roster_layout: {:?}: {:?}", self.file_path, layout);
        Ok(layout)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct MappingRules {
    #[serde(rename = "minPartLength")]
    pub min_part_length: Option<JSValue>,
    #[serde(rename = "minCoveragePercent")]
    pub min_coverage_percent: Option<f64>,
}

impl MappingRules {
    pub fn match_rules(&self) -> MapResult<MatchRules> {
        let mut rules = MatchRules::DEFAULT_RULES;
        if let Some(l) = read_js_int(&self.min_part_length)? {
            rules.min_part_len = l;
        }
        Ok(rules)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "boSource")]
    pub bo_source: FileSource,
    #[serde(rename = "rosterSources", default)]
    pub roster_sources: Vec<FileSource>,
    pub rules: Option<MappingRules>,
}

pub fn read_config(path: &str) -> MapResult<MappingConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: MappingConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &Path) -> MapResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.display().to_string(),
    })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> MapResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu {
                value: n.to_string(),
            }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { value: s.clone() }),
        Some(v) => ParsingJsonNumberSnafu {
            value: v.to_string(),
        }
        .fail(),
    }
}

// Rows are numbered from 1, as in the spreadsheet programs.
fn read_row_index(x: &Option<JSValue>) -> MapResult<Option<usize>> {
    match read_js_int(x)? {
        Some(0) => ParsingJsonNumberSnafu {
            value: "0".to_string(),
        }
        .fail(),
        Some(r) => Ok(Some(r - 1)),
        None => Ok(None),
    }
}

// "A" is the first column, "Z" the 26th, "AA" the 27th.
fn column_from_letters(s: &str) -> usize {
    s.bytes()
        .fold(0, |acc, b| acc * 26 + ((b - b'A') as usize) + 1)
        - 1
}

fn is_column_letters(s: &str) -> bool {
    !s.is_empty() && s.len() <= 2 && s.bytes().all(|b| b.is_ascii_uppercase())
}

/// Decodes a column option: a number starting at 1, spreadsheet letters
/// (upper case, at most two) or the name of the column in the header row.
pub fn read_column(x: &Option<JSValue>) -> MapResult<Option<ColumnRef>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => match n.as_u64() {
            Some(idx) if idx > 0 => Ok(Some(ColumnRef::Index((idx - 1) as usize))),
            _ => BadColumnSnafu {
                value: n.to_string(),
            }
            .fail(),
        },
        Some(JSValue::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return BadColumnSnafu { value: s }.fail();
            }
            if s.bytes().all(|b| b.is_ascii_digit()) {
                return match s.parse::<usize>() {
                    Ok(idx) if idx > 0 => Ok(Some(ColumnRef::Index(idx - 1))),
                    _ => BadColumnSnafu { value: s }.fail(),
                };
            }
            if is_column_letters(s) {
                return Ok(Some(ColumnRef::Index(column_from_letters(s))));
            }
            Ok(Some(ColumnRef::Header(s.to_string())))
        }
        Some(v) => BadColumnSnafu {
            value: v.to_string(),
        }
        .fail(),
    }
}

// The registry is read by position only.
fn read_position(x: &Option<JSValue>) -> MapResult<Option<usize>> {
    match read_column(x)? {
        Some(ColumnRef::Index(idx)) => Ok(Some(idx)),
        Some(ColumnRef::Header(h)) => BadColumnSnafu { value: h }.fail(),
        None => Ok(None),
    }
}
