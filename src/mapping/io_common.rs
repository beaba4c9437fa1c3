use calamine::DataType;
use log::warn;
use std::path::Path;

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The text of a spreadsheet cell.
///
/// Serial numbers are often stored as floats: integral values are written
/// without a fractional part.
pub fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Empty => "".to_string(),
        DataType::Error(e) => {
            warn!("cell_to_string: error cell {:?}, reading it as empty", e);
            "".to_string()
        }
        other => other.to_string(),
    }
}
