// Primitives for reading CSV files.

use crate::mapping::{io_common::simplify_file_name, *};

/// All the lines of a CSV file, without any header handling.
///
/// Lines may have different lengths.
pub fn read_csv_rows(path: &Path) -> BMapResult<Vec<Vec<String>>> {
    let path_s = path.display().to_string();
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {
            path: path_s.clone(),
        })?;

    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineSnafu {
            path: path_s.clone(),
            lineno,
        })?;
        debug!("read_csv_rows: {:?} {:?}", lineno, line);
        res.push(line.iter().map(|s| s.to_string()).collect());
    }
    info!(
        "read_csv_rows: {}: {} lines",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_lines() {
        let path = std::env::temp_dir().join("bomap-io-csv-ragged.csv");
        fs::write(&path, "1,BO One,\"Admin-I, CR Cell\"\n,,Record Room\nnote\n").unwrap();
        let rows = read_csv_rows(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["1", "BO One", "Admin-I, CR Cell"],
                vec!["", "", "Record Room"],
                vec!["note"],
            ]
        );
    }

    #[test]
    fn missing_file() {
        let res = read_csv_rows(Path::new("/nonexistent/bomap/registry.csv"));
        assert!(matches!(res.map_err(|e| *e), Err(MapError::CsvOpen { .. })));
    }
}
