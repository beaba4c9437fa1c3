use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::mapping::{
    io_common::{cell_to_string, simplify_file_name},
    *,
};

/// All the rows of a worksheet, as strings.
///
/// The first worksheet is used unless a name is given. The rows and columns
/// before the first used cell are kept as empty cells, so that the positions
/// match the ones shown by the spreadsheet programs.
pub fn read_excel_rows(path: &Path, worksheet: &Option<String>) -> BMapResult<Vec<Vec<String>>> {
    let wrange = get_range(path, worksheet)?;
    let (start_row, start_col) = wrange
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    debug!(
        "read_excel_rows: {:?}: range starts at {:?}",
        path,
        (start_row, start_col)
    );

    let res = absolute_rows(
        (start_row, start_col),
        wrange.rows().map(|row| row.iter().map(cell_to_string).collect()),
    );
    info!(
        "read_excel_rows: {}: {} rows",
        simplify_file_name(path),
        res.len()
    );
    Ok(res)
}

// Rows above the range are blank rows of at least one empty cell.
fn absolute_rows(
    (start_row, start_col): (usize, usize),
    rows: impl Iterator<Item = Vec<String>>,
) -> Vec<Vec<String>> {
    let mut res: Vec<Vec<String>> = vec![vec!["".to_string(); start_col.max(1)]; start_row];
    for row in rows {
        let mut cells: Vec<String> = vec!["".to_string(); start_col];
        cells.extend(row);
        res.push(cells);
    }
    res
}

fn get_range(path: &Path, worksheet_name_o: &Option<String>) -> BMapResult<Range<DataType>> {
    let path_s = path.display().to_string();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path_s, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path_s.clone(),
    })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path: path_s.clone(),
                worksheet: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path: path_s })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {
                path: path_s.clone(),
            })?
            .context(OpeningExcelSnafu { path: path_s })?;
        Ok(wrange)
    }
}
