/*!

This is the long-form manual for `section_mapping` and `bomap`.

## Input tables

Two kinds of tables are needed: the registry of branch officers (BOs) and
one or more staff rosters. `bomap` reads them from Excel (`xlsx`) or CSV
(`csv`) files. Only the first worksheet is read, unless a worksheet name is
given.

### Registry

The registry lists, for each BO, a serial number, a name and the sections
under their control:

| Sl. No. | Name of Branch Officer | Sections under control |
|---------|------------------------|------------------------|
|         | Administration Group   |                        |
| 1       | Smt. A                 | Admin-I, CR Cell       |
|         |                        | Record Room            |
| 2       | Sri B                  | Admin-II               |

- a row with a number in the first column starts a new BO;
- a row without a number but with sections adds these sections to the BO above it;
- a row without a number nor sections, with the word `Group` in it, is a group
  heading: it is attached to the BOs that follow;
- every other row (titles, blank lines) is ignored.

### Rosters

Rosters have one person per row: a name, a designation, a section and a
group. The position of each column is described by a layout. The following
layouts are built in:

* `administration`: a title row, then `Sl No`, name, designation and
  section in the first four columns. The group is `Administration`.
* `fund`: a title row, then a header row with the columns
  `Name of the Official`, `Designation` and
  `Name of the section where presently posted`. The group is `Fund`.
* `accounts`: a header row with `Name`, `Designation` and `Section`. The
  group is `Accounts`.
* `combined`: a header row with `Attendance Id`, `Name`, `Designation`,
  `Section` and `Group`.

Rows without a name are dropped.

## Matching

Section names are compared after normalization: uppercase, and everything
that is not a letter or a digit removed. `"Admin-I"` and `"ADMIN I"` both
become `ADMINI`.

A roster section belongs to a BO when one of the BO's section strings
contains it, or is contained in it. Compound strings (`"Admin-I, CR Cell"`)
are also split on commas and semicolons, and each part is compared on its
own, ignoring the parts shorter than 3 characters (`minPartLength`).

The BOs are tried in the order of the registry and the first one that
matches wins. When several BOs match, the section is listed under
`ambiguousSections` in the summary, with all the candidates.

## Configuration

For repeated runs, all the inputs can be described in a JSON file passed with
`--config`:

```text
{
  "outputSettings": {
    "outputDirectory": "out",
    "summaryFile": "summary.json",
    "accessConfigFile": "access.json",
    "employeeMappingFile": "employees.json"
  },
  "boSource": {
    "provider": "xlsx",
    "filePath": "master data.xlsx",
    "excelWorksheetName": "List of BOs",
    "firstRowIndex": 2
  },
  "rosterSources": [
    {
      "provider": "xlsx",
      "filePath": "master data.xlsx",
      "excelWorksheetName": "Combines",
      "layout": "combined"
    }
  ],
  "rules": {
    "minPartLength": 3,
    "minCoveragePercent": 85
  }
}
```

The paths are relative to the configuration file.

Options for the sources:
 - `provider` (`csv` or `xlsx`, optional): inferred from the file extension if missing.
 - `excelWorksheetName` (string, optional): the worksheet to read.
 - `layout` (string, optional, rosters only): one of the built-in layouts above,
   the default is `combined`.
 - `headerRowIndex` (number, optional): the row (starting at 1) with the column names.
 - `firstRowIndex` (number, optional): the first row (starting at 1) to read.
 - `serialColumnIndex`, `nameColumnIndex`, `sectionColumnIndex` (registry) and
   `nameColumnIndex`, `designationColumnIndex`, `sectionColumnIndex`, `groupColumnIndex`,
   `divisionColumnIndex`, `attendanceIdColumnIndex` (rosters): a column, either as a
   number starting at 1, as spreadsheet letters (`"C"`, `"AB"`: upper case, at most two) or as
   the name of the column in the header row. The registry columns only accept positions.
 - `group` (string, optional, rosters only): all the people of this source belong to this group.
   The special value `"fromTitle"` infers the group from the title of the sheet.

## Outputs

- the summary (`--out`): counts, the section to BO mapping, the unmatched and ambiguous
  sections, and one entry `bo<N>` per BO;
- the access configuration (`--access-config`): the sections visible by each BO account,
  plus a `nodal` account that sees all the sections;
- the employee mapping (`--employee-mapping`): section of each employee (by cleaned name),
  and the attendance ids per section.

 */
