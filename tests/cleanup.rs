use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook};
use sheet_cleanup::ToolError;
use sheet_cleanup::clean::CleanupOptions;
use sheet_cleanup::io::excel_write::DATA_SHEET;
use sheet_cleanup::report::{self, CleanupJob};
use sheet_cleanup::summary::SUMMARY_SHEET;
use tempfile::tempdir;

/// Writes the 3×3 sample: a header and two data rows with two blanks.
fn write_sample(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Name").unwrap();
    worksheet.write_string(0, 1, "Age").unwrap();
    worksheet.write_string(0, 2, "City").unwrap();
    worksheet.write_string(1, 0, "Alice").unwrap();
    worksheet.write_number(1, 1, 30).unwrap();
    worksheet.write_number(2, 1, 25).unwrap();
    worksheet.write_string(2, 2, "Oslo").unwrap();
    workbook.save(path).expect("sample workbook written");
}

fn read_range(path: &Path, sheet: &str) -> Range<DataType> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output workbook opened");
    workbook
        .worksheet_range(sheet)
        .expect("sheet present")
        .expect("sheet readable")
}

fn text(value: &str) -> DataType {
    DataType::String(value.to_string())
}

/// Reads one XML part out of a written workbook.
fn read_part(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).expect("output opened"))
        .expect("output is a zip archive");
    let mut xml = String::new();
    archive
        .by_name(name)
        .expect("part present")
        .read_to_string(&mut xml)
        .expect("part readable");
    xml
}

/// Inner XML of every `<tag>` element listed inside `<list>`.
fn elements(xml: &str, list: &str, tag: &str) -> Vec<String> {
    let list_pattern = Regex::new(&format!(r"(?s)<{list}[\s>].*?</{list}>")).unwrap();
    let body = list_pattern
        .find(xml)
        .map(|found| found.as_str().to_string())
        .unwrap_or_default();
    let tag_pattern = Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*?)?(?:/>|>(.*?)</{tag}>)")).unwrap();
    tag_pattern
        .captures_iter(&body)
        .map(|caps| caps[0].to_string())
        .collect()
}

fn attribute(element: &str, name: &str) -> Option<usize> {
    Regex::new(&format!(r#"\s{name}="(\d+)""#))
        .unwrap()
        .captures(element)
        .and_then(|caps| caps[1].parse().ok())
}

/// Font and fill XML of the style applied to `cell` on the first sheet.
fn cell_style(path: &Path, cell: &str) -> (String, String) {
    let sheet = read_part(path, "xl/worksheets/sheet1.xml");
    let styles = read_part(path, "xl/styles.xml");

    let cell_pattern = Regex::new(&format!(r#"<c r="{cell}"[^>]*>"#)).unwrap();
    let cell_tag = cell_pattern.find(&sheet).expect("cell written").as_str();
    let xf_index = attribute(cell_tag, "s").expect("cell carries a style");

    let xfs = elements(&styles, "cellXfs", "xf");
    let xf = &xfs[xf_index];
    let fonts = elements(&styles, "fonts", "font");
    let fills = elements(&styles, "fills", "fill");
    (
        fonts[attribute(xf, "fontId").unwrap_or(0)].clone(),
        fills[attribute(xf, "fillId").unwrap_or(0)].clone(),
    )
}

#[test]
fn sample_sheet_blanks_become_placeholder() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    write_sample(&input);

    let job = CleanupJob::new(&input);
    let stats = report::run(&job).expect("cleanup succeeded");

    assert_eq!(job.output, temp_dir.path().join("data_cleaned.xlsx"));
    assert_eq!(stats.cells_filled, 2);

    let range = read_range(&job.output, DATA_SHEET);
    let expected = vec![
        vec![text("Name"), text("Age"), text("City")],
        vec![text("Alice"), DataType::Float(30.0), text("N/A")],
        vec![text("N/A"), DataType::Float(25.0), text("Oslo")],
    ];
    let actual: Vec<Vec<DataType>> = range.rows().map(|row| row.to_vec()).collect();
    assert_eq!(actual, expected);
}

#[test]
fn non_empty_cells_are_unchanged_and_no_blank_remains() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    write_sample(&input);

    let job = CleanupJob::new(&input);
    report::run(&job).expect("cleanup succeeded");

    let source = read_range(&input, "Sheet1");
    let output = read_range(&job.output, DATA_SHEET);
    assert_eq!(source.get_size(), output.get_size());

    for (source_row, output_row) in source.rows().zip(output.rows()) {
        for (before, after) in source_row.iter().zip(output_row) {
            match before {
                DataType::Empty => assert_eq!(after, &text("N/A")),
                value => assert_eq!(after, value),
            }
        }
    }
}

#[test]
fn data_keeps_its_position_in_the_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("offset.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(1, 1, "Id").unwrap();
    worksheet.write_string(1, 2, "Label").unwrap();
    worksheet.write_number(2, 1, 7).unwrap();
    workbook.save(&input).expect("workbook written");

    let job = CleanupJob::new(&input);
    report::run(&job).expect("cleanup succeeded");

    let range = read_range(&job.output, DATA_SHEET);
    assert_eq!(range.start(), Some((1, 1)));
    assert_eq!(range.get_value((1, 1)), Some(&text("Id")));
    assert_eq!(range.get_value((2, 2)), Some(&text("N/A")));
}

#[test]
fn dates_survive_cleanup() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("dates.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    worksheet.write_string(0, 0, "Created").unwrap();
    worksheet
        .write_number_with_format(1, 0, 45292.0, &date_format)
        .unwrap();
    workbook.save(&input).expect("workbook written");

    let job = CleanupJob::new(&input);
    report::run(&job).expect("cleanup succeeded");

    let range = read_range(&job.output, DATA_SHEET);
    assert_eq!(range.get_value((1, 0)), Some(&DataType::DateTime(45292.0)));
}

#[test]
fn header_dates_stay_dates() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("dated-header.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    worksheet
        .write_number_with_format(0, 0, 45292.0, &date_format)
        .unwrap();
    worksheet.write_string(1, 0, "opening balance").unwrap();
    workbook.save(&input).expect("workbook written");

    let job = CleanupJob::new(&input);
    report::run(&job).expect("cleanup succeeded");

    let range = read_range(&job.output, DATA_SHEET);
    assert_eq!(range.get_value((0, 0)), Some(&DataType::DateTime(45292.0)));
    assert_eq!(range.get_value((1, 0)), Some(&text("opening balance")));

    let (font, fill) = cell_style(&job.output, "A1");
    assert!(font.contains("<b/>"), "header font: {font}");
    assert!(fill.contains(r#"rgb="FF366092""#), "header fill: {fill}");
}

#[test]
fn written_styles_and_widths_match_the_report_layout() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    write_sample(&input);

    let job = CleanupJob::new(&input);
    report::run(&job).expect("cleanup succeeded");

    for header in ["A1", "B1", "C1"] {
        let (font, fill) = cell_style(&job.output, header);
        assert!(font.contains("<b/>"), "{header} font: {font}");
        assert!(font.contains(r#"rgb="FFFFFFFF""#), "{header} font: {font}");
        assert!(fill.contains(r#"rgb="FF366092""#), "{header} fill: {fill}");
    }
    for filled in ["C2", "A3"] {
        let (_, fill) = cell_style(&job.output, filled);
        assert!(fill.contains(r#"rgb="FFFFCCCC""#), "{filled} fill: {fill}");
    }

    let sheet = read_part(&job.output, "xl/worksheets/sheet1.xml");
    let col_pattern =
        Regex::new(r#"<col min="(\d+)" max="(\d+)" width="([\d.]+)""#).unwrap();
    let mut widths = vec![0.0f64; 3];
    for caps in col_pattern.captures_iter(&sheet) {
        let min: usize = caps[1].parse().unwrap();
        let max: usize = caps[2].parse().unwrap();
        let width: f64 = caps[3].parse().unwrap();
        for col in min..=max {
            if col <= widths.len() {
                widths[col - 1] = width;
            }
        }
    }
    // Name/Alice/N/A, Age/30/25, City/N/A/Oslo
    let widest = [5.0, 3.0, 4.0];
    for (col, (width, needed)) in widths.iter().zip(widest).enumerate() {
        assert!(*width >= needed, "column {col} is {width} wide, needs {needed}");
    }
}

#[test]
fn optional_steps_trim_drop_and_dedupe() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("messy.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Name").unwrap();
    worksheet.write_string(0, 1, "Unused").unwrap();
    worksheet.write_string(0, 2, "Team").unwrap();
    worksheet.write_string(1, 0, "  Alice ").unwrap();
    worksheet.write_string(1, 2, "red").unwrap();
    worksheet.write_string(3, 0, "Alice").unwrap();
    worksheet.write_string(3, 2, "red").unwrap();
    worksheet.write_string(4, 0, "Bob").unwrap();
    workbook.save(&input).expect("workbook written");

    let mut job = CleanupJob::new(&input);
    job.options = CleanupOptions {
        trim_whitespace: true,
        drop_empty: true,
        drop_duplicates: true,
        ..CleanupOptions::default()
    };
    let stats = report::run(&job).expect("cleanup succeeded");

    assert_eq!(stats.empty_rows_removed, 1);
    assert_eq!(stats.empty_columns_removed, 1);
    assert_eq!(stats.cells_trimmed, 1);
    assert_eq!(stats.duplicate_rows_removed, 1);

    let range = read_range(&job.output, DATA_SHEET);
    let actual: Vec<Vec<DataType>> = range.rows().map(|row| row.to_vec()).collect();
    assert_eq!(
        actual,
        vec![
            vec![text("Name"), text("Team")],
            vec![text("Alice"), text("red")],
            vec![text("Bob"), text("N/A")],
        ]
    );
}

#[test]
fn summary_sheet_and_stats_json_are_written() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    write_sample(&input);

    let mut job = CleanupJob::new(&input);
    job.include_summary = true;
    job.stats_json = Some(temp_dir.path().join("stats.json"));
    report::run(&job).expect("cleanup succeeded");

    let workbook: Xlsx<_> = open_workbook(&job.output).expect("output opened");
    assert_eq!(
        workbook.sheet_names().to_vec(),
        vec![DATA_SHEET.to_string(), SUMMARY_SHEET.to_string()]
    );

    let summary = read_range(&job.output, SUMMARY_SHEET);
    assert_eq!(summary.get_value((0, 0)), Some(&text("Metric")));
    assert_eq!(summary.get_value((1, 0)), Some(&text("Total Rows")));
    assert_eq!(summary.get_value((1, 1)), Some(&DataType::Float(2.0)));

    let json = fs::read_to_string(temp_dir.path().join("stats.json")).expect("stats read");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("stats parsed");
    assert_eq!(parsed["cells_filled"], 2);
    assert_eq!(parsed["columns"][1]["kind"], "number");
}

#[test]
fn csv_input_is_cleaned_into_a_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("export.csv");
    fs::write(&input, "id;name\n1;\n2;Bea\n").expect("csv written");

    let mut job = CleanupJob::new(&input);
    job.delimiter = b';';
    report::run(&job).expect("cleanup succeeded");

    assert_eq!(job.output, temp_dir.path().join("export_cleaned.xlsx"));
    let range = read_range(&job.output, DATA_SHEET);
    assert_eq!(range.get_value((1, 0)), Some(&DataType::Float(1.0)));
    assert_eq!(range.get_value((1, 1)), Some(&text("N/A")));
    assert_eq!(range.get_value((2, 1)), Some(&text("Bea")));
}

#[test]
fn named_sheet_must_exist() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    write_sample(&input);

    let mut job = CleanupJob::new(&input);
    job.sheet = Some("Budget".into());
    let error = report::run(&job).expect_err("sheet is missing");
    assert!(matches!(error, ToolError::MissingSheet(name) if name == "Budget"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("notes.txt");
    fs::write(&input, "hello").expect("file written");

    let error = report::run(&CleanupJob::new(&input)).expect_err("format rejected");
    assert!(matches!(error, ToolError::UnsupportedFormat(_)));
}

#[test]
fn corrupt_workbook_fails_to_open() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("data.xlsx");
    fs::write(&input, "not a zip archive").expect("file written");

    let error = report::run(&CleanupJob::new(&input)).expect_err("parse failure");
    assert!(matches!(error, ToolError::ExcelRead(_)));
}
