mod common;

use cellgrid::domain::Spreadsheet;
use cellgrid::infrastructure::{LoadReport, XmlRepository};
use common::init_test_setup;
use tempfile::tempdir;

fn save_and_reload(sheet: &Spreadsheet) -> (Spreadsheet, LoadReport) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sheet.xml");
    let path = path.to_str().unwrap();

    XmlRepository::save_spreadsheet(sheet, path).unwrap();
    let mut restored = Spreadsheet::new(sheet.row_count(), sheet.column_count());
    let (report, _) = XmlRepository::load_spreadsheet(&mut restored, path).unwrap();
    (restored, report)
}

#[test]
fn literal_cells_survive_save_and_load() {
    init_test_setup();
    let mut sheet = Spreadsheet::new(50, 26);
    let entries = [
        ("A1", "Hello Friend"),
        ("C7", "42"),
        ("Z50", "last cell"),
        ("M13", "quotes \" and 'apostrophes'"),
        ("B2", "tags <b>bold</b> & more"),
    ];
    for (address, text) in entries {
        sheet.set_text(address, text).unwrap();
    }

    let (restored, report) = save_and_reload(&sheet);
    assert_eq!(report, LoadReport { applied: entries.len(), skipped: 0 });
    for (address, text) in entries {
        let cell = restored.get_cell(address).unwrap();
        assert_eq!(cell.text(), text, "cell {address}");
        assert_eq!(cell.value(), text, "cell {address}");
    }

    let non_blank = restored.cells().filter(|cell| !cell.is_blank()).count();
    assert_eq!(non_blank, entries.len());
}

#[test]
fn formula_after_its_target_resolves_on_load() {
    init_test_setup();
    let mut sheet = Spreadsheet::new(5, 5);
    sheet.set_text("A1", "target").unwrap();
    sheet.set_text("B2", "=A1").unwrap();

    let (restored, _) = save_and_reload(&sheet);
    let formula = restored.get_cell("B2").unwrap();
    assert_eq!(formula.text(), "=A1");
    assert_eq!(formula.value(), "target");
}

#[test]
fn formula_before_its_target_stays_unresolved_on_load() {
    init_test_setup();
    let mut sheet = Spreadsheet::new(5, 5);
    sheet.set_text("B1", "hello").unwrap();
    sheet.set_text("A1", "=B1").unwrap();
    assert_eq!(sheet.get_cell("A1").unwrap().value(), "hello");

    // A1 is written, and therefore read, before B1.
    let (restored, _) = save_and_reload(&sheet);
    let formula = restored.get_cell("A1").unwrap();
    assert_eq!(formula.text(), "=B1");
    assert_eq!(formula.value(), "");
    assert_eq!(restored.get_cell("B1").unwrap().value(), "hello");
}

#[test]
fn wide_grids_round_trip_multi_letter_names() {
    init_test_setup();
    let mut sheet = Spreadsheet::new(3, 30);
    sheet.set_text("AC3", "far right").unwrap();

    let (restored, report) = save_and_reload(&sheet);
    assert_eq!(report.applied, 1);
    assert_eq!(restored.cell(2, 28).unwrap().text(), "far right");
}

#[test]
fn loading_into_a_smaller_grid_skips_missing_cells() {
    init_test_setup();
    let mut sheet = Spreadsheet::new(10, 10);
    sheet.set_text("A1", "kept").unwrap();
    sheet.set_text("J10", "dropped").unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("sheet.xml");
    let path = path.to_str().unwrap();
    XmlRepository::save_spreadsheet(&sheet, path).unwrap();

    let (small, report) = XmlRepository::open(path, 5, 5).unwrap();
    assert_eq!(report, LoadReport { applied: 1, skipped: 1 });
    assert_eq!(small.get_cell("A1").unwrap().text(), "kept");
}
