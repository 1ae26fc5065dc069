#![no_main]
use imagediff::correspondence::{CorrespondenceTable, Filters, COVER_COLUMN, STEGO_COLUMN};
use libfuzzer_sys::fuzz_target;

/// Fuzz correspondence table parsing and row filtering.
///
/// Input is tried as-is and behind a valid header row, so both header
/// handling and row access are reached.
fuzz_target!(|data: &[u8]| {
    exercise(data);

    let mut prefixed = format!("{COVER_COLUMN},{STEGO_COLUMN},tool\n").into_bytes();
    prefixed.extend_from_slice(data);
    exercise(&prefixed);
});

fn exercise(data: &[u8]) {
    let Ok(table) = CorrespondenceTable::from_reader(data, "fuzz") else {
        return;
    };

    let unfiltered = Filters::new();
    for row in table.filtered(&unfiltered) {
        let _ = row.required(COVER_COLUMN);
        let _ = row.required(STEGO_COLUMN);
    }

    let filters: Filters = [("tool".to_string(), "steghide".to_string())]
        .into_iter()
        .collect();
    let _ = table.filtered(&filters).count();
}
