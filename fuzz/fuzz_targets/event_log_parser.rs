#![no_main]

use libfuzzer_sys::fuzz_target;
use procroc::config::ParseFailurePolicy;
use procroc::event_log::EventLog;
use procroc::preparation::prepare;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Reading and preparing must never panic, whatever the input
        if let Ok(log) = EventLog::from_csv_str(input) {
            if let Some(case_column) = log.case_like_columns().first().map(|c| c.to_string()) {
                let _ = prepare(&log, &case_column, ParseFailurePolicy::Drop);
            }
        }
    }
});
