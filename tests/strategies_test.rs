use fdic::strategies::{all_strategies, compare, DeflatedRecords, PlainText, Strategy};
use fdic::word_list::parse_word_list;
use fdic::{CodecConfig, FrequencyDictionary};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

/// Word lists under tests/data, with their expected entry counts.
fn manifest() -> HashMap<String, usize> {
    let text = fs::read_to_string(data_dir().join("manifest.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn load(file: &str) -> FrequencyDictionary {
    let text = fs::read_to_string(data_dir().join(file)).unwrap();
    parse_word_list(&text).unwrap()
}

#[test]
fn test_word_lists_match_manifest() {
    for (file, entries) in manifest() {
        assert_eq!(load(&file).len(), entries, "{}", file);
    }
}

#[test]
fn test_strategies_round_trip_word_lists() {
    for (file, entries) in manifest() {
        let dict = load(&file);
        for strategy in all_strategies(CodecConfig::default()) {
            let data = strategy.store(&dict).unwrap();
            let loaded = strategy.load(&data).unwrap();
            assert_eq!(loaded.len(), entries, "{} with {}", file, strategy.name());
            assert!(
                loaded.same_entries(&dict),
                "{} with {}",
                file,
                strategy.name()
            );
        }
    }
}

#[test]
fn test_compare_word_lists() {
    for (file, _) in manifest() {
        let dict = load(&file);
        let reports = compare(&dict, &all_strategies(CodecConfig::default()));
        assert_eq!(reports.len(), 4);
        for report in &reports {
            assert!(report.valid, "{} with {}", file, report.name);
            assert!(report.size_bytes > 0);
        }
    }
}

#[test]
fn test_huffman_container_beats_plain_text() {
    let dict = load("en-sample.txt");
    let reports = compare(&dict, &all_strategies(CodecConfig::default()));
    let txt = reports.iter().find(|r| r.name == "txt").unwrap();
    let fdic = reports.iter().find(|r| r.name == "fdic").unwrap();
    assert!(fdic.size_ratio(txt) < 1.0);
}

#[test]
fn test_plain_text_is_the_word_list() {
    let raw = fs::read(data_dir().join("accents.txt")).unwrap();
    let dict = load("accents.txt");
    assert_eq!(PlainText.store(&dict).unwrap(), raw);
}

#[test]
fn test_truncated_deflated_records() {
    let dict = load("accents.txt");
    let data = DeflatedRecords.store(&dict).unwrap();
    assert!(DeflatedRecords.load(&data[..data.len() / 2]).is_err());
}
