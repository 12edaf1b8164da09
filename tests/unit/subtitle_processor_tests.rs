/*!
 * Tests for subtitle processing functionality
 */

use std::fmt::Write;
use std::path::PathBuf;
use anyhow::Result;
use summasub::errors::SubtitleError;
use summasub::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ms = SubtitleEntry::timestamp_to_ms(1, 23, 45, 678).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, "01:23:45,678");
}

#[test]
fn test_timestamp_parsing_withOutOfRangeComponents_shouldFail() {
    assert_eq!(SubtitleEntry::timestamp_to_ms(0, 61, 0, 0), None);
    assert_eq!(SubtitleEntry::timestamp_to_ms(0, 0, 60, 0), None);
    assert_eq!(SubtitleEntry::timestamp_to_ms(u64::MAX / 1000, 0, 0, 0), None);
}

#[test]
fn test_parse_withHugeHourField_shouldReturnInvalidTimestamp() {
    let content = "1\n9999999999999999999:00:00,000 --> 9999999999999999999:00:01,000\nHello\n";

    let result = SubtitleCollection::parse_srt_string(content);

    assert!(matches!(result, Err(SubtitleError::InvalidTimestamp { line: 2, .. })));
}

#[test]
fn test_parse_withIndentedText_shouldKeepLeadingWhitespace() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n  - indented dialogue   \n- reply\n\n";

    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries[0].text, "  - indented dialogue\n- reply");
    assert!(entries[0].to_string().contains("\n  - indented dialogue\n"));
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldRenderSrtBlock() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

#[test]
fn test_parse_withSampleDocument_shouldReadAllEntries() {
    let entries = SubtitleCollection::parse_srt_string(common::SAMPLE_SRT).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "This is a test subtitle.");
    assert_eq!(entries[2].text, "For testing purposes.");
}

#[test]
fn test_parse_withMultilineText_shouldJoinWithNewline() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst line\nSecond line\n\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "First line\nSecond line");
}

#[test]
fn test_parse_withBomAndCrlf_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Hello");
    assert_eq!(entries[1].text, "World");
}

#[test]
fn test_parse_withDotMillisAndPositionSuffix_shouldParse() {
    let content = "1\n00:00:01.250 --> 00:00:02.500 X1:10 X2:20\nHello\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries[0].start_time_ms, 1250);
    assert_eq!(entries[0].end_time_ms, 2500);
}

#[test]
fn test_parse_withEntryWithoutText_shouldKeepEmptyEntry() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nAfter\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "");
    assert_eq!(entries[1].text, "After");
}

#[test]
fn test_parse_withEmptyInput_shouldReturnNoEntries() {
    assert!(SubtitleCollection::parse_srt_string("").unwrap().is_empty());
    assert!(SubtitleCollection::parse_srt_string("\n\n  \n").unwrap().is_empty());
}

#[test]
fn test_parse_withNonNumericIndex_shouldReportLine() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\nabc\n00:00:03,000 --> 00:00:04,000\nWorld\n";
    let error = SubtitleCollection::parse_srt_string(content).unwrap_err();

    assert_eq!(error, SubtitleError::InvalidIndex { line: 5, value: "abc".to_string() });
}

#[test]
fn test_parse_withMissingTimingLine_shouldReportMissingTimestamp() {
    let content = "1\nHello there\n\n";
    let error = SubtitleCollection::parse_srt_string(content).unwrap_err();

    assert_eq!(error, SubtitleError::MissingTimestamp { line: 2, index: 1 });
}

#[test]
fn test_parse_withIndexAtEndOfInput_shouldReportMissingTimestamp() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n";
    let error = SubtitleCollection::parse_srt_string(content).unwrap_err();

    assert_eq!(error, SubtitleError::MissingTimestamp { line: 6, index: 2 });
}

#[test]
fn test_parse_withBadTimestampValues_shouldReportInvalidTimestamp() {
    let content = "1\n00:00:01,000 --> 00:99:02,000\nHello\n";
    let error = SubtitleCollection::parse_srt_string(content).unwrap_err();

    assert!(matches!(error, SubtitleError::InvalidTimestamp { line: 2, .. }));
}

#[test]
fn test_parse_withBlocksRunTogether_shouldReportMissingSeparator() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nHello\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n";
    let error = SubtitleCollection::parse_srt_string(content).unwrap_err();

    assert_eq!(error, SubtitleError::MissingSeparator { line: 5, index: 1 });
}

#[test]
fn test_parse_withInvalidUtf8_shouldReportEncoding() {
    let bytes = [b'1', b'\n', 0xff, 0xfe, b'\n'];
    let error = SubtitleCollection::parse_srt_bytes(&bytes).unwrap_err();

    assert!(matches!(error, SubtitleError::InvalidEncoding(_)));
}

#[test]
fn test_parse_withOutOfOrderIndices_shouldStillParse() {
    let content = "2\n00:00:01,000 --> 00:00:02,000\nA\n\n1\n00:00:03,000 --> 00:00:04,000\nB\n";
    let entries = SubtitleCollection::parse_srt_string(content).unwrap();

    assert_eq!(entries.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![2, 1]);
}

#[test]
fn test_from_file_withWrittenCollection_shouldReadBack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "talk.srt")?;

    let collection = SubtitleCollection::from_file(&path)?;
    assert_eq!(collection.source_file, path);
    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.time_span(), Some((1000, 14000)));

    let reparsed = SubtitleCollection::parse_srt_string(&collection.to_srt_string())?;
    assert_eq!(reparsed, collection.entries);
    Ok(())
}

#[test]
fn test_in_memory_collection_withNoEntries_shouldHaveNoTimeSpan() {
    let collection = SubtitleCollection::new(PathBuf::from("empty.srt"));
    assert_eq!(collection.time_span(), None);
    assert!(collection.to_string().contains("Entries: 0"));
}
