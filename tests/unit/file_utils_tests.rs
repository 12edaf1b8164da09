/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use summasub::file_utils::FileManager;
use crate::common;

#[test]
fn test_file_exists_withExistingAndMissingFile_shouldReturnCorrectStatus() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_file(temp_dir.path(), "test.srt", "content")?;

    assert!(FileManager::file_exists(&file_path));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.srt")));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_is_subtitle_file_shouldAcceptSrtOnly() {
    assert!(FileManager::is_subtitle_file("movie.srt"));
    assert!(FileManager::is_subtitle_file("MOVIE.SRT"));
    assert!(!FileManager::is_subtitle_file("movie.mkv"));
    assert!(!FileManager::is_subtitle_file("movie"));
}

#[test]
fn test_generate_output_path_shouldUseSummarySuffix() {
    let path = FileManager::generate_output_path("/videos/talk.srt", "/out", "txt");
    assert_eq!(path, Path::new("/out/talk.summary.txt"));

    let path = FileManager::generate_output_path("talk.en.srt", "out", ".md");
    assert_eq!(path, Path::new("out/talk.en.summary.md"));
}

#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("summary.txt");

    FileManager::write_to_file(&path, "hello")?;

    assert_eq!(fs::read_to_string(&path)?, "hello");
    assert_eq!(FileManager::read_bytes(&path)?, b"hello");
    Ok(())
}

#[test]
fn test_read_bytes_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::read_bytes(temp_dir.path().join("nope.srt"));

    assert!(result.unwrap_err().to_string().contains("does not exist"));
    Ok(())
}
