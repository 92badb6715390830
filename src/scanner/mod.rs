use crate::error::{Result, SlipPdfError};
use slip_pdf_common::{extract_date_token, DateToken};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub file_name: String,
    /// ファイル名から取り出した日付（短すぎる名前は None）
    pub date: Option<DateToken>,
}

/// 入力フォルダ直下から拡張子が一致するファイルを列挙
///
/// 拡張子は大文字小文字を区別して末尾一致で判定する（".jpg" と ".JPG" は別）。
pub fn scan_inputs(folder: &Path, extension: &str) -> Result<Vec<InputFile>> {
    if !folder.is_dir() {
        return Err(SlipPdfError::FolderNotFound(folder.display().to_string()));
    }

    let mut inputs = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !file_name.ends_with(extension) {
            continue;
        }

        let date = extract_date_token(&file_name);

        inputs.push(InputFile {
            path: path.to_path_buf(),
            file_name,
            date,
        });
    }

    // ファイル名でソート
    inputs.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_inputs(Path::new("/nonexistent/folder"), ".jpg");
        assert!(matches!(result, Err(SlipPdfError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_empty() {
        let dir = tempdir().unwrap();
        let result = scan_inputs(dir.path(), ".jpg").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_filters_by_extension() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("IMG_20190724_102855.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("IMG_20190725_090000.JPG")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("IMG_20190726_090000.png")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("readme.txt")).unwrap().write_all(b"text").unwrap();

        let result = scan_inputs(dir.path(), ".jpg").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].file_name, "IMG_20190724_102855.jpg");
        assert_eq!(result[0].date.as_ref().map(|d| d.as_str()), Some("20190724"));
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Regal_Collections_20190724.jpg")).unwrap();
        File::create(dir.path().join("IMG_20190724_102855.jpg")).unwrap();

        let result = scan_inputs(dir.path(), ".jpg").unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_short_name_has_no_date() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();

        let result = scan_inputs(dir.path(), ".jpg").unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].date.is_none());
    }

    #[test]
    fn test_inputs_sorted_by_filename() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("IMG_20190903_1.jpg")).unwrap();
        File::create(dir.path().join("IMG_20190901_1.jpg")).unwrap();
        File::create(dir.path().join("IMG_20190902_1.jpg")).unwrap();

        let result = scan_inputs(dir.path(), ".jpg").unwrap();
        assert_eq!(result[0].file_name, "IMG_20190901_1.jpg");
        assert_eq!(result[1].file_name, "IMG_20190902_1.jpg");
        assert_eq!(result[2].file_name, "IMG_20190903_1.jpg");
    }
}
