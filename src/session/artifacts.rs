use std::io;
use std::path::{Path, PathBuf};

/// Regular files directly inside `dir`, sorted by name
pub async fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// The engine output named `<session_id>*.<extension>`
pub fn find_output<'a>(files: &'a [PathBuf], session_id: &str, extension: &str) -> Option<&'a PathBuf> {
    let suffix = format!(".{}", extension);
    files.iter().find(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(session_id) && name.ends_with(&suffix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.mp4"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.mp4"]);
    }

    #[test]
    fn test_find_output_matches_session_and_extension() {
        let files = vec![
            PathBuf::from("d/abc.webm"),
            PathBuf::from("d/other.mp4"),
            PathBuf::from("d/abc.mp4"),
        ];
        assert_eq!(find_output(&files, "abc", "mp4"), Some(&files[2]));
        assert_eq!(find_output(&files, "abc", "mp3"), None);
    }
}
