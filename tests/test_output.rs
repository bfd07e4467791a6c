use std::fs;
use std::io;
use enviroscan::output::{OutputCleaner, CLEAR_SUCCESS};

#[test]
fn missing_directory_counts_as_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let cleaner = OutputCleaner::new(dir.path().join("never-created"));
    assert_eq!(cleaner.clear().unwrap(), "Output folder cleared successfully");
}

#[test]
fn empty_directory_counts_as_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let cleaner = OutputCleaner::new(dir.path());
    assert_eq!(cleaner.clear().unwrap(), CLEAR_SUCCESS);
    assert!(dir.path().is_dir());
}

#[test]
fn removes_files_and_nested_directories() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    fs::create_dir_all(out.join("sub").join("deeper")).unwrap();
    fs::write(out.join("annotated_a.jpg"), b"a").unwrap();
    fs::write(out.join("sub").join("deeper").join("b.png"), b"b").unwrap();

    assert_eq!(OutputCleaner::new(&out).clear().unwrap(), CLEAR_SUCCESS);
    assert!(out.is_dir());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn stops_at_first_failure_and_leaves_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    fs::create_dir_all(&out).unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
        fs::write(out.join(name), b"x").unwrap();
    }

    let mut visited = Vec::new();
    let err = OutputCleaner::new(&out)
        .clear_with(|path, _| {
            visited.push(path.file_name().unwrap().to_string_lossy().into_owned());
            if visited.len() == 2 {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "entry is busy"));
            }
            fs::remove_file(path)
        })
        .unwrap_err();

    assert_eq!(visited.len(), 2);
    assert_eq!(err.to_string(), format!("Failed to delete {}: entry is busy", visited[1]));
    // first entry removed; the failing one and the two never visited remain
    let mut left: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left.len(), 3);
    assert!(!left.contains(&visited[0]));
    assert!(left.contains(&visited[1]));
}

#[test]
fn unreadable_output_path_names_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    fs::write(&out, b"not a directory").unwrap();

    let err = OutputCleaner::new(&out).clear().unwrap_err();
    assert!(err.to_string().starts_with(&format!("Failed to delete {}: ", out.display())), "{err}");
    assert!(out.is_file());
}
