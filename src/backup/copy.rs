// ABOUTME: Recursive directory copy used for media backups.
// ABOUTME: Merges into an existing destination and follows symlinks.

use std::fs;
use std::io;
use std::path::Path;

pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if fs::metadata(&from)?.is_dir() {
            copy_dir_all(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }

    Ok(())
}
