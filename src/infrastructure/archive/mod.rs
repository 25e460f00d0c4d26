use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive io error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Bundle a job's output tree into a single zip at `destination`.
///
/// Internal paths are relative to `root`, preserving the per-voice folder
/// structure. The archive is written to a temp path and renamed into place,
/// so a half-written file is never visible at the final path.
pub fn archive_directory(root: &Path, destination: &Path) -> Result<(), ArchiveError> {
    let temp_path = destination.with_extension("zip.partial");

    let file = File::create(&temp_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut result = add_directory(&mut zip, root, root, options);
    if result.is_ok() {
        result = zip.finish().map(|_| ()).map_err(ArchiveError::from);
    }

    if let Err(err) = result {
        // Best effort: do not leave a partial file behind
        let _ = std::fs::remove_file(&temp_path);
        return Err(err);
    }

    std::fs::rename(&temp_path, destination)?;

    tracing::info!(archive = %destination.display(), "output archive written");

    Ok(())
}

fn add_directory(
    zip: &mut ZipWriter<File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    // Deterministic archive layout
    entries.sort();

    for path in entries {
        let relative = path
            .strip_prefix(root)
            .expect("entry is always under the walk root");
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if path.is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
            add_directory(zip, root, &path, options)?;
        } else {
            zip.start_file(name, options)?;
            let contents = std::fs::read(&path)?;
            zip.write_all(&contents)?;
        }
    }

    Ok(())
}
