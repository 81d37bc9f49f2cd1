use eyre::WrapErr;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip every file under `source` into `destination`
///
/// Entry names are the paths relative to `source` with `/` separators, so the
/// archive unpacks to the same layout the directory had. Entry modes mirror
/// the source files, which keeps the function binary executable. Returns the
/// number of files written.
pub fn zip_directory(source: &Path, destination: &Path) -> eyre::Result<usize> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(destination)
        .wrap_err_with(|| format!("Failed to create {}", destination.display()))?;

    let mut archive = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in WalkDir::new(source) {
        let entry = entry.wrap_err_with(|| format!("Failed to walk {}", source.display()))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .strip_prefix(source)
            .wrap_err("Walked outside the source directory")?
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = entry
            .metadata()
            .wrap_err_with(|| format!("Failed to read metadata of {}", entry.path().display()))?;

        // The runtime only runs a bootstrap that kept its exec bit
        let mut entry_options = options;
        if let Some(mode) = file_mode(&metadata) {
            entry_options = entry_options.unix_permissions(mode);
        }

        let content = std::fs::read(entry.path())
            .wrap_err_with(|| format!("Failed to read {}", entry.path().display()))?;

        archive.start_file(name, entry_options)?;
        archive.write_all(&content)?;
        count += 1;
    }

    archive.finish().wrap_err("Failed to finalize the archive")?;

    Ok(count)
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}
