use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

/// A shapefile unpacked from a zip archive
///
/// The temporary directory, and the shapefile in it, are removed on drop.
pub struct ExtractedArchive {
    _dir: TempDir,
    shapefile: PathBuf,
}

impl ExtractedArchive {
    pub fn shapefile(&self) -> &Path {
        &self.shapefile
    }
}

/// Unpack a zip archive and locate the first `.shp` file in it
pub fn extract_shapefile(path: &Path) -> Result<ExtractedArchive> {
    let file =
        fs::File::open(path).with_context(|| format!("Failed to open archive: {:?}", path))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("Failed to read ZIP archive: {:?}", path))?;

    let temp_dir = TempDir::new().context("Failed to create temporary directory")?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Entries that would escape the target directory are skipped
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!(entry = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        let outpath = temp_dir.path().join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
        }
    }

    let shapefile = find_shapefile_recursive(temp_dir.path())
        .with_context(|| format!("No .shp file found in {:?}", path))?;
    tracing::debug!(archive = %path.display(), shapefile = %shapefile.display(), "Extracted shapefile");

    Ok(ExtractedArchive {
        _dir: temp_dir,
        shapefile,
    })
}

/// Depth-first search in name order
fn find_shapefile_recursive(dir: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if let Ok(found) = find_shapefile_recursive(&path) {
                return Ok(found);
            }
        } else if path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        {
            return Ok(path);
        }
    }
    anyhow::bail!("No .shp file in {:?}", dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extract_finds_nested_shapefile() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("zips.zip");
        write_archive(
            &zip_path,
            &[
                ("readme.txt", b"ZIP code boundaries"),
                ("data/ca_zips.shp", b"shp"),
                ("data/ca_zips.dbf", b"dbf"),
            ],
        );

        let extracted = extract_shapefile(&zip_path).unwrap();
        assert!(extracted.shapefile().ends_with("data/ca_zips.shp"));
        assert!(extracted.shapefile().exists());
        assert!(extracted.shapefile().with_extension("dbf").exists());

        let shp = extracted.shapefile().to_path_buf();
        drop(extracted);
        assert!(!shp.exists());
    }

    #[test]
    fn test_extract_without_shapefile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("empty.zip");
        write_archive(&zip_path, &[("notes.txt", b"nothing here")]);

        let err = extract_shapefile(&zip_path).err().unwrap();
        assert!(format!("{:#}", err).contains("No .shp file"));
    }
}
