// Decompressing readers for archived input tables

use crate::core::error::{Result, SweepError};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
    Lz4,
    Zstd,
}

impl CompressionType {
    /// Picks the codec from the last file extension.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("gz") => CompressionType::Gzip,
            Some("lz4") => CompressionType::Lz4,
            Some("zst") => CompressionType::Zstd,
            _ => CompressionType::None,
        }
    }
}

/// Opens `path` and wraps it in the decoder its extension asks for.
pub fn open_decompressed(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);

    match CompressionType::from_path(path) {
        CompressionType::None => Ok(Box::new(file)),

        CompressionType::Gzip => Ok(Box::new(MultiGzDecoder::new(file))),

        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let decoder = lz4::Decoder::new(file)
                .map_err(|e| SweepError::DecompressionFailed(format!("LZ4: {}", e)))?;
            Ok(Box::new(decoder))
        }

        #[cfg(not(feature = "lz4"))]
        CompressionType::Lz4 => Err(SweepError::UnsupportedCompression("lz4".to_string())),

        #[cfg(feature = "zstd")]
        CompressionType::Zstd => {
            let decoder = zstd::stream::read::Decoder::with_buffer(file)
                .map_err(|e| SweepError::DecompressionFailed(format!("Zstd: {}", e)))?;
            Ok(Box::new(decoder))
        }

        #[cfg(not(feature = "zstd"))]
        CompressionType::Zstd => Err(SweepError::UnsupportedCompression("zstd".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_from_path() {
        assert_eq!(
            CompressionType::from_path(&PathBuf::from("a.csv")),
            CompressionType::None
        );
        assert_eq!(
            CompressionType::from_path(&PathBuf::from("a.csv.GZ")),
            CompressionType::Gzip
        );
        assert_eq!(
            CompressionType::from_path(&PathBuf::from("a.csv.zst")),
            CompressionType::Zstd
        );
        assert_eq!(
            CompressionType::from_path(&PathBuf::from("a.csv.lz4")),
            CompressionType::Lz4
        );
    }

    #[test]
    fn test_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        std::fs::write(&path, b"1;0;1.0\n").unwrap();

        let mut out = String::new();
        open_decompressed(&path)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "1;0;1.0\n");
    }

    #[test]
    fn test_gzip_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"1;0;1.0\n1;1;1.2\n").unwrap();
        encoder.finish().unwrap();

        let mut out = String::new();
        open_decompressed(&path)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "1;0;1.0\n1;1;1.2\n");
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn test_zstd_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv.zst");
        let compressed = zstd::encode_all(&b"2;0;0.5\n"[..], 3).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let mut out = String::new();
        open_decompressed(&path)
            .unwrap()
            .read_to_string(&mut out)
            .unwrap();
        assert_eq!(out, "2;0;0.5\n");
    }

    #[test]
    fn test_missing_file() {
        let err = open_decompressed(Path::new("/nonexistent/sweep.csv")).err();
        assert!(matches!(err, Some(SweepError::Io(_))));
    }
}
