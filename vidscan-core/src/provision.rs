use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Result, VidError};

pub const DEFAULT_DATASET_URL: &str =
    "http://www.robots.ox.ac.uk/~maxbain/webvid/results_10M_train.csv";
pub const DEFAULT_DATASET_FILE: &str = "results_10M_train.csv";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provisioned {
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

pub fn dataset_present(path: &Path) -> bool {
    path.is_file()
}

/// Fetch `url` into `path` unless the file already exists.
///
/// One blocking GET, no retries. Anything but 200 is a failure. The body is
/// written to a sibling temp file and renamed into place only once complete, so
/// `path` never holds a partial download.
pub fn ensure_dataset(path: &Path, url: &str) -> Result<Provisioned> {
    if dataset_present(path) {
        return Ok(Provisioned::AlreadyPresent);
    }

    info!(url, path = %path.display(), "downloading dataset");
    let mut response = reqwest::blocking::get(url)?;
    let status = response.status();
    if status != StatusCode::OK {
        warn!(url, status = status.as_u16(), "dataset download failed");
        return Err(VidError::DownloadStatus(status.as_u16()));
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    let bytes = response.copy_to(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    info!(bytes, path = %path.display(), "dataset downloaded");
    Ok(Provisioned::Downloaded { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            // drain request headers
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut out = stream;
            write!(
                out,
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        });
        format!("http://{addr}/results.csv")
    }

    #[test]
    fn downloads_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let url = serve_once("200 OK", "name,contentUrl\ncat,http://v/1.mp4\n");

        let got = ensure_dataset(&path, &url).unwrap();
        assert_eq!(got, Provisioned::Downloaded { bytes: 35 });
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "name,contentUrl\ncat,http://v/1.mp4\n"
        );
    }

    #[test]
    fn non_200_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let url = serve_once("404 Not Found", "gone");

        let err = ensure_dataset(&path, &url).unwrap_err();
        assert!(matches!(err, VidError::DownloadStatus(404)));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn existing_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "name,contentUrl\n").unwrap();

        // unroutable URL: must not be contacted
        let got = ensure_dataset(&path, "http://127.0.0.1:9/never").unwrap();
        assert_eq!(got, Provisioned::AlreadyPresent);
    }
}
