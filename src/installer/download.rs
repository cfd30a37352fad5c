//! Artifact download with progress display

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use super::InstallError;
use crate::http::{self, USER_AGENT};
use crate::interrupt::Interrupt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream `url` into `dest`, returning the number of bytes written
///
/// The interrupt flag is polled between chunks.
pub fn download(
    agent: &ureq::Agent,
    url: &str,
    dest: &Path,
    interrupt: &Interrupt,
) -> Result<u64, InstallError> {
    let fail = |reason: String| InstallError::Download {
        url: url.to_string(),
        reason,
    };

    debug!(%url, dest = %dest.display(), "downloading");

    let mut request = agent.get(url).header("User-Agent", USER_AGENT);
    if url.starts_with("https://github.com/")
        && let Some(token) = http::github_token()
    {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let response = request.call().map_err(|e| {
        if interrupt.is_raised() {
            InstallError::Interrupted
        } else {
            fail(e.to_string())
        }
    })?;
    let progress = progress_bar(response.body().content_length());

    let mut file = File::create(dest).map_err(|e| {
        InstallError::permission(dest.parent().unwrap_or(dest), e)
    })?;
    let mut reader = progress.wrap_read(response.into_body().into_reader());
    let written = copy_chunks(&mut reader, &mut file, interrupt).map_err(|e| match e {
        CopyError::Interrupted => InstallError::Interrupted,
        CopyError::Read(e) => fail(e.to_string()),
        CopyError::Write(e) => InstallError::permission(dest.parent().unwrap_or(dest), e),
    });
    progress.finish_and_clear();

    let written = written?;
    if written == 0 {
        return Err(fail("empty response body".to_string()));
    }

    debug!(%url, bytes = written, "download complete");
    Ok(written)
}

enum CopyError {
    Interrupted,
    Read(io::Error),
    Write(io::Error),
}

fn copy_chunks(
    reader: &mut impl Read,
    writer: &mut impl Write,
    interrupt: &Interrupt,
) -> Result<u64, CopyError> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        if interrupt.is_raised() {
            return Err(CopyError::Interrupted);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // A read cut short by a timeout after Ctrl-C is still an interrupt
            Err(_) if interrupt.is_raised() => return Err(CopyError::Interrupted),
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        written += n as u64;
    }
}

/// Byte progress bar, or a spinner when the length is unknown
///
/// indicatif hides both when stderr is not a terminal.
fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template(
                    "  {bar:30.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {bytes} downloaded")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_chunks_copies_everything() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 13];
        let mut out = Vec::new();
        let written = copy_chunks(&mut data.as_slice(), &mut out, &Interrupt::new())
            .unwrap_or_else(|_| panic!("copy failed"));
        assert_eq!(written, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_chunks_stops_when_interrupted() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let mut out = Vec::new();
        let result = copy_chunks(&mut b"payload".as_slice(), &mut out, &interrupt);
        assert!(matches!(result, Err(CopyError::Interrupted)));
        assert!(out.is_empty());
    }
}
