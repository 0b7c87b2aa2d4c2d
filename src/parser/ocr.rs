use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;

/// Digits, decimal separators and the minus sign.
pub const NUMERIC_WHITELIST: &str = "0123456789,.-";
/// Page segmentation: treat the image as a single text line.
const PSM_SINGLE_LINE: &str = "7";
/// Engine mode: default, whichever is available.
const OEM_DEFAULT: &str = "3";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("could not encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("could not start {binary:?}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("OCR process I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("OCR exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Recognizes a single line of numeric text in a bitmap.
pub trait OcrEngine {
    /// Returns the recognized text trimmed of surrounding whitespace; may be empty.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Runs the `tesseract` executable once per image, piping PNG bytes through stdin.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "stdin",
            "stdout",
            "--psm",
            PSM_SINGLE_LINE,
            "--oem",
            OEM_DEFAULT,
            "-c",
        ])
        .arg(format!("tessedit_char_whitelist={}", NUMERIC_WHITELIST))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;

        let mut child = self.command().spawn().map_err(|source| OcrError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        if let Some(stdin) = child.stdin.take() {
            feed(&mut child, stdin, png.get_ref())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(text = %text, "OCR result");
        Ok(text)
    }
}

/// An early exit closes the pipe and the exit status reports it; any other
/// write failure kills and reaps the child before returning.
fn feed(child: &mut Child, mut stdin: impl Write, bytes: &[u8]) -> io::Result<()> {
    match stdin.write_all(bytes) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            Err(e)
        }
        _ => Ok(()),
    }
}
