//! Recognizer backed by an external `tesseract` executable.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use hexid_pipeline::{RecognitionError, Recognizer};

/// Runs `tesseract stdin stdout` once per rendering, feeding PNG bytes on
/// stdin and reading the text from stdout.
///
/// Defaults to single-line page segmentation (`--psm 7`) and a whitelist of
/// uppercase hex digits plus `:` so a leading `ID:` label survives.
#[derive(Clone, Debug)]
pub struct TesseractRecognizer {
    program: PathBuf,
    psm: u8,
    whitelist: Option<String>,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractRecognizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            psm: 7,
            whitelist: Some("0123456789ABCDEF:".to_string()),
        }
    }

    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    /// Restrict output characters; `None` lets the engine emit anything.
    pub fn with_whitelist(mut self, whitelist: Option<String>) -> Self {
        self.whitelist = whitelist;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments passed after the program name.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ];
        if let Some(whitelist) = &self.whitelist {
            args.push("-c".to_string());
            args.push(format!("tessedit_char_whitelist={whitelist}"));
        }
        args
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, png: &[u8]) -> Result<String, RecognitionError> {
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => RecognitionError::Unavailable(format!(
                    "`{}` not found",
                    self.program.display()
                )),
                _ => RecognitionError::Io(err),
            })?;

        // stdin is closed at the end of this block; the child is always reaped
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if let Err(err) = written {
            return Err(RecognitionError::Failed(format!(
                "writing image to {} failed ({err}), exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if !output.status.success() {
            return Err(RecognitionError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_target_a_single_hex_line() {
        let rec = TesseractRecognizer::default();
        assert_eq!(rec.program(), Path::new("tesseract"));
        assert_eq!(
            rec.args(),
            vec![
                "stdin",
                "stdout",
                "--psm",
                "7",
                "-c",
                "tessedit_char_whitelist=0123456789ABCDEF:"
            ]
        );
    }

    #[test]
    fn whitelist_can_be_dropped() {
        let rec = TesseractRecognizer::default().with_psm(8).with_whitelist(None);
        assert_eq!(rec.args(), vec!["stdin", "stdout", "--psm", "8"]);
    }

    #[test]
    fn missing_executable_is_unavailable() {
        let rec = TesseractRecognizer::new("/nonexistent/bin/tesseract-hexid");
        let err = rec.recognize(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, RecognitionError::Unavailable(_)), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn engine_exiting_before_reading_input_fails_cleanly() {
        // `false` ignores its arguments and never reads stdin
        let rec = TesseractRecognizer::new("false");
        let err = rec.recognize(&vec![0u8; 1 << 20]).unwrap_err();
        assert!(matches!(err, RecognitionError::Failed(_)), "{err}");
    }
}
