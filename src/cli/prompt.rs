//! Interactive prompts.
//!
//! Only the four run inputs and the per-target selection cross from here
//! into the pipeline; prompts are plain line-oriented stdin reads.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;

use crate::core::Selector;
use crate::domain::{Target, VideoDetail};

use super::RunInputs;

/// Ask one question; an empty answer (or end of input) keeps `default`
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: &str,
) -> Result<String> {
    write!(output, "{} ({}): ", question, default).context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;

    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}

/// Prompt for channel file, output directory and the date window
pub fn prompt_inputs<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    defaults: RunInputs,
) -> Result<RunInputs> {
    let channel_file = ask(
        input,
        output,
        "Channel file",
        &defaults.channel_file.display().to_string(),
    )?;
    let output_dir = ask(
        input,
        output,
        "Output directory",
        &defaults.output_dir.display().to_string(),
    )?;
    let from_date = ask(input, output, "From date (yyyy-mm-dd)", &defaults.from_date)?;
    let to_date = ask(input, output, "To date (yyyy-mm-dd)", &defaults.to_date)?;

    Ok(RunInputs {
        channel_file: PathBuf::from(channel_file),
        output_dir: PathBuf::from(output_dir),
        from_date,
        to_date,
    })
}

/// Parse a comma separated list of 1-based positions.
///
/// An empty answer selects everything. Repeated numbers are kept once.
pub fn parse_selection(answer: &str, count: usize) -> Result<Vec<usize>, String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok((0..count).collect());
    }

    let mut picked = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let number: usize = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        if number == 0 || number > count {
            return Err(format!("{} is out of range 1-{}", number, count));
        }
        if !picked.contains(&(number - 1)) {
            picked.push(number - 1);
        }
    }

    Ok(picked)
}

/// Asks which of a target's accepted videos to download
pub struct InteractiveSelector<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl InteractiveSelector<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn ask_selection(&self, target: &Target, candidates: &[VideoDetail]) -> Result<Vec<usize>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| anyhow::anyhow!("Selector input poisoned"))?;
        let mut output = self
            .output
            .lock()
            .map_err(|_| anyhow::anyhow!("Selector output poisoned"))?;

        writeln!(output, "{}:", target)?;
        for (idx, detail) in candidates.iter().enumerate() {
            writeln!(
                output,
                "  {:>3}. {} ({})",
                idx + 1,
                detail.title,
                detail.upload_date.format("%Y-%m-%d")
            )?;
        }

        loop {
            let answer = ask(&mut *input, &mut *output, "Videos to download", "all")?;
            let answer = if answer == "all" { "" } else { answer.as_str() };

            match parse_selection(answer, candidates.len()) {
                Ok(picked) => return Ok(picked),
                Err(reason) => writeln!(output, "{}", reason)?,
            }
        }
    }
}

impl<R, W> Selector for InteractiveSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn select(&self, target: &Target, candidates: Vec<VideoDetail>) -> Vec<VideoDetail> {
        match self.ask_selection(target, &candidates) {
            Ok(picked) => picked
                .into_iter()
                .filter_map(|idx| candidates.get(idx).cloned())
                .collect(),
            Err(e) => {
                warn!(error = %e, "Selection prompt failed, keeping all videos");
                candidates
            }
        }
    }
}
