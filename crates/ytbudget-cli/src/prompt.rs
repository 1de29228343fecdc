//! Interactive fallback for settings not given on the command line

use anyhow::{bail, Result};
use std::io::{BufRead, Write};
use ytbudget_core::audio::{Channels, SampleRate};
use ytbudget_core::budget::TimeUnit;
use ytbudget_core::downloader::validate_source_url;
use ytbudget_core::Budget;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    /// Ask until a supported URL (or `test`) is entered
    pub fn url(&mut self) -> Result<String> {
        loop {
            let answer =
                self.ask("Enter a YouTube or Twitch URL (or 'test' for a short test video): ")?;
            match validate_source_url(&answer) {
                Ok(url) => return Ok(url),
                Err(e) => self.say(&format!("{}. Please try again.", e))?,
            }
        }
    }

    /// Ask for a unit, then an amount
    pub fn budget(&mut self) -> Result<Budget> {
        let unit = loop {
            let answer = self.ask("Enter duration unit (h for hours, m for minutes): ")?;
            match answer.to_lowercase().as_str() {
                "h" => break TimeUnit::Hours,
                "m" => break TimeUnit::Minutes,
                _ => self.say("Please enter 'h' for hours or 'm' for minutes")?,
            }
        };

        loop {
            let answer = self.ask("Enter the amount: ")?;
            let amount: f64 = match answer.parse() {
                Ok(amount) => amount,
                Err(_) => {
                    self.say(&format!("Please enter a valid number. You entered: '{}'", answer))?;
                    continue;
                }
            };
            match Budget::from_unit(amount, unit) {
                Ok(budget) => return Ok(budget),
                Err(e) => self.say(&format!("Please enter a positive number ({})", e))?,
            }
        }
    }

    /// Empty input keeps `default`
    pub fn sample_rate(&mut self, default: SampleRate) -> Result<SampleRate> {
        let choices: Vec<String> = SampleRate::ALL.iter().map(|r| r.hz().to_string()).collect();
        let question = format!(
            "Enter desired sample rate [{}] (default {}): ",
            choices.join(", "),
            default.hz()
        );

        loop {
            let answer = self.ask(&question)?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<u32>().ok().and_then(SampleRate::from_hz) {
                Some(rate) => return Ok(rate),
                None => self.say(&format!(
                    "Please enter one of the valid sample rates: {}",
                    choices.join(", ")
                ))?,
            }
        }
    }

    /// Empty input keeps `default`
    pub fn channels(&mut self, default: Channels) -> Result<Channels> {
        let question = format!("Enter audio channels (mono/stereo, default {}): ", default);

        loop {
            let answer = self.ask(&question)?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<Channels>() {
                Ok(channels) => return Ok(channels),
                Err(_) => self.say(&format!(
                    "Please enter either 'mono' or 'stereo'. You entered: '{}'",
                    answer
                ))?,
            }
        }
    }
}
