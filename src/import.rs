use std::fmt;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::db::{self, ProblemRow};
use crate::email;
use crate::extract;

/// Highest problem number already stored when the run started.
///
/// Fixed for the whole run: numbers written during the import do not raise it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Subject carried no problem number.
    Unnumbered,
    AlreadyStored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep(i64),
    Skip(SkipReason),
}

impl Threshold {
    pub fn new(latest: i64) -> Self {
        Threshold(latest)
    }

    pub fn check(self, number: Option<i64>) -> Verdict {
        match number {
            None => Verdict::Skip(SkipReason::Unnumbered),
            Some(n) if n <= self.0 => Verdict::Skip(SkipReason::AlreadyStored),
            Some(n) => Verdict::Keep(n),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub entered: usize,
    pub skipped: usize,
}

impl ImportCounts {
    pub fn print(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for ImportCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "All problems uploaded successfully")?;
        writeln!(f)?;
        writeln!(f, "Total number of problems uploaded: {}", self.entered)?;
        write!(f, "Total number of emails skipped: {}", self.skipped)
    }
}

/// Decode, extract, filter and store each message in order.
///
/// The first error of any kind ends the run; records written before it stay.
pub fn run<I>(conn: &Connection, messages: I, threshold: Threshold) -> Result<ImportCounts>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} emails {msg}")?,
    );

    let mut counts = ImportCounts::default();

    for raw in messages {
        let raw = raw?;
        let email = email::decode(&raw)?;
        let fields = extract::extract(&email);

        match threshold.check(fields.number) {
            Verdict::Skip(reason) => {
                counts.skipped += 1;
                pb.suspend(|| debug!(?reason, subject = %email.subject, "Skipped email"));
            }
            Verdict::Keep(number) => {
                let row = ProblemRow {
                    number,
                    difficulty: fields.difficulty,
                    company: fields.company,
                    text: email.text,
                    html: email.html,
                    date: email.date,
                };
                let id = db::insert_problem(conn, &row)
                    .with_context(|| format!("Unable to create problem {}", number))?;
                counts.entered += 1;
                pb.suspend(|| info!(number, id, "Uploaded problem"));
            }
        }

        pb.inc(1);
        pb.set_message(format!("({} uploaded, {} skipped)", counts.entered, counts.skipped));
    }

    pb.finish_and_clear();
    Ok(counts)
}
