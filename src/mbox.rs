use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use mail_parser::mailbox::mbox::MessageIterator;

/// Forward-only reader over the raw messages of an mbox file.
///
/// End of archive is iterator exhaustion; a read failure is yielded as `Err`.
pub struct Archive {
    messages: MessageIterator<BufReader<File>>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Unable to open mbox file {}", path.display()))?;
        Ok(Archive {
            messages: MessageIterator::new(BufReader::new(file)),
        })
    }
}

impl Iterator for Archive {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let message = self.messages.next()?;
        Some(
            message
                .map(|m| m.contents().to_vec())
                .map_err(|e| anyhow!("Error reading message from mbox: {:?}", e)),
        )
    }
}
