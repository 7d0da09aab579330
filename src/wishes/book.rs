//! Append-only wish storage.
//!
//! The book is an opaque append/lookup service: submissions live as TOML
//! tables in a single file, each keyed by a short generated id that doubles
//! as the shareable link. Rows are never removed or reordered.

use anyhow::{bail, Context, Result};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Wish, WishEntry};

/// Characters in a generated wish id
const ID_LEN: usize = 8;

#[derive(Serialize, Deserialize, Default)]
struct BookFile {
    #[serde(default)]
    wish: Vec<WishRow>,
}

/// One stored submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WishRow {
    pub id: String,
    pub sender: String,
    pub receiver: Option<String>,
    pub messages: Vec<String>,
    pub timestamp: u64,
}

/// Outcome of a successful append
#[derive(Clone, Debug)]
pub struct Receipt {
    pub id: String,
    pub link: String,
}

pub struct WishBook {
    path: PathBuf,
}

impl WishBook {
    /// Book at the default location in the home directory.
    pub fn open() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wishfire-book.toml");
        Self { path }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store a submission, dropping blank messages first. Returns the
    /// generated id and shareable link.
    pub fn append(&self, entry: &WishEntry, rng: &mut impl Rng) -> Result<Receipt> {
        let messages: Vec<String> = entry
            .messages
            .iter()
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .collect();
        if messages.is_empty() {
            bail!("a wish needs at least one non-blank message");
        }

        let id: String = (0..ID_LEN).map(|_| rng.sample(Alphanumeric) as char).collect();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        let mut book = self.read()?;
        book.wish.push(WishRow {
            id: id.clone(),
            sender: entry.sender.clone(),
            receiver: entry.receiver.clone(),
            messages,
            timestamp,
        });

        let text = toml::to_string(&book).context("serializing wish book")?;
        fs::write(&self.path, text)
            .with_context(|| format!("writing wish book {:?}", self.path))?;

        Ok(Receipt {
            link: format!("/wish/{}", id),
            id,
        })
    }

    /// The wishes of one submission, one record per message, or `None` for
    /// an unknown id.
    pub fn lookup(&self, id: &str) -> Result<Option<Vec<Wish>>> {
        let book = self.read()?;
        Ok(book.wish.iter().find(|row| row.id == id).map(row_to_wishes))
    }

    /// Every stored wish in submission order.
    pub fn all(&self) -> Result<Vec<Wish>> {
        let book = self.read()?;
        Ok(book.wish.iter().flat_map(|row| row_to_wishes(row)).collect())
    }

    fn read(&self) -> Result<BookFile> {
        if !self.path.exists() {
            return Ok(BookFile::default());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("reading wish book {:?}", self.path))?;
        toml::from_str(&text).with_context(|| format!("parsing wish book {:?}", self.path))
    }
}

fn row_to_wishes(row: &WishRow) -> Vec<Wish> {
    row.messages
        .iter()
        .map(|message| Wish {
            sender: row.sender.clone(),
            receiver: row.receiver.clone(),
            message: message.clone(),
        })
        .collect()
}
