mod book;

pub use book::{Receipt, WishBook, WishRow};

use serde::{Deserialize, Serialize};

/// One greeting bound to its sender and optional receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub sender: String,
    pub receiver: Option<String>,
    pub message: String,
}

/// A submission collected by the compose overlay: one sender, an optional
/// receiver, and any number of message lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WishEntry {
    pub sender: String,
    pub receiver: Option<String>,
    pub messages: Vec<String>,
}
