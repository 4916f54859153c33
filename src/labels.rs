// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Room-label glossary. The firmware stores a numeric label per room; the
//! controller deals in the canonical lowercase identifiers below.

use thiserror::Error;

const LABELS: [(u8, &str); 14] = [
    (1, "living_room"),
    (2, "dining_room"),
    (3, "bedroom"),
    (4, "study"),
    (5, "kitchen"),
    (6, "bathroom"),
    (7, "laundry"),
    (8, "lounge"),
    (9, "storeroom"),
    (10, "kids_room"),
    (11, "sunroom"),
    (12, "corridor"),
    (13, "balcony"),
    (14, "gym"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("empty room label; accepted: {}", accepted_names())]
    Empty,
    #[error("unknown room label {0:?}; accepted: {accepted}", accepted = accepted_names())]
    Unknown(String),
}

fn accepted_names() -> String {
    LABELS
        .iter()
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonical identifier for a numeric label; unknown ids stringify as
/// `label_<id>`.
pub fn label_name(id: u8) -> String {
    LABELS
        .iter()
        .find(|(i, _)| *i == id)
        .map_or_else(|| format!("label_{id}"), |(_, name)| (*name).to_string())
}

/// Numeric label for a user-supplied name. Input is lowercased with
/// hyphens and whitespace folded to underscores; pure-digit input is taken
/// as the id itself.
pub fn label_id(name: &str) -> Result<u8, LabelError> {
    let folded = normalize(name);
    if folded.is_empty() {
        return Err(LabelError::Empty);
    }
    if folded.chars().all(|c| c.is_ascii_digit()) {
        return folded
            .parse::<u8>()
            .map_err(|_| LabelError::Unknown(name.to_string()));
    }
    LABELS
        .iter()
        .find(|(_, n)| *n == folded)
        .map(|(id, _)| *id)
        .ok_or_else(|| LabelError::Unknown(name.to_string()))
}

fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    lower
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
