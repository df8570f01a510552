use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::roster::Student;

/// Background colors for generated placeholders.
const PALETTE: [&str; 8] = [
    "#e57373", "#64b5f6", "#81c784", "#ffb74d", "#ba68c8", "#4db6ac", "#f06292", "#a1887f",
];

/// Generated stand-in for a missing avatar image. Keyed by name and gender
/// so the same student gets the same placeholder on every open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderAvatar {
    pub initials: String,
    pub color: String,
}

/// What a slot should render for a candidate: the stored image when there
/// is one, a generated placeholder otherwise. A slot is never blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AvatarRef {
    Image(String),
    Generated(PlaceholderAvatar),
}

pub fn avatar_for(student: &Student) -> AvatarRef {
    match &student.avatar {
        Some(url) if !url.trim().is_empty() => AvatarRef::Image(url.clone()),
        _ => AvatarRef::Generated(placeholder_for(&student.name, student.gender.as_deref())),
    }
}

pub fn placeholder_for(name: &str, gender: Option<&str>) -> PlaceholderAvatar {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b"\0");
    hasher.update(gender.unwrap_or("").as_bytes());
    let digest = hasher.finalize();
    let color = PALETTE[digest[0] as usize % PALETTE.len()];
    PlaceholderAvatar {
        initials: initials_of(name),
        color: color.to_string(),
    }
}

fn initials_of(name: &str) -> String {
    let mut out = String::new();
    for word in name.split_whitespace().take(2) {
        if let Some(c) = word.chars().next() {
            out.extend(c.to_uppercase());
        }
    }
    if out.is_empty() {
        out.push('?');
    }
    out
}
