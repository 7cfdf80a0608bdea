use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PosterError, PosterResult};

/// One person in the directory, as supplied by the roster loader.
///
/// Field names follow the roster's column headers. The poster pipeline never mutates a record.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PersonRecord {
    /// Display name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Email address.
    #[serde(rename = "Email")]
    pub email: String,
    /// Phone number.
    #[serde(rename = "Phone")]
    pub phone: String,
    /// Office location.
    #[serde(rename = "Office")]
    pub office: String,
    /// Local photo filename, resolved under `images/`.
    #[serde(rename = "Photo", skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Remote photo URL, used when no local photo is set.
    #[serde(rename = "Photo URL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Personal profile page encoded into the QR code.
    #[serde(rename = "Profile URL", skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    /// Research interests, `;` or newline separated.
    #[serde(rename = "Research")]
    pub research: String,
    /// Selected papers, `;` or newline separated.
    #[serde(rename = "Papers")]
    pub papers: String,
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl PersonRecord {
    /// Image reference for this person's photo.
    ///
    /// A local `Photo` wins over `Photo URL`; with neither, a placeholder URL carrying the name
    /// is returned.
    pub fn photo_ref(&self) -> String {
        if let Some(file) = non_blank(&self.photo) {
            return format!("images/{file}");
        }
        if let Some(url) = non_blank(&self.photo_url) {
            return url.to_string();
        }
        let text = if self.name.trim().is_empty() {
            "No"
        } else {
            self.name.trim()
        };
        match reqwest::Url::parse_with_params(
            "https://via.placeholder.com/420x420",
            &[("text", text)],
        ) {
            Ok(url) => url.to_string(),
            Err(_) => String::new(),
        }
    }

    /// Profile page URL, derived from `base` and the roster index when the record has none.
    pub fn profile_ref(&self, base: &str, index: usize) -> String {
        match non_blank(&self.profile_url) {
            Some(url) => url.to_string(),
            None => format!("{base}profile.html?id={index}"),
        }
    }

    /// Suggested filename for a downloaded poster.
    pub fn poster_filename(&self) -> String {
        let name: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                let reserved =
                    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
                if c.is_control() || reserved {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        if name.is_empty() {
            "poster_staff.png".to_string()
        } else {
            format!("poster_{name}.png")
        }
    }
}

/// Ordered, read-only list of person records addressed by stable index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    people: Vec<PersonRecord>,
}

impl Roster {
    /// Wrap an already loaded list.
    pub fn new(people: Vec<PersonRecord>) -> Self {
        Self { people }
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(json: &str) -> PosterResult<Self> {
        let people: Vec<PersonRecord> = serde_json::from_str(json)
            .map_err(|e| PosterError::validation(format!("invalid roster json: {e}")))?;
        Ok(Self { people })
    }

    /// Read and parse a JSON roster file.
    pub fn from_path(path: &Path) -> PosterResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read roster '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.people.len()
    }

    /// Whether the roster has no records.
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Record at `index`, or [`PosterError::NotFound`].
    pub fn get(&self, index: usize) -> PosterResult<&PersonRecord> {
        self.people.get(index).ok_or(PosterError::NotFound(index))
    }

    /// Iterate records in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &PersonRecord> {
        self.people.iter()
    }
}

#[cfg(test)]
#[path = "../tests/unit/roster/roster.rs"]
mod tests;
