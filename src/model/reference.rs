use serde::{Deserialize, Serialize};

/// A person record imported from the reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    /// Opaque record pointer, e.g. `I42`
    pub pointer: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
}

impl Individual {
    pub fn new(
        pointer: &str,
        first_name: &str,
        last_name: &str,
        birth_year: Option<i32>,
        death_year: Option<i32>,
    ) -> Self {
        Individual {
            pointer: pointer.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            birth_year,
            death_year,
        }
    }

    /// `First Last (birth-death)`, unknown years shown as `?`
    pub fn display_name(&self) -> String {
        format!(
            "{} {} ({}-{})",
            self.first_name,
            self.last_name,
            year_text(self.birth_year),
            year_text(self.death_year)
        )
    }
}

fn year_text(year: Option<i32>) -> String {
    year.map_or_else(|| "?".to_string(), |y| y.to_string())
}

/// A source record imported from the reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub pointer: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub abbreviation: String,
}

impl Source {
    pub fn new(pointer: &str, title: &str, author: &str, publisher: &str, abbreviation: &str) -> Self {
        Source {
            pointer: pointer.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            publisher: publisher.to_string(),
            abbreviation: abbreviation.to_string(),
        }
    }

    /// `Author, Title`, or just the title when there is no author
    pub fn display_name(&self) -> String {
        if self.author.is_empty() {
            self.title.clone()
        } else {
            format!("{}, {}", self.author, self.title)
        }
    }
}

/// Which reference list a link points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Individual,
    Source,
}

/// A record found by pointer or completion, reduced to what the views need
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordMatch {
    pub pointer: String,
    pub display_name: String,
}

/// The two flat record lists loaded from a reference file.
///
/// Always replaced wholesale when the file is (re)loaded. Pointers are not
/// required to be unique; lookups report every match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    #[serde(default)]
    pub individuals: Vec<Individual>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl ReferenceSet {
    pub fn new(individuals: Vec<Individual>, sources: Vec<Source>) -> Self {
        ReferenceSet {
            individuals,
            sources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty() && self.sources.is_empty()
    }

    /// All records of `kind` whose pointer equals `pointer`
    pub fn lookup(&self, kind: RecordKind, pointer: &str) -> Vec<RecordMatch> {
        match kind {
            RecordKind::Individual => self
                .individuals
                .iter()
                .filter(|i| i.pointer == pointer)
                .map(|i| RecordMatch {
                    pointer: i.pointer.clone(),
                    display_name: i.display_name(),
                })
                .collect(),
            RecordKind::Source => self
                .sources
                .iter()
                .filter(|s| s.pointer == pointer)
                .map(|s| RecordMatch {
                    pointer: s.pointer.clone(),
                    display_name: s.display_name(),
                })
                .collect(),
        }
    }

    /// Autocomplete: records whose display name contains `fragment`,
    /// ignoring case. An empty fragment completes nothing.
    pub fn complete(&self, kind: RecordKind, fragment: &str) -> Vec<RecordMatch> {
        if fragment.is_empty() {
            return Vec::new();
        }
        let needle = fragment.to_lowercase();
        let candidates: Vec<RecordMatch> = match kind {
            RecordKind::Individual => self
                .individuals
                .iter()
                .map(|i| RecordMatch {
                    pointer: i.pointer.clone(),
                    display_name: i.display_name(),
                })
                .collect(),
            RecordKind::Source => self
                .sources
                .iter()
                .map(|s| RecordMatch {
                    pointer: s.pointer.clone(),
                    display_name: s.display_name(),
                })
                .collect(),
        };
        candidates
            .into_iter()
            .filter(|m| m.display_name.to_lowercase().contains(&needle))
            .collect()
    }
}
