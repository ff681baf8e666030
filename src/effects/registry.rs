//! Effect registry and name validation

use super::{decrypt, expand, matrix, print, rain, slide, wipe};
use super::{EffectInput, FrameIter};

/// A named effect constructor
#[derive(Clone, Copy)]
pub struct EffectEntry {
    pub name: &'static str,
    pub build: fn(EffectInput<'_>) -> FrameIter,
}

impl std::fmt::Debug for EffectEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEntry").field("name", &self.name).finish()
    }
}

static CATALOG: [EffectEntry; 7] = [
    EffectEntry { name: "Matrix", build: matrix::build },
    EffectEntry { name: "Rain", build: rain::build },
    EffectEntry { name: "Decrypt", build: decrypt::build },
    EffectEntry { name: "Print", build: print::build },
    EffectEntry { name: "Wipe", build: wipe::build },
    EffectEntry { name: "Slide", build: slide::build },
    EffectEntry { name: "Expand", build: expand::build },
];

/// Used when no configured name is known
pub const FALLBACK_EFFECTS: [&str; 3] = ["Matrix", "Rain", "Decrypt"];

pub fn catalog() -> &'static [EffectEntry] {
    &CATALOG
}

/// Look up an effect by exact name
pub fn find(name: &str) -> Option<&'static EffectEntry> {
    catalog().iter().find(|e| e.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    catalog().iter().map(|e| e.name)
}

/// Non-empty, de-duplicated list of known effect names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledEffects {
    names: Vec<&'static str>,
}

impl EnabledEffects {
    /// Keep the configured names the catalog knows, in order.
    ///
    /// Falls back to [`FALLBACK_EFFECTS`] when nothing survives.
    pub fn validate<S: AsRef<str>>(configured: &[S]) -> Self {
        let mut names: Vec<&'static str> = Vec::new();
        for raw in configured {
            match find(raw.as_ref()) {
                Some(entry) if !names.contains(&entry.name) => names.push(entry.name),
                Some(_) => {}
                None => tracing::warn!("Ignoring unknown effect: {}", raw.as_ref()),
            }
        }

        if names.is_empty() {
            tracing::warn!("No valid effects configured, using {:?}", FALLBACK_EFFECTS);
            names = FALLBACK_EFFECTS.to_vec();
        }

        Self { names }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Name at `index`, wrapping around
    pub fn get_wrapped(&self, index: usize) -> &'static str {
        self.names[index % self.names.len()]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| *n == name)
    }
}
