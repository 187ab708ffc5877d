//! Particle tables: which detachable particles to try for which tags.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::error::{Result, ToadError};

/// Tag substring → candidate particles.
///
/// Parsed from `[TAG/particle] [TAG/particle] ...`, e.g. the Dutch default
/// `[WW(vd/be] [WW(vd/ge]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticleTable {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ParticleTable {
    /// Parses a particle line.
    ///
    /// # Errors
    ///
    /// [`ToadError::InvalidParticles`] when a bracketed part is not exactly
    /// `tag/particle`.
    pub fn parse(line: &str) -> Result<Self> {
        info!("start filling particle info from {line}");
        let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for part in line.split(['[', ']', ' ']).filter(|p| !p.is_empty()) {
            let pieces: Vec<&str> = part.split('/').filter(|p| !p.is_empty()).collect();
            let [tag, particle] = pieces.as_slice() else {
                return Err(ToadError::InvalidParticles {
                    line: line.to_string(),
                    part: part.to_string(),
                });
            };
            entries
                .entry(tag.to_string())
                .or_default()
                .insert(particle.to_string());
        }
        Ok(Self { entries })
    }

    /// The table used for Dutch when nothing is configured.
    pub fn dutch() -> Self {
        let mut table = Self::default();
        table.insert("WW(vd", "be");
        table.insert("WW(vd", "ge");
        table
    }

    pub fn insert(&mut self, tag: &str, particle: &str) {
        self.entries
            .entry(tag.to_string())
            .or_default()
            .insert(particle.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Particles to try for `tag`, in table order.
    pub fn candidates<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| tag.contains(key.as_str()))
            .flat_map(|(_, particles)| particles.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DUTCH_PARTICLES;

    #[test]
    fn parses_dutch_default() {
        let table = ParticleTable::parse(DUTCH_PARTICLES).unwrap();
        assert_eq!(table, ParticleTable::dutch());
        let found: Vec<_> = table.candidates("WW(vd,vrij,zonder)").collect();
        assert_eq!(found, vec!["be", "ge"]);
        assert_eq!(table.candidates("WW(inf)").count(), 0);
    }

    #[test]
    fn several_tags() {
        let table = ParticleTable::parse("[WW(vd/ge] [WW(inf/te] [WW(vd/be]").unwrap();
        let found: Vec<_> = table.candidates("WW(inf,vrij,zonder)").collect();
        assert_eq!(found, vec!["te"]);
    }

    #[test]
    fn rejects_missing_particle() {
        let err = ParticleTable::parse("[WW(vd/ge] [WW(vd]").unwrap_err();
        assert!(matches!(
            err,
            ToadError::InvalidParticles { ref part, .. } if part == "WW(vd"
        ));
    }

    #[test]
    fn empty_line_gives_empty_table() {
        assert!(ParticleTable::parse("").unwrap().is_empty());
    }
}
