//! Edit scripts turning a word form into its lemma, and the class labels
//! that encode them.

use std::fmt;

use tracing::debug;

use crate::lemma::particles::ParticleTable;

/// Minimum characters the particle position must keep before the word end,
/// and the minimum common prefix an edited form must share with the lemma.
pub const MIN_PARTICLE_OVERLAP: usize = 5;

/// Length of the longest common prefix of `a` and `b`, in characters.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Finds `particle` in `word` and removes it when it sits early enough.
///
/// Only the first occurrence counts. It qualifies when at least
/// [`MIN_PARTICLE_OVERLAP`] characters follow its start position.
fn strip_particle(word: &str, particle: &str) -> Option<String> {
    let byte = word.find(particle)?;
    let pos = word[..byte].chars().count();
    if pos + MIN_PARTICLE_OVERLAP >= word.chars().count() {
        return None;
    }
    Some(format!("{}{}", &word[..byte], &word[byte + particle.len()..]))
}

/// How to get from a word form to its lemma.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EditScript {
    /// Particle removed from the word before diffing.
    pub particle: Option<String>,
    /// Suffix deleted from the (edited) word.
    pub deleted: String,
    /// Suffix appended afterwards.
    pub inserted: String,
}

impl EditScript {
    /// Computes the script for `word` → `lemma` under `tag`.
    pub fn compute(word: &str, lemma: &str, tag: &str, particles: &ParticleTable) -> Self {
        let mut particle = None;
        let mut form = word.to_string();
        for candidate in particles.candidates(tag) {
            let Some(edit) = strip_particle(word, candidate) else {
                continue;
            };
            if common_prefix_len(&edit, lemma) < MIN_PARTICLE_OVERLAP {
                debug!(word, lemma, particle = candidate, "discarding particle edit");
                continue;
            }
            debug!(word, edited = %edit, lemma, "stripped particle {candidate}");
            particle = Some(candidate.to_string());
            form = edit;
            break;
        }
        let ident = common_prefix_len(&form, lemma);
        Self {
            particle,
            deleted: form.chars().skip(ident).collect(),
            inserted: lemma.chars().skip(ident).collect(),
        }
    }

    /// The class label for this script under `tag`.
    pub fn label(&self, tag: &str) -> String {
        ClassLabel {
            tag: tag.to_string(),
            script: self.clone(),
        }
        .to_string()
    }

    /// Applies the script to `word`, giving the lemma.
    pub fn apply(&self, word: &str) -> String {
        let mut form = match &self.particle {
            Some(p) => strip_particle(word, p).unwrap_or_else(|| word.to_string()),
            None => word.to_string(),
        };
        if !self.deleted.is_empty() && form.ends_with(&self.deleted) {
            form.truncate(form.len() - self.deleted.len());
        }
        form.push_str(&self.inserted);
        form
    }

    /// Whether the script leaves the word unchanged.
    pub fn is_identity(&self) -> bool {
        self.particle.is_none() && self.deleted.is_empty() && self.inserted.is_empty()
    }
}

/// A lemmatizer class: `TAG[+Pparticle][+Ddeleted][+Iinserted]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassLabel {
    pub tag: String,
    pub script: EditScript,
}

impl ClassLabel {
    /// Parses one label. Unknown `+X` parts are kept as part of the tag.
    pub fn parse(label: &str) -> Self {
        let mut pieces = label.split('+');
        let mut tag = pieces.next().unwrap_or_default().to_string();
        let mut script = EditScript::default();
        for piece in pieces {
            let mut chars = piece.chars();
            match chars.next() {
                Some('P') => script.particle = Some(chars.as_str().to_string()),
                Some('D') => script.deleted = chars.as_str().to_string(),
                Some('I') => script.inserted = chars.as_str().to_string(),
                _ => {
                    tag.push('+');
                    tag.push_str(piece);
                }
            }
        }
        Self { tag, script }
    }

    /// Parses a `|`-joined class as predicted by the instance base.
    pub fn parse_all(class: &str) -> Vec<Self> {
        class
            .split('|')
            .filter(|l| !l.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// The lemma this label gives for `word`.
    pub fn lemma(&self, word: &str) -> String {
        self.script.apply(word)
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        if let Some(particle) = &self.script.particle {
            write!(f, "+P{particle}")?;
        }
        if !self.script.deleted.is_empty() {
            write!(f, "+D{}", self.script.deleted)?;
        }
        if !self.script.inserted.is_empty() {
            write!(f, "+I{}", self.script.inserted)?;
        }
        Ok(())
    }
}
