//! Text corpora: filtered lines drawn by weight, with case and augmentation options.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::components::component::{Component, ComponentData, component_meta};
use crate::foundation::error::{SynthError, SynthResult};
use crate::foundation::random::{Categorical, SynthRng, chance, int_inclusive, uniform};

/// Case rewrite applied to a drawn line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCase {
    /// All lowercase.
    Lower,
    /// All uppercase.
    Upper,
    /// First character uppercase, the rest lowercase.
    Capitalize,
}

impl TextCase {
    /// Rewrite `text`.
    pub fn apply(self, text: &str) -> String {
        match self {
            TextCase::Lower => text.to_lowercase(),
            TextCase::Upper => text.to_uppercase(),
            TextCase::Capitalize => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.as_str().to_lowercase().chars())
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Configuration of a [`Corpus`].
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorpusConfig {
    /// Text files, one sample per line.
    pub paths: Vec<PathBuf>,
    /// Per-path weights; uniform when absent.
    pub weights: Option<Vec<f64>>,
    /// Drop lines shorter than this many characters.
    pub min_length: Option<usize>,
    /// Drop lines longer than this many characters.
    pub max_length: Option<usize>,
    /// Drop lines with characters outside this charset file.
    pub charset: Option<PathBuf>,
    /// Case rewrites drawn uniformly; none when absent.
    pub textcase: Option<Vec<TextCase>>,
    /// Probability of concatenating random lines up to a drawn length.
    pub length_augmentation: f64,
    /// Inclusive length range for length augmentation.
    pub augmentation_length: (i64, i64),
    /// Probability of drawing a line weighted toward rare characters.
    pub char_augmentation: f64,
    /// Characters whose rarity drives char augmentation.
    pub augmentation_charset: Option<PathBuf>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            weights: None,
            min_length: None,
            max_length: None,
            charset: None,
            textcase: None,
            length_augmentation: 0.0,
            augmentation_length: (1, 25),
            char_augmentation: 0.0,
            augmentation_charset: None,
        }
    }
}

component_meta! {
    /// Resolved [`Corpus`] draw.
    pub struct CorpusMeta / CorpusPartial {
        /// The text.
        pub text: String,
    }
}

/// Set of characters in a charset file.
pub fn read_charset(path: &Path) -> SynthResult<HashSet<char>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SynthError::config(format!("read charset {}: {e}", path.display())))?;
    Ok(text.chars().collect())
}

#[derive(Clone, Debug)]
struct Source {
    name: String,
    lines: Vec<String>,
    // Cumulative rare-character weights, present only with char augmentation.
    rarity: Option<Vec<f64>>,
}

/// Draws lines of text from weighted corpora.
#[derive(Clone, Debug)]
pub struct Corpus {
    config: CorpusConfig,
    sources: Vec<Source>,
    choice: Option<Categorical>,
}

impl Corpus {
    /// Read every corpus file.
    pub fn new(config: CorpusConfig) -> SynthResult<Self> {
        let texts = config
            .paths
            .iter()
            .map(|p| {
                std::fs::read_to_string(p)
                    .map(|t| t.lines().map(str::to_owned).collect::<Vec<_>>())
                    .map_err(|e| SynthError::config(format!("read corpus {}: {e}", p.display())))
            })
            .collect::<SynthResult<Vec<_>>>()?;
        Self::from_texts(config, texts)
    }

    /// Build from in-memory line lists, one per source; `config.paths` is ignored.
    pub fn from_texts(config: CorpusConfig, texts: Vec<Vec<String>>) -> SynthResult<Self> {
        let charset = config.charset.as_deref().map(read_charset).transpose()?;
        let rare = if config.char_augmentation > 0.0 {
            let path = config.augmentation_charset.as_deref().ok_or_else(|| {
                SynthError::config("char augmentation needs an augmentation charset")
            })?;
            Some(read_charset(path)?)
        } else {
            None
        };
        let choice = if texts.is_empty() {
            None
        } else {
            Some(Categorical::new(texts.len(), config.weights.as_deref())?)
        };
        let sources = texts
            .into_iter()
            .enumerate()
            .map(|(key, lines)| {
                let lines: Vec<String> = lines
                    .into_iter()
                    .map(|l| l.trim_end_matches(['\r', '\n']).to_owned())
                    .filter(|l| keep_line(&config, charset.as_ref(), l))
                    .collect();
                let rarity = rare.as_ref().map(|rare| rarity_weights(&lines, rare));
                let name = config
                    .paths
                    .get(key)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("source {key}"));
                Source {
                    name,
                    lines,
                    rarity,
                }
            })
            .collect();
        Ok(Self {
            config,
            sources,
            choice,
        })
    }

    /// Number of usable lines per source.
    pub fn counts(&self) -> Vec<usize> {
        self.sources.iter().map(|s| s.lines.len()).collect()
    }

    fn pick_source(&self, rng: &mut SynthRng) -> SynthResult<&Source> {
        let choice = self
            .choice
            .as_ref()
            .ok_or_else(|| SynthError::config("corpus path is not specified"))?;
        let source = &self.sources[choice.sample(rng)];
        if source.lines.is_empty() {
            return Err(SynthError::config(format!("there is no text in {}", source.name)));
        }
        Ok(source)
    }

    fn random_line<'a>(rng: &mut SynthRng, source: &'a Source) -> &'a str {
        let idx = int_inclusive(rng, (0, source.lines.len() as i64 - 1)) as usize;
        &source.lines[idx]
    }

    fn sample_text(&self, rng: &mut SynthRng) -> SynthResult<String> {
        if chance(rng, self.config.length_augmentation) {
            let length = int_inclusive(rng, self.config.augmentation_length).max(0) as usize;
            let mut text = String::new();
            while text.chars().count() < length {
                let source = self.pick_source(rng)?;
                let line = Self::random_line(rng, source);
                if line.is_empty() && source.lines.iter().all(String::is_empty) {
                    break;
                }
                text.push_str(line);
            }
            return Ok(text.chars().take(length).collect());
        }
        if chance(rng, self.config.char_augmentation) {
            let source = self.pick_source(rng)?;
            if let Some(cumulative) = source.rarity.as_ref() {
                let total = cumulative.last().copied().unwrap_or(0.0);
                let value = uniform(rng, (0.0, total));
                let idx = cumulative
                    .partition_point(|c| *c < value)
                    .min(source.lines.len() - 1);
                return Ok(source.lines[idx].clone());
            }
        }
        let source = self.pick_source(rng)?;
        Ok(Self::random_line(rng, source).to_owned())
    }
}

fn keep_line(config: &CorpusConfig, charset: Option<&HashSet<char>>, line: &str) -> bool {
    let len = line.chars().count();
    if config.min_length.is_some_and(|m| len < m) || config.max_length.is_some_and(|m| len > m) {
        return false;
    }
    charset.is_none_or(|set| line.chars().all(|c| set.contains(&c)))
}

/// Cumulative weights favouring lines that contain characters rare across the source.
fn rarity_weights(lines: &[String], rare: &HashSet<char>) -> Vec<f64> {
    let mut doc_freq: HashMap<char, usize> = HashMap::new();
    for line in lines {
        for c in line.chars().collect::<HashSet<_>>() {
            *doc_freq.entry(c).or_default() += 1;
        }
    }
    let mut acc = 0.0;
    lines
        .iter()
        .map(|line| {
            let chars: HashSet<char> = line.chars().filter(|c| rare.contains(c)).collect();
            acc += chars
                .iter()
                .map(|c| 1.0 / doc_freq.get(c).copied().unwrap_or(1) as f64)
                .sum::<f64>();
            acc
        })
        .collect()
}

impl Component for Corpus {
    type Meta = CorpusMeta;
    type Partial = CorpusPartial;

    fn sample(&self, rng: &mut SynthRng, partial: CorpusPartial) -> SynthResult<CorpusMeta> {
        if let Some(text) = partial.text {
            return Ok(CorpusMeta { text });
        }
        let text = self.sample_text(rng)?;
        let text = match self.config.textcase.as_deref() {
            Some(cases) if !cases.is_empty() => {
                cases[int_inclusive(rng, (0, cases.len() as i64 - 1)) as usize].apply(&text)
            }
            _ => text,
        };
        Ok(CorpusMeta { text })
    }

    fn data(&self, meta: &CorpusMeta) -> SynthResult<ComponentData> {
        Ok(ComponentData::Text(meta.text.clone()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/components/corpus.rs"]
mod tests;
