use anyhow::{bail, Context, Result};
use include_dir::{include_dir, Dir};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");

const BUILTIN_CORPUS: &str = "quotes.json";

/// A named list of sentences to type
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Corpus {
    pub name: String,
    pub sentences: Vec<String>,
}

impl Corpus {
    /// The quotes shipped with the binary
    pub fn builtin() -> Self {
        let file = CORPUS_DIR
            .get_file(BUILTIN_CORPUS)
            .expect("Built-in corpus not found");

        let contents = file
            .contents_utf8()
            .expect("Unable to interpret corpus as a string");

        serde_json::from_str(contents).expect("Unable to deserialize built-in corpus")
    }

    /// A corpus holding one sentence, used for a custom prompt.
    /// A blank sentence can never be finished, so it leaves the corpus empty.
    pub fn single(sentence: impl Into<String>) -> Self {
        Self {
            name: "custom".to_string(),
            sentences: vec![sentence.into()],
        }
        .without_blank_sentences()
    }

    fn without_blank_sentences(mut self) -> Self {
        self.sentences.retain(|s| !s.trim().is_empty());
        self
    }

    /// Load a corpus from disk.
    ///
    /// `.json` files use the `{ "name", "sentences" }` shape of the built-in
    /// corpus; anything else is read as one sentence per line.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading corpus file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let corpus = if is_json {
            serde_json::from_str::<Corpus>(&contents)
                .with_context(|| format!("parsing corpus file {}", path.display()))?
                .without_blank_sentences()
        } else {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "custom".to_string());
            Corpus::from_lines(name, &contents)
        };

        if corpus.sentences.is_empty() {
            bail!("corpus file {} contains no sentences", path.display());
        }

        debug!(
            "loaded corpus {:?} with {} sentences",
            corpus.name,
            corpus.sentences.len()
        );

        Ok(corpus)
    }

    fn from_lines(name: String, contents: &str) -> Self {
        let sentences = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();

        Self { name, sentences }
    }

    /// Pick a sentence uniformly at random
    pub fn pick(&self) -> Option<&str> {
        random_sentence(&self.sentences)
    }

    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        random_sentence_with(&self.sentences, rng)
    }
}

/// Choose one sentence uniformly at random; `None` only for an empty list.
pub fn random_sentence<S: AsRef<str>>(sentences: &[S]) -> Option<&str> {
    random_sentence_with(sentences, &mut rand::thread_rng())
}

pub fn random_sentence_with<'a, S: AsRef<str>, R: Rng + ?Sized>(
    sentences: &'a [S],
    rng: &mut R,
) -> Option<&'a str> {
    match sentences {
        [] => None,
        [only] => Some(only.as_ref()),
        _ => sentences.choose(rng).map(AsRef::as_ref),
    }
}
