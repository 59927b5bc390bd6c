use super::*;
use crate::foundation::random::rng_from_seed;

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "synthtiger_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn textcase_rewrites() {
    assert_eq!(TextCase::Lower.apply("HeLLo"), "hello");
    assert_eq!(TextCase::Upper.apply("HeLLo"), "HELLO");
    assert_eq!(TextCase::Capitalize.apply("hELLO wORLD"), "Hello world");
    assert_eq!(TextCase::Capitalize.apply(""), "");
}

#[test]
fn length_filters_drop_lines() {
    let corpus = Corpus::from_texts(
        CorpusConfig {
            min_length: Some(2),
            max_length: Some(4),
            ..CorpusConfig::default()
        },
        vec![lines(&["a", "ab", "abcd", "abcde", "日本"])],
    )
    .unwrap();
    assert_eq!(corpus.counts(), vec![3]);
}

#[test]
fn charset_filter_drops_lines() {
    let charset = temp_file("corpus_charset", "abc");
    let corpus = Corpus::from_texts(
        CorpusConfig {
            charset: Some(charset.clone()),
            ..CorpusConfig::default()
        },
        vec![lines(&["abc", "abd", "cab"])],
    )
    .unwrap();
    assert_eq!(corpus.counts(), vec![2]);
    let _ = std::fs::remove_file(charset);
}

#[test]
fn samples_come_from_the_corpus() {
    let corpus =
        Corpus::from_texts(CorpusConfig::default(), vec![lines(&["one", "two"]), lines(&["three"])])
            .unwrap();
    let mut rng = rng_from_seed(8);
    for _ in 0..30 {
        let m = corpus.sample(&mut rng, CorpusPartial::default()).unwrap();
        assert!(["one", "two", "three"].contains(&m.text.as_str()));
        assert_eq!(corpus.data(&m).unwrap().as_text(), Some(m.text.as_str()));
    }
}

#[test]
fn weights_steer_source_choice() {
    let corpus = Corpus::from_texts(
        CorpusConfig {
            weights: Some(vec![0.0, 1.0]),
            ..CorpusConfig::default()
        },
        vec![lines(&["never"]), lines(&["always"])],
    )
    .unwrap();
    let mut rng = rng_from_seed(2);
    for _ in 0..20 {
        assert_eq!(corpus.sample(&mut rng, CorpusPartial::default()).unwrap().text, "always");
    }
}

#[test]
fn empty_source_is_config_error() {
    let corpus = Corpus::from_texts(CorpusConfig::default(), vec![lines(&[])]).unwrap();
    let mut rng = rng_from_seed(2);
    let err = corpus.sample(&mut rng, CorpusPartial::default()).unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));

    let none = Corpus::from_texts(CorpusConfig::default(), Vec::new()).unwrap();
    assert!(none.sample(&mut rng, CorpusPartial::default()).is_err());
}

#[test]
fn length_augmentation_hits_exact_length() {
    let corpus = Corpus::from_texts(
        CorpusConfig {
            length_augmentation: 1.0,
            augmentation_length: (7, 7),
            ..CorpusConfig::default()
        },
        vec![lines(&["ab", "cde"])],
    )
    .unwrap();
    let mut rng = rng_from_seed(6);
    for _ in 0..10 {
        let m = corpus.sample(&mut rng, CorpusPartial::default()).unwrap();
        assert_eq!(m.text.chars().count(), 7);
        assert!(m.text.chars().all(|c| "abcde".contains(c)));
    }
}

#[test]
fn char_augmentation_prefers_rare_lines() {
    let charset = temp_file("corpus_rare", "z");
    let corpus = Corpus::from_texts(
        CorpusConfig {
            char_augmentation: 1.0,
            augmentation_charset: Some(charset.clone()),
            ..CorpusConfig::default()
        },
        vec![lines(&["aaa", "bbb", "zzz", "ccc"])],
    )
    .unwrap();
    let mut rng = rng_from_seed(6);
    for _ in 0..20 {
        assert_eq!(corpus.sample(&mut rng, CorpusPartial::default()).unwrap().text, "zzz");
    }
    let _ = std::fs::remove_file(charset);
}

#[test]
fn char_augmentation_without_charset_is_config_error() {
    let err = Corpus::from_texts(
        CorpusConfig {
            char_augmentation: 0.5,
            ..CorpusConfig::default()
        },
        vec![lines(&["x"])],
    )
    .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn textcase_applies_and_partial_wins() {
    let corpus = Corpus::from_texts(
        CorpusConfig {
            textcase: Some(vec![TextCase::Upper]),
            ..CorpusConfig::default()
        },
        vec![lines(&["abc"])],
    )
    .unwrap();
    let mut rng = rng_from_seed(1);
    assert_eq!(corpus.sample(&mut rng, CorpusPartial::default()).unwrap().text, "ABC");
    let forced = corpus
        .sample(
            &mut rng,
            CorpusPartial {
                text: Some("kept".into()),
            },
        )
        .unwrap();
    assert_eq!(forced.text, "kept");
}
