use super::*;
use crate::foundation::random::rng_from_seed;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "synthtiger_res_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(dir.join("nested")).unwrap();
    dir
}

#[test]
fn scan_filters_by_extension_recursively() {
    let dir = temp_dir("scan");
    std::fs::write(dir.join("b.TTF"), b"x").unwrap();
    std::fs::write(dir.join("a.otf"), b"x").unwrap();
    std::fs::write(dir.join("notes.txt"), b"x").unwrap();
    std::fs::write(dir.join("nested").join("c.ttf"), b"x").unwrap();

    let set = ResourceSet::scan(&[dir.clone()], None, &["ttf", "otf"]).unwrap();
    let names: Vec<_> = set.groups()[0]
        .iter()
        .map(|p| p.strip_prefix(&dir).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("a.otf"),
            PathBuf::from("b.TTF"),
            PathBuf::from("nested").join("c.ttf"),
        ]
    );
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_path_is_config_error() {
    let err = ResourceSet::scan(&[PathBuf::from("/definitely/not/here")], None, &["ttf"])
        .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn zero_weight_group_is_never_picked() {
    let set = ResourceSet::from_groups(
        vec!["a".into(), "b".into()],
        vec![vec!["a/1".into()], vec!["b/1".into(), "b/2".into()]],
        Some(&[0.0, 1.0]),
    )
    .unwrap();
    let mut rng = rng_from_seed(1);
    for _ in 0..32 {
        assert!(set.pick(&mut rng).unwrap().starts_with("b"));
    }
}

#[test]
fn empty_group_and_empty_set_are_config_errors() {
    let set = ResourceSet::from_groups(vec!["empty".into()], vec![vec![]], None).unwrap();
    assert!(matches!(
        set.pick(&mut rng_from_seed(0)),
        Err(SynthError::Config(_))
    ));
    let none = ResourceSet::from_groups(vec![], vec![], None).unwrap();
    assert!(matches!(
        none.pick(&mut rng_from_seed(0)),
        Err(SynthError::Config(_))
    ));
}

#[test]
fn mismatched_weights_are_rejected() {
    let err = ResourceSet::from_groups(
        vec!["a".into()],
        vec![vec!["a/1".into()]],
        Some(&[1.0, 2.0]),
    )
    .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}
