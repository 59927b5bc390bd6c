use super::*;
use crate::foundation::random::rng_from_seed;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "synthtiger_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([x as u8 * 10, y as u8 * 10, 7, 255]));
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

#[test]
fn missing_path_is_config_error() {
    let err = Texture::new(TextureConfig {
        paths: vec![PathBuf::from("/definitely/not/here")],
        ..TextureConfig::default()
    })
    .unwrap_err();
    assert!(matches!(err, SynthError::Config(_)));
}

#[test]
fn empty_config_fails_at_sample() {
    let t = Texture::new(TextureConfig::default()).unwrap();
    let mut rng = rng_from_seed(1);
    assert!(t.sample(&mut rng, TexturePartial::default()).is_err());
}

#[test]
fn directory_scan_and_crop_bounds() {
    let dir = temp_dir("texture_crop");
    std::fs::create_dir_all(&dir).unwrap();
    write_png(&dir, "a.png", 8, 6);
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let t = Texture::new(TextureConfig {
        paths: vec![dir.clone()],
        crop: 1.0,
        ..TextureConfig::default()
    })
    .unwrap();
    let mut rng = rng_from_seed(4);
    for _ in 0..20 {
        let m = t.sample(&mut rng, TexturePartial::default()).unwrap();
        assert!(m.path.ends_with("a.png"));
        assert!(m.crop);
        assert!(m.w >= 1 && m.x + m.w <= 8);
        assert!(m.h >= 1 && m.y + m.h <= 6);
        match t.data(&m).unwrap() {
            ComponentData::Texture(r) => assert_eq!(r.dimensions(), (m.w, m.h)),
            other => panic!("unexpected {other:?}"),
        }
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn apply_keeps_layer_alpha_and_fades() {
    let dir = temp_dir("texture_apply");
    std::fs::create_dir_all(&dir).unwrap();
    let path = write_png(&dir, "t.png", 4, 4);
    let t = Texture::new(TextureConfig {
        paths: vec![path.clone()],
        ..TextureConfig::default()
    })
    .unwrap();
    let meta = TextureMeta {
        path,
        alpha: 0.5,
        grayscale: false,
        crop: false,
        x: 0,
        y: 0,
        w: 4,
        h: 4,
    };
    let mut image = Raster::new(4, 4);
    image.put_pixel(1, 1, image::Rgba([255.0, 255.0, 255.0, 200.0]));
    let mut layers = vec![Layer::new(image)];
    t.apply_meta(&mut layers, &meta).unwrap();
    let out = layers[0].image();
    assert_eq!(out.get_pixel(1, 1).0[3], 200.0);
    assert_eq!(out.get_pixel(0, 0).0[3], 0.0);
    assert!(out.get_pixel(1, 1).0[2] < 255.0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversized_crop_is_rejected() {
    let dir = temp_dir("texture_oversize");
    std::fs::create_dir_all(&dir).unwrap();
    let path = write_png(&dir, "t.png", 2, 2);
    let t = Texture::new(TextureConfig {
        paths: vec![path.clone()],
        ..TextureConfig::default()
    })
    .unwrap();
    let meta = TextureMeta {
        path,
        alpha: 1.0,
        grayscale: true,
        crop: true,
        x: 1,
        y: 0,
        w: 2,
        h: 2,
    };
    assert!(t.load(&meta).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
