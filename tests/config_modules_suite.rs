use clap::Parser;

use depth_gallery::config::{Config, RendererMode};
use depth_gallery::gallery::{collect_items, ImageItem, ImageLibrary, Texture};
use depth_gallery::motion::{EnvelopePreset, Falloff, GalleryOptions, Window};
use depth_gallery::profile::{GalleryProfile, ProfileError};

fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "depth_gallery_{tag}_{}_{}",
        std::process::id(),
        fastrand::u64(..)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ── CLI config ──────────────────────────────────────────────────────────────

#[test]
fn config_defaults_match_gallery_defaults() {
    let cfg = Config::try_parse_from(["depth-gallery", "a.png"]).unwrap();
    assert_eq!(cfg.images, vec!["a.png".to_string()]);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.compact_below, 80);
    assert!(cfg.auto_detect);
    assert!(!cfg.force_static);
    let none = GalleryProfile::default();
    assert_eq!(cfg.gallery_options(&none), GalleryOptions::default());
    assert_eq!(cfg.preset(&none), EnvelopePreset::Tight);
}

#[test]
fn config_flags_flow_into_options() {
    let cfg = Config::try_parse_from([
        "depth-gallery",
        "--speed",
        "2.5",
        "--z-spacing",
        "6",
        "--visible-count",
        "12",
        "--falloff-near",
        "1",
        "--preset",
        "wide",
        "--renderer",
        "hb",
        "--static",
        "x.png",
        "y.png",
    ])
    .unwrap();
    assert!(cfg.force_static);
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    let opts = cfg.gallery_options(&GalleryProfile::default());
    assert_eq!(opts.speed, 2.5);
    assert_eq!(opts.z_spacing, Some(6.0));
    assert_eq!(opts.visible_count, 12);
    assert_eq!(opts.fade, EnvelopePreset::Wide.fade());
    let falloff = opts.falloff.unwrap();
    assert_eq!(falloff.near, 1.0);
    assert!(falloff.far.is_infinite());
}

#[test]
fn explicit_flags_win_over_profile_keys() {
    let text = "speed=0.5\nz_spacing=6\npreset=wide\nfalloff=1,5";
    let profile = GalleryProfile::parse(text).unwrap();

    let cfg = Config::try_parse_from(["depth-gallery"]).unwrap();
    let opts = cfg.gallery_options(&profile);
    assert_eq!(opts.speed, 0.5);
    assert_eq!(opts.z_spacing, Some(6.0));
    assert_eq!(opts.fade, EnvelopePreset::Wide.fade());
    assert_eq!(opts.falloff, Some(Falloff { near: 1.0, far: 5.0 }));
    assert_eq!(cfg.preset(&profile), EnvelopePreset::Wide);

    let cfg = Config::try_parse_from([
        "depth-gallery",
        "--speed",
        "2",
        "--preset",
        "tight",
        "--falloff-far",
        "9",
    ])
    .unwrap();
    let opts = cfg.gallery_options(&profile);
    assert_eq!(opts.speed, 2.0);
    assert_eq!(opts.z_spacing, Some(6.0), "unset flag keeps the profile value");
    assert_eq!(opts.fade, EnvelopePreset::Tight.fade());
    assert_eq!(opts.blur, EnvelopePreset::Tight.blur());
    assert_eq!(opts.falloff, Some(Falloff { near: 0.0, far: 9.0 }));
    assert_eq!(cfg.preset(&profile), EnvelopePreset::Tight);
}

#[test]
fn config_rejects_unknown_preset() {
    assert!(Config::try_parse_from(["depth-gallery", "--preset", "medium"]).is_err());
}

// ── Profiles ────────────────────────────────────────────────────────────────

#[test]
fn profile_parses_known_keys_and_skips_comments() {
    let text = "
        # depth_gallery profile v1
        preset = wide
        speed=0.5
        visible_count=6
        falloff=2,10
        fade_out=0.7,0.8
        max_blur=5
        future_key=whatever
    ";
    let profile = GalleryProfile::parse(text).unwrap();
    assert_eq!(profile.preset, Some(EnvelopePreset::Wide));
    assert_eq!(profile.speed, Some(0.5));
    assert_eq!(profile.visible_count, Some(6));
    assert_eq!(profile.falloff, Some(Falloff { near: 2.0, far: 10.0 }));
    assert_eq!(profile.fade_out, Some(Window::new(0.7, 0.8)));
    assert_eq!(profile.max_blur, Some(5.0));
    assert_eq!(profile.z_spacing, None);
}

#[test]
fn profile_reports_line_of_bad_value() {
    let err = GalleryProfile::parse("speed=1\nfade_in=0.1\n").unwrap_err();
    assert!(matches!(err, ProfileError::Parse { line: 2, .. }), "{err}");

    let err = GalleryProfile::parse("speed=fast").unwrap_err();
    assert!(err.to_string().contains("line 1"));

    let err = GalleryProfile::parse("no equals sign").unwrap_err();
    assert!(matches!(err, ProfileError::Parse { line: 1, .. }));

    assert!(GalleryProfile::parse("speed=NaN").is_err());
    assert!(GalleryProfile::parse("preset=medium").is_err());
}

#[test]
fn profile_apply_overrides_only_present_keys() {
    let mut opts = GalleryOptions::default();
    opts.speed = 3.0;
    let profile = GalleryProfile::parse("preset=wide\nblur_out=0.5,0.6").unwrap();
    profile.apply(&mut opts);

    assert_eq!(opts.speed, 3.0);
    assert_eq!(opts.fade, EnvelopePreset::Wide.fade());
    assert_eq!(opts.blur.blur_in, EnvelopePreset::Wide.blur().blur_in);
    assert_eq!(opts.blur.blur_out, Window::new(0.5, 0.6));
    assert_eq!(opts.blur.max_blur, EnvelopePreset::Wide.blur().max_blur);
}

#[test]
fn profile_capture_round_trips_through_text() {
    let mut opts = GalleryOptions::with_preset(EnvelopePreset::Wide);
    opts.speed = 1.25;
    opts.visible_count = 10;
    opts.falloff = Some(Falloff { near: 1.5, far: 9.0 });

    let text = GalleryProfile::capture(&opts).to_text();
    assert!(text.starts_with("# depth_gallery profile v1\n"));

    let mut restored = GalleryOptions::default();
    GalleryProfile::parse(&text).unwrap().apply(&mut restored);
    assert_eq!(restored, opts);
}

#[test]
fn profile_capture_drops_unbounded_falloff() {
    let mut opts = GalleryOptions::default();
    opts.falloff = Some(Falloff { near: 2.0, far: f32::INFINITY });
    let profile = GalleryProfile::capture(&opts);
    assert_eq!(profile.falloff, None);
    assert!(GalleryProfile::parse(&profile.to_text()).is_ok());
}

#[test]
fn profile_save_and_load_from_disk() {
    let dir = scratch_dir("profile");
    let path = dir.join("nested").join("profile.txt");

    let profile = GalleryProfile::parse("speed=0.75\nz_spacing=3").unwrap();
    profile.save(&path).unwrap();
    assert!(!path.with_extension("tmp").exists());
    assert_eq!(GalleryProfile::load(Some(&path)).unwrap(), profile);

    assert_eq!(
        GalleryProfile::load(Some(&dir.join("missing.txt"))).unwrap(),
        GalleryProfile::default()
    );
    assert_eq!(GalleryProfile::load(None).unwrap(), GalleryProfile::default());

    std::fs::remove_dir_all(&dir).ok();
}

// ── Gallery items ───────────────────────────────────────────────────────────

#[test]
fn image_items_parse_labels() {
    let item = ImageItem::parse("photos/sea.jpg | Sea at dusk");
    assert_eq!(item.src, "photos/sea.jpg");
    assert_eq!(item.alt, "Sea at dusk");
    assert_eq!(item.display_name(), "Sea at dusk");

    let item = ImageItem::parse("photos/sea.jpg");
    assert_eq!(item.alt, "");
    assert_eq!(item.display_name(), "sea.jpg");
}

#[test]
fn directories_expand_to_sorted_image_files() {
    let dir = scratch_dir("items");
    for name in ["b.png", "a.JPG", "notes.txt", "c.webp"] {
        std::fs::write(dir.join(name), b"").unwrap();
    }
    let args = vec![dir.to_string_lossy().to_string(), "extra.gif|Extra".to_string()];
    let items = collect_items(&args).unwrap();
    let names = items.iter().map(|i| i.display_name().to_string()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a.JPG", "b.png", "c.webp", "Extra"]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn short_texture_buffers_are_replaced_and_never_read_out_of_bounds() {
    let short = Texture {
        width: 4,
        height: 4,
        rgba: vec![255; 10],
        placeholder: false,
    };
    assert!(!short.is_valid());
    assert_eq!(short.sample(1.0, 1.0), [0, 0, 0, 0]);
    assert_eq!(short.sample(0.0, 0.0), [255, 255, 255, 255]);

    let library = ImageLibrary::from_parts(
        vec![ImageItem::new("a.png"), ImageItem::new("b.png")],
        vec![short],
    );
    assert_eq!(library.len(), 2);
    assert_eq!(library.placeholder_count(), 2);
    for i in 0..2 {
        let tex = library.texture(i).unwrap();
        assert!(tex.is_valid());
        tex.sample(0.99, 0.99);
    }
}

#[test]
fn undecodable_images_become_placeholders() {
    let dir = scratch_dir("decode");
    let bogus = dir.join("broken.png");
    std::fs::write(&bogus, b"not a png").unwrap();

    let items = vec![
        ImageItem::new(bogus.to_string_lossy()),
        ImageItem::new(dir.join("absent.png").to_string_lossy()),
    ];
    let library = ImageLibrary::load(items);
    assert_eq!(library.len(), 2);
    assert_eq!(library.placeholder_count(), 2);
    let tex = library.texture(0).unwrap();
    assert!(tex.width > 0 && tex.height > 0);
    assert_eq!(tex.rgba.len(), tex.width * tex.height * 4);
    std::fs::remove_dir_all(&dir).ok();
}
