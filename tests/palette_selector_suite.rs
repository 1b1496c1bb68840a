use code_splash::motion::EffectStyle;
use code_splash::palette::{ColorPalette, GradientPair, Rgb, MIN_COLORS};
use code_splash::selector::EffectSelector;
use fastrand::Rng;

#[test]
fn default_palette_has_at_least_eight_colors() {
    let palette = ColorPalette::default();
    assert!(palette.len() >= 8, "palette too small: {}", palette.len());
}

#[test]
fn gradient_endpoints_are_exact() {
    let palette = ColorPalette::default();
    for i in 0..palette.len() {
        for j in 0..palette.len() {
            if i == j {
                continue;
            }
            let pair = GradientPair { start: i, end: j };
            assert_eq!(Some(palette.gradient(0.0, pair)), palette.color(i));
            assert_eq!(Some(palette.gradient(1.0, pair)), palette.color(j));
        }
    }
}

#[test]
fn gradient_clamps_out_of_range_ratios() {
    let palette = ColorPalette::default();
    let pair = GradientPair { start: 2, end: 4 };
    assert_eq!(palette.gradient(-3.0, pair), palette.gradient(0.0, pair));
    assert_eq!(palette.gradient(7.5, pair), palette.gradient(1.0, pair));
    assert_eq!(palette.gradient(f32::NAN, pair), palette.gradient(0.0, pair));
}

#[test]
fn gradient_is_monotonic_per_channel() {
    let palette = ColorPalette::default();
    let pair = GradientPair { start: 0, end: 3 };
    let a = palette.gradient(0.0, pair);
    let b = palette.gradient(1.0, pair);
    let dir = |x: f32, y: f32| (y - x).signum();

    let mut prev = a;
    for step in 1..=100 {
        let c = palette.gradient(step as f32 / 100.0, pair);
        for (p, n, d) in [
            (prev.r, c.r, dir(a.r, b.r)),
            (prev.g, c.g, dir(a.g, b.g)),
            (prev.b, c.b, dir(a.b, b.b)),
        ] {
            assert!((n - p) * d >= -1e-6, "channel moved backwards at step {step}");
        }
        prev = c;
    }
}

#[test]
fn random_pair_is_distinct_and_in_range() {
    let palette = ColorPalette::default();
    let mut rng = Rng::with_seed(42);
    for _ in 0..5_000 {
        let pair = palette.random_pair(&mut rng);
        assert_ne!(pair.start, pair.end);
        assert!(pair.start < palette.len() && pair.end < palette.len());
    }
}

#[test]
fn custom_palettes_need_eight_colors() {
    let grey = |i: usize| Rgb::new(i as f32 / 10.0, i as f32 / 10.0, i as f32 / 10.0);
    let eight: Vec<Rgb> = (0..MIN_COLORS).map(grey).collect();
    let palette = ColorPalette::with_colors(eight).expect("eight colours are enough");
    assert_eq!(palette.len(), 8);
    let mut rng = Rng::with_seed(9);
    for _ in 0..200 {
        let pair = palette.random_pair(&mut rng);
        assert_ne!(pair.start, pair.end);
        assert!(pair.start < 8 && pair.end < 8);
    }

    for short in [0, 1, 2, MIN_COLORS - 1] {
        let colors: Vec<Rgb> = (0..short).map(grey).collect();
        assert!(ColorPalette::with_colors(colors).is_none(), "{short} colours accepted");
    }
}

#[test]
fn random_color_comes_from_the_palette() {
    let palette = ColorPalette::default();
    let mut rng = Rng::with_seed(3);
    for _ in 0..200 {
        let c = palette.random_color(&mut rng);
        assert!((0..palette.len()).any(|i| palette.color(i) == Some(c)));
    }
}

#[test]
fn selector_never_repeats_a_style_three_times() {
    for seed in 0..20u64 {
        let mut rng = Rng::with_seed(seed);
        let mut selector = EffectSelector::default();
        let picks: Vec<EffectStyle> = (0..2_000).map(|_| selector.next_effect(&mut rng)).collect();
        for w in picks.windows(3) {
            assert!(
                !(w[0] == w[1] && w[1] == w[2]),
                "seed {seed}: three consecutive {:?}",
                w[0]
            );
        }
    }
}

#[test]
fn selector_with_two_styles_alternates_after_a_pair() {
    let mut rng = Rng::with_seed(5);
    let mut selector =
        EffectSelector::with_styles(vec![EffectStyle::Scroll, EffectStyle::Orbit]).expect("styles");
    let picks: Vec<EffectStyle> = (0..500).map(|_| selector.next_effect(&mut rng)).collect();
    for w in picks.windows(3) {
        assert!(!(w[0] == w[1] && w[1] == w[2]));
    }
    assert!(picks.iter().any(|s| *s == EffectStyle::Scroll));
    assert!(picks.iter().any(|s| *s == EffectStyle::Orbit));
}

#[test]
fn selector_tracks_streaks() {
    let mut rng = Rng::with_seed(8);
    let mut selector = EffectSelector::default();
    let mut prev = None;
    let mut streak = 0;
    for _ in 0..300 {
        let style = selector.next_effect(&mut rng);
        streak = if Some(style) == prev { streak + 1 } else { 1 };
        prev = Some(style);
        assert_eq!(selector.last(), Some(style));
        assert_eq!(selector.consecutive(), streak);
        assert!(streak <= 2);
    }
}

#[test]
fn selector_reaches_every_style() {
    let mut rng = Rng::with_seed(77);
    let mut selector = EffectSelector::default();
    let mut seen = [0usize; 5];
    for _ in 0..1_000 {
        seen[selector.next_effect(&mut rng).index()] += 1;
    }
    for (i, n) in seen.iter().enumerate() {
        assert!(*n > 100, "style {i} picked only {n} times");
    }
}

#[test]
fn empty_selector_is_rejected() {
    assert!(EffectSelector::with_styles(Vec::new()).is_none());
}

#[test]
fn style_labels_round_trip() {
    for style in EffectStyle::all() {
        assert_eq!(EffectStyle::from_label(style.label()), Some(style));
    }
    assert_eq!(EffectStyle::from_label("popout"), Some(EffectStyle::PopOut));
    assert_eq!(EffectStyle::from_label("fireworks"), None);
}
