use code_splash::text_sampler::{
    bounded_line_prefix, bounded_prefix, compact, random_line_window, random_lines,
    random_substring, Indent,
};
use fastrand::Rng;

const FIVE_LINES: &str = "a\nb\nc\nd\ne";

#[test]
fn compact_collapses_every_whitespace_run() {
    let raw = "fn  main()\t{\n\n    println!(\"hi\");\r\n}\n";
    let out = compact(raw);
    assert_eq!(out, "fn main() { println!(\"hi\"); } ");
    assert!(!out.contains("  "), "double space survived: {out:?}");
}

#[test]
fn compact_is_idempotent() {
    let samples = [
        "",
        "   ",
        "a\tb\nc",
        "  leading and trailing  ",
        "unicode\u{00A0}\u{2003}spaces",
        "x\n\n\n\ny",
    ];
    for s in samples {
        let once = compact(s);
        assert_eq!(compact(&once), once, "compact not idempotent for {s:?}");
        assert!(!once.contains("  "), "double space in {once:?}");
    }
}

#[test]
fn line_window_returns_three_contiguous_lines() {
    let all: Vec<&str> = FIVE_LINES.lines().collect();
    for seed in 0..200u64 {
        let mut rng = Rng::with_seed(seed);
        for indent in [Indent::Trimmed, Indent::Relative] {
            let out = random_line_window(FIVE_LINES, 3, indent, &mut rng);
            let picked: Vec<&str> = out.lines().collect();
            assert_eq!(picked.len(), 3, "seed {seed}: {out:?}");
            let start = all
                .iter()
                .position(|l| *l == picked[0])
                .expect("first line comes from the input");
            assert_eq!(&all[start..start + 3], picked.as_slice(), "seed {seed}");
        }
    }
}

#[test]
fn line_window_covers_every_start_position() {
    let mut rng = Rng::with_seed(7);
    let mut starts = [false; 3];
    for _ in 0..300 {
        let out = random_line_window(FIVE_LINES, 3, Indent::Trimmed, &mut rng);
        let first = out.lines().next().unwrap_or_default();
        let idx = (first.as_bytes()[0] - b'a') as usize;
        starts[idx] = true;
    }
    assert_eq!(starts, [true; 3]);
}

#[test]
fn line_window_skips_blank_lines_and_returns_all_when_short() {
    let mut rng = Rng::with_seed(1);
    let text = "\n  one\n\n\t\n  two\n";
    assert_eq!(random_line_window(text, 10, Indent::Trimmed, &mut rng), "one\ntwo");
}

#[test]
fn relative_indent_keeps_nesting() {
    let mut rng = Rng::with_seed(3);
    let text = "    if x {\n        y();\n    }\n";
    let out = random_line_window(text, 10, Indent::Relative, &mut rng);
    assert_eq!(out, "if x {\n    y();\n}");
}

#[test]
fn random_lines_trims_each_line() {
    let mut rng = Rng::with_seed(11);
    let text = "  alpha  \n\tbeta\n\n gamma\n";
    let lines = random_lines(text, 5, &mut rng);
    assert_eq!(lines, vec!["alpha", "beta", "gamma"]);

    let lines = random_lines(text, 2, &mut rng);
    assert_eq!(lines.len(), 2);
    assert!(lines == ["alpha", "beta"] || lines == ["beta", "gamma"], "{lines:?}");
}

#[test]
fn empty_and_blank_text_sample_to_nothing() {
    let mut rng = Rng::with_seed(5);
    assert_eq!(random_line_window("", 3, Indent::Trimmed, &mut rng), "");
    assert_eq!(random_line_window(" \n\t\n", 3, Indent::Relative, &mut rng), "");
    assert!(random_lines("\n\n", 3, &mut rng).is_empty());
    assert_eq!(compact("   \n\t"), " ");
}

#[test]
fn random_substring_is_a_contiguous_window() {
    let text = "abcdefghij";
    for seed in 0..50u64 {
        let mut rng = Rng::with_seed(seed);
        let sub = random_substring(text, 4, &mut rng);
        assert_eq!(sub.chars().count(), 4);
        assert!(text.contains(&sub), "{sub:?} is not a window of {text:?}");
    }
    let mut rng = Rng::with_seed(0);
    assert_eq!(random_substring("abc", 10, &mut rng), "abc");
}

#[test]
fn bounded_prefixes_cap_chars_and_lines() {
    assert_eq!(bounded_prefix("abcdef", 3), "abc");
    assert_eq!(bounded_prefix("日本語テキスト", 3), "日本語");
    assert_eq!(bounded_line_prefix("1\n2\n3\n4", 2), "1\n2");
    assert_eq!(bounded_line_prefix("1", 5), "1");
}
