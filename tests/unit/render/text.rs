use super::*;

/// 10 px per character, 20 px for `W`, so widths are monotone but uneven.
struct Mono;

impl TextMeasure for Mono {
    fn measure(&mut self, text: &str, _size_px: f32) -> f32 {
        text.chars().map(|c| if c == 'W' { 20.0 } else { 10.0 }).sum()
    }
}

#[test]
fn paragraphs_split_on_semicolons_and_newlines() {
    let lines = wrap_text(&mut Mono, "Optics; Lasers\n\n ;Quantum ", 16.0, 1000.0);
    assert_eq!(lines, vec!["Optics", "Lasers", "Quantum"]);
}

#[test]
fn long_paragraph_breaks_at_longest_fitting_prefix() {
    let lines = wrap_text(&mut Mono, "abcdefghij", 16.0, 40.0);
    assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
}

#[test]
fn whitespace_at_breaks_is_trimmed() {
    let lines = wrap_text(&mut Mono, "abc defg", 16.0, 40.0);
    assert_eq!(lines, vec!["abc", "defg"]);
}

#[test]
fn single_overflowing_character_is_emitted_alone() {
    let lines = wrap_text(&mut Mono, "WWa", 16.0, 15.0);
    assert_eq!(lines, vec!["W", "W", "a"]);
}

#[test]
fn every_line_fits_or_is_one_character() {
    let samples = [
        "The quick brown fox jumps over the lazy dog; WWWWWWWWW",
        "Ünïcödé text — with dashes; and\nnewlines",
        "a",
        "",
        ";;;",
        "W W W W W W",
    ];
    for width in [5.0f32, 10.0, 25.0, 47.0, 200.0] {
        for text in samples {
            let lines = wrap_text(&mut Mono, text, 16.0, width);
            for line in &lines {
                assert!(!line.is_empty());
                assert!(
                    Mono.measure(line, 16.0) <= width || line.chars().count() == 1,
                    "line {line:?} exceeds {width}"
                );
            }
            let joined: String = lines.concat().split_whitespace().collect();
            let expected: String = text
                .split([';', '\n'])
                .collect::<String>()
                .split_whitespace()
                .collect();
            assert_eq!(joined, expected, "wrapping lost characters of {text:?}");
        }
    }
}

#[test]
fn engine_without_font_uses_fixed_advance() {
    let mut engine = TextEngine::without_font();
    assert!(!engine.has_font());
    assert_eq!(engine.measure("abcd", 10.0), 4.0 * 10.0 * FALLBACK_ADVANCE_EM);
    assert!(engine.layout_line("abcd", 10.0, Rgba8::WHITE).is_none());
}

#[test]
fn unreadable_font_file_is_an_error() {
    assert!(TextEngine::from_font_file(Path::new("no/such/font.ttf")).is_err());
}

#[test]
fn configured_but_missing_font_falls_back_to_no_font() {
    let cfg = PosterConfig {
        font_path: Some(PathBuf::from("no/such/font.ttf")),
        ..PosterConfig::default()
    };
    assert!(!TextEngine::from_config(&cfg).has_font());
}
