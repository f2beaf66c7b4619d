//! Text distortion for anomaly entries.
//!
//! # Responsibility
//! - Corrupt entry text in the style of each anomaly kind.
//!
//! # Invariants
//! - Output depends only on the input text, the mode, and the RNG draws.
//! - Character surgery works on Unicode scalar values, never raw bytes.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Glyphs spliced into corrupted words.
pub const CORRUPTION_GLYPHS: [char; 13] = [
    '▇', '█', '▓', '▒', '░', '▀', '▄', '▌', '▐', '■', '□', '▪', '▫',
];

/// Phrases appended to echoes and inserted into rewritten history.
pub const OMINOUS_PHRASES: [&str; 8] = [
    "...the void watches...",
    "...time fractures...",
    "...reality bends...",
    "...echoes from nowhere...",
    "...this never happened...",
    "...or did it?...",
    "...the timeline splits...",
    "...causality breaks...",
];

/// Replacement endings for a forked multi-sentence entry.
pub const DIVERGENT_ENDINGS: [&str; 6] = [
    " But that's not what really happened.",
    " Or was it? The memory shifts.",
    " In another timeline, everything was different.",
    " The truth fractures here.",
    " Reality splits at this moment.",
    " This is where it all went wrong.",
];

/// Continuation appended when an entry has a single sentence to fork.
pub const BRANCH_CONTINUATION: &str = " ...but in this branch, something changed.";

const FUTURE_ECHO_CORRUPTION_CHANCE: f64 = 0.2;
const ALTER_PAST_CORRUPTION_CHANCE: f64 = 0.15;
const ALTER_PAST_MIN_TOKEN_CHARS: usize = 3;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("valid sentence regex"));

/// The three ways time can tear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionMode {
    FutureEcho,
    AlterPast,
    BranchTimeline,
}

impl DistortionMode {
    pub const ALL: [Self; 3] = [Self::FutureEcho, Self::AlterPast, Self::BranchTimeline];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FutureEcho => "future_echo",
            Self::AlterPast => "alter_past",
            Self::BranchTimeline => "branch_timeline",
        }
    }
}

impl Display for DistortionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown distortion mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistortionModeParseError(pub String);

impl Display for DistortionModeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown anomaly mode `{}`; expected future_echo|alter_past|branch_timeline",
            self.0
        )
    }
}

impl Error for DistortionModeParseError {}

impl FromStr for DistortionMode {
    type Err = DistortionModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "future_echo" => Ok(Self::FutureEcho),
            "alter_past" => Ok(Self::AlterPast),
            "branch_timeline" => Ok(Self::BranchTimeline),
            _ => Err(DistortionModeParseError(value.to_string())),
        }
    }
}

/// Produces a distorted copy of `text` for the given anomaly mode.
pub fn distort<R: Rng + ?Sized>(text: &str, mode: DistortionMode, rng: &mut R) -> String {
    match mode {
        DistortionMode::FutureEcho => echo_from_future(text, rng),
        DistortionMode::AlterPast => rewrite_past(text, rng),
        DistortionMode::BranchTimeline => fork_timeline(text, rng),
    }
}

fn echo_from_future<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut words = Vec::new();
    for token in tokens(text) {
        if rng.random_bool(FUTURE_ECHO_CORRUPTION_CHANCE) {
            words.push(corrupt_echo_token(token, rng));
        } else {
            words.push(token.to_string());
        }
    }
    let suffix = pick_phrase(&OMINOUS_PHRASES, rng);
    format!("{}\n\n{}", words.join(" "), suffix)
}

fn corrupt_echo_token<R: Rng + ?Sized>(token: &str, rng: &mut R) -> String {
    match rng.random_range(0..3u8) {
        0 => token.chars().rev().collect(),
        1 => {
            let glyph = pick_glyph(rng);
            std::iter::repeat(glyph).take(token.chars().count()).collect()
        }
        _ => {
            let glyph = pick_glyph(rng);
            splice_midpoint(token, glyph)
        }
    }
}

fn rewrite_past<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut words: Vec<&str> = tokens(text).collect();
    let phrase = pick_phrase(&OMINOUS_PHRASES, rng);
    words.insert(words.len() / 2, phrase);

    let mut rewritten = Vec::with_capacity(words.len());
    for word in words {
        // The draw happens for every token so the RNG stream does not depend
        // on token lengths.
        let roll = rng.random_bool(ALTER_PAST_CORRUPTION_CHANCE);
        if roll && word.chars().count() > ALTER_PAST_MIN_TOKEN_CHARS {
            let glyph = pick_glyph(rng);
            rewritten.push(splice_midpoint(word, glyph));
        } else {
            rewritten.push(word.to_string());
        }
    }
    rewritten.join(" ")
}

/// Keeps the first half of the sentences and swaps in a divergent ending.
///
/// Fragments are trimmed before rejoining with `". "`, so `"A. B. C. D."`
/// keeps `"A. B."` without doubled spaces.
fn fork_timeline<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let sentences: Vec<&str> = SENTENCE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect();

    if sentences.len() > 1 {
        let kept = &sentences[..sentences.len() / 2];
        let ending = pick_phrase(&DIVERGENT_ENDINGS, rng);
        return format!("{}.{}", kept.join(". "), ending);
    }

    format!("{text}{BRANCH_CONTINUATION}")
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    WHITESPACE_RE.split(text).filter(|token| !token.is_empty())
}

/// Replaces the middle character of `token` with `glyph`.
fn splice_midpoint(token: &str, glyph: char) -> String {
    let chars: Vec<char> = token.chars().collect();
    let mid = chars.len() / 2;
    let mut out = String::with_capacity(token.len() + glyph.len_utf8());
    out.extend(&chars[..mid]);
    out.push(glyph);
    if mid < chars.len() {
        out.extend(&chars[mid + 1..]);
    }
    out
}

fn pick_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    CORRUPTION_GLYPHS[rng.random_range(0..CORRUPTION_GLYPHS.len())]
}

fn pick_phrase<'a, R: Rng + ?Sized>(phrases: &[&'a str], rng: &mut R) -> &'a str {
    phrases[rng.random_range(0..phrases.len())]
}

#[cfg(test)]
mod tests {
    use super::{
        distort, splice_midpoint, DistortionMode, BRANCH_CONTINUATION, CORRUPTION_GLYPHS,
        DIVERGENT_ENDINGS, OMINOUS_PHRASES,
    };
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg64;

    #[test]
    fn splice_replaces_middle_scalar() {
        assert_eq!(splice_midpoint("abcde", '█'), "ab█de");
        assert_eq!(splice_midpoint("ab", '█'), "a█");
        assert_eq!(splice_midpoint("a", '█'), "█");
        assert_eq!(splice_midpoint("héllo", '▒'), "hé▒lo");
    }

    #[test]
    fn future_echo_ends_with_ominous_phrase() {
        let mut rng = Pcg64::seed_from_u64(11);
        let out = distort("the pages feel wrong tonight", DistortionMode::FutureEcho, &mut rng);
        let (body, suffix) = out.rsplit_once("\n\n").expect("echo has a suffix block");
        assert!(OMINOUS_PHRASES.iter().any(|phrase| *phrase == suffix));
        assert_eq!(body.split(' ').count(), 5);
    }

    #[test]
    fn future_echo_preserves_token_lengths() {
        let source = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        for seed in 0..32 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let out = distort(source, DistortionMode::FutureEcho, &mut rng);
            let body = out.rsplit_once("\n\n").unwrap().0;
            for (original, echoed) in source.split(' ').zip(body.split(' ')) {
                assert_eq!(original.chars().count(), echoed.chars().count());
            }
        }
    }

    /// Draws the top of every range, so no corruption roll ever succeeds.
    struct TopRng;

    impl RngCore for TopRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(u8::MAX);
        }
    }

    fn assert_phrase_spliced(out: &str, head: &str, tail: &str) {
        assert!(
            OMINOUS_PHRASES
                .iter()
                .any(|phrase| out == format!("{head}{phrase}{tail}")),
            "unexpected rewrite: {out}"
        );
    }

    #[test]
    fn alter_past_inserts_phrase_at_midpoint() {
        let out = distort("one two three four", DistortionMode::AlterPast, &mut TopRng);
        assert_phrase_spliced(&out, "one two ", " three four");
    }

    #[test]
    fn alter_past_midpoint_rounds_down_for_odd_counts() {
        let out = distort("one two three", DistortionMode::AlterPast, &mut TopRng);
        assert_phrase_spliced(&out, "one ", " two three");

        let single = distort("alone", DistortionMode::AlterPast, &mut TopRng);
        assert_phrase_spliced(&single, "", " alone");
    }

    #[test]
    fn alter_past_leaves_short_tokens_alone() {
        for seed in 0..64 {
            let mut rng = Pcg64::seed_from_u64(seed);
            let out = distort("a an the", DistortionMode::AlterPast, &mut rng);
            assert!(out.starts_with("a "));
            assert!(out.ends_with(" an the"));
        }
    }

    #[test]
    fn branch_keeps_first_half_and_appends_ending() {
        let mut rng = Pcg64::seed_from_u64(9);
        let out = distort(
            "I opened the door. The hall was empty! Was it? Nobody answered.",
            DistortionMode::BranchTimeline,
            &mut rng,
        );
        let prefix = "I opened the door. The hall was empty.";
        assert!(out.starts_with(prefix), "unexpected branch text: {out}");
        let ending = &out[prefix.len()..];
        assert!(DIVERGENT_ENDINGS.iter().any(|candidate| *candidate == ending));
    }

    #[test]
    fn branch_single_sentence_appends_continuation() {
        let mut rng = Pcg64::seed_from_u64(2);
        let source = "Just one thought without a stop";
        let out = distort(source, DistortionMode::BranchTimeline, &mut rng);
        assert_eq!(out, format!("{source}{BRANCH_CONTINUATION}"));

        let empty = distort("", DistortionMode::BranchTimeline, &mut rng);
        assert_eq!(empty, BRANCH_CONTINUATION);
    }

    #[test]
    fn same_seed_same_output() {
        let source = "The dates don't make sense. Some entries are from tomorrow.";
        for mode in DistortionMode::ALL {
            let mut a = Pcg64::seed_from_u64(42);
            let mut b = Pcg64::seed_from_u64(42);
            assert_eq!(distort(source, mode, &mut a), distort(source, mode, &mut b));
        }
    }

    #[test]
    fn mode_parsing_is_closed() {
        for mode in DistortionMode::ALL {
            assert_eq!(mode.as_str().parse::<DistortionMode>().unwrap(), mode);
        }
        let err = "rewind".parse::<DistortionMode>().unwrap_err();
        assert!(err.to_string().contains("rewind"));
        assert!(CORRUPTION_GLYPHS.len() > 1);
    }
}
