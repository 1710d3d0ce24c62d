use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern must compile"));

/// Lower-cased, hyphen-separated form of `title` with edge hyphens trimmed.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// `slugify(title)` plus a random base36 suffix, e.g. `intro-to-rust-k3j9x0a1b`.
pub fn generate_slug(title: &str) -> String {
    let mut base = slugify(title);
    if base.is_empty() {
        base.push_str("quiz");
    }

    format!("{}-{}", base, random_suffix())
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
