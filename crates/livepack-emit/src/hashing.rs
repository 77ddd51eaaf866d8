//! Content-hash placeholders for filenames (§4.4).
//!
//! Filenames may embed `[hash]`, an 8-char Base32 encoding of a SHA-1
//! digest. When two outputs depend on each other, each one's source
//! contains a placeholder for the other's not-yet-known filename hash; the
//! placeholders are spliced in once every output in the cycle has produced
//! its own content hash.

use data_encoding::BASE32_NOPAD;
use livepack_common::limits::{HASH_LENGTH, PLACEHOLDER_CHAR, PLACEHOLDER_PAD_LEN};
use livepack_common::OutputId;
use sha1::{Digest, Sha1};

/// `PPPPPPPnnn`: seven pad characters followed by the depended-output's
/// serial index, rendered decimal, left-padded with more pad characters to
/// `HASH_LENGTH` total width.
#[must_use]
pub fn placeholder_token(depended_output: OutputId) -> String {
    let index = depended_output.0.to_string();
    assert!(index.len() <= HASH_LENGTH, "output index too large to fit in a placeholder token");
    let pad = PLACEHOLDER_CHAR.to_string().repeat(HASH_LENGTH - index.len());
    format!("{pad}{index}")
}

/// The uniform placeholder used when normalizing content before hashing
/// (step 2 of the protocol): every real or index-bearing placeholder token
/// collapses to this, so two outputs whose only difference is which
/// filename hash they'll eventually contain still hash identically.
#[must_use]
pub fn uniform_placeholder() -> String {
    PLACEHOLDER_CHAR.to_string().repeat(HASH_LENGTH)
}

/// One occurrence of a placeholder token inside an output's source, and
/// which other output it stands in for.
#[derive(Clone, Copy, Debug)]
pub struct PlaceholderSite {
    pub byte_offset: usize,
    pub depended_output: OutputId,
}

/// Scans `source` for every `PLACEHOLDER_PAD_LEN`-pad-char-then-digits
/// token and records its position. Called once per output, right after its
/// first (placeholder-bearing) emission.
#[must_use]
pub fn find_placeholder_sites(source: &str, dependencies: &[OutputId]) -> Vec<PlaceholderSite> {
    let mut sites = Vec::new();
    for &dep in dependencies {
        let token = placeholder_token(dep);
        let mut search_from = 0;
        while let Some(pos) = source[search_from..].find(token.as_str()) {
            let byte_offset = search_from + pos;
            sites.push(PlaceholderSite { byte_offset, depended_output: dep });
            search_from = byte_offset + token.len();
        }
    }
    sites
}

/// Step 2: hash content with every placeholder normalized to
/// `uniform_placeholder()`, so the content hash is stable regardless of
/// which output indices happen to be involved.
#[must_use]
pub fn content_hash(source: &str, sites: &[PlaceholderSite]) -> String {
    let normalized = normalize_placeholders(source, sites);
    base32_sha1(normalized.as_bytes())
}

fn normalize_placeholders(source: &str, sites: &[PlaceholderSite]) -> String {
    let uniform = uniform_placeholder();
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    let mut ordered = sites.to_vec();
    ordered.sort_by_key(|s| s.byte_offset);
    for site in &ordered {
        out.push_str(&source[cursor..site.byte_offset]);
        out.push_str(&uniform);
        cursor = site.byte_offset + HASH_LENGTH;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Step 3: an output's final filename hash once every output in its cycle
/// has a content hash: `hash(contentHash_self ++ contentHash_others)`,
/// others taken in ascending `OutputId` order for determinism.
#[must_use]
pub fn final_filename_hash(own_content_hash: &str, other_content_hashes: &[(OutputId, String)]) -> String {
    let mut ordered: Vec<&(OutputId, String)> = other_content_hashes.iter().collect();
    ordered.sort_by_key(|(id, _)| id.0);
    let mut joined = own_content_hash.to_string();
    for (_, hash) in ordered {
        joined.push_str(hash);
    }
    base32_sha1(joined.as_bytes())
}

/// Step 4: replace every recorded placeholder occurrence with the final
/// hash, truncated/padded to `HASH_LENGTH`.
#[must_use]
pub fn splice_placeholders(source: &str, sites: &[PlaceholderSite], final_hashes: &rustc_hash::FxHashMap<OutputId, String>) -> String {
    let mut ordered = sites.to_vec();
    ordered.sort_by_key(|s| s.byte_offset);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for site in &ordered {
        out.push_str(&source[cursor..site.byte_offset]);
        let hash = final_hashes.get(&site.depended_output).map(String::as_str).unwrap_or_else(|| {
            debug_assert!(false, "missing final hash for dependency during placeholder splice");
            ""
        });
        out.push_str(hash);
        cursor = site.byte_offset + HASH_LENGTH;
    }
    out.push_str(&source[cursor..]);
    out
}

fn base32_sha1(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let encoded = BASE32_NOPAD.encode(&digest);
    encoded[..HASH_LENGTH].to_ascii_lowercase()
}

/// A literal in the serialized source that happens to collide with the
/// placeholder pattern (`PLACEHOLDER_CHAR` repeated `HASH_LENGTH` times,
/// optionally with trailing digits replacing some pad characters) must be
/// rejected before hashing begins, per the `PlaceholderEscape` error kind.
#[must_use]
pub fn literal_collides_with_placeholder_pattern(literal: &str) -> bool {
    if literal.len() < HASH_LENGTH {
        return false;
    }
    literal.as_bytes().windows(HASH_LENGTH).any(|window| {
        let pad_run = window.iter().take_while(|&&b| b == PLACEHOLDER_CHAR as u8).count();
        pad_run >= PLACEHOLDER_PAD_LEN && window[pad_run..].iter().all(u8::is_ascii_digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_token_pads_to_hash_length() {
        let token = placeholder_token(OutputId(3));
        assert_eq!(token.len(), HASH_LENGTH);
        assert!(token.ends_with('3'));
    }

    #[test]
    fn find_and_normalize_roundtrip() {
        let dep = OutputId(2);
        let token = placeholder_token(dep);
        let source = format!("require(\"./{token}.js\");");
        let sites = find_placeholder_sites(&source, &[dep]);
        assert_eq!(sites.len(), 1);
        let normalized = normalize_placeholders(&source, &sites);
        assert!(normalized.contains(&uniform_placeholder()));
    }

    #[test]
    fn splice_replaces_every_site_with_final_hash() {
        let dep = OutputId(1);
        let token = placeholder_token(dep);
        let source = format!("a{token}b{token}c");
        let sites = find_placeholder_sites(&source, &[dep]);
        let mut finals = rustc_hash::FxHashMap::default();
        finals.insert(dep, "deadbeef".to_string());
        let spliced = splice_placeholders(&source, &sites, &finals);
        assert_eq!(spliced, "adeadbeefbdeadbeefc");
    }

    #[test]
    fn content_hash_is_stable_regardless_of_output_index() {
        let dep_a = OutputId(1);
        let dep_b = OutputId(9);
        let source_a = format!("x{}y", placeholder_token(dep_a));
        let source_b = format!("x{}y", placeholder_token(dep_b));
        let hash_a = content_hash(&source_a, &find_placeholder_sites(&source_a, &[dep_a]));
        let hash_b = content_hash(&source_b, &find_placeholder_sites(&source_b, &[dep_b]));
        assert_eq!(hash_a, hash_b);
    }

    #[test]
    fn literal_matching_pattern_is_detected() {
        assert!(literal_collides_with_placeholder_pattern("PPPPPPP123"));
        assert!(!literal_collides_with_placeholder_pattern("hello world"));
    }
}
