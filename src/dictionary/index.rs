//! Longest-prefix lookup over dictionary names.

use hashbrown::HashMap;
use std::cmp::Reverse;

/// A key that matched at the start of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'t, T> {
    pub value: T,
    /// Length of the matched key in characters
    pub key_chars: usize,
    /// Text after the match
    pub rest: &'t str,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    key: String,
    chars: usize,
    value: T,
}

/// Name index bucketed by first character.
///
/// Matching skips spaces in the text before and inside the key, so
/// `藤橋町 亥` matches the key `藤橋町亥`.
#[derive(Debug, Clone)]
pub struct PrefixIndex<T> {
    buckets: HashMap<char, Vec<Entry<T>>>,
}

impl<T: Copy + Ord> PrefixIndex<T> {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: &str, value: T) {
        let key: String = key.chars().filter(|c| *c != ' ').collect();
        let Some(first) = key.chars().next() else {
            return;
        };
        self.buckets.entry(first).or_default().push(Entry {
            chars: key.chars().count(),
            key,
            value,
        });
    }

    /// Sort buckets longest key first and drop duplicate entries.
    pub fn finish(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.sort_by(|a, b| {
                (Reverse(a.chars), &a.key, a.value).cmp(&(Reverse(b.chars), &b.key, b.value))
            });
            bucket.dedup_by(|a, b| a.key == b.key && a.value == b.value);
        }
    }

    /// Every entry whose key prefixes `text`, longest first.
    pub fn matches<'t>(&self, text: &'t str) -> Vec<PrefixMatch<'t, T>> {
        let trimmed = text.trim_start_matches(' ');
        let Some(first) = trimmed.chars().next() else {
            return Vec::new();
        };
        let Some(bucket) = self.buckets.get(&first) else {
            return Vec::new();
        };

        bucket
            .iter()
            .filter_map(|entry| {
                match_prefix(text, &entry.key).map(|end| PrefixMatch {
                    value: entry.value,
                    key_chars: entry.chars,
                    rest: &text[end..],
                })
            })
            .collect()
    }

    /// Entries tied for the longest match. Distinct values only.
    pub fn longest<'t>(&self, text: &'t str) -> Vec<PrefixMatch<'t, T>> {
        let mut all = self.matches(text);
        let Some(best) = all.first().map(|m| m.key_chars) else {
            return all;
        };
        all.retain(|m| m.key_chars == best);
        all.sort_by_key(|m| m.value);
        all.dedup_by_key(|m| m.value);
        all
    }
}

impl<T: Copy + Ord> Default for PrefixIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset in `text` right after `key`, ignoring spaces in `text`.
pub fn match_prefix(text: &str, key: &str) -> Option<usize> {
    let mut text_iter = text.char_indices().peekable();
    let mut end = 0;

    for k in key.chars() {
        while matches!(text_iter.peek(), Some((_, ' '))) {
            text_iter.next();
        }
        let (pos, c) = text_iter.next()?;
        if c != k {
            return None;
        }
        end = pos + c.len_utf8();
    }

    Some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_prefix_skips_spaces() {
        assert_eq!(match_prefix("藤橋町 亥 45-1", "藤橋町亥"), Some("藤橋町 亥".len()));
        assert_eq!(match_prefix(" 江東区", "江東区"), Some(" 江東区".len()));
        assert_eq!(match_prefix("江東", "江東区"), None);
        assert_eq!(match_prefix("港北区", "港区"), None);
    }

    #[test]
    fn test_longest_wins() {
        let mut index = PrefixIndex::new();
        index.insert("横浜市", 1u32);
        index.insert("横浜市港北区", 2u32);
        index.finish();

        let found = index.longest("横浜市港北区大豆戸町");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, 2);
        assert_eq!(found[0].rest, "大豆戸町");

        let all = index.matches("横浜市港北区大豆戸町");
        assert_eq!(all.iter().map(|m| m.value).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_ties_are_sorted_and_deduplicated() {
        let mut index = PrefixIndex::new();
        index.insert("府中市", 7u32);
        index.insert("府中市", 3u32);
        index.insert("府中市", 3u32);
        index.finish();

        let found = index.longest("府中市栗柄町");
        assert_eq!(found.iter().map(|m| m.value).collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn test_no_match() {
        let mut index = PrefixIndex::new();
        index.insert("東京都", 0u32);
        index.finish();
        assert!(index.longest("あいうえお").is_empty());
        assert!(index.longest("").is_empty());
    }
}
