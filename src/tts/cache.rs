//! Cache of synthesized clips keyed by exact source text
//!
//! No eviction: entries live until [`AudioCache::clear`].

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Encoded audio ready for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Arc<[u8]>,
    pub mime: &'static str,
}

impl AudioClip {
    pub fn mp3(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: "audio/mpeg",
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AudioCache {
    clips: HashMap<String, AudioClip>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&AudioClip> {
        self.clips.get(text)
    }

    pub fn insert(&mut self, text: &str, clip: AudioClip) {
        debug!("Caching {} byte clip for '{}'", clip.len(), text);
        self.clips.insert(text.to_string(), clip);
    }

    pub fn contains(&self, text: &str) -> bool {
        self.clips.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Drop every clip and return how many were released
    pub fn clear(&mut self) -> usize {
        let released = self.clips.len();
        self.clips.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_exact_text() {
        let mut cache = AudioCache::new();
        cache.insert("Hello", AudioClip::mp3(vec![1, 2, 3]));

        assert!(cache.contains("Hello"));
        assert!(!cache.contains("hello"));
        assert!(!cache.contains("Hello "));
        assert_eq!(cache.get("Hello").unwrap().len(), 3);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut cache = AudioCache::new();
        cache.insert("a", AudioClip::mp3(vec![1]));
        cache.insert("b", AudioClip::mp3(vec![2]));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);
    }
}
