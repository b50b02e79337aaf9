//! Word Repository
//!
//! Static vocabulary list. Sessions never mutate it; they take a shuffled copy.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single vocabulary entry
///
/// Built-in entries borrow static text; entries read back from test history
/// own theirs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Display form, may carry affix markers
    pub word: Cow<'static, str>,
    /// Canonical answer form used for every comparison
    pub clean_word: Cow<'static, str>,
    pub pronunciation: Cow<'static, str>,
    pub translation: Cow<'static, str>,
    pub explanation: Cow<'static, str>,
}

impl Word {
    /// Trimmed, case-insensitive comparison against the clean form
    pub fn matches(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.clean_word.to_lowercase()
    }
}

macro_rules! word {
    ($word:expr, $clean:expr, $pron:expr, $trans:expr, $expl:expr) => {
        Word {
            word: Cow::Borrowed($word),
            clean_word: Cow::Borrowed($clean),
            pronunciation: Cow::Borrowed($pron),
            translation: Cow::Borrowed($trans),
            explanation: Cow::Borrowed($expl),
        }
    };
}

/// The built-in vocabulary list
pub static WORDS: &[Word] = &[
    word!("abandon", "abandon", "/əˈbændən/", "放弃", "To leave something behind for good."),
    word!("ac-curate", "accurate", "/ˈækjərət/", "准确的", "Correct in every detail."),
    word!("achieve", "achieve", "/əˈtʃiːv/", "实现", "To succeed in reaching a goal."),
    word!("ad-equate", "adequate", "/ˈædɪkwət/", "足够的", "Good enough for what is needed."),
    word!("ambition", "ambition", "/æmˈbɪʃən/", "雄心", "A strong wish to succeed."),
    word!("anxious", "anxious", "/ˈæŋkʃəs/", "焦虑的", "Worried about something uncertain."),
    word!("benefit", "benefit", "/ˈbenɪfɪt/", "益处", "An advantage gained from something."),
    word!("brilliant", "brilliant", "/ˈbrɪljənt/", "杰出的", "Extremely clever or impressive."),
    word!("candidate", "candidate", "/ˈkændɪdət/", "候选人", "A person applying for a job or position."),
    word!("challenge", "challenge", "/ˈtʃælɪndʒ/", "挑战", "Something difficult that tests ability."),
    word!("curious", "curious", "/ˈkjʊəriəs/", "好奇的", "Eager to know or learn something."),
    word!("decade", "decade", "/ˈdekeɪd/", "十年", "A period of ten years."),
    word!("de-liberate", "deliberate", "/dɪˈlɪbərət/", "故意的", "Done on purpose, carefully planned."),
    word!("efficient", "efficient", "/ɪˈfɪʃənt/", "高效的", "Working well without wasting time."),
    word!("enormous", "enormous", "/ɪˈnɔːməs/", "巨大的", "Very large in size or amount."),
    word!("essential", "essential", "/ɪˈsenʃəl/", "必要的", "Absolutely necessary."),
    word!("familiar", "familiar", "/fəˈmɪliər/", "熟悉的", "Well known from long experience."),
    word!("generous", "generous", "/ˈdʒenərəs/", "慷慨的", "Willing to give more than expected."),
    word!("harmony", "harmony", "/ˈhɑːməni/", "和谐", "A pleasing agreement of parts."),
    word!("in-evitable", "inevitable", "/ɪnˈevɪtəbəl/", "不可避免的", "Certain to happen."),
    word!("journey", "journey", "/ˈdʒɜːni/", "旅程", "Travel from one place to another."),
    word!("knowledge", "knowledge", "/ˈnɒlɪdʒ/", "知识", "Facts and skills learned through experience."),
    word!("landscape", "landscape", "/ˈlændskeɪp/", "风景", "Everything you can see across an area of land."),
    word!("mysterious", "mysterious", "/mɪˈstɪəriəs/", "神秘的", "Difficult to understand or explain."),
    word!("negotiate", "negotiate", "/nɪˈɡəʊʃieɪt/", "谈判", "To discuss in order to reach an agreement."),
    word!("opportunity", "opportunity", "/ˌɒpəˈtjuːnəti/", "机会", "A chance to do something."),
    word!("patient", "patient", "/ˈpeɪʃənt/", "耐心的", "Able to wait calmly."),
    word!("re-markable", "remarkable", "/rɪˈmɑːkəbəl/", "非凡的", "Worth noticing because unusual."),
    word!("sincere", "sincere", "/sɪnˈsɪə/", "真诚的", "Honest and meaning what you say."),
    word!("tremendous", "tremendous", "/trəˈmendəs/", "极大的", "Very great in amount or level."),
    word!("vivid", "vivid", "/ˈvɪvɪd/", "生动的", "Producing clear, strong images in the mind."),
    word!("wisdom", "wisdom", "/ˈwɪzdəm/", "智慧", "Good judgement that comes from experience."),
];

/// Unbiased permutation of the full repository
pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Vec<Word> {
    let mut words = WORDS.to_vec();
    words.shuffle(rng);
    words
}

/// Up to `count` distinct words sampled without replacement
pub fn sample<R: Rng + ?Sized>(words: &[Word], count: usize, rng: &mut R) -> Vec<Word> {
    words.choose_multiple(rng, count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_clean_words_are_unique() {
        let clean: HashSet<&str> = WORDS.iter().map(|w| w.clean_word.as_ref()).collect();
        assert_eq!(clean.len(), WORDS.len());
    }

    #[test]
    fn test_matches_ignores_case_and_whitespace() {
        let w = &WORDS[0];
        assert!(w.matches("  ABANDON "));
        assert!(!w.matches("abandons"));
        assert!(!w.matches(""));
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = rand::thread_rng();
        let words = shuffled(&mut rng);
        assert_eq!(words.len(), WORDS.len());
        let seen: HashSet<&str> = words.iter().map(|w| w.clean_word.as_ref()).collect();
        assert_eq!(seen.len(), WORDS.len());
    }

    #[test]
    fn test_sample_caps_at_repository_size() {
        let mut rng = rand::thread_rng();
        assert_eq!(sample(&WORDS[..3], 10, &mut rng).len(), 3);
        let picked = sample(WORDS, 10, &mut rng);
        let distinct: HashSet<&str> = picked.iter().map(|w| w.clean_word.as_ref()).collect();
        assert_eq!(distinct.len(), 10);
    }
}
