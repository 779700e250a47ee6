//! Static breed descriptions keyed by label

use std::collections::HashMap;

use serde::Serialize;

use crate::labels::Label;

/// Descriptive text shown next to an accepted prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreedInfo {
    pub name: &'static str,
    pub origin: &'static str,
    pub size: &'static str,
    pub traits: &'static str,
    pub temperament: &'static str,
    pub care: &'static str,
}

impl BreedInfo {
    /// Placeholder for labels without a record
    pub const UNKNOWN: BreedInfo = BreedInfo {
        name: "-",
        origin: "-",
        size: "-",
        traits: "-",
        temperament: "-",
        care: "-",
    };

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

const BUILTIN: [(&str, BreedInfo); 5] = [
    (
        "french_bulldog",
        BreedInfo {
            name: "French Bulldog",
            origin: "France",
            size: "Small (up to 12 kg)",
            traits: "Bat ears, compact body, short muzzle",
            temperament: "Friendly and calm, well suited to life indoors.",
            care: "Needs regular facial cleaning to prevent irritation in the skin folds.",
        },
    ),
    (
        "german_shepherd",
        BreedInfo {
            name: "German Shepherd",
            origin: "Germany",
            size: "Large (30-40 kg)",
            traits: "Erect ears, thick double coat, highly intelligent working dog",
            temperament: "Intelligent, loyal and easy to train; an excellent guard dog.",
            care: "Needs frequent brushing because the thick coat sheds heavily.",
        },
    ),
    (
        "golden_retriever",
        BreedInfo {
            name: "Golden Retriever",
            origin: "Scotland",
            size: "Medium (25-34 kg)",
            traits: "Long golden coat, friendly, loves water",
            temperament: "Very sociable and affectionate, great for families with children.",
            care: "Needs daily exercise and regular coat grooming.",
        },
    ),
    (
        "poodle",
        BreedInfo {
            name: "Poodle",
            origin: "Germany/France",
            size: "Toy to medium",
            traits: "Curly coat, very intelligent and easy to train",
            temperament: "Active, clever and quick to adapt to new surroundings.",
            care: "The curly coat must be clipped and groomed regularly to avoid matting.",
        },
    ),
    (
        "yorkshire_terrier",
        BreedInfo {
            name: "Yorkshire Terrier",
            origin: "England",
            size: "Small (2-3 kg)",
            traits: "Long silky coat, energetic, apartment friendly",
            temperament: "Lively, bold and happy to be the center of attention.",
            care: "Needs daily brushing and particular attention to dental health.",
        },
    ),
];

/// Read-only label → [`BreedInfo`] map
#[derive(Debug, Clone)]
pub struct BreedKnowledgeBase {
    records: HashMap<&'static str, BreedInfo>,
}

impl BreedKnowledgeBase {
    /// Records for the bundled model's labels
    pub fn builtin() -> Self {
        Self {
            records: BUILTIN.iter().cloned().collect(),
        }
    }

    /// Record for `label`, or [`BreedInfo::UNKNOWN`]
    pub fn lookup(&self, label: &Label) -> &BreedInfo {
        self.records
            .get(label.as_str())
            .unwrap_or(&BreedInfo::UNKNOWN)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.records.contains_key(label.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for BreedKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breedid_common::config::DEFAULT_LABELS;

    #[test]
    fn test_every_default_label_has_complete_record() {
        let kb = BreedKnowledgeBase::builtin();
        for id in DEFAULT_LABELS {
            let info = kb.lookup(&Label::new(id));
            assert!(!info.is_unknown(), "missing record for {}", id);
            for field in [info.name, info.origin, info.size, info.traits, info.temperament, info.care] {
                assert!(!field.trim().is_empty(), "empty field for {}", id);
            }
        }
        assert_eq!(kb.len(), DEFAULT_LABELS.len());
    }

    #[test]
    fn test_record_name_matches_display_name() {
        let kb = BreedKnowledgeBase::builtin();
        for id in DEFAULT_LABELS {
            let label = Label::new(id);
            assert_eq!(kb.lookup(&label).name, label.display_name());
        }
    }

    #[test]
    fn test_unknown_label_gets_placeholder() {
        let kb = BreedKnowledgeBase::builtin();
        let info = kb.lookup(&Label::new("chihuahua"));
        assert!(info.is_unknown());
        assert_eq!(info.origin, "-");
        assert!(!kb.contains(&Label::new("chihuahua")));
    }
}
