//! Breed labels
//!
//! A [`LabelSet`] is fixed at process start and indexed positionally to match
//! the model's output vector.

use serde::Serialize;
use std::fmt;

use crate::{ClassifierError, Result};

/// A breed identifier the classifier can output (e.g. `golden_retriever`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form: underscores become spaces, then title case
    ///
    /// `golden_retriever` → `Golden Retriever`
    pub fn display_name(&self) -> String {
        title_case(&self.0.replace('_', " "))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Ordered, closed set of labels
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Build a label set, rejecting empty, blank or duplicate ids
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<Label> = Vec::new();
        for id in ids {
            let id = id.into();
            if id.trim().is_empty() {
                return Err(ClassifierError::InvalidLabels("blank label".to_string()));
            }
            let label = Label::new(id);
            if labels.contains(&label) {
                return Err(ClassifierError::InvalidLabels(format!(
                    "duplicate label '{}'",
                    label
                )));
            }
            labels.push(label);
        }

        if labels.is_empty() {
            return Err(ClassifierError::InvalidLabels(
                "label set is empty".to_string(),
            ));
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_replaces_underscores() {
        assert_eq!(Label::new("golden_retriever").display_name(), "Golden Retriever");
        assert_eq!(Label::new("yorkshire_terrier").display_name(), "Yorkshire Terrier");
        assert_eq!(Label::new("poodle").display_name(), "Poodle");
    }

    #[test]
    fn test_display_name_normalizes_case() {
        assert_eq!(Label::new("GERMAN_shepherd").display_name(), "German Shepherd");
        assert_eq!(Label::new("jack-russell_terrier").display_name(), "Jack-Russell Terrier");
    }

    #[test]
    fn test_label_set_preserves_order() {
        let set = LabelSet::new(["a", "b", "c"]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(1).unwrap().as_str(), "b");
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_label_set_rejects_duplicates_and_empty() {
        assert!(LabelSet::new(["a", "a"]).is_err());
        assert!(LabelSet::new(Vec::<String>::new()).is_err());
        assert!(LabelSet::new(["a", " "]).is_err());
    }
}
