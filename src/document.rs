//! The `Wikitext` document facade.
//!
//! Owns one immutable source string and memoizes scan results, so repeated
//! `parse_*` calls pay for a full scan only once. The memos hold the
//! unfiltered scans; each call filters a fresh copy per its config.

use once_cell::unsync::OnceCell;

use crate::parse::parameters::{self, Parameter};
use crate::parse::sections::{self, Section};
use crate::parse::tags::{self, Tag, is_transclusion_preventing};
use crate::parse::templates::{self, ParseTemplatesConfig};
use crate::template::parsed::ParsedTemplate;

/// A revision snapshot of a wiki page, as returned by the MediaWiki query
/// API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Revision {
    /// The ID of the page.
    pub pageid: u64,
    /// The ID of the revision.
    pub revid: u64,
    /// The namespace number of the page.
    pub ns: i32,
    /// The formatted title of the page.
    pub title: String,
    /// The JSON timestamp of the revision.
    pub basetimestamp: String,
    /// The JSON timestamp of the fetch.
    pub curtimestamp: String,
    /// The byte length of the page content.
    pub length: usize,
    /// The content of the page.
    pub content: String,
    /// Whether the page is a redirect.
    pub redirect: bool,
}

/// Parsing config of [`Wikitext::parse_tags`].
#[derive(Default)]
pub struct ParseTagsConfig<'a> {
    /// Only include tags that match this predicate.
    pub condition_predicate: Option<&'a dyn Fn(&Tag) -> bool>,
}

/// Parsing config of [`Wikitext::parse_parameters`].
pub struct ParseParametersConfig<'a> {
    /// Whether to parse `{{{parameter}}}`s inside another `{{{parameter}}}`.
    ///
    /// Default: `true`
    pub recursive: bool,
    /// Only include parameters that match this predicate. Evaluated after
    /// `recursive`: with `recursive: false` the predicate only ever sees
    /// parameters of nest level `0`.
    pub condition_predicate: Option<&'a dyn Fn(&Parameter) -> bool>,
}

impl Default for ParseParametersConfig<'_> {
    fn default() -> Self {
        Self {
            recursive: true,
            condition_predicate: None,
        }
    }
}

/// A wikitext document and its memoized scan results.
pub struct Wikitext {
    text: String,
    revision: Option<Revision>,
    tags: OnceCell<Vec<Tag>>,
    sections: OnceCell<Vec<Section>>,
    parameters: OnceCell<Vec<Parameter>>,
}

impl Wikitext {
    /// Wrap a raw wikitext string.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: None,
            tags: OnceCell::new(),
            sections: OnceCell::new(),
            parameters: OnceCell::new(),
        }
    }

    /// Wrap the content of a fetched revision, keeping the snapshot
    /// available through [`revision`](Self::revision).
    pub fn from_revision(revision: Revision) -> Self {
        Self {
            text: revision.content.clone(),
            revision: Some(revision),
            tags: OnceCell::new(),
            sections: OnceCell::new(),
            parameters: OnceCell::new(),
        }
    }

    /// The raw wikitext.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The length of the wikitext in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the wikitext is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte length of the wikitext. Prefers the length reported by the
    /// API when the document came from a revision.
    pub fn byte_length(&self) -> usize {
        self.revision
            .as_ref()
            .map_or(self.text.len(), |revision| revision.length)
    }

    /// The revision the document was created from, if any.
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    /// Parse `<tag>`s (and `<!---->` comments) in the wikitext.
    pub fn parse_tags(&self, config: &ParseTagsConfig) -> Vec<Tag> {
        self.all_tags()
            .iter()
            .filter(|tag| {
                config
                    .condition_predicate
                    .is_none_or(|predicate| predicate(tag))
            })
            .cloned()
            .collect()
    }

    /// A copy of the tag scan, or `None` if [`parse_tags`](Self::parse_tags)
    /// has not been called yet.
    pub fn tags(&self) -> Option<Vec<Tag>> {
        self.tags.get().cloned()
    }

    /// Parse the section structure of the wikitext.
    pub fn parse_sections(&self) -> Vec<Section> {
        self.sections
            .get_or_init(|| sections::scan(&self.text, self.all_tags(), &self.tp_tags()))
            .clone()
    }

    /// A copy of the section scan, or `None` if
    /// [`parse_sections`](Self::parse_sections) has not been called yet.
    pub fn sections(&self) -> Option<Vec<Section>> {
        self.sections.get().cloned()
    }

    /// Parse `{{{parameter}}}`s in the wikitext.
    pub fn parse_parameters(&self, config: &ParseParametersConfig) -> Vec<Parameter> {
        self.all_parameters()
            .iter()
            .filter(|param| {
                if !config.recursive && param.nest_level > 0 {
                    return false;
                }
                config
                    .condition_predicate
                    .is_none_or(|predicate| predicate(param))
            })
            .cloned()
            .collect()
    }

    /// A copy of the parameter scan, or `None` if
    /// [`parse_parameters`](Self::parse_parameters) has not been called yet.
    pub fn parameters(&self) -> Option<Vec<Parameter>> {
        self.parameters.get().cloned()
    }

    /// Parse `{{template}}`s in the wikitext.
    pub fn parse_templates(&self, config: &ParseTemplatesConfig) -> Vec<ParsedTemplate> {
        let tp_tags = self.tp_tags();
        let params: Vec<Parameter> = self
            .all_parameters()
            .iter()
            .filter(|param| param.nest_level == 0)
            .cloned()
            .collect();
        templates::scan(&self.text, &tp_tags, &params, config, 0)
    }

    /// The memoized full tag scan.
    fn all_tags(&self) -> &[Tag] {
        self.tags.get_or_init(|| tags::scan(&self.text))
    }

    /// The memoized full (recursive) parameter scan.
    fn all_parameters(&self) -> &[Parameter] {
        self.parameters
            .get_or_init(|| parameters::scan(&self.text, &self.tp_tags()))
    }

    /// The transclusion-preventing subset of the tag scan.
    fn tp_tags(&self) -> Vec<Tag> {
        self.all_tags()
            .iter()
            .filter(|tag| is_transclusion_preventing(&tag.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(content: &str, length: usize) -> Revision {
        Revision {
            pageid: 1,
            revid: 2,
            ns: 0,
            title: "Page".to_string(),
            basetimestamp: "2024-01-01T00:00:00Z".to_string(),
            curtimestamp: "2024-01-01T00:00:01Z".to_string(),
            length,
            content: content.to_string(),
            redirect: false,
        }
    }

    #[test]
    fn test_length_in_chars_and_bytes() {
        let doc = Wikitext::new("héllo");
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.byte_length(), 6);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_from_revision() {
        let doc = Wikitext::from_revision(revision("{{T}}", 100));
        assert_eq!(doc.text(), "{{T}}");
        // The API-reported length wins over the local byte count
        assert_eq!(doc.byte_length(), 100);
        assert_eq!(doc.revision().unwrap().pageid, 1);
    }

    #[test]
    fn test_getters_none_before_first_parse() {
        let doc = Wikitext::new("<div>x</div>\n== A ==\n{{{1}}}");
        assert!(doc.tags().is_none());
        assert!(doc.sections().is_none());
        assert!(doc.parameters().is_none());

        doc.parse_tags(&ParseTagsConfig::default());
        doc.parse_sections();
        doc.parse_parameters(&ParseParametersConfig::default());
        assert_eq!(doc.tags().unwrap().len(), 1);
        assert_eq!(doc.sections().unwrap().len(), 2);
        assert_eq!(doc.parameters().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_tags_filtered() {
        let doc = Wikitext::new("<div>x</div><!--c-->");
        let comments = doc.parse_tags(&ParseTagsConfig {
            condition_predicate: Some(&|tag| tag.name == "comment"),
        });
        assert_eq!(comments.len(), 1);
        // The memo keeps the unfiltered scan
        assert_eq!(doc.tags().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_parameters_recursion_toggle() {
        let doc = Wikitext::new("{{{1|{{{page|{{PAGENAME}}}}}}}}");
        let all = doc.parse_parameters(&ParseParametersConfig::default());
        assert_eq!(all.len(), 2);
        let top = doc.parse_parameters(&ParseParametersConfig {
            recursive: false,
            ..Default::default()
        });
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].nest_level, 0);
    }

    #[test]
    fn test_parse_templates() {
        let doc = Wikitext::new("a {{T|x=1}} b");
        let templates = doc.parse_templates(&ParseTemplatesConfig::default());
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].render_original(), "{{T|x=1}}");
    }
}
