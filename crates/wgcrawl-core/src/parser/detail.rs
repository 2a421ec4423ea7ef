//! Detail page parser for wg-gesucht.de
//!
//! Every field of a [`ListingRecord`] is bound to one [`ExtractionRule`]:
//! an [`ElementPath`] into the page plus a [`PostProcess`] step. Rules are
//! evaluated independently, so a field that is missing or malformed only
//! defaults that field.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::FieldError;
use crate::parser::text::{element_text, last_token, normalize_whitespace, strip_unit};
use crate::types::ListingRecord;

/// Layout rows of the detail view, counted in document order
const ROW: &str = r#"div[class="row"]"#;

/// One step from a set of elements to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Element children with the given tag; `Some(n)` keeps only the
    /// n-th such child (1-based), `None` keeps all of them
    Child(&'static str, Option<usize>),
    /// Descendants matching a CSS selector
    Descendant(&'static str),
}

/// Path from the document root to the elements holding a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPath {
    /// CSS selector evaluated against the whole document
    pub root: &'static str,
    /// Keep only the n-th root match in document order (1-based)
    pub root_index: Option<usize>,
    /// Steps applied after the root
    pub steps: &'static [Step],
}

impl ElementPath {
    /// Evaluates the path, returning matches in document order
    ///
    /// # Errors
    /// Returns the offending selector if one of the CSS selectors does not parse
    pub fn select<'a>(
        &self,
        document: &'a Html,
    ) -> std::result::Result<Vec<ElementRef<'a>>, &'static str> {
        let root = Selector::parse(self.root).map_err(|_| self.root)?;
        let roots = document.select(&root);
        let mut current: Vec<ElementRef<'a>> = match self.root_index {
            Some(n) => roots.skip(n.saturating_sub(1)).take(1).collect(),
            None => roots.collect(),
        };

        for step in self.steps {
            current = match *step {
                Step::Child(tag, nth) => current
                    .iter()
                    .flat_map(|element| child_elements(element, tag, nth))
                    .collect(),
                Step::Descendant(css) => {
                    let selector = Selector::parse(css).map_err(|_| css)?;
                    let mut seen = HashSet::new();
                    current
                        .iter()
                        .flat_map(|element| element.select(&selector).collect::<Vec<_>>())
                        .filter(|element| seen.insert(element.id()))
                        .collect()
                }
            };
            if current.is_empty() {
                break;
            }
        }

        Ok(current)
    }
}

fn child_elements<'a>(
    element: &ElementRef<'a>,
    tag: &str,
    nth: Option<usize>,
) -> Vec<ElementRef<'a>> {
    let children = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == tag);
    match nth {
        Some(n) => children.skip(n.saturating_sub(1)).take(1).collect(),
        None => children.collect(),
    }
}

/// Conversion applied to the text found by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Trimmed text of the first match
    Verbatim,
    /// Text of the first match with whitespace runs collapsed
    NormalizeWhitespace,
    /// Text of the first match without its unit marker, parsed as integer
    Integer { unit: Option<&'static str> },
    /// Trimmed text of every match
    Texts,
    /// Whitespace-normalized text of every match
    NormalizedTexts,
    /// Last whitespace-delimited token of the first match
    LastToken,
}

/// Value produced by a successful rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Single text value
    Text(String),
    /// Unsigned integer with its unit removed
    Integer(u32),
    /// Texts of every match in document order
    Texts(Vec<String>),
}

/// Location plus conversion for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    /// Elements holding the value
    pub path: ElementPath,
    /// Conversion of the matched text
    pub post: PostProcess,
}

/// Fields extracted from a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    RentBase,
    RentAdditional,
    Deposit,
    Address,
    AvailableFrom,
    ListedOn,
    AreaSqm,
    RoomCount,
    Amenities,
    DescriptionHeadings,
    DescriptionBodies,
    ExternalId,
}

impl Field {
    /// All fields in extraction order
    pub const ALL: [Field; 13] = [
        Field::Title,
        Field::RentBase,
        Field::RentAdditional,
        Field::Deposit,
        Field::Address,
        Field::AvailableFrom,
        Field::ListedOn,
        Field::AreaSqm,
        Field::RoomCount,
        Field::Amenities,
        Field::DescriptionHeadings,
        Field::DescriptionBodies,
        Field::ExternalId,
    ];

    /// Name used in logs and reports
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::RentBase => "rent_base",
            Field::RentAdditional => "rent_additional",
            Field::Deposit => "deposit",
            Field::Address => "address",
            Field::AvailableFrom => "available_from",
            Field::ListedOn => "listed_on",
            Field::AreaSqm => "area_sqm",
            Field::RoomCount => "room_count",
            Field::Amenities => "amenities",
            Field::DescriptionHeadings => "description_headings",
            Field::DescriptionBodies => "description_bodies",
            Field::ExternalId => "external_id",
        }
    }

    /// Where the field lives on the page and how its text is converted
    pub fn rule(self) -> ExtractionRule {
        use PostProcess::*;
        use Step::*;

        let (path, post) = match self {
            Field::Title => (
                ElementPath {
                    root: r#"h1[class="headline headline-detailed-view-title"]"#,
                    root_index: None,
                    steps: &[],
                },
                Verbatim,
            ),
            Field::AreaSqm => (
                row(1, &[Child("div", Some(2)), Child("h2", None)]),
                Integer { unit: Some("m²") },
            ),
            Field::RentBase => (
                row(1, &[Child("div", Some(3)), Child("h2", None)]),
                Integer { unit: Some("€") },
            ),
            Field::RoomCount => (
                row(1, &[Child("div", Some(4)), Child("h2", None)]),
                Integer { unit: None },
            ),
            Field::RentAdditional => (
                row(
                    3,
                    &[
                        Child("div", None),
                        Child("table", None),
                        Child("tbody", None),
                        Child("tr", Some(2)),
                        Child("td", Some(2)),
                        Child("b", None),
                    ],
                ),
                Integer { unit: Some("€") },
            ),
            Field::Deposit => (
                row(
                    3,
                    &[
                        Child("div", None),
                        Child("table", None),
                        Child("tbody", None),
                        Child("tr", Some(4)),
                        Child("td", Some(2)),
                        Child("b", None),
                    ],
                ),
                Integer { unit: Some("€") },
            ),
            Field::Address => (
                row(3, &[Child("div", Some(2)), Child("a", None)]),
                NormalizeWhitespace,
            ),
            Field::AvailableFrom => (
                row(
                    3,
                    &[Child("div", Some(3)), Child("p", Some(1)), Child("b", None)],
                ),
                Verbatim,
            ),
            Field::ListedOn => (
                row(3, &[Child("div", Some(3)), Child("b", None)]),
                Verbatim,
            ),
            Field::Amenities => (
                row(
                    6,
                    &[
                        Child("div", None),
                        Child("div", None),
                        Descendant(r#"div[class="col-xs-6 col-sm-4 text-center print_text_left"]"#),
                    ],
                ),
                NormalizedTexts,
            ),
            Field::DescriptionHeadings => (
                ElementPath {
                    root: r#"#ad_description_text div[class="wordWrap"] h3"#,
                    root_index: None,
                    steps: &[],
                },
                Texts,
            ),
            Field::DescriptionBodies => (
                ElementPath {
                    root: r#"#ad_description_text div[class="wordWrap"] p"#,
                    root_index: None,
                    steps: &[],
                },
                Texts,
            ),
            Field::ExternalId => (
                ElementPath {
                    root: r#"div[class="row bottom_contact_box"]"#,
                    root_index: None,
                    steps: &[
                        Child("div", None),
                        Child("div", None),
                        Child("div", Some(1)),
                        Child("div", Some(2)),
                        Child("div", Some(2)),
                        Child("div", None),
                    ],
                },
                LastToken,
            ),
        };

        ExtractionRule { path, post }
    }
}

fn row(index: usize, steps: &'static [Step]) -> ElementPath {
    ElementPath {
        root: ROW,
        root_index: Some(index),
        steps,
    }
}

impl ExtractionRule {
    /// Evaluates the rule against a parsed detail page
    ///
    /// # Errors
    /// - `Missing` if the path matches nothing
    /// - `NotANumber` if integer conversion fails
    /// - `NoTokens` if a token was expected in an empty block
    /// - `InvalidSelector` if the path does not parse
    pub fn apply(&self, field: Field, document: &Html) -> Result<FieldValue, FieldError> {
        let name = field.name();
        let matches = self
            .path
            .select(document)
            .map_err(|selector| FieldError::InvalidSelector {
                field: name,
                selector,
            })?;

        let first_text = || {
            matches
                .first()
                .map(element_text)
                .ok_or(FieldError::Missing(name))
        };

        match self.post {
            PostProcess::Verbatim => first_text().map(FieldValue::Text),
            PostProcess::NormalizeWhitespace => {
                first_text().map(|text| FieldValue::Text(normalize_whitespace(&text)))
            }
            PostProcess::Integer { unit } => {
                let text = first_text()?;
                let digits = match unit {
                    Some(unit) => strip_unit(&text, unit),
                    None => text.trim(),
                };
                match digits.parse::<u32>() {
                    Ok(value) => Ok(FieldValue::Integer(value)),
                    Err(_) => Err(FieldError::NotANumber { field: name, text }),
                }
            }
            PostProcess::LastToken => {
                let text = first_text()?;
                last_token(&text)
                    .map(|token| FieldValue::Text(token.to_string()))
                    .ok_or(FieldError::NoTokens(name))
            }
            PostProcess::Texts => all_texts(&matches, name, false),
            PostProcess::NormalizedTexts => all_texts(&matches, name, true),
        }
    }
}

fn all_texts(
    matches: &[ElementRef],
    name: &'static str,
    normalize: bool,
) -> Result<FieldValue, FieldError> {
    if matches.is_empty() {
        return Err(FieldError::Missing(name));
    }
    let texts = matches
        .iter()
        .map(|element| {
            let text = element_text(element);
            if normalize { normalize_whitespace(&text) } else { text }
        })
        .collect();
    Ok(FieldValue::Texts(texts))
}

/// Record extracted from one page together with the fields that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: ListingRecord,
    /// Fields whose rule failed and which hold a default value
    pub missing: Vec<Field>,
}

/// Parses a detail page into a listing record
///
/// # Arguments
/// * `source_url` - URL the page was fetched from
/// * `html` - Raw HTML of the detail page
///
/// # Returns
/// Always a record; fields that could not be extracted are zero or empty
pub fn extract_listing(source_url: &str, html: &str) -> ListingRecord {
    extract_report(source_url, html).record
}

/// Parses a detail page and reports which fields fell back to defaults
pub fn extract_report(source_url: &str, html: &str) -> Extraction {
    let document = Html::parse_document(html);
    let mut extractor = Extractor {
        document: &document,
        source_url,
        missing: Vec::new(),
    };

    let headings = extractor.texts(Field::DescriptionHeadings);
    let bodies = extractor.texts(Field::DescriptionBodies);
    if headings.len() != bodies.len() {
        debug!(
            url = %source_url,
            headings = headings.len(),
            bodies = bodies.len(),
            "Description headings and bodies differ in count, pairing the shorter"
        );
    }
    let description_sections = headings
        .iter()
        .zip(&bodies)
        .map(|(heading, body)| format!("{heading}: {body}"))
        .collect();

    let record = ListingRecord {
        source_url: source_url.to_string(),
        external_id: extractor.text(Field::ExternalId),
        title: extractor.text(Field::Title),
        rent_base: extractor.integer(Field::RentBase),
        rent_additional: extractor.integer(Field::RentAdditional),
        deposit: extractor.integer(Field::Deposit),
        address: extractor.text(Field::Address),
        available_from: extractor.text(Field::AvailableFrom),
        listed_on: extractor.text(Field::ListedOn),
        area_sqm: extractor.integer(Field::AreaSqm),
        room_count: extractor.integer(Field::RoomCount),
        amenities: extractor.texts(Field::Amenities),
        description_sections,
    };

    Extraction {
        record,
        missing: extractor.missing,
    }
}

struct Extractor<'a> {
    document: &'a Html,
    source_url: &'a str,
    missing: Vec<Field>,
}

impl Extractor<'_> {
    /// Runs one field's rule; a failure is logged and recorded, never propagated
    fn isolate(&mut self, field: Field) -> Option<FieldValue> {
        match field.rule().apply(field, self.document) {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(
                    url = %self.source_url,
                    field = field.name(),
                    error = %error,
                    "Field extraction failed"
                );
                self.missing.push(field);
                None
            }
        }
    }

    fn text(&mut self, field: Field) -> String {
        match self.isolate(field) {
            Some(FieldValue::Text(text)) => text,
            _ => String::new(),
        }
    }

    fn integer(&mut self, field: Field) -> u32 {
        match self.isolate(field) {
            Some(FieldValue::Integer(value)) => value,
            _ => 0,
        }
    }

    fn texts(&mut self, field: Field) -> Vec<String> {
        match self.isolate(field) {
            Some(FieldValue::Texts(texts)) => texts,
            _ => Vec::new(),
        }
    }
}
