use super::criteria::{SortField, SortOrder, ViewCriteria};
use crate::models::Document;

/// Sort key extracted once per document before ordering
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Number(u64),
}

fn sort_key(doc: &Document, field: SortField) -> SortKey {
    match field {
        SortField::Name => SortKey::Text(doc.filename.to_lowercase()),
        SortField::Size => SortKey::Number(doc.size),
        SortField::Category => SortKey::Text(doc.category.as_str().to_lowercase()),
    }
}

/// Check a document against the search term and category filter.
///
/// Filter logic:
/// - Search: case-insensitive substring of filename OR content (empty matches all)
/// - Category: exact match, or any category when unset
/// - Both must hold
pub fn matches_criteria(doc: &Document, criteria: &ViewCriteria) -> bool {
    matches_search(doc, &criteria.search_term.to_lowercase())
        && criteria.category.as_ref().is_none_or(|category| &doc.category == category)
}

/// `needle` must already be lowercased
fn matches_search(doc: &Document, needle: &str) -> bool {
    needle.is_empty()
        || doc.filename.to_lowercase().contains(needle)
        || doc.content.to_lowercase().contains(needle)
}

/// Derive the visible view as indices into `documents`.
///
/// Indices keep the view a strict subset of the loaded list. Sorting is stable in
/// both directions: documents with equal keys keep their loaded relative order.
pub fn derive_view(documents: &[Document], criteria: &ViewCriteria) -> Vec<usize> {
    let needle = criteria.search_term.to_lowercase();

    let mut view: Vec<(usize, SortKey)> = documents
        .iter()
        .enumerate()
        .filter(|(_, doc)| {
            matches_search(doc, &needle)
                && criteria.category.as_ref().is_none_or(|category| &doc.category == category)
        })
        .map(|(idx, doc)| (idx, sort_key(doc, criteria.sort.field)))
        .collect();

    view.sort_by(|(_, a), (_, b)| match criteria.sort.order {
        SortOrder::Asc => a.cmp(b),
        SortOrder::Desc => b.cmp(a),
    });

    view.into_iter().map(|(idx, _)| idx).collect()
}

/// Convenience wrapper over [`derive_view`] returning document references
pub fn filter_documents<'a>(documents: &'a [Document], criteria: &ViewCriteria) -> Vec<&'a Document> {
    derive_view(documents, criteria).into_iter().map(|idx| &documents[idx]).collect()
}

/// Footer summary: `Showing N of M documents` plus the active search term
pub fn view_summary(shown: usize, total: usize, search_term: &str) -> String {
    let mut text = format!("Showing {} of {} documents", shown, total);
    if !search_term.is_empty() {
        text.push_str(&format!(" matching \"{}\"", search_term));
    }
    text
}
