//! Building an output document from an ordered list of source pages.
//!
//! Every distinct source is imported once with renumbered object ids, so
//! shared resources (fonts, images) are stored once however many of its
//! pages are used. Each position of the plan gets its own page object: the
//! first use of a source page takes over the imported object, later uses
//! clone its dictionary. Attributes a page inherits from its source page
//! tree are copied onto the page itself because the source tree is dropped.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::arrange::{DocumentId, PageRef};
use crate::config::CompressionLevel;
use crate::error::{PdfDeckError, Result};
use crate::utils::{INHERITABLE_PAGE_KEYS, inherited_attribute};

/// Page-level entries dropped under [`CompressionLevel::Maximum`]:
/// embedded thumbnails and private application data.
const DISPOSABLE_PAGE_KEYS: [&[u8]; 2] = [b"Thumb", b"PieceInfo"];

/// Assembles a new PDF document from resolved source pages.
#[derive(Debug, Clone, Default)]
pub struct PageAssembler {
    compression: CompressionLevel,
}

impl PageAssembler {
    /// Create an assembler that compresses its output at `compression`.
    pub fn new(compression: CompressionLevel) -> Self {
        Self { compression }
    }

    /// Build a document whose pages are `plan`, in order.
    ///
    /// An empty plan yields a valid document with zero pages.
    ///
    /// # Errors
    ///
    /// Returns [`PdfDeckError::PageWriteFailed`] carrying the plan position
    /// of the first page that could not be placed.
    pub fn assemble(
        &self,
        plan: &[PageRef],
        sources: &HashMap<DocumentId, Arc<Document>>,
    ) -> Result<Document> {
        let mut output = Document::with_version(output_version(plan, sources));
        let pages_id = output.new_object_id();

        let mut imported: HashMap<DocumentId, Vec<ObjectId>> = HashMap::new();
        let mut placed: HashSet<PageRef> = HashSet::new();
        let mut kids = Vec::with_capacity(plan.len());

        for (position, page) in plan.iter().enumerate() {
            if !imported.contains_key(&page.document) {
                let source = sources.get(&page.document).ok_or_else(|| {
                    PdfDeckError::page_write_failed(
                        position,
                        format!("{} is not available", page.document),
                    )
                })?;
                let page_ids = self.import(&mut output, source, pages_id);
                imported.insert(page.document, page_ids);
            }

            let page_id = imported
                .get(&page.document)
                .and_then(|ids| ids.get(page.page_index))
                .copied()
                .ok_or_else(|| {
                    PdfDeckError::page_write_failed(position, format!("{page} does not exist"))
                })?;

            let id = if placed.insert(*page) {
                page_id
            } else {
                // repeated page: a second object sharing contents and resources
                let copy = output
                    .get_dictionary(page_id)
                    .map_err(|e| PdfDeckError::page_write_failed(position, e.to_string()))?
                    .clone();
                output.add_object(copy)
            };
            kids.push(Object::Reference(id));
        }

        let page_count = kids.len();
        output.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }
            .into(),
        );
        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        // Unused pages and the source catalogs are unreachable now
        let pruned = output.prune_objects();
        output.renumber_objects();

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard | CompressionLevel::Maximum => output.compress(),
        }

        log::debug!(
            "assembled {} page(s) from {} source(s), pruned {} object(s)",
            page_count,
            imported.len(),
            pruned.len()
        );

        Ok(output)
    }

    /// Build a document from `plan` and serialise it.
    pub fn assemble_to_bytes(
        &self,
        plan: &[PageRef],
        sources: &HashMap<DocumentId, Arc<Document>>,
    ) -> Result<Vec<u8>> {
        let mut document = self.assemble(plan, sources)?;
        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| PdfDeckError::export_failed(format!("Cannot serialise PDF: {e}")))?;
        Ok(bytes)
    }

    /// Copy every object of `source` into `output` under fresh ids.
    ///
    /// Returns the new page ids in source page order. Each page is
    /// re-parented to `pages_id` with its inherited attributes made explicit.
    fn import(
        &self,
        output: &mut Document,
        source: &Document,
        pages_id: ObjectId,
    ) -> Vec<ObjectId> {
        let mut doc = source.clone();
        doc.renumber_objects_with(output.max_id + 1);

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        for &page_id in &page_ids {
            let inherited: Vec<(&[u8], Object)> = INHERITABLE_PAGE_KEYS
                .iter()
                .filter(|key| {
                    doc.get_dictionary(page_id)
                        .is_ok_and(|page| !page.has(key))
                })
                .filter_map(|key| {
                    inherited_attribute(&doc, page_id, key).map(|value| (*key, value))
                })
                .collect();

            if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
                for (key, value) in inherited {
                    page.set(key, value);
                }
                page.set("Parent", pages_id);

                if self.compression == CompressionLevel::Maximum {
                    for key in DISPOSABLE_PAGE_KEYS {
                        page.remove(key);
                    }
                }
            }
        }

        output.max_id = output.max_id.max(doc.max_id);
        output.objects.extend(doc.objects);
        page_ids
    }
}

/// Highest PDF version among the sources used by `plan`.
fn output_version(plan: &[PageRef], sources: &HashMap<DocumentId, Arc<Document>>) -> String {
    plan.iter()
        .filter_map(|page| sources.get(&page.document))
        .map(|doc| doc.version.clone())
        .max()
        .unwrap_or_else(|| "1.5".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_pdf, page_markers};

    fn sources(docs: &[(u64, &str, usize)]) -> HashMap<DocumentId, Arc<Document>> {
        docs.iter()
            .map(|&(id, label, pages)| (DocumentId::new(id), Arc::new(build_pdf(label, pages))))
            .collect()
    }

    fn page(document: u64, page_index: usize) -> PageRef {
        PageRef::new(DocumentId::new(document), page_index)
    }

    fn reload(
        assembler: &PageAssembler,
        plan: &[PageRef],
        sources: &HashMap<DocumentId, Arc<Document>>,
    ) -> Document {
        let bytes = assembler.assemble_to_bytes(plan, sources).unwrap();
        Document::load_mem(&bytes).unwrap()
    }

    #[test]
    fn test_pages_follow_plan_order() {
        let sources = sources(&[(1, "A", 3), (2, "B", 2)]);
        let plan = [page(2, 1), page(1, 0), page(2, 0), page(1, 2)];

        let doc = reload(&PageAssembler::default(), &plan, &sources);

        assert_eq!(page_markers(&doc), vec!["B-2", "A-1", "B-1", "A-3"]);
    }

    #[test]
    fn test_repeated_page_gets_distinct_objects() {
        let sources = sources(&[(1, "A", 2)]);
        let plan = [page(1, 1), page(1, 0), page(1, 1)];

        let doc = PageAssembler::new(CompressionLevel::None)
            .assemble(&plan, &sources)
            .unwrap();

        let ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[2]);
        assert_eq!(page_markers(&doc), vec!["A-2", "A-1", "A-2"]);
    }

    #[test]
    fn test_empty_plan_is_valid_pdf() {
        let doc = reload(&PageAssembler::default(), &[], &HashMap::new());
        assert_eq!(doc.get_pages().len(), 0);
    }

    #[test]
    fn test_inherited_attributes_are_flattened() {
        let sources = sources(&[(1, "A", 1)]);
        let doc = PageAssembler::new(CompressionLevel::None)
            .assemble(&[page(1, 0)], &sources)
            .unwrap();

        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), {
            let catalog = doc.catalog().unwrap();
            catalog.get(b"Pages").unwrap().as_reference().unwrap()
        });
    }

    #[test]
    fn test_unused_source_pages_are_pruned() {
        let sources = sources(&[(1, "A", 5)]);
        let one = PageAssembler::new(CompressionLevel::None)
            .assemble(&[page(1, 0)], &sources)
            .unwrap();
        let all = PageAssembler::new(CompressionLevel::None)
            .assemble(&(0..5).map(|i| page(1, i)).collect::<Vec<_>>(), &sources)
            .unwrap();

        assert!(one.objects.len() < all.objects.len());
    }

    #[test]
    fn test_missing_page_reports_position() {
        let sources = sources(&[(1, "A", 2)]);
        let plan = [page(1, 0), page(1, 1), page(1, 7)];

        let err = PageAssembler::default().assemble(&plan, &sources).unwrap_err();

        assert!(matches!(err, PdfDeckError::PageWriteFailed { position: 2, .. }));
    }

    #[test]
    fn test_missing_source_reports_position() {
        let sources = sources(&[(1, "A", 2)]);
        let plan = [page(1, 0), page(9, 0)];

        let err = PageAssembler::default().assemble(&plan, &sources).unwrap_err();

        assert!(matches!(err, PdfDeckError::PageWriteFailed { position: 1, .. }));
    }

    #[test]
    fn test_maximum_drops_thumbnails() {
        let mut source = build_pdf("A", 1);
        let page_id = source.get_pages()[&1];
        let thumb = source.add_object(dictionary! { "Width" => 1 });
        if let Ok(Object::Dictionary(dict)) = source.get_object_mut(page_id) {
            dict.set("Thumb", thumb);
        }
        let sources = HashMap::from([(DocumentId::new(1), Arc::new(source))]);

        let standard = PageAssembler::new(CompressionLevel::Standard)
            .assemble(&[page(1, 0)], &sources)
            .unwrap();
        let maximum = PageAssembler::new(CompressionLevel::Maximum)
            .assemble(&[page(1, 0)], &sources)
            .unwrap();

        let has_thumb = |doc: &Document| {
            let id = doc.get_pages()[&1];
            doc.get_dictionary(id).unwrap().has(b"Thumb")
        };
        assert!(has_thumb(&standard));
        assert!(!has_thumb(&maximum));
    }
}
