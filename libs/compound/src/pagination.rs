//! Page accumulation for paginated list endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::document::{assemble, PaginatedDocument, ResultsWithReferences};
use crate::error::DocumentError;
use crate::reference::RawReference;

/// Page numbers are 1-based.
pub const FIRST_PAGE: u32 = 1;

/// One page of a paginated compound document.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub data: Vec<RawReference>,
    pub included: Vec<RawReference>,
    pub has_more: bool,
}

impl From<PaginatedDocument> for Page {
    fn from(doc: PaginatedDocument) -> Self {
        let has_more = doc.has_more();
        Self {
            data: doc.data,
            included: doc.included,
            has_more,
        }
    }
}

/// Fetches pages of a paginated endpoint.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Error: Send;

    /// Fetches the given 1-based page.
    async fn fetch_page(&self, page: u32) -> Result<Page, Self::Error>;
}

/// Every page's primary and included resources, concatenated in fetch
/// order.
#[derive(Debug, Clone, Default)]
pub struct AccumulatedPages {
    data: Vec<RawReference>,
    included: Vec<RawReference>,
    pages: u32,
}

impl AccumulatedPages {
    pub fn data(&self) -> &[RawReference] {
        &self.data
    }

    pub fn included(&self) -> &[RawReference] {
        &self.included
    }

    /// Number of pages fetched.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Assembles the accumulated resources into one document.
    pub fn assemble<T: DeserializeOwned>(self) -> Result<ResultsWithReferences<T>, DocumentError> {
        assemble(self.data, self.included)
    }
}

/// Fetches pages from `source` starting at [`FIRST_PAGE`] until a page
/// reports no more pages.
///
/// Fetches are sequential. The first failed fetch aborts and its error is
/// returned; pages fetched before it are dropped.
pub async fn accumulate_pages<S>(source: &S) -> Result<AccumulatedPages, S::Error>
where
    S: PageSource + ?Sized,
{
    let mut acc = AccumulatedPages::default();
    let mut page = FIRST_PAGE;

    loop {
        let Page {
            data,
            included,
            has_more,
        } = source.fetch_page(page).await?;

        let data_count = data.len();
        let included_count = included.len();
        acc.data.extend(data);
        acc.included.extend(included);
        acc.pages = page;

        debug!(
            page,
            data_count,
            data_count_total = acc.data.len(),
            included_count,
            included_count_total = acc.included.len(),
            has_more,
            "Fetched page"
        );

        if !has_more {
            return Ok(acc);
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmx_id::Id;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Named {
        name: String,
    }

    /// Serves canned pages and records which page numbers were asked for.
    struct CannedPages {
        pages: Mutex<VecDeque<Result<Page, String>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl CannedPages {
        fn new(pages: Vec<Result<Page, String>>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for CannedPages {
        type Error = String;

        async fn fetch_page(&self, page: u32) -> Result<Page, String> {
            self.requested.lock().unwrap().push(page);
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(format!("no page {page}")))
        }
    }

    fn raw(id: &str, name: &str) -> RawReference {
        serde_json::from_value(json!({"id": id, "type": "things", "name": name})).unwrap()
    }

    fn page(data: Vec<RawReference>, included: Vec<RawReference>, has_more: bool) -> Page {
        Page {
            data,
            included,
            has_more,
        }
    }

    #[tokio::test]
    async fn test_two_pages_assemble_in_order() {
        let source = CannedPages::new(vec![
            Ok(page(vec![raw("1", "a"), raw("2", "b")], vec![raw("10", "x")], true)),
            Ok(page(vec![raw("3", "c")], vec![raw("11", "y")], false)),
        ]);

        let acc = accumulate_pages(&source).await.unwrap();
        assert_eq!(acc.pages(), 2);
        assert_eq!(acc.data().len(), 3);
        assert_eq!(acc.included().len(), 2);
        assert_eq!(source.requested(), vec![1, 2]);

        let results = acc.assemble::<Named>().unwrap();
        let names: Vec<_> = results.data().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(results.refs().len(), 5);
        for id in [1, 2, 3, 10, 11] {
            assert!(results.refs().contains(Id::new(id)));
        }
    }

    #[tokio::test]
    async fn test_single_page() {
        let source = CannedPages::new(vec![Ok(page(vec![raw("1", "a")], vec![], false))]);
        let acc = accumulate_pages(&source).await.unwrap();
        assert_eq!(acc.pages(), 1);
        assert_eq!(source.requested(), vec![1]);
    }

    #[tokio::test]
    async fn test_failure_discards_earlier_pages() {
        let source = CannedPages::new(vec![
            Ok(page(vec![raw("1", "a")], vec![], true)),
            Err("connection reset".to_string()),
            Ok(page(vec![raw("3", "c")], vec![], false)),
        ]);

        let err = accumulate_pages(&source).await.unwrap_err();
        assert_eq!(err, "connection reset");
        assert_eq!(source.requested(), vec![1, 2]);
    }

    #[test]
    fn test_page_from_paginated_document() {
        let doc: PaginatedDocument = serde_json::from_value(json!({
            "data": [{"id": "1", "type": "things", "name": "a"}],
            "included": [],
            "links": {"next": "2"}
        }))
        .unwrap();

        let page = Page::from(doc);
        assert!(page.has_more);
        assert_eq!(page.data.len(), 1);
    }
}
