//! The get-iter calls page through large result sets.  Each reply carries
//! a page of records, an optional `next-tag` and a `num-records` count.
//! Feeding `next-tag` back as the `tag` of the next request fetches the
//! following page.
/**
* Copyright 2019 Comcast Cable Communications Management, LLC
*
* Licensed under the Apache License, Version 2.0 (the "License");
* you may not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
* http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing, software
* distributed under the License is distributed on an "AS IS" BASIS,
* WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
* See the License for the specific language governing permissions and
* limitations under the License.
*
* SPDX-License-Identifier: Apache-2.0
*/
use std::marker::PhantomData;

use crate::codec::{self, Element, ResultStatus, ZapiElement, ZapiValue};
use crate::error::*;

use log::debug;

/// A request that pages through `attributes-list` records
pub trait IterRequest: ZapiElement + Clone {
    type Item: ZapiValue;

    /// Element holding the records of a page
    const LIST_ELEMENT: &'static str = "attributes-list";

    fn set_tag(&mut self, tag: String);

    fn set_max_records(&mut self, max_records: u32);
}

/// One page, or the merged result of all pages
#[derive(Clone, Debug)]
pub struct PagedResponse<T> {
    pub status: ResultStatus,
    pub records: Vec<T>,
    pub next_tag: Option<String>,
    pub num_records: Option<u64>,
}

impl<T> Default for PagedResponse<T> {
    fn default() -> Self {
        PagedResponse {
            status: ResultStatus::default(),
            records: Vec::new(),
            next_tag: None,
            num_records: None,
        }
    }
}

impl<T: ZapiValue> PagedResponse<T> {
    pub fn from_results(
        status: ResultStatus,
        results: &Element,
        list_element: &str,
    ) -> ZapiResult<Self> {
        Ok(PagedResponse {
            status,
            records: codec::read_list(results, list_element)?,
            next_tag: codec::read_optional(results, "next-tag", None)?,
            num_records: codec::read_optional(results, "num-records", None)?,
        })
    }
}

/// Tracks the continuation tag between pages and decides when to stop.
/// Iteration ends once a page comes back without a `next-tag`, or with a
/// missing or zero `num-records`.
#[derive(Clone, Debug, Default)]
pub struct Cursor {
    tag: Option<String>,
    done: bool,
}

impl Cursor {
    /// Tag to send with the next request.  None on the first page.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Record the markers of the page just read.  Returns true if it was
    /// the last one.
    pub fn advance(&mut self, next_tag: Option<&str>, num_records: Option<u64>) -> bool {
        match next_tag {
            Some(t) => self.tag = Some(t.to_string()),
            None => self.done = true,
        }
        match num_records {
            None | Some(0) => self.done = true,
            Some(_) => {}
        }
        self.done
    }

    pub fn finish(&mut self) {
        self.done = true;
    }
}

/// Fetch every page and merge the records in order.  `fetch` receives the
/// tag to continue from.  The first error aborts the whole walk and no
/// partial result is returned.
pub fn collect_pages<T, F>(mut fetch: F) -> ZapiResult<PagedResponse<T>>
where
    F: FnMut(Option<&str>) -> ZapiResult<PagedResponse<T>>,
{
    let mut cursor = Cursor::default();
    let mut combined: PagedResponse<T> = PagedResponse::default();
    let mut page_count = 0;
    while !cursor.is_done() {
        let page = fetch(cursor.tag())?;
        page_count += 1;
        cursor.advance(page.next_tag.as_deref(), page.num_records);
        combined.records.extend(page.records);
        // The merged result reports the status of the final page
        combined.status = page.status;
    }
    combined.num_records = Some(combined.records.len() as u64);
    debug!(
        "collected {} records over {} pages",
        combined.records.len(),
        page_count
    );

    Ok(combined)
}

/// Lazily walk the pages of a get-iter call
pub struct Pages<T, F> {
    fetch: F,
    cursor: Cursor,
    _item: PhantomData<T>,
}

impl<T, F> Pages<T, F>
where
    F: FnMut(Option<&str>) -> ZapiResult<PagedResponse<T>>,
{
    pub fn new(fetch: F) -> Self {
        Pages {
            fetch,
            cursor: Cursor::default(),
            _item: PhantomData,
        }
    }
}

impl<T, F> Iterator for Pages<T, F>
where
    F: FnMut(Option<&str>) -> ZapiResult<PagedResponse<T>>,
{
    type Item = ZapiResult<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.is_done() {
            return None;
        }
        match (self.fetch)(self.cursor.tag()) {
            Ok(page) => {
                self.cursor
                    .advance(page.next_tag.as_deref(), page.num_records);
                Some(Ok(page.records))
            }
            Err(e) => {
                self.cursor.finish();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
fn page(records: &[&str], next_tag: Option<&str>, num_records: Option<u64>) -> PagedResponse<String> {
    PagedResponse {
        status: ResultStatus {
            status: "passed".into(),
            ..Default::default()
        },
        records: records.iter().map(|r| r.to_string()).collect(),
        next_tag: next_tag.map(|t| t.to_string()),
        num_records,
    }
}

#[test]
fn test_collect_follows_tags() {
    let mut seen: Vec<Option<String>> = Vec::new();
    let res = collect_pages(|tag| {
        seen.push(tag.map(|t| t.to_string()));
        Ok(match tag {
            None => page(&["vol1", "vol2"], Some("t1"), Some(2)),
            Some("t1") => page(&["vol3", "vol4"], Some("t2"), Some(2)),
            Some("t2") => page(&["vol5"], None, Some(1)),
            Some(other) => panic!("unexpected tag {}", other),
        })
    })
    .unwrap();
    assert_eq!(res.records, vec!["vol1", "vol2", "vol3", "vol4", "vol5"]);
    assert_eq!(res.num_records, Some(5));
    assert_eq!(res.next_tag, None);
    assert!(res.status.is_passed());
    assert_eq!(
        seen,
        vec![None, Some("t1".to_string()), Some("t2".to_string())]
    );
}

#[test]
fn test_collect_stops_on_zero_records() {
    // A tag with an empty page must not loop forever
    let mut calls = 0;
    let res = collect_pages(|_tag| {
        calls += 1;
        Ok(if calls == 1 {
            page(&["a"], Some("t1"), Some(1))
        } else {
            page(&[], Some("t2"), Some(0))
        })
    })
    .unwrap();
    assert_eq!(calls, 2);
    assert_eq!(res.records, vec!["a"]);
    assert_eq!(res.num_records, Some(1));
}

#[test]
fn test_collect_stops_without_num_records() {
    let mut calls = 0;
    let res = collect_pages(|_tag| {
        calls += 1;
        Ok(page(&["a", "b"], Some("more"), None))
    })
    .unwrap();
    assert_eq!(calls, 1);
    assert_eq!(res.num_records, Some(2));
}

#[test]
fn test_collect_aborts_on_error() {
    let mut calls = 0;
    let res: ZapiResult<PagedResponse<String>> = collect_pages(|_tag| {
        calls += 1;
        if calls == 1 {
            Ok(page(&["a"], Some("t1"), Some(1)))
        } else {
            Err(ZapiError::new("connection reset".to_string()))
        }
    });
    assert!(res.is_err());
    assert_eq!(calls, 2);
}

#[test]
fn test_pages_iterator() {
    let pages = Pages::new(|tag: Option<&str>| {
        Ok(match tag {
            None => page(&["a", "b"], Some("t1"), Some(2)),
            _ => page(&["c"], None, Some(1)),
        })
    });
    let all: Vec<Vec<String>> = pages.map(|p| p.unwrap()).collect();
    assert_eq!(all, vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]);
}

#[test]
fn test_pages_stop_after_error() {
    let mut pages = Pages::new(|_tag: Option<&str>| -> ZapiResult<PagedResponse<String>> {
        Err(ZapiError::Unauthorized)
    });
    assert!(pages.next().unwrap().is_err());
    assert!(pages.next().is_none());
}
