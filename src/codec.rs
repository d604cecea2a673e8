//! ZAPI speaks a small subset of XML: every value is an element, lists are
//! a wrapper element holding one child per entry and the only attributes
//! that matter live on the `<netapp>` and `<results>` envelope elements.
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
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::error::*;

use log::trace;
use treexml::Document;
use uuid::Uuid;
use xml::writer::{EventWriter, XmlEvent};

pub use treexml::Element;

pub type XmlWriter<W> = EventWriter<W>;

pub static ZAPI_XMLNS: &str = "http://www.netapp.com/filer/admin";
pub static NMSDK_VERSION: &str = "9.4";
pub static NMSDK_APP: &str = "ontap-zapi";

/// A value that can be decoded from a ZAPI element and written back out
/// as the body of one.
pub trait ZapiValue: Sized {
    fn from_element(element: &Element) -> ZapiResult<Self>;

    /// Write the content of the element.  The caller owns the start and
    /// end tags.
    fn write_body<W: Write>(&self, w: &mut XmlWriter<W>) -> ZapiResult<()>;
}

/// A value that always appears under the same element name, every request
/// is one of these.
pub trait ZapiElement: ZapiValue {
    const ELEMENT: &'static str;
}

fn element_text(element: &Element) -> &str {
    element.text.as_ref().map(|t| t.trim()).unwrap_or("")
}

macro_rules! scalar_value {
    ($($t:ty),*) => {$(
        impl ZapiValue for $t {
            fn from_element(element: &Element) -> ZapiResult<Self> {
                <$t>::from_str(element_text(element)).map_err(|e| {
                    ZapiError::new(format!("parsing {} failed: {}", element.name, e))
                })
            }

            fn write_body<W: Write>(&self, w: &mut XmlWriter<W>) -> ZapiResult<()> {
                w.write(XmlEvent::characters(&self.to_string()))?;
                Ok(())
            }
        }
    )*};
}

scalar_value!(bool, u8, u16, u32, u64, i32, i64);

impl ZapiValue for Uuid {
    fn from_element(element: &Element) -> ZapiResult<Self> {
        Ok(Uuid::parse_str(element_text(element))?)
    }

    fn write_body<W: Write>(&self, w: &mut XmlWriter<W>) -> ZapiResult<()> {
        w.write(XmlEvent::characters(&self.to_string()))?;
        Ok(())
    }
}

impl ZapiValue for String {
    fn from_element(element: &Element) -> ZapiResult<Self> {
        Ok(element_text(element).to_string())
    }

    fn write_body<W: Write>(&self, w: &mut XmlWriter<W>) -> ZapiResult<()> {
        // Empty strings become empty elements, desired-attributes relies on it
        if !self.is_empty() {
            w.write(XmlEvent::characters(self))?;
        }
        Ok(())
    }
}

/// Calls that return nothing but a status
impl ZapiValue for () {
    fn from_element(_element: &Element) -> ZapiResult<Self> {
        Ok(())
    }

    fn write_body<W: Write>(&self, _w: &mut XmlWriter<W>) -> ZapiResult<()> {
        Ok(())
    }
}

fn child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find(|c| c.name == name)
}

fn locate<'a>(parent: &'a Element, name: &str, wrap: Option<&str>) -> Option<&'a Element> {
    let outer = child(parent, name)?;
    match wrap {
        Some(inner) => child(outer, inner),
        None => Some(outer),
    }
}

pub fn read_required<T: ZapiValue>(
    parent: &Element,
    name: &str,
    wrap: Option<&str>,
) -> ZapiResult<T> {
    let e = locate(parent, name, wrap)
        .ok_or_else(|| ZapiError::new(format!("{} not found in {}", name, parent.name)))?;
    T::from_element(e)
}

pub fn read_optional<T: ZapiValue>(
    parent: &Element,
    name: &str,
    wrap: Option<&str>,
) -> ZapiResult<Option<T>> {
    match locate(parent, name, wrap) {
        Some(e) => Ok(Some(T::from_element(e)?)),
        None => Ok(None),
    }
}

/// Every child of the list element is decoded regardless of its name
pub fn read_list<T: ZapiValue>(parent: &Element, name: &str) -> ZapiResult<Vec<T>> {
    match child(parent, name) {
        Some(list) => list.children.iter().map(T::from_element).collect(),
        None => Ok(Vec::new()),
    }
}

pub fn write_required<W: Write, T: ZapiValue>(
    w: &mut XmlWriter<W>,
    name: &str,
    wrap: Option<&str>,
    value: &T,
) -> ZapiResult<()> {
    w.write(XmlEvent::start_element(name))?;
    if let Some(inner) = wrap {
        w.write(XmlEvent::start_element(inner))?;
    }
    value.write_body(w)?;
    if wrap.is_some() {
        w.write(XmlEvent::end_element())?;
    }
    w.write(XmlEvent::end_element())?;
    Ok(())
}

pub fn write_optional<W: Write, T: ZapiValue>(
    w: &mut XmlWriter<W>,
    name: &str,
    wrap: Option<&str>,
    value: &Option<T>,
) -> ZapiResult<()> {
    match value {
        Some(v) => write_required(w, name, wrap, v),
        None => Ok(()),
    }
}

pub fn write_list<W: Write, T: ZapiValue>(
    w: &mut XmlWriter<W>,
    name: &str,
    item: &str,
    values: &[T],
) -> ZapiResult<()> {
    if values.is_empty() {
        return Ok(());
    }
    w.write(XmlEvent::start_element(name))?;
    for v in values {
        write_required(w, item, None, v)?;
    }
    w.write(XmlEvent::end_element())?;
    Ok(())
}

/// The status attributes carried on every `<results>` element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultStatus {
    pub status: String,
    pub reason: String,
    pub errno: String,
}

impl ResultStatus {
    pub fn from_results(results: &Element) -> Self {
        let attr = |name: &str| results.attributes.get(name).cloned().unwrap_or_default();
        ResultStatus {
            status: attr("status"),
            reason: attr("reason"),
            errno: attr("errno"),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == "passed"
    }

    pub fn is_privilege_error(&self) -> bool {
        self.errno == EAPIPRIVILEGE
    }

    /// The call is either not permitted or unknown at the current scope
    /// (cluster vs vserver)
    pub fn is_scope_error(&self) -> bool {
        self.errno == EAPIPRIVILEGE || self.errno == EAPINOTFOUND
    }

    pub fn is_failed_to_load_job_error(&self) -> bool {
        self.errno == EINTERNALERROR && self.reason.contains("Failed to load job")
    }

    pub fn is_not_found(&self) -> bool {
        self.errno == EOBJECTNOTFOUND || self.errno == EVOLUMEDOESNOTEXIST
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_passed() {
            return f.write_str("API status: passed");
        }
        write!(
            f,
            "API status: {}, Reason: {}, Code: {}",
            self.status, self.reason, self.errno
        )
    }
}

fn start_request<W: Write>(
    w: &mut XmlWriter<W>,
    vfiler: Option<&str>,
    version: &str,
) -> ZapiResult<()> {
    // The array logs which platform the sdk client runs on
    let sys_info = uname::uname()?;
    let platform = format!("{} {}", sys_info.sysname, sys_info.machine);

    let mut e = XmlEvent::start_element("netapp")
        .default_ns(ZAPI_XMLNS)
        .attr("version", version)
        .attr("nmsdk_version", NMSDK_VERSION)
        .attr("nmsdk_platform", &platform)
        .attr("nmsdk_language", "rust")
        .attr("nmsdk_app", NMSDK_APP);
    if let Some(svm) = vfiler {
        e = e.attr("vfiler", svm);
    }
    w.write(e)?;
    Ok(())
}

/// Serialize a request inside the `<netapp>` envelope.  Passing a vfiler
/// tunnels the call to that vserver.
pub fn write_request<R: ZapiElement>(
    request: &R,
    vfiler: Option<&str>,
    version: &str,
) -> ZapiResult<Vec<u8>> {
    let mut output: Vec<u8> = Vec::new();
    {
        let mut writer = EventWriter::new(&mut output);
        start_request(&mut writer, vfiler, version)?;
        writer.write(XmlEvent::start_element(R::ELEMENT))?;
        request.write_body(&mut writer)?;
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
    }
    Ok(output)
}

/// Parse a reply down to its `<results>` element
pub fn parse_results(data: &str) -> ZapiResult<(ResultStatus, Element)> {
    let doc = Document::parse(data.as_bytes())?;
    let root = doc
        .root
        .ok_or_else(|| ZapiError::new(format!("root xml not found for {}", data)))?;
    if root.name != "netapp" {
        return Err(ZapiError::new(format!(
            "expected netapp root element, found {}",
            root.name
        )));
    }
    let results = root
        .children
        .into_iter()
        .find(|c| c.name == "results")
        .ok_or_else(|| ZapiError::new("results tag not found in response".to_string()))?;
    let status = ResultStatus::from_results(&results);
    trace!("results status: {:?}", status);

    Ok((status, results))
}

#[cfg(test)]
fn parse_element(data: &str) -> Element {
    Document::parse(data.as_bytes()).unwrap().root.unwrap()
}

#[test]
fn test_read_scalars() {
    let e = parse_element(
        "<volume-space-attributes>\
           <size> 1073741824 </size>\
           <is-space-guarantee-enabled>true</is-space-guarantee-enabled>\
           <space-guarantee>none</space-guarantee>\
         </volume-space-attributes>",
    );
    let size: u64 = read_required(&e, "size", None).unwrap();
    assert_eq!(size, 1_073_741_824);
    let enabled: Option<bool> = read_optional(&e, "is-space-guarantee-enabled", None).unwrap();
    assert_eq!(enabled, Some(true));
    let missing: Option<u64> = read_optional(&e, "size-used", None).unwrap();
    assert_eq!(missing, None);
    assert!(read_required::<u64>(&e, "size-used", None).is_err());
    let guarantee: String = read_required(&e, "space-guarantee", None).unwrap();
    assert_eq!(guarantee, "none");
}

#[test]
fn test_bad_scalar_names_element() {
    let e = parse_element("<lun-info><size>lots</size></lun-info>");
    let err = read_required::<u64>(&e, "size", None).unwrap_err();
    assert!(err.to_string().contains("size"));
}

#[test]
fn test_bad_uuid() {
    let e = parse_element(
        "<snapshot-info><snapshot-instance-uuid>not-a-uuid</snapshot-instance-uuid></snapshot-info>",
    );
    match read_required::<Uuid>(&e, "snapshot-instance-uuid", None) {
        Err(ZapiError::UuidError(_)) => {}
        other => panic!("expected a uuid error, got {:?}", other),
    }
}

#[test]
fn test_read_list_and_wrap() {
    let e = parse_element(
        "<vserver-info>\
           <aggr-list><aggr-name>aggr1</aggr-name><aggr-name>aggr2</aggr-name></aggr-list>\
           <query><volume-id-attributes><name>vol1</name></volume-id-attributes></query>\
         </vserver-info>",
    );
    let aggrs: Vec<String> = read_list(&e, "aggr-list").unwrap();
    assert_eq!(aggrs, vec!["aggr1".to_string(), "aggr2".to_string()]);
    let none: Vec<String> = read_list(&e, "nodes").unwrap();
    assert!(none.is_empty());

    let wrapped = locate(&e, "query", Some("volume-id-attributes")).unwrap();
    let name: String = read_required(wrapped, "name", None).unwrap();
    assert_eq!(name, "vol1");
}

#[test]
fn test_write_fields() {
    let mut output: Vec<u8> = Vec::new();
    {
        let mut w = xml::writer::EmitterConfig::new()
            .write_document_declaration(false)
            .create_writer(&mut output);
        w.write(XmlEvent::start_element("volume-size")).unwrap();
        write_required(&mut w, "volume", None, &"vol1".to_string()).unwrap();
        write_optional::<_, String>(&mut w, "new-size", None, &None).unwrap();
        write_optional(&mut w, "name", Some("inner"), &Some(String::new())).unwrap();
        write_list(&mut w, "aggr-list", "aggr-name", &["a1".to_string()]).unwrap();
        write_list::<_, String>(&mut w, "nodes", "node-name", &[]).unwrap();
        w.write(XmlEvent::end_element()).unwrap();
    }
    let s = String::from_utf8(output).unwrap();
    assert!(s.contains("<volume>vol1</volume>"));
    assert!(!s.contains("new-size"));
    assert!(s.contains("<name><inner"));
    assert!(s.contains("<aggr-list><aggr-name>a1</aggr-name></aggr-list>"));
    assert!(!s.contains("nodes"));
}

#[test]
fn test_parse_results_status() {
    let (status, results) = parse_results(
        r#"<?xml version='1.0' encoding='UTF-8' ?>
        <netapp version='1.21' xmlns='http://www.netapp.com/filer/admin'>
          <results status="failed" errno="13005" reason="Unable to find API: bogus-call"/>
        </netapp>"#,
    )
    .unwrap();
    assert_eq!(results.name, "results");
    assert!(!status.is_passed());
    assert!(status.is_scope_error());
    assert!(!status.is_privilege_error());
    assert_eq!(
        status.to_string(),
        "API status: failed, Reason: Unable to find API: bogus-call, Code: 13005"
    );
}

#[test]
fn test_parse_results_requires_envelope() {
    assert!(parse_results("<nope><results status=\"passed\"/></nope>").is_err());
    assert!(parse_results("<netapp version='1.21'></netapp>").is_err());
}
