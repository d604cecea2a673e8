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
use crate::api::job::AsyncResult;

/// Limits are in KB, "-" means unlimited
#[derive(Clone, Debug, Default, ZapiObject)]
pub struct QuotaEntry {
    pub disk_limit: Option<String>,
    pub file_limit: Option<String>,
    pub policy: Option<String>,
    pub qtree: Option<String>,
    pub quota_target: Option<String>,
    /// user, group or tree
    pub quota_type: Option<String>,
    pub soft_disk_limit: Option<String>,
    pub soft_file_limit: Option<String>,
    pub threshold: Option<String>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-list-entries-iter")]
pub struct QuotaListEntriesIterRequest {
    #[zapi(wrap = "quota-entry")]
    pub desired_attributes: Option<QuotaEntry>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "quota-entry")]
    pub query: Option<QuotaEntry>,
    pub tag: Option<String>,
}

iter_request!(QuotaListEntriesIterRequest => QuotaEntry);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-set-entry")]
pub struct QuotaSetEntryRequest {
    pub disk_limit: Option<String>,
    pub file_limit: Option<String>,
    pub policy: Option<String>,
    pub qtree: String,
    pub quota_target: String,
    pub quota_type: String,
    pub soft_disk_limit: Option<String>,
    pub soft_file_limit: Option<String>,
    pub threshold: Option<String>,
    pub volume: String,
}

zapi_request!(QuotaSetEntryRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-on")]
pub struct QuotaOnRequest {
    pub volume: String,
}

zapi_request!(QuotaOnRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-off")]
pub struct QuotaOffRequest {
    pub volume: String,
}

zapi_request!(QuotaOffRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-resize")]
pub struct QuotaResizeRequest {
    pub volume: String,
}

zapi_request!(QuotaResizeRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "quota-status")]
pub struct QuotaStatusRequest {
    pub volume: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct QuotaStatus {
    pub percent_complete: Option<u32>,
    pub quota_errors: Option<String>,
    pub reason: Option<String>,
    /// on, off, resizing, initializing or shutting down
    pub status: Option<String>,
    pub substatus: Option<String>,
}

zapi_request!(QuotaStatusRequest => QuotaStatus);

#[test]
fn test_quota_entry_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("quota_list_entries_iter.xml");
    let entries: Vec<QuotaEntry> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.disk_limit.as_deref(), Some("1048576"));
    assert_eq!(entry.file_limit.as_deref(), Some("-"));
    assert_eq!(
        entry.quota_target.as_deref(),
        Some("/vol/trident_qtree_pool_abc/trident_pvc_1")
    );
    assert_eq!(entry.quota_type.as_deref(), Some("tree"));
}

#[test]
fn test_quota_list_entries_wrap() {
    let req = QuotaListEntriesIterRequest {
        query: Some(QuotaEntry {
            quota_target: Some("/vol/v/q".to_string()),
            quota_type: Some("tree".to_string()),
            ..Default::default()
        }),
        desired_attributes: Some(QuotaEntry {
            disk_limit: Some(String::new()),
            ..Default::default()
        }),
        max_records: Some(100),
        tag: None,
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains("<quota-list-entries-iter><desired-attributes><quota-entry><disk-limit"));
    assert!(body.contains(
        "<query><quota-entry><quota-target>/vol/v/q</quota-target>\
         <quota-type>tree</quota-type></quota-entry></query>"
    ));
}

#[test]
fn test_quota_status_decode() {
    use crate::codec::ZapiValue;

    let results = crate::api::fixture_results("quota_status.xml");
    let status = QuotaStatus::from_element(&results).unwrap();
    assert_eq!(status.status.as_deref(), Some("on"));
    assert_eq!(status.substatus.as_deref(), Some("none"));
    assert_eq!(status.percent_complete, Some(100));
}
