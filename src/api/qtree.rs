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

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct QtreeInfo {
    pub export_policy: Option<String>,
    pub id: Option<u32>,
    pub mode: Option<String>,
    pub oplocks: Option<String>,
    pub qtree: Option<String>,
    pub security_style: Option<String>,
    pub status: Option<String>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "qtree-list-iter")]
pub struct QtreeListIterRequest {
    #[zapi(wrap = "qtree-info")]
    pub desired_attributes: Option<QtreeInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "qtree-info")]
    pub query: Option<QtreeInfo>,
    pub tag: Option<String>,
}

iter_request!(QtreeListIterRequest => QtreeInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "qtree-create")]
pub struct QtreeCreateRequest {
    pub export_policy: Option<String>,
    /// Unix permissions, e.g. 0755
    pub mode: Option<String>,
    pub oplocks: Option<String>,
    pub qtree: String,
    pub security_style: Option<String>,
    pub volume: String,
}

zapi_request!(QtreeCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "qtree-delete-async")]
pub struct QtreeDeleteAsyncRequest {
    pub force: Option<bool>,
    /// Full path, /vol/<volume>/<qtree>
    pub qtree: String,
}

zapi_request!(QtreeDeleteAsyncRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "qtree-rename")]
pub struct QtreeRenameRequest {
    pub new_qtree_name: String,
    pub qtree: String,
}

zapi_request!(QtreeRenameRequest => ());

#[test]
fn test_qtree_info_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("qtree_list_iter.xml");
    let qtrees: Vec<QtreeInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(qtrees.len(), 3);
    assert_eq!(qtrees[0].id, None);
    let q = &qtrees[1];
    assert_eq!(q.qtree.as_deref(), Some("trident_pvc_1"));
    assert_eq!(q.id, Some(1));
    assert_eq!(q.mode.as_deref(), Some("0755"));
    assert_eq!(q.export_policy.as_deref(), Some("trident_qtree_pool_export_policy"));
    assert_eq!(q.volume.as_deref(), Some("trident_qtree_pool_abc"));
}

#[test]
fn test_qtree_create_encoding() {
    let req = QtreeCreateRequest {
        qtree: "trident_pvc_1".to_string(),
        volume: "trident_qtree_pool_abc".to_string(),
        mode: Some("0755".to_string()),
        export_policy: Some("default".to_string()),
        security_style: Some("unix".to_string()),
        oplocks: None,
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains(
        "<qtree-create><export-policy>default</export-policy><mode>0755</mode>\
         <qtree>trident_pvc_1</qtree><security-style>unix</security-style>\
         <volume>trident_qtree_pool_abc</volume></qtree-create>"
    ));
}
