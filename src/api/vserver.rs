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

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VserverAggrInfo {
    pub aggr_availsize: Option<u64>,
    pub aggr_name: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VserverInfo {
    #[zapi(item = "aggr-name")]
    pub aggr_list: Vec<String>,
    #[zapi(item = "protocol")]
    pub allowed_protocols: Vec<String>,
    pub comment: Option<String>,
    pub operational_state: Option<String>,
    pub root_volume: Option<String>,
    pub state: Option<String>,
    pub uuid: Option<String>,
    #[zapi(item = "vserver-aggr-info")]
    pub vserver_aggr_info_list: Vec<VserverAggrInfo>,
    pub vserver_name: Option<String>,
    /// admin, node, system or data
    pub vserver_type: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "vserver-get-iter")]
pub struct VserverGetIterRequest {
    #[zapi(wrap = "vserver-info")]
    pub desired_attributes: Option<VserverInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "vserver-info")]
    pub query: Option<VserverInfo>,
    pub tag: Option<String>,
}

iter_request!(VserverGetIterRequest => VserverInfo);

/// Only valid when tunneled to a vserver
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "vserver-get")]
pub struct VserverGetRequest {
    #[zapi(wrap = "vserver-info")]
    pub desired_attributes: Option<VserverInfo>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VserverGetResponse {
    #[zapi(wrap = "vserver-info")]
    pub attributes: Option<VserverInfo>,
}

zapi_request!(VserverGetRequest => VserverGetResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct ShowAggregates {
    pub aggregate_name: Option<String>,
    pub aggregate_type: Option<String>,
    pub available_size: Option<u64>,
    pub snaplock_type: Option<String>,
    pub vserver_name: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "vserver-show-aggr-get-iter")]
pub struct VserverShowAggrGetIterRequest {
    #[zapi(wrap = "show-aggregates")]
    pub desired_attributes: Option<ShowAggregates>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "show-aggregates")]
    pub query: Option<ShowAggregates>,
    pub tag: Option<String>,
    pub vserver: Option<String>,
}

iter_request!(VserverShowAggrGetIterRequest => ShowAggregates);

#[test]
fn test_vserver_info_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("vserver_get_iter.xml");
    let vservers: Vec<VserverInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(vservers.len(), 1);
    let svm = &vservers[0];
    assert_eq!(svm.vserver_name.as_deref(), Some("svm_iscsi"));
    assert_eq!(svm.allowed_protocols, vec!["nfs".to_string(), "iscsi".to_string()]);
    let aggrs: Vec<&str> = svm
        .vserver_aggr_info_list
        .iter()
        .map(|a| a.aggr_name.as_str())
        .collect();
    assert_eq!(aggrs, vec!["aggr1", "aggr2"]);
    assert_eq!(svm.vserver_aggr_info_list[0].aggr_availsize, Some(858_993_459_200));
}
