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
pub struct InitiatorInfo {
    pub initiator_name: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct InitiatorGroupInfo {
    pub initiator_group_name: Option<String>,
    pub initiator_group_os_type: Option<String>,
    /// iscsi, fcp or mixed
    pub initiator_group_type: Option<String>,
    pub initiator_group_uuid: Option<String>,
    #[zapi(item = "initiator-info")]
    pub initiators: Vec<InitiatorInfo>,
    /// Only reported by lun-map-list-info
    pub lun_id: Option<u32>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "igroup-get-iter")]
pub struct IgroupGetIterRequest {
    #[zapi(wrap = "initiator-group-info")]
    pub desired_attributes: Option<InitiatorGroupInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "initiator-group-info")]
    pub query: Option<InitiatorGroupInfo>,
    pub tag: Option<String>,
}

iter_request!(IgroupGetIterRequest => InitiatorGroupInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "igroup-create")]
pub struct IgroupCreateRequest {
    pub initiator_group_name: String,
    pub initiator_group_type: Option<String>,
    pub os_type: Option<String>,
}

zapi_request!(IgroupCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "igroup-add")]
pub struct IgroupAddRequest {
    pub force: Option<bool>,
    pub initiator: String,
    pub initiator_group_name: String,
}

zapi_request!(IgroupAddRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "igroup-remove")]
pub struct IgroupRemoveRequest {
    pub force: Option<bool>,
    pub initiator: String,
    pub initiator_group_name: String,
}

zapi_request!(IgroupRemoveRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "igroup-destroy")]
pub struct IgroupDestroyRequest {
    pub force: Option<bool>,
    pub initiator_group_name: String,
}

zapi_request!(IgroupDestroyRequest => ());

#[test]
fn test_igroup_add_encoding() {
    let req = IgroupAddRequest {
        initiator: "iqn.1993-08.org.debian:01:8c2ad6b9e5".to_string(),
        initiator_group_name: "trident".to_string(),
        force: None,
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains(
        "<igroup-add><initiator>iqn.1993-08.org.debian:01:8c2ad6b9e5</initiator>\
         <initiator-group-name>trident</initiator-group-name></igroup-add>"
    ));
}
