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
pub struct NetInterfaceInfo {
    pub address: Option<String>,
    pub administrative_status: Option<String>,
    pub current_node: Option<String>,
    pub current_port: Option<String>,
    #[zapi(item = "data-protocol")]
    pub data_protocols: Vec<String>,
    pub interface_name: Option<String>,
    pub operational_status: Option<String>,
    pub role: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "net-interface-get-iter")]
pub struct NetInterfaceGetIterRequest {
    #[zapi(wrap = "net-interface-info")]
    pub desired_attributes: Option<NetInterfaceInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "net-interface-info")]
    pub query: Option<NetInterfaceInfo>,
    pub tag: Option<String>,
}

iter_request!(NetInterfaceGetIterRequest => NetInterfaceInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct IscsiServiceInfo {
    pub alias_name: Option<String>,
    pub is_available: Option<bool>,
    /// The target iqn
    pub node_name: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "iscsi-service-get-iter")]
pub struct IscsiServiceGetIterRequest {
    #[zapi(wrap = "iscsi-service-info")]
    pub desired_attributes: Option<IscsiServiceInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "iscsi-service-info")]
    pub query: Option<IscsiServiceInfo>,
    pub tag: Option<String>,
}

iter_request!(IscsiServiceGetIterRequest => IscsiServiceInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct IscsiInterfaceListEntryInfo {
    pub current_node: Option<String>,
    pub current_port: Option<String>,
    pub interface_name: Option<String>,
    pub ip_address: Option<String>,
    pub ip_port: Option<u16>,
    pub is_interface_enabled: Option<bool>,
    pub tpgroup_name: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "iscsi-interface-get-iter")]
pub struct IscsiInterfaceGetIterRequest {
    #[zapi(wrap = "iscsi-interface-list-entry-info")]
    pub desired_attributes: Option<IscsiInterfaceListEntryInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "iscsi-interface-list-entry-info")]
    pub query: Option<IscsiInterfaceListEntryInfo>,
    pub tag: Option<String>,
}

iter_request!(IscsiInterfaceGetIterRequest => IscsiInterfaceListEntryInfo);

/// The IQN of the vserver
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "iscsi-node-get-name")]
pub struct IscsiNodeGetNameRequest {}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct IscsiNodeName {
    pub node_name: Option<String>,
}

zapi_request!(IscsiNodeGetNameRequest => IscsiNodeName);

#[test]
fn test_net_interface_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("net_interface_get_iter.xml");
    let lifs: Vec<NetInterfaceInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(lifs.len(), 3);
    assert_eq!(lifs[0].data_protocols, vec!["nfs".to_string(), "cifs".to_string()]);
    assert!(lifs[2].data_protocols.is_empty());
    assert_eq!(lifs[1].address.as_deref(), Some("10.0.0.12"));
}
