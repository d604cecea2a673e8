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
use crate::api::igroup::InitiatorGroupInfo;

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunInfo {
    pub comment: Option<String>,
    pub is_space_alloc_enabled: Option<bool>,
    pub is_space_reservation_enabled: Option<bool>,
    pub mapped: Option<bool>,
    pub multiprotocol_type: Option<String>,
    pub online: Option<bool>,
    pub path: Option<String>,
    pub qtree: Option<String>,
    pub serial_number: Option<String>,
    pub size: Option<u64>,
    pub size_used: Option<u64>,
    pub state: Option<String>,
    pub uuid: Option<String>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-get-iter")]
pub struct LunGetIterRequest {
    #[zapi(wrap = "lun-info")]
    pub desired_attributes: Option<LunInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "lun-info")]
    pub query: Option<LunInfo>,
    pub tag: Option<String>,
}

iter_request!(LunGetIterRequest => LunInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunSizeResponse {
    pub actual_size: Option<u64>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-create-by-size")]
pub struct LunCreateBySizeRequest {
    pub comment: Option<String>,
    pub ostype: Option<String>,
    pub path: String,
    pub size: u64,
    pub space_allocation_enabled: Option<bool>,
    pub space_reservation_enabled: Option<bool>,
}

zapi_request!(LunCreateBySizeRequest => LunSizeResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-destroy")]
pub struct LunDestroyRequest {
    pub force: Option<bool>,
    pub path: String,
}

zapi_request!(LunDestroyRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-map")]
pub struct LunMapRequest {
    pub force: Option<bool>,
    pub initiator_group: String,
    /// Let the array pick when unset
    pub lun_id: Option<u32>,
    pub path: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunMapResponse {
    pub lun_id_assigned: Option<u32>,
}

zapi_request!(LunMapRequest => LunMapResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-get-serial-number")]
pub struct LunGetSerialNumberRequest {
    pub path: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunSerialNumber {
    pub serial_number: Option<String>,
}

zapi_request!(LunGetSerialNumberRequest => LunSerialNumber);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-resize")]
pub struct LunResizeRequest {
    pub force: Option<bool>,
    pub path: String,
    pub size: u64,
}

zapi_request!(LunResizeRequest => LunSizeResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-online")]
pub struct LunOnlineRequest {
    pub path: String,
}

zapi_request!(LunOnlineRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-offline")]
pub struct LunOfflineRequest {
    pub path: String,
}

zapi_request!(LunOfflineRequest => ());

/// equivalent to filer::> lun mapped show -vserver iscsi_vs -path /vol/v/lun0
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-map-list-info")]
pub struct LunMapListInfoRequest {
    pub path: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunMapListInfo {
    #[zapi(item = "initiator-group-info")]
    pub initiator_groups: Vec<InitiatorGroupInfo>,
}

zapi_request!(LunMapListInfoRequest => LunMapListInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-set-attribute")]
pub struct LunSetAttributeRequest {
    pub name: String,
    pub path: String,
    pub value: String,
}

zapi_request!(LunSetAttributeRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-get-attribute")]
pub struct LunGetAttributeRequest {
    pub name: String,
    pub path: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunAttribute {
    pub value: Option<String>,
}

zapi_request!(LunGetAttributeRequest => LunAttribute);

/// Sub-file clone of a LUN within one volume
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "clone-create")]
pub struct CloneCreateRequest {
    pub destination_path: String,
    pub source_path: String,
    pub space_reserve: Option<bool>,
    pub volume: String,
}

zapi_request!(CloneCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "lun-get-geometry")]
pub struct LunGetGeometryRequest {
    pub path: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct LunGeometry {
    pub bytes_per_sector: Option<u32>,
    pub cylinders: Option<u64>,
    /// Largest size the LUN can be resized to, in bytes
    pub max_resize_size: Option<u64>,
    pub sectors_per_track: Option<u32>,
    pub size: Option<u64>,
    pub tracks_per_cylinder: Option<u32>,
}

zapi_request!(LunGetGeometryRequest => LunGeometry);

#[test]
fn test_lun_info_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("lun_get_iter.xml");
    let luns: Vec<LunInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(luns.len(), 1);
    assert_eq!(luns[0].path.as_deref(), Some("/vol/trident_lun_pool/lun0"));
    assert_eq!(luns[0].size, Some(2_147_483_648));
    assert_eq!(luns[0].mapped, Some(true));
    assert_eq!(luns[0].multiprotocol_type.as_deref(), Some("linux"));
}

#[test]
fn test_lun_map_list_info_decode() {
    use crate::codec::ZapiValue;

    let results = crate::api::fixture_results("lun_map_list_info.xml");
    let info = LunMapListInfo::from_element(&results).unwrap();
    assert_eq!(info.initiator_groups.len(), 2);
    let trident = &info.initiator_groups[1];
    assert_eq!(trident.initiator_group_name.as_deref(), Some("trident"));
    assert_eq!(trident.lun_id, Some(3));
    assert_eq!(trident.initiators.len(), 1);
}

#[test]
fn test_lun_geometry_decode() {
    use crate::codec::ZapiValue;

    let results = crate::api::fixture_results("lun_get_geometry.xml");
    let geometry = LunGeometry::from_element(&results).unwrap();
    assert_eq!(geometry.max_resize_size, Some(68_719_476_736));
    assert_eq!(geometry.bytes_per_sector, Some(512));
}
