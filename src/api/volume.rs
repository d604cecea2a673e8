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
use crate::api::job::{AsyncResponse, AsyncResult};

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeIdAttributes {
    #[zapi(item = "aggr-name")]
    pub aggr_list: Vec<String>,
    pub comment: Option<String>,
    pub containing_aggregate_name: Option<String>,
    pub instance_uuid: Option<String>,
    pub junction_path: Option<String>,
    pub name: Option<String>,
    pub node: Option<String>,
    pub owning_vserver_name: Option<String>,
    /// flexvol or flexgroup
    pub style_extended: Option<String>,
    #[zapi(rename = "type")]
    pub volume_type: Option<String>,
    pub uuid: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSpaceAttributes {
    pub is_space_guarantee_enabled: Option<bool>,
    pub percentage_snapshot_reserve: Option<u32>,
    pub size: Option<u64>,
    pub size_available: Option<u64>,
    pub size_total: Option<u64>,
    pub size_used: Option<u64>,
    pub space_guarantee: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeStateAttributes {
    pub is_flexgroup: Option<bool>,
    pub is_junction_active: Option<bool>,
    pub is_vserver_root: Option<bool>,
    /// online, offline, restricted or mixed
    pub state: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeExportAttributes {
    pub policy: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSecurityUnixAttributes {
    pub group_id: Option<u32>,
    pub permissions: Option<String>,
    pub user_id: Option<u32>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSecurityAttributes {
    pub style: Option<String>,
    pub volume_security_unix_attributes: Option<VolumeSecurityUnixAttributes>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSnapshotAttributes {
    pub snapdir_access_enabled: Option<bool>,
    pub snapshot_count: Option<u32>,
    pub snapshot_policy: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSisAttributes {
    pub deduplication_space_saved: Option<u64>,
    pub is_sis_volume: Option<bool>,
    pub percentage_total_space_saved: Option<u32>,
    pub total_space_saved: Option<u64>,
}

/// A volume as returned by volume-get-iter.  The same shape is used for
/// the query and for desired-attributes.
#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeAttributes {
    pub encrypt: Option<bool>,
    pub volume_export_attributes: Option<VolumeExportAttributes>,
    pub volume_id_attributes: Option<VolumeIdAttributes>,
    pub volume_security_attributes: Option<VolumeSecurityAttributes>,
    pub volume_sis_attributes: Option<VolumeSisAttributes>,
    pub volume_snapshot_attributes: Option<VolumeSnapshotAttributes>,
    pub volume_space_attributes: Option<VolumeSpaceAttributes>,
    pub volume_state_attributes: Option<VolumeStateAttributes>,
}

impl VolumeAttributes {
    pub fn name(&self) -> Option<&str> {
        self.volume_id_attributes
            .as_ref()
            .and_then(|id| id.name.as_deref())
    }

    pub fn size(&self) -> Option<u64> {
        self.volume_space_attributes.as_ref().and_then(|s| s.size)
    }
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-get-iter")]
pub struct VolumeGetIterRequest {
    #[zapi(wrap = "volume-attributes")]
    pub desired_attributes: Option<VolumeAttributes>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "volume-attributes")]
    pub query: Option<VolumeAttributes>,
    pub tag: Option<String>,
}

iter_request!(VolumeGetIterRequest => VolumeAttributes);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-create")]
pub struct VolumeCreateRequest {
    pub containing_aggr_name: Option<String>,
    pub encrypt: Option<bool>,
    pub export_policy: Option<String>,
    pub junction_path: Option<String>,
    pub percentage_snapshot_reserve: Option<u32>,
    /// Size with an optional unit suffix, e.g. 1g
    pub size: Option<String>,
    pub snapshot_policy: Option<String>,
    pub space_reserve: Option<String>,
    pub tiering_policy: Option<String>,
    pub unix_permissions: Option<String>,
    pub volume: String,
    pub volume_security_style: Option<String>,
    pub volume_type: Option<String>,
}

zapi_request!(VolumeCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-destroy")]
pub struct VolumeDestroyRequest {
    pub name: String,
    pub unmount_and_offline: Option<bool>,
}

zapi_request!(VolumeDestroyRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-destroy-async")]
pub struct VolumeDestroyAsyncRequest {
    pub unmount_and_offline: Option<bool>,
    pub volume_name: String,
}

zapi_request!(VolumeDestroyAsyncRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-size")]
pub struct VolumeSizeRequest {
    /// Absolute size, or a +/- prefixed delta.  Omit to read the size
    pub new_size: Option<String>,
    pub volume: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSizeResponse {
    pub is_fixed_size_flex_volume: Option<bool>,
    pub is_readonly_flex_volume: Option<bool>,
    pub is_replica_flex_volume: Option<bool>,
    pub volume_size: Option<String>,
}

zapi_request!(VolumeSizeRequest => VolumeSizeResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-mount")]
pub struct VolumeMountRequest {
    pub activate_junction: Option<bool>,
    pub export_policy_override: Option<bool>,
    pub junction_path: String,
    pub volume_name: String,
}

zapi_request!(VolumeMountRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-unmount")]
pub struct VolumeUnmountRequest {
    pub force: Option<bool>,
    pub volume_name: String,
}

zapi_request!(VolumeUnmountRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-clone-create")]
pub struct VolumeCloneCreateRequest {
    pub parent_snapshot: Option<String>,
    pub parent_volume: String,
    pub space_reserve: Option<String>,
    pub volume: String,
}

zapi_request!(VolumeCloneCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-clone-split-start")]
pub struct VolumeCloneSplitStartRequest {
    pub volume: String,
}

zapi_request!(VolumeCloneSplitStartRequest => AsyncResult);

/// Renames a flexvol.  FlexGroups can't be renamed.
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-rename")]
pub struct VolumeRenameRequest {
    pub new_volume_name: String,
    pub volume: String,
}

zapi_request!(VolumeRenameRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-offline")]
pub struct VolumeOfflineRequest {
    pub name: String,
}

zapi_request!(VolumeOfflineRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeModifyIterInfo {
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

/// Applies `attributes` to every volume matching `query`
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-modify-iter")]
pub struct VolumeModifyIterRequest {
    #[zapi(wrap = "volume-attributes")]
    pub attributes: Option<VolumeAttributes>,
    #[zapi(wrap = "volume-attributes")]
    pub query: Option<VolumeAttributes>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeModifyIterResponse {
    #[zapi(item = "volume-modify-iter-info")]
    pub failure_list: Vec<VolumeModifyIterInfo>,
    pub num_failed: Option<u32>,
    pub num_succeeded: Option<u32>,
    #[zapi(item = "volume-modify-iter-info")]
    pub success_list: Vec<VolumeModifyIterInfo>,
}

zapi_request!(VolumeModifyIterRequest => VolumeModifyIterResponse);

// FlexGroup variants.  Their replies point at a job.

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-create-async")]
pub struct VolumeCreateAsyncRequest {
    #[zapi(item = "aggr-name")]
    pub aggr_list: Vec<String>,
    pub encrypt: Option<bool>,
    pub export_policy: Option<String>,
    pub junction_path: Option<String>,
    pub percentage_snapshot_reserve: Option<u32>,
    pub size: u64,
    pub snapshot_policy: Option<String>,
    pub space_reserve: Option<String>,
    pub tiering_policy: Option<String>,
    pub unix_permissions: Option<String>,
    pub volume_name: String,
    pub volume_security_style: Option<String>,
}

zapi_request!(VolumeCreateAsyncRequest => AsyncResult);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-size-async")]
pub struct VolumeSizeAsyncRequest {
    pub new_size: Option<String>,
    pub volume_name: String,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeSizeAsyncResponse {
    pub result_error_code: Option<i64>,
    pub result_error_message: Option<String>,
    pub result_jobid: Option<u64>,
    pub result_status: Option<String>,
    pub volume_size: Option<String>,
}

impl AsyncResponse for VolumeSizeAsyncResponse {
    fn async_result(&self) -> AsyncResult {
        AsyncResult {
            result_error_code: self.result_error_code,
            result_error_message: self.result_error_message.clone(),
            result_jobid: self.result_jobid,
            result_status: self.result_status.clone(),
        }
    }
}

zapi_request!(VolumeSizeAsyncRequest => VolumeSizeAsyncResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeModifyIterAsyncInfo {
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub jobid: Option<u64>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "volume-modify-iter-async")]
pub struct VolumeModifyIterAsyncRequest {
    #[zapi(wrap = "volume-attributes")]
    pub attributes: Option<VolumeAttributes>,
    #[zapi(wrap = "volume-attributes")]
    pub query: Option<VolumeAttributes>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct VolumeModifyIterAsyncResponse {
    #[zapi(item = "volume-modify-iter-async-info")]
    pub failure_list: Vec<VolumeModifyIterAsyncInfo>,
    pub num_failed: Option<u32>,
    pub num_succeeded: Option<u32>,
    #[zapi(item = "volume-modify-iter-async-info")]
    pub success_list: Vec<VolumeModifyIterAsyncInfo>,
}

impl AsyncResponse for VolumeModifyIterAsyncResponse {
    /// The job of the first volume modified, or the first failure
    fn async_result(&self) -> AsyncResult {
        let (info, failed) = match self.success_list.first() {
            Some(info) => (info, false),
            None => match self.failure_list.first() {
                Some(info) => (info, true),
                None => return AsyncResult::default(),
            },
        };
        AsyncResult {
            result_error_code: info.error_code,
            result_error_message: info.error_message.clone(),
            result_jobid: info.jobid,
            result_status: if failed {
                Some("failed".to_string())
            } else {
                info.status.clone()
            },
        }
    }
}

zapi_request!(VolumeModifyIterAsyncRequest => VolumeModifyIterAsyncResponse);

#[test]
fn test_volume_attributes_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("volume_get_iter_page1.xml");
    let vols: Vec<VolumeAttributes> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(vols.len(), 2);
    let vol = &vols[1];
    assert_eq!(vol.name(), Some("trident_pvc_1"));
    assert_eq!(vol.size(), Some(1_073_741_824));
    let id = vol.volume_id_attributes.as_ref().unwrap();
    assert_eq!(id.containing_aggregate_name.as_deref(), Some("aggr1"));
    assert_eq!(id.aggr_list, vec!["aggr1".to_string()]);
    let unix = vol
        .volume_security_attributes
        .as_ref()
        .and_then(|s| s.volume_security_unix_attributes.as_ref())
        .unwrap();
    assert_eq!(unix.permissions.as_deref(), Some("---rwxrwxrwx"));
    assert_eq!(
        vol.volume_export_attributes.as_ref().unwrap().policy.as_deref(),
        Some("default")
    );
}

#[test]
fn test_volume_get_iter_query_encoding() {
    let req = VolumeGetIterRequest {
        query: Some(VolumeAttributes {
            volume_id_attributes: Some(VolumeIdAttributes {
                name: Some("trident_*".to_string()),
                style_extended: Some("flexvol".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        desired_attributes: Some(VolumeAttributes {
            volume_id_attributes: Some(VolumeIdAttributes {
                name: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        max_records: Some(100),
        tag: None,
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains(
        "<query><volume-attributes><volume-id-attributes><name>trident_*</name>\
         <style-extended>flexvol</style-extended></volume-id-attributes></volume-attributes></query>"
    ));
    assert!(body.contains("<desired-attributes><volume-attributes><volume-id-attributes><name"));
    assert!(!body.contains("<name></name>"));
    assert!(body.contains("<max-records>100</max-records>"));
    assert!(!body.contains("<tag>"));
}

#[test]
fn test_modify_iter_async_result() {
    use crate::codec::ZapiValue;

    let results = crate::api::fixture_results("volume_modify_iter_async.xml");
    let response = VolumeModifyIterAsyncResponse::from_element(&results).unwrap();
    let result = response.async_result();
    assert_eq!(result.result_jobid, Some(4321));
    assert_eq!(result.result_status.as_deref(), Some("in_progress"));

    let failed = VolumeModifyIterAsyncResponse {
        failure_list: vec![VolumeModifyIterAsyncInfo {
            error_code: Some(13001),
            ..Default::default()
        }],
        ..Default::default()
    };
    let result = failed.async_result();
    assert_eq!(result.result_status.as_deref(), Some("failed"));
    assert_eq!(result.result_error_code, Some(13001));
}
