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
use uuid::Uuid;

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct SnapshotInfo {
    /// Creation time, seconds since the epoch
    pub access_time: Option<i64>,
    pub busy: Option<bool>,
    pub comment: Option<String>,
    pub dependency: Option<String>,
    pub name: Option<String>,
    pub snapshot_instance_uuid: Option<Uuid>,
    pub state: Option<String>,
    pub total: Option<u64>,
    pub volume: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "snapshot-get-iter")]
pub struct SnapshotGetIterRequest {
    #[zapi(wrap = "snapshot-info")]
    pub desired_attributes: Option<SnapshotInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "snapshot-info")]
    pub query: Option<SnapshotInfo>,
    pub tag: Option<String>,
}

iter_request!(SnapshotGetIterRequest => SnapshotInfo);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "snapshot-create")]
pub struct SnapshotCreateRequest {
    #[zapi(rename = "async")]
    pub run_async: Option<bool>,
    pub comment: Option<String>,
    pub snapmirror_label: Option<String>,
    pub snapshot: String,
    pub volume: String,
}

zapi_request!(SnapshotCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "snapshot-delete")]
pub struct SnapshotDeleteRequest {
    pub ignore_owners: Option<bool>,
    pub snapshot: String,
    pub snapshot_instance_uuid: Option<Uuid>,
    pub volume: String,
}

zapi_request!(SnapshotDeleteRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "snapshot-restore-volume")]
pub struct SnapshotRestoreVolumeRequest {
    pub force: Option<bool>,
    pub preserve_lun_ids: Option<bool>,
    pub snapshot: String,
    pub snapshot_instance_uuid: Option<Uuid>,
    pub volume: String,
}

zapi_request!(SnapshotRestoreVolumeRequest => ());

#[test]
fn test_snapshot_info_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("snapshot_get_iter.xml");
    let snaps: Vec<SnapshotInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(snaps.len(), 2);
    assert_eq!(snaps[0].name.as_deref(), Some("snap.2019-03-01"));
    assert_eq!(snaps[0].busy, Some(false));
    assert_eq!(
        snaps[0].snapshot_instance_uuid,
        Some(Uuid::parse_str("0d1e2a3b-4c5d-6e7f-8091-a2b3c4d5e6f7").unwrap())
    );
    assert_eq!(snaps[1].busy, Some(true));
    assert_eq!(snaps[1].dependency.as_deref(), Some("busy,LUNs"));
}

#[test]
fn test_snapshot_create_encoding() {
    let req = SnapshotCreateRequest {
        snapshot: "snap1".to_string(),
        volume: "vol1".to_string(),
        ..Default::default()
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains(
        "<snapshot-create><snapshot>snap1</snapshot><volume>vol1</volume></snapshot-create>"
    ));
}
