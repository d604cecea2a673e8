//! Storage driver level operations built on top of the raw ZAPI calls.
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
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::api::aggr::*;
use crate::api::ems::*;
use crate::api::export::*;
use crate::api::igroup::*;
use crate::api::job::*;
use crate::api::lun::*;
use crate::api::net::*;
use crate::api::qtree::*;
use crate::api::quota::*;
use crate::api::snapshot::*;
use crate::api::system::*;
use crate::api::volume::*;
use crate::api::vserver::*;
use crate::config::ZapiConfig;
use crate::error::*;
use crate::iter::{IterRequest, PagedResponse};
use crate::runner::ZapiRunner;

use backoff::ExponentialBackoffBuilder;
use log::{debug, warn};

/// Features that depend on the ONTAPI version of the cluster
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Feature {
    MinimumOntapiVersion,
    FlexGroups,
    FabricPoolFlexVol,
    FabricPoolFlexGroup,
    LunGeometrySkip,
}

impl Feature {
    /// Lowest ONTAPI (major, minor) that supports the feature
    pub fn minimum_version(self) -> (u32, u32) {
        match self {
            // cDOT 9.1
            Feature::MinimumOntapiVersion => (1, 110),
            // cDOT 9.2
            Feature::FlexGroups => (1, 120),
            Feature::FabricPoolFlexVol => (1, 120),
            // cDOT 9.5
            Feature::FabricPoolFlexGroup => (1, 150),
            Feature::LunGeometrySkip => (1, 150),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Feature::MinimumOntapiVersion => "MINIMUM_ONTAPI_VERSION",
            Feature::FlexGroups => "NETAPP_FLEXGROUPS",
            Feature::FabricPoolFlexVol => "NETAPP_FABRICPOOL_FLEXVOL",
            Feature::FabricPoolFlexGroup => "NETAPP_FABRICPOOL_FLEXGROUP",
            Feature::LunGeometrySkip => "LUN_GEOMETRY_SKIP",
        };
        f.write_str(name)
    }
}

fn parse_ontapi_version(version: &str) -> ZapiResult<(u32, u32)> {
    let mut parts = version.trim().splitn(2, '.');
    let major = parts.next().unwrap_or("").parse::<u32>()?;
    let minor = parts
        .next()
        .ok_or_else(|| ZapiError::new(format!("invalid ONTAPI version {}", version)))?
        .parse::<u32>()?;
    Ok((major, minor))
}

/// FlexGroup create, delete and resize jobs are waited on this long
pub const FLEXGROUP_MAX_WAIT: Duration = Duration::from_secs(30);

// Only online volumes of one style (flexvol or flexgroup) matching the name
// or name pattern
fn online_volume_query(name: &str, style: &str) -> VolumeAttributes {
    VolumeAttributes {
        volume_id_attributes: Some(VolumeIdAttributes {
            name: Some(name.to_string()),
            style_extended: Some(style.to_string()),
            ..Default::default()
        }),
        volume_state_attributes: Some(VolumeStateAttributes {
            state: Some("online".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn exactly_one<T>(mut records: Vec<T>, kind: &str, name: &str) -> ZapiResult<T> {
    match records.len() {
        0 => Err(ZapiError::new(format!("{} {} not found", kind, name))),
        1 => Ok(records.remove(0)),
        _ => Err(ZapiError::new(format!("more than one {} {} found", kind, name))),
    }
}

// The attributes a driver reads back when listing its volumes
fn driver_volume_attributes() -> VolumeAttributes {
    VolumeAttributes {
        volume_export_attributes: Some(VolumeExportAttributes {
            policy: Some(String::new()),
        }),
        volume_id_attributes: Some(VolumeIdAttributes {
            name: Some(String::new()),
            containing_aggregate_name: Some(String::new()),
            ..Default::default()
        }),
        volume_security_attributes: Some(VolumeSecurityAttributes {
            style: None,
            volume_security_unix_attributes: Some(VolumeSecurityUnixAttributes {
                permissions: Some(String::new()),
                ..Default::default()
            }),
        }),
        volume_space_attributes: Some(VolumeSpaceAttributes {
            size: Some(0),
            space_guarantee: Some(String::new()),
            ..Default::default()
        }),
        volume_snapshot_attributes: Some(VolumeSnapshotAttributes {
            snapdir_access_enabled: Some(true),
            snapshot_policy: Some(String::new()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn volume_name_query(name: &str) -> VolumeAttributes {
    VolumeAttributes {
        volume_id_attributes: Some(VolumeIdAttributes {
            name: Some(name.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn snapdir_access_disabled() -> VolumeAttributes {
    VolumeAttributes {
        volume_snapshot_attributes: Some(VolumeSnapshotAttributes {
            snapdir_access_enabled: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn is_volume_missing(err: &ZapiError) -> bool {
    err.api_status()
        .map(|s| s.errno == EVOLUMEDOESNOTEXIST)
        .unwrap_or(false)
}

/// How much of an aggregate is promised to its volumes.  A volume counts
/// with its own size or the sum of its LUN sizes, whichever is larger.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateCommitment {
    pub aggregate_size: f64,
    pub total_allocated: f64,
}

impl AggregateCommitment {
    pub fn percent(&self) -> f64 {
        self.total_allocated / self.aggregate_size * 100.0
    }

    /// The commitment if a volume of requested_size bytes were added
    pub fn percent_with_requested_size(&self, requested_size: f64) -> f64 {
        (self.total_allocated + requested_size) / self.aggregate_size * 100.0
    }
}

impl fmt::Display for AggregateCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AggregateSize: {:.0} TotalAllocated: {:.0} Percent: {:.2} %",
            self.aggregate_size,
            self.total_allocated,
            self.percent()
        )
    }
}

pub struct OntapClient {
    runner: ZapiRunner,
    max_records: u32,
    job_poll_interval: Duration,
    ontapi_version: Mutex<Option<String>>,
}

impl OntapClient {
    pub fn new(config: ZapiConfig) -> ZapiResult<Self> {
        let runner = ZapiRunner::new(config)?;
        Ok(OntapClient::with_runner(runner))
    }

    pub fn with_runner(runner: ZapiRunner) -> Self {
        let max_records = runner.config().max_records;
        OntapClient {
            runner,
            max_records,
            job_poll_interval: Duration::from_secs(1),
            ontapi_version: Mutex::new(None),
        }
    }

    /// First wait between async job status checks.  Doubles on every poll.
    pub fn with_job_poll_interval(mut self, interval: Duration) -> Self {
        self.job_poll_interval = interval;
        self
    }

    pub fn runner(&self) -> &ZapiRunner {
        &self.runner
    }

    // Page through a get-iter call with the configured page size
    fn get_all<R: IterRequest>(&self, mut request: R) -> ZapiResult<Vec<R::Item>> {
        request.set_max_records(self.max_records);
        let response = self.runner.execute_with_iteration(&request)?;
        Ok(response.records)
    }

    // Single page, for calls expected to match a handful of records
    fn get_page<R: IterRequest>(&self, mut request: R) -> ZapiResult<Vec<R::Item>> {
        request.set_max_records(self.max_records);
        let response = self.runner.execute_page(&request)?;
        Ok(response.records)
    }

    /// equivalent to filer::> version
    pub fn system_get_version(&self) -> ZapiResult<SystemVersion> {
        self.runner.execute(&SystemGetVersionRequest {})
    }

    /// The ONTAPI version as "major.minor".  Read once and cached.
    pub fn system_get_ontapi_version(&self) -> ZapiResult<String> {
        if let Some(v) = self.cached_ontapi_version()? {
            return Ok(v);
        }
        // Not locked while the call is in flight, racing callers both ask
        let result = self
            .runner
            .execute(&SystemGetOntapiVersionRequest {})
            .map_err(|e| ZapiError::new(format!("could not read ONTAPI version: {}", e)))?;
        let version = format!(
            "{}.{}",
            result.major_version.unwrap_or(0),
            result.minor_version.unwrap_or(0)
        );
        debug!("ONTAPI version {}", version);
        *self.lock_ontapi_version()? = Some(version.clone());

        Ok(version)
    }

    fn lock_ontapi_version(&self) -> ZapiResult<MutexGuard<'_, Option<String>>> {
        self.ontapi_version
            .lock()
            .map_err(|e| ZapiError::new(e.to_string()))
    }

    fn cached_ontapi_version(&self) -> ZapiResult<Option<String>> {
        Ok(self.lock_ontapi_version()?.clone())
    }

    /// A failure to read the version counts as unsupported
    pub fn supports_feature(&self, feature: Feature) -> bool {
        let version = match self
            .system_get_ontapi_version()
            .and_then(|v| parse_ontapi_version(&v))
        {
            Ok(v) => v,
            Err(e) => {
                warn!("unable to check support for {}: {}", feature, e);
                return false;
            }
        };
        version >= feature.minimum_version()
    }

    /// Serial numbers of every node in the cluster
    pub fn node_list_serial_numbers(&self) -> ZapiResult<Vec<String>> {
        let req = SystemNodeGetIterRequest {
            desired_attributes: Some(NodeDetailsInfo {
                node_serial_number: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let serials: Vec<String> = self
            .runner
            .nontunneled()
            .execute_with_iteration(&req)?
            .records
            .into_iter()
            .filter_map(|n| n.node_serial_number)
            .collect();
        if serials.is_empty() {
            return Err(ZapiError::new(
                "could not get node serial numbers".to_string(),
            ));
        }
        Ok(serials)
    }

    /// Create a flexvol.  The tiering policy defaults to none where
    /// FabricPool is available.
    pub fn volume_create(&self, mut request: VolumeCreateRequest) -> ZapiResult<()> {
        if request.tiering_policy.is_none() && self.supports_feature(Feature::FabricPoolFlexVol) {
            request.tiering_policy = Some("none".to_string());
        }
        self.runner.execute(&request)
    }

    pub fn volume_clone_create(&self, name: &str, source: &str, snapshot: &str) -> ZapiResult<()> {
        self.runner.execute(&VolumeCloneCreateRequest {
            volume: name.to_string(),
            parent_volume: source.to_string(),
            parent_snapshot: Some(snapshot.to_string()),
            space_reserve: None,
        })
    }

    /// Exactly one online flexvol by name
    pub fn volume_get(&self, name: &str) -> ZapiResult<VolumeAttributes> {
        let vols = self.get_page(VolumeGetIterRequest {
            query: Some(online_volume_query(name, "flexvol")),
            ..Default::default()
        })?;
        exactly_one(vols, "flexvol", name)
    }

    /// Every online flexvol whose name starts with prefix, limited to the
    /// attributes a driver cares about
    pub fn volume_get_all(&self, prefix: &str) -> ZapiResult<Vec<VolumeAttributes>> {
        self.get_all(VolumeGetIterRequest {
            query: Some(online_volume_query(&format!("{}*", prefix), "flexvol")),
            desired_attributes: Some(driver_volume_attributes()),
            ..Default::default()
        })
    }

    /// Names of the online flexvols whose name starts with prefix
    pub fn volume_list(&self, prefix: &str) -> ZapiResult<Vec<String>> {
        let desired = VolumeAttributes {
            volume_id_attributes: Some(VolumeIdAttributes {
                name: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let vols = self.get_all(VolumeGetIterRequest {
            query: Some(online_volume_query(&format!("{}*", prefix), "flexvol")),
            desired_attributes: Some(desired),
            ..Default::default()
        })?;
        Ok(vols
            .iter()
            .filter_map(|v| v.name())
            .map(|n| n.to_string())
            .collect())
    }

    pub fn volume_exists(&self, name: &str) -> ZapiResult<bool> {
        let req = VolumeSizeRequest {
            volume: name.to_string(),
            new_size: None,
        };
        match self.runner.execute(&req) {
            Ok(_) => Ok(true),
            Err(ref e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Size in bytes
    pub fn volume_size(&self, name: &str) -> ZapiResult<u64> {
        let vol = self.volume_get(name)?;
        vol.size()
            .ok_or_else(|| ZapiError::new(format!("size of flexvol {} not reported", name)))
    }

    pub fn volume_set_size(&self, name: &str, new_size: &str) -> ZapiResult<VolumeSizeResponse> {
        self.runner.execute(&VolumeSizeRequest {
            volume: name.to_string(),
            new_size: Some(new_size.to_string()),
        })
    }

    pub fn volume_mount(&self, name: &str, junction_path: &str) -> ZapiResult<()> {
        self.runner.execute(&VolumeMountRequest {
            volume_name: name.to_string(),
            junction_path: junction_path.to_string(),
            ..Default::default()
        })
    }

    pub fn volume_unmount(&self, name: &str, force: bool) -> ZapiResult<()> {
        self.runner.execute(&VolumeUnmountRequest {
            volume_name: name.to_string(),
            force: Some(force),
        })
    }

    pub fn volume_destroy(&self, name: &str, force: bool) -> ZapiResult<()> {
        self.runner.execute(&VolumeDestroyRequest {
            name: name.to_string(),
            unmount_and_offline: Some(force),
        })
    }

    /// Destroy a volume through the job queue and wait for the job
    pub fn volume_destroy_async(&self, name: &str, force: bool, max_wait: Duration) -> ZapiResult<()> {
        let result = self.runner.execute(&VolumeDestroyAsyncRequest {
            volume_name: name.to_string(),
            unmount_and_offline: Some(force),
        })?;
        self.wait_for_async_response(&result, max_wait)
    }

    /// FlexGroups can't be renamed
    pub fn volume_rename(&self, name: &str, new_name: &str) -> ZapiResult<()> {
        self.runner.execute(&VolumeRenameRequest {
            volume: name.to_string(),
            new_volume_name: new_name.to_string(),
        })
    }

    pub fn volume_offline(&self, name: &str) -> ZapiResult<()> {
        self.runner.execute(&VolumeOfflineRequest {
            name: name.to_string(),
        })
    }

    /// Start splitting a clone from its parent.  The split runs as a job
    /// which isn't waited on.
    pub fn volume_clone_split_start(&self, name: &str) -> ZapiResult<AsyncResult> {
        self.runner.execute(&VolumeCloneSplitStartRequest {
            volume: name.to_string(),
        })
    }

    /// equivalent to filer::> volume modify -vserver iscsi_vs -volume v -snapdir-access false
    pub fn volume_disable_snapshot_directory_access(&self, name: &str) -> ZapiResult<()> {
        let response = self.runner.execute(&VolumeModifyIterRequest {
            attributes: Some(snapdir_access_disabled()),
            query: Some(volume_name_query(name)),
        })?;
        if let Some(failure) = response.failure_list.first() {
            return Err(ZapiError::new(format!(
                "error disabling snapshot directory access on {}: {}",
                name,
                failure.error_message.as_deref().unwrap_or("unknown error")
            )));
        }
        Ok(())
    }

    /// Create a FlexGroup and wait for its job.  The junction path defaults
    /// to /<name> and the tiering policy to none where FabricPool supports
    /// FlexGroups.
    pub fn flexgroup_create(&self, mut request: VolumeCreateAsyncRequest) -> ZapiResult<()> {
        if !self.supports_feature(Feature::FlexGroups) {
            return Err(ZapiError::new(
                "ONTAP version does not support FlexGroups".to_string(),
            ));
        }
        if request.junction_path.is_none() {
            request.junction_path = Some(format!("/{}", request.volume_name));
        }
        if request.tiering_policy.is_none() && self.supports_feature(Feature::FabricPoolFlexGroup) {
            request.tiering_policy = Some("none".to_string());
        }
        let result = self.runner.execute(&request)?;
        self.wait_for_async_response(&result, FLEXGROUP_MAX_WAIT)
    }

    /// Deleting a FlexGroup that is already gone succeeds
    pub fn flexgroup_destroy(&self, name: &str, force: bool) -> ZapiResult<()> {
        match self.volume_destroy_async(name, force, FLEXGROUP_MAX_WAIT) {
            Err(ref e) if is_volume_missing(e) => {
                warn!("FlexGroup {} already deleted.", name);
                Ok(())
            }
            other => other,
        }
    }

    pub fn flexgroup_exists(&self, name: &str) -> ZapiResult<bool> {
        let response = match self.runner.execute(&VolumeSizeAsyncRequest {
            volume_name: name.to_string(),
            new_size: None,
        }) {
            Ok(r) => r,
            Err(ref e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };
        self.wait_for_async_response(&response, FLEXGROUP_MAX_WAIT)?;
        Ok(true)
    }

    /// Exactly one online FlexGroup by name
    pub fn flexgroup_get(&self, name: &str) -> ZapiResult<VolumeAttributes> {
        let vols = self.get_page(VolumeGetIterRequest {
            query: Some(online_volume_query(name, "flexgroup")),
            ..Default::default()
        })?;
        exactly_one(vols, "flexgroup", name)
    }

    pub fn flexgroup_get_all(&self, prefix: &str) -> ZapiResult<Vec<VolumeAttributes>> {
        self.get_all(VolumeGetIterRequest {
            query: Some(online_volume_query(&format!("{}*", prefix), "flexgroup")),
            desired_attributes: Some(driver_volume_attributes()),
            ..Default::default()
        })
    }

    /// Size in bytes
    pub fn flexgroup_size(&self, name: &str) -> ZapiResult<u64> {
        let vol = self.flexgroup_get(name)?;
        vol.size()
            .ok_or_else(|| ZapiError::new(format!("size of flexgroup {} not reported", name)))
    }

    pub fn flexgroup_set_size(&self, name: &str, new_size: &str) -> ZapiResult<()> {
        let response = self.runner.execute(&VolumeSizeAsyncRequest {
            volume_name: name.to_string(),
            new_size: Some(new_size.to_string()),
        })?;
        self.wait_for_async_response(&response, FLEXGROUP_MAX_WAIT)
    }

    pub fn flexgroup_disable_snapshot_directory_access(&self, name: &str) -> ZapiResult<()> {
        let response = self.runner.execute(&VolumeModifyIterAsyncRequest {
            attributes: Some(snapdir_access_disabled()),
            query: Some(volume_name_query(name)),
        })?;
        self.wait_for_async_response(&response, FLEXGROUP_MAX_WAIT)
    }

    /// Returns once the job behind an async reply has finished.
    /// `succeeded` returns at once, `failed` is an error and `in_progress`
    /// polls the job with exponential backoff for up to max_wait.
    pub fn wait_for_async_response<T: AsyncResponse>(&self, response: &T, max_wait: Duration) -> ZapiResult<()> {
        let result = response.async_result();
        match result.result_status.as_ref().map(|s| s.as_str()) {
            Some("in_progress") => {
                let job_id = result.result_jobid.ok_or_else(|| {
                    ZapiError::new("async result in progress without a job id".to_string())
                })?;
                self.check_for_job_completion(job_id, max_wait)
            }
            Some("failed") => Err(ZapiError::new(format!(
                "result status is failed with errorCode {}",
                result.result_error_code.unwrap_or(0)
            ))),
            _ => Ok(()),
        }
    }

    fn check_for_job_completion(&self, job_id: u64, max_wait: Duration) -> ZapiResult<()> {
        let check_job_finished = || -> Result<(), backoff::Error<ZapiError>> {
            let response = self
                .job_get_iter_status(job_id)
                .map_err(|e| backoff::Error::transient(ZapiError::new(format!(
                    "error occurred getting job status for job ID {}: {}",
                    job_id, e
                ))))?;
            let state = response
                .records
                .first()
                .and_then(|j| j.job_state.clone())
                .ok_or_else(|| {
                    backoff::Error::transient(ZapiError::new(format!(
                        "failed to get job status for job ID {}",
                        job_id
                    )))
                })?;
            debug!("Job status for job ID {}: {}", job_id, state);
            if state.is_failed() {
                return Err(backoff::Error::permanent(ZapiError::new(format!(
                    "job {} failed to complete. job state: {}",
                    job_id, state
                ))));
            }
            if state != JobState::Success {
                return Err(backoff::Error::transient(ZapiError::new(format!(
                    "job {} is not yet completed. job state: {}",
                    job_id, state
                ))));
            }
            Ok(())
        };
        let notify = |_err: ZapiError, duration: Duration| {
            debug!("Job not yet completed, waiting {:?}", duration);
        };

        let in_progress_backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.job_poll_interval)
            .with_multiplier(2.0)
            .with_randomization_factor(0.1)
            .with_max_elapsed_time(Some(max_wait))
            .build();

        match backoff::retry_notify(in_progress_backoff, check_job_finished, notify) {
            Ok(()) => {
                debug!("Job {} completed successfully.", job_id);
                Ok(())
            }
            Err(backoff::Error::Permanent(err)) => {
                warn!("Job {} failed: {}", job_id, err);
                Err(ZapiError::new(format!(
                    "job Id {} failed to complete successfully: {}",
                    job_id, err
                )))
            }
            Err(backoff::Error::Transient { err, .. }) => {
                warn!("Job not completed after {:?}.", max_wait);
                Err(ZapiError::new(format!(
                    "job Id {} failed to complete successfully: {}",
                    job_id, err
                )))
            }
        }
    }

    /// Job records live at cluster scope so the query is never tunneled
    pub fn job_get_iter_status(&self, job_id: u64) -> ZapiResult<PagedResponse<JobInfo>> {
        let req = JobGetIterRequest {
            query: Some(JobInfo {
                job_id: Some(job_id),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.runner.nontunneled().execute_page(&req)
    }

    pub fn snapshot_create(&self, snapshot: &str, volume: &str) -> ZapiResult<()> {
        self.runner.execute(&SnapshotCreateRequest {
            snapshot: snapshot.to_string(),
            volume: volume.to_string(),
            ..Default::default()
        })
    }

    pub fn snapshot_list(&self, volume: &str) -> ZapiResult<Vec<SnapshotInfo>> {
        self.get_all(SnapshotGetIterRequest {
            query: Some(SnapshotInfo {
                volume: Some(volume.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    pub fn snapshot_restore_volume(&self, snapshot: &str, volume: &str) -> ZapiResult<()> {
        self.runner.execute(&SnapshotRestoreVolumeRequest {
            snapshot: snapshot.to_string(),
            volume: volume.to_string(),
            preserve_lun_ids: Some(true),
            ..Default::default()
        })
    }

    pub fn snapshot_delete(&self, snapshot: &str, volume: &str) -> ZapiResult<()> {
        self.runner.execute(&SnapshotDeleteRequest {
            snapshot: snapshot.to_string(),
            volume: volume.to_string(),
            ignore_owners: Some(true),
            snapshot_instance_uuid: None,
        })
    }

    /// equivalent to filer::> lun create -vserver iscsi_vs -path /vol/v/lun0 -size 1g -ostype linux -space-reserve disabled
    pub fn lun_create(
        &self,
        path: &str,
        size_bytes: u64,
        os_type: &str,
        space_reserved: bool,
        space_allocated: bool,
    ) -> ZapiResult<LunSizeResponse> {
        self.runner.execute(&LunCreateBySizeRequest {
            path: path.to_string(),
            size: size_bytes,
            ostype: Some(os_type.to_string()),
            space_reservation_enabled: Some(space_reserved),
            space_allocation_enabled: Some(space_allocated),
            comment: None,
        })
    }

    pub fn lun_get(&self, path: &str) -> ZapiResult<LunInfo> {
        let luns = self.get_page(LunGetIterRequest {
            query: Some(LunInfo {
                path: Some(path.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })?;
        exactly_one(luns, "LUN", path)
    }

    /// LUNs whose path matches the pattern, e.g. /vol/trident_*/*
    pub fn lun_get_all(&self, path_pattern: &str) -> ZapiResult<Vec<LunInfo>> {
        self.get_all(LunGetIterRequest {
            query: Some(LunInfo {
                path: Some(path_pattern.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Map a LUN.  Without a lun_id the array assigns one.
    pub fn lun_map(&self, igroup: &str, path: &str, lun_id: Option<u32>) -> ZapiResult<u32> {
        let response = self.runner.execute(&LunMapRequest {
            initiator_group: igroup.to_string(),
            path: path.to_string(),
            lun_id,
            force: None,
        })?;
        response
            .lun_id_assigned
            .or(lun_id)
            .ok_or_else(|| ZapiError::new(format!("no LUN id assigned mapping {}", path)))
    }

    pub fn lun_destroy(&self, path: &str) -> ZapiResult<()> {
        self.runner.execute(&LunDestroyRequest {
            path: path.to_string(),
            force: None,
        })
    }

    pub fn lun_get_serial_number(&self, path: &str) -> ZapiResult<String> {
        let response = self.runner.execute(&LunGetSerialNumberRequest {
            path: path.to_string(),
        })?;
        response
            .serial_number
            .ok_or_else(|| ZapiError::new(format!("no serial number reported for {}", path)))
    }

    /// Resize a LUN, returning the size the array actually used
    pub fn lun_resize(&self, path: &str, size_bytes: u64) -> ZapiResult<u64> {
        let response = self.runner.execute(&LunResizeRequest {
            path: path.to_string(),
            size: size_bytes,
            force: None,
        })?;
        response
            .actual_size
            .ok_or_else(|| ZapiError::new(format!("LUN resize of {} reported no size", path)))
    }

    /// Resize a LUN after checking the new size fits its geometry.  ONTAP
    /// 9.5 and later have no geometry limit so the check is skipped there.
    pub fn lun_resize_checked(&self, path: &str, size_bytes: u64) -> ZapiResult<u64> {
        if !self.supports_feature(Feature::LunGeometrySkip) {
            let geometry = self.lun_get_geometry(path)?;
            let max_size = geometry.max_resize_size.unwrap_or(0);
            if max_size < size_bytes {
                return Err(ZapiError::new(format!(
                    "requested size {} is larger than LUN's maximum capacity {}",
                    size_bytes, max_size
                )));
            }
        }
        self.lun_resize(path, size_bytes)
    }

    pub fn lun_get_geometry(&self, path: &str) -> ZapiResult<LunGeometry> {
        self.runner.execute(&LunGetGeometryRequest {
            path: path.to_string(),
        })
    }

    pub fn lun_get_all_for_volume(&self, volume: &str) -> ZapiResult<Vec<LunInfo>> {
        self.get_all(LunGetIterRequest {
            query: Some(LunInfo {
                volume: Some(volume.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Number of LUNs in a volume
    pub fn lun_count(&self, volume: &str) -> ZapiResult<u64> {
        let mut req = LunGetIterRequest {
            query: Some(LunInfo {
                volume: Some(volume.to_string()),
                ..Default::default()
            }),
            desired_attributes: Some(LunInfo {
                path: Some(String::new()),
                volume: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        req.set_max_records(self.max_records);
        let response = self.runner.execute_page(&req)?;
        Ok(response.num_records.unwrap_or(0))
    }

    pub fn lun_online(&self, path: &str) -> ZapiResult<()> {
        self.runner.execute(&LunOnlineRequest {
            path: path.to_string(),
        })
    }

    pub fn lun_offline(&self, path: &str) -> ZapiResult<()> {
        self.runner.execute(&LunOfflineRequest {
            path: path.to_string(),
        })
    }

    /// igroups the LUN is mapped to, each with its LUN id
    pub fn lun_map_list_info(&self, path: &str) -> ZapiResult<LunMapListInfo> {
        self.runner.execute(&LunMapListInfoRequest {
            path: path.to_string(),
        })
    }

    /// Map a LUN to igroup unless it already is, returning the LUN id
    pub fn lun_map_if_not_mapped(&self, igroup: &str, path: &str) -> ZapiResult<u32> {
        let mapped = self.lun_map_list_info(path)?;
        let existing = mapped
            .initiator_groups
            .iter()
            .filter(|g| g.initiator_group_name.as_deref() == Some(igroup))
            .filter_map(|g| g.lun_id)
            .next();
        if let Some(lun_id) = existing {
            debug!("LUN {} already mapped to {} as {}", path, igroup, lun_id);
            return Ok(lun_id);
        }
        self.lun_map(igroup, path, None)
    }

    pub fn lun_set_attribute(&self, path: &str, name: &str, value: &str) -> ZapiResult<()> {
        self.runner.execute(&LunSetAttributeRequest {
            path: path.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn lun_get_attribute(&self, path: &str, name: &str) -> ZapiResult<String> {
        let response = self.runner.execute(&LunGetAttributeRequest {
            path: path.to_string(),
            name: name.to_string(),
        })?;
        response
            .value
            .ok_or_else(|| ZapiError::new(format!("LUN {} has no attribute {}", path, name)))
    }

    /// Clone a LUN inside its volume.  Paths are relative to the volume.
    pub fn lun_clone_create(&self, volume: &str, source: &str, destination: &str) -> ZapiResult<()> {
        self.runner.execute(&CloneCreateRequest {
            volume: volume.to_string(),
            source_path: source.to_string(),
            destination_path: destination.to_string(),
            space_reserve: None,
        })
    }

    /// equivalent to filer::> igroup create docker -vserver iscsi_vs -protocol iscsi -ostype linux
    pub fn igroup_create(&self, name: &str, igroup_type: &str, os_type: &str) -> ZapiResult<()> {
        self.runner.execute(&IgroupCreateRequest {
            initiator_group_name: name.to_string(),
            initiator_group_type: Some(igroup_type.to_string()),
            os_type: Some(os_type.to_string()),
        })
    }

    pub fn igroup_add(&self, name: &str, initiator: &str) -> ZapiResult<()> {
        self.runner.execute(&IgroupAddRequest {
            initiator_group_name: name.to_string(),
            initiator: initiator.to_string(),
            force: None,
        })
    }

    pub fn igroup_remove(&self, name: &str, initiator: &str, force: bool) -> ZapiResult<()> {
        self.runner.execute(&IgroupRemoveRequest {
            initiator_group_name: name.to_string(),
            initiator: initiator.to_string(),
            force: Some(force),
        })
    }

    pub fn igroup_list(&self) -> ZapiResult<Vec<InitiatorGroupInfo>> {
        self.get_all(IgroupGetIterRequest::default())
    }

    pub fn igroup_destroy(&self, name: &str) -> ZapiResult<()> {
        self.runner.execute(&IgroupDestroyRequest {
            initiator_group_name: name.to_string(),
            force: None,
        })
    }

    pub fn qtree_create(
        &self,
        name: &str,
        volume: &str,
        unix_permissions: &str,
        export_policy: &str,
        security_style: &str,
    ) -> ZapiResult<()> {
        self.runner.execute(&QtreeCreateRequest {
            qtree: name.to_string(),
            volume: volume.to_string(),
            mode: Some(unix_permissions.to_string()),
            export_policy: Some(export_policy.to_string()),
            security_style: Some(security_style.to_string()),
            oplocks: None,
        })
    }

    /// Delete a qtree given its /vol/<volume>/<qtree> path.  The delete
    /// runs as a job which isn't waited on.
    pub fn qtree_destroy_async(&self, path: &str, force: bool) -> ZapiResult<AsyncResult> {
        self.runner.execute(&QtreeDeleteAsyncRequest {
            qtree: path.to_string(),
            force: Some(force),
        })
    }

    /// Qtrees named with prefix in volumes named with volume_prefix
    pub fn qtree_list(&self, prefix: &str, volume_prefix: &str) -> ZapiResult<Vec<QtreeInfo>> {
        self.get_all(QtreeListIterRequest {
            query: Some(QtreeInfo {
                qtree: Some(format!("{}*", prefix)),
                volume: Some(format!("{}*", volume_prefix)),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    fn qtree_query(&self, name: &str, volume_prefix: &str) -> ZapiResult<Vec<QtreeInfo>> {
        self.get_page(QtreeListIterRequest {
            query: Some(QtreeInfo {
                qtree: Some(name.to_string()),
                volume: Some(format!("{}*", volume_prefix)),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// The volume holding qtree name, when exactly one volume named with
    /// volume_prefix has it
    pub fn qtree_exists(&self, name: &str, volume_prefix: &str) -> ZapiResult<Option<String>> {
        let mut qtrees = self.qtree_query(name, volume_prefix)?;
        if qtrees.len() != 1 {
            return Ok(None);
        }
        Ok(qtrees.remove(0).volume)
    }

    pub fn qtree_get(&self, name: &str, volume_prefix: &str) -> ZapiResult<QtreeInfo> {
        let qtrees = self.qtree_query(name, volume_prefix)?;
        exactly_one(qtrees, "qtree", name)
    }

    /// Qtrees in a volume, not counting the volume's own qtree 0
    pub fn qtree_count(&self, volume: &str) -> ZapiResult<u64> {
        let mut req = QtreeListIterRequest {
            query: Some(QtreeInfo {
                volume: Some(volume.to_string()),
                ..Default::default()
            }),
            desired_attributes: Some(QtreeInfo {
                volume: Some(String::new()),
                qtree: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        };
        req.set_max_records(self.max_records);
        let response = self.runner.execute_page(&req)?;
        Ok(response.num_records.unwrap_or(0).saturating_sub(1))
    }

    /// Both paths are /vol/<volume>/<qtree>
    pub fn qtree_rename(&self, path: &str, new_path: &str) -> ZapiResult<()> {
        self.runner.execute(&QtreeRenameRequest {
            qtree: path.to_string(),
            new_qtree_name: new_path.to_string(),
        })
    }

    pub fn export_policy_create(&self, policy: &str) -> ZapiResult<()> {
        self.runner.execute(&ExportPolicyCreateRequest {
            policy_name: policy.to_string(),
            return_record: None,
        })?;
        Ok(())
    }

    /// Allow client_match in with the given protocols and security flavors
    pub fn export_rule_create(
        &self,
        policy: &str,
        client_match: &str,
        protocols: &[&str],
        ro_rules: &[&str],
        rw_rules: &[&str],
        super_user_rules: &[&str],
    ) -> ZapiResult<()> {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<String>>();
        self.runner.execute(&ExportRuleCreateRequest {
            policy_name: policy.to_string(),
            client_match: client_match.to_string(),
            protocol: owned(protocols),
            ro_rule: owned(ro_rules),
            rw_rule: owned(rw_rules),
            super_user_security: owned(super_user_rules),
            ..Default::default()
        })
    }

    pub fn export_rule_list(&self, policy: &str) -> ZapiResult<Vec<ExportRuleInfo>> {
        self.get_all(ExportRuleGetIterRequest {
            query: Some(ExportRuleInfo {
                policy_name: Some(policy.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    pub fn quota_on(&self, volume: &str) -> ZapiResult<AsyncResult> {
        self.runner.execute(&QuotaOnRequest {
            volume: volume.to_string(),
        })
    }

    pub fn quota_off(&self, volume: &str) -> ZapiResult<AsyncResult> {
        self.runner.execute(&QuotaOffRequest {
            volume: volume.to_string(),
        })
    }

    pub fn quota_resize(&self, volume: &str) -> ZapiResult<AsyncResult> {
        self.runner.execute(&QuotaResizeRequest {
            volume: volume.to_string(),
        })
    }

    pub fn quota_status(&self, volume: &str) -> ZapiResult<QuotaStatus> {
        self.runner.execute(&QuotaStatusRequest {
            volume: volume.to_string(),
        })
    }

    /// disk_limit is in KB
    pub fn quota_set_entry(
        &self,
        qtree: &str,
        volume: &str,
        quota_target: &str,
        quota_type: &str,
        disk_limit: &str,
    ) -> ZapiResult<()> {
        self.runner.execute(&QuotaSetEntryRequest {
            qtree: qtree.to_string(),
            volume: volume.to_string(),
            quota_target: quota_target.to_string(),
            quota_type: quota_type.to_string(),
            disk_limit: Some(disk_limit.to_string()),
            ..Default::default()
        })
    }

    pub fn quota_entry_list(&self, volume: &str) -> ZapiResult<Vec<QuotaEntry>> {
        self.get_all(QuotaListEntriesIterRequest {
            query: Some(QuotaEntry {
                volume: Some(volume.to_string()),
                quota_type: Some("tree".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// The tree quota on target, a /vol/<volume>/<qtree> path
    pub fn quota_get_entry(&self, target: &str) -> ZapiResult<QuotaEntry> {
        let entries = self.get_page(QuotaListEntriesIterRequest {
            query: Some(QuotaEntry {
                quota_target: Some(target.to_string()),
                quota_type: Some("tree".to_string()),
                ..Default::default()
            }),
            desired_attributes: Some(QuotaEntry {
                disk_limit: Some(String::new()),
                quota_target: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        })?;
        exactly_one(entries, "tree quota for", target)
    }

    /// equivalent to filer::> vserver show
    pub fn vserver_list(&self) -> ZapiResult<Vec<VserverInfo>> {
        self.get_all(VserverGetIterRequest::default())
    }

    pub fn vserver_get(&self) -> ZapiResult<Option<VserverInfo>> {
        Ok(self.runner.execute(&VserverGetRequest::default())?.attributes)
    }

    /// Aggregates assigned to the configured vserver.  vserver-get-iter works
    /// at either scope so the query pins it to that vserver.
    pub fn vserver_get_aggregate_names(&self) -> ZapiResult<Vec<String>> {
        let svm = self
            .runner
            .config()
            .svm
            .clone()
            .ok_or_else(|| ZapiError::new("no SVM configured".to_string()))?;
        let vservers = self.get_page(VserverGetIterRequest {
            query: Some(VserverInfo {
                vserver_name: Some(svm.clone()),
                ..Default::default()
            }),
            ..Default::default()
        })?;
        if vservers.len() != 1 {
            return Err(ZapiError::new(format!("could not find SVM {}", svm)));
        }

        Ok(vservers
            .into_iter()
            .flat_map(|v| v.vserver_aggr_info_list)
            .map(|a| a.aggr_name)
            .collect())
    }

    /// Needs ONTAP 9 or later
    pub fn vserver_show_aggr(&self) -> ZapiResult<Vec<ShowAggregates>> {
        self.get_all(VserverShowAggrGetIterRequest::default())
    }

    pub fn iscsi_service_get(&self) -> ZapiResult<Vec<IscsiServiceInfo>> {
        self.get_all(IscsiServiceGetIterRequest::default())
    }

    pub fn iscsi_interface_get(&self) -> ZapiResult<Vec<IscsiInterfaceListEntryInfo>> {
        self.get_all(IscsiInterfaceGetIterRequest::default())
    }

    /// The vserver's iSCSI target node name
    pub fn iscsi_node_get_name(&self) -> ZapiResult<String> {
        let response = self.runner.execute(&IscsiNodeGetNameRequest {})?;
        response
            .node_name
            .ok_or_else(|| ZapiError::new("no iSCSI node name reported".to_string()))
    }

    pub fn net_interface_get(&self) -> ZapiResult<Vec<NetInterfaceInfo>> {
        self.get_all(NetInterfaceGetIterRequest::default())
    }

    /// Addresses of the LIFs serving the given data protocol
    pub fn net_interface_get_data_lifs(&self, protocol: &str) -> ZapiResult<Vec<String>> {
        let lifs = self
            .net_interface_get()
            .map_err(|e| ZapiError::new(format!("error checking network interfaces: {}", e)))?;
        let data_lifs: Vec<String> = lifs
            .into_iter()
            .filter(|l| l.data_protocols.iter().any(|p| p == protocol))
            .filter_map(|l| l.address)
            .collect();
        debug!("Data LIFs: {:?}", data_lifs);
        Ok(data_lifs)
    }

    /// equivalent to filer::> storage aggregate show-space -aggregate-name aggregate
    pub fn aggr_space_get(&self, aggregate: &str) -> ZapiResult<Vec<SpaceInformation>> {
        self.get_all(AggrSpaceGetIterRequest {
            query: Some(SpaceInformation {
                aggregate: Some(aggregate.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Space promised to the volumes of an aggregate, across every vserver
    pub fn aggregate_commitment(&self, aggregate: &str) -> ZapiResult<AggregateCommitment> {
        let aggregate_size = self
            .aggr_space_get(aggregate)?
            .first()
            .and_then(|s| s.aggregate_size)
            .ok_or_else(|| ZapiError::new(format!("could not get size of aggregate {}", aggregate)))?;

        let mut req = VolumeGetIterRequest {
            query: Some(VolumeAttributes {
                volume_id_attributes: Some(VolumeIdAttributes {
                    containing_aggregate_name: Some(aggregate.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        req.set_max_records(self.max_records);
        let vols = self
            .runner
            .nontunneled()
            .execute_with_iteration(&req)
            .map_err(|e| ZapiError::new(format!("error enumerating Flexvols: {}", e)))?
            .records;

        let mut total_allocated = 0.0;
        for vol in &vols {
            let name = match vol.name() {
                Some(n) => n,
                None => continue,
            };
            let vol_allocated = vol
                .volume_space_attributes
                .as_ref()
                .and_then(|s| s.size_total)
                .unwrap_or(0) as f64;
            let lun_allocated: f64 = self
                .lun_get_all_for_volume(name)
                .map_err(|e| ZapiError::new(format!("error enumerating LUNs for volume {}: {}", name, e)))?
                .iter()
                .filter_map(|l| l.size)
                .map(|s| s as f64)
                .sum();
            debug!(
                "volume {} size_total {} LUNs {}",
                name, vol_allocated, lun_allocated
            );
            total_allocated += vol_allocated.max(lun_allocated);
        }

        Ok(AggregateCommitment {
            aggregate_size: aggregate_size as f64,
            total_allocated,
        })
    }

    pub fn ems_autosupport_log(&self, event: &EmsAutosupportLogRequest) -> ZapiResult<()> {
        self.runner.execute(event)
    }
}

#[cfg(test)]
fn test_client(svm: Option<&str>) -> (OntapClient, std::sync::Arc<crate::runner::testing::ScriptedTransport>) {
    let (runner, transport) = crate::runner::testing::runner(svm);
    let client = OntapClient::with_runner(runner).with_job_poll_interval(Duration::from_millis(5));
    (client, transport)
}

#[test]
fn test_ontapi_version_cached() {
    let (client, transport) = test_client(None);
    transport.push_fixture("system_get_ontapi_version.xml");
    assert_eq!(client.system_get_ontapi_version().unwrap(), "1.150");
    assert_eq!(client.system_get_ontapi_version().unwrap(), "1.150");
    assert!(client.supports_feature(Feature::FabricPoolFlexGroup));
    assert!(client.supports_feature(Feature::MinimumOntapiVersion));
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn test_supports_feature_false_on_error() {
    let (client, transport) = test_client(None);
    transport.push_error(ZapiError::Unauthorized);
    assert!(!client.supports_feature(Feature::FlexGroups));
}

#[test]
fn test_parse_ontapi_version() {
    assert_eq!(parse_ontapi_version("1.21").unwrap(), (1, 21));
    assert!(parse_ontapi_version("1").is_err());
    assert!(parse_ontapi_version("one.two").is_err());
    assert!((1, 130) < Feature::LunGeometrySkip.minimum_version());
    assert!((1, 130) >= Feature::FlexGroups.minimum_version());
}

#[test]
fn test_volume_create_sets_tiering_policy() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("system_get_ontapi_version.xml");
    transport.push_fixture("passed.xml");
    client
        .volume_create(VolumeCreateRequest {
            volume: "trident_pvc_3".to_string(),
            containing_aggr_name: Some("aggr1".to_string()),
            size: Some("1g".to_string()),
            ..Default::default()
        })
        .unwrap();
    let sent = transport.sent();
    assert!(sent[1].contains("<tiering-policy>none</tiering-policy>"));
    assert!(sent[1].contains("<volume>trident_pvc_3</volume>"));
}

#[test]
fn test_volume_get_counts() {
    let (client, transport) = test_client(None);
    transport.push_fixture("volume_get_iter_empty.xml");
    let err = client.volume_get("nope").unwrap_err();
    assert_eq!(err.to_string(), "flexvol nope not found");

    transport.push_fixture("volume_get_iter_page1.xml");
    let err = client.volume_get("trident_*").unwrap_err();
    assert!(err.to_string().starts_with("more than one"));

    transport.push_fixture("volume_get_iter_page2.xml");
    assert_eq!(client.volume_size("trident_pvc_2").unwrap(), 2_147_483_648);
    let sent = transport.sent();
    assert!(sent[2].contains("<state>online</state>"));
    assert!(sent[2].contains("<max-records>100</max-records>"));
}

#[test]
fn test_volume_list_pages() {
    let (client, transport) = test_client(None);
    transport.push_fixture("volume_get_iter_page1.xml");
    transport.push_fixture("volume_get_iter_page2.xml");
    let names = client.volume_list("").unwrap();
    assert_eq!(names, vec!["vol0", "trident_pvc_1", "trident_pvc_2"]);
}

#[test]
fn test_volume_exists() {
    let (client, transport) = test_client(None);
    transport.push_fixture("failed_not_found.xml");
    assert!(!client.volume_exists("missing").unwrap());
    transport.push_fixture("passed.xml");
    assert!(client.volume_exists("vol0").unwrap());
    transport.push_error(ZapiError::Unauthorized);
    assert!(client.volume_exists("vol0").is_err());
}

#[test]
fn test_wait_for_async_immediate() {
    let (client, transport) = test_client(None);
    let done = AsyncResult {
        result_status: Some("succeeded".to_string()),
        ..Default::default()
    };
    client
        .wait_for_async_response(&done, Duration::from_secs(1))
        .unwrap();
    let failed = AsyncResult {
        result_status: Some("failed".to_string()),
        result_error_code: Some(13001),
        ..Default::default()
    };
    let err = client
        .wait_for_async_response(&failed, Duration::from_secs(1))
        .unwrap_err();
    assert!(err.to_string().contains("13001"));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_volume_destroy_async_polls_job() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("async_in_progress.xml");
    transport.push_fixture("job_get_iter_running.xml");
    transport.push_fixture("job_get_iter_success.xml");
    client
        .volume_destroy_async("trident_pvc_1", true, Duration::from_secs(30))
        .unwrap();
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].contains("vfiler=\"svm_iscsi\""));
    assert!(sent[1].contains("<job-id>4321</job-id>"));
    assert!(!sent[1].contains("vfiler"));
}

#[test]
fn test_volume_destroy_async_replies() {
    let (client, transport) = test_client(None);
    transport.push_fixture("async_succeeded.xml");
    client
        .volume_destroy_async("trident_pvc_1", false, Duration::from_secs(1))
        .unwrap();
    assert_eq!(transport.sent().len(), 1);

    transport.push_fixture("async_failed.xml");
    let err = client
        .volume_destroy_async("trident_pvc_1", false, Duration::from_secs(1))
        .unwrap_err();
    assert_eq!(err.to_string(), "result status is failed with errorCode 13001");
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn test_job_failure_is_permanent() {
    let (client, transport) = test_client(None);
    transport.push_fixture("job_get_iter_failure.xml");
    transport.push_fixture("job_get_iter_success.xml");
    let running = AsyncResult {
        result_status: Some("in_progress".to_string()),
        result_jobid: Some(4321),
        ..Default::default()
    };
    let err = client
        .wait_for_async_response(&running, Duration::from_secs(30))
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("job Id 4321 failed to complete successfully"));
    assert!(err.to_string().contains("job state: failure"));
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn test_vserver_aggregate_names() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("vserver_get_iter.xml");
    assert_eq!(
        client.vserver_get_aggregate_names().unwrap(),
        vec!["aggr1".to_string(), "aggr2".to_string()]
    );
    assert!(transport.sent()[0].contains("<vserver-name>svm_iscsi</vserver-name>"));

    let (client, _) = test_client(None);
    assert!(client.vserver_get_aggregate_names().is_err());
}

#[test]
fn test_data_lifs() {
    let (client, transport) = test_client(None);
    transport.push_fixture("net_interface_get_iter.xml");
    assert_eq!(
        client.net_interface_get_data_lifs("iscsi").unwrap(),
        vec!["10.0.0.12".to_string()]
    );
}

#[test]
fn test_lun_get_and_serial() {
    let (client, transport) = test_client(None);
    transport.push_fixture("lun_get_iter.xml");
    let lun = client.lun_get("/vol/trident_lun_pool/lun0").unwrap();
    assert_eq!(lun.serial_number.as_deref(), Some("80CS+]Kc5IuB"));
    transport.push_reply(
        "<netapp version='1.150' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><serial-number>80CS+]Kc5IuB</serial-number></results></netapp>",
    );
    assert_eq!(
        client
            .lun_get_serial_number("/vol/trident_lun_pool/lun0")
            .unwrap(),
        "80CS+]Kc5IuB"
    );
}

#[test]
fn test_job_poll_gives_up_after_max_wait() {
    let (client, transport) = test_client(None);
    for _ in 0..20 {
        transport.push_fixture("job_get_iter_running.xml");
    }
    let running = AsyncResult {
        result_status: Some("in_progress".to_string()),
        result_jobid: Some(4321),
        ..Default::default()
    };
    let err = client
        .wait_for_async_response(&running, Duration::from_millis(40))
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("job Id 4321 failed to complete successfully"));
    let polls = transport.sent().len();
    assert!(polls > 1 && polls < 20);
}

#[test]
fn test_job_status_error_is_retried() {
    let (client, transport) = test_client(None);
    transport.push_error(ZapiError::new("connection reset".to_string()));
    transport.push_fixture("job_get_iter_success.xml");
    let running = AsyncResult {
        result_status: Some("in_progress".to_string()),
        result_jobid: Some(4321),
        ..Default::default()
    };
    client
        .wait_for_async_response(&running, Duration::from_secs(30))
        .unwrap();
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn test_ontapi_version_unlocked_during_call() {
    use std::fs::read_to_string;
    use std::sync::{mpsc, Arc};
    use std::thread;

    use crate::runner::Transport;

    // Holds the reply back until the test releases it
    struct GatedTransport {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<String>>,
    }

    impl Transport for GatedTransport {
        fn post(&self, _body: String) -> ZapiResult<String> {
            self.entered.lock().unwrap().send(()).unwrap();
            Ok(self.release.lock().unwrap().recv().unwrap())
        }
    }

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let transport = Arc::new(GatedTransport {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let runner = ZapiRunner::with_transport(ZapiConfig::new("10.0.0.5", "admin", "secret"), transport);
    let client = Arc::new(OntapClient::with_runner(runner));

    let caller = {
        let client = client.clone();
        thread::spawn(move || client.system_get_ontapi_version().map_err(|e| e.to_string()))
    };
    entered_rx.recv().unwrap();
    assert!(client.ontapi_version.try_lock().is_ok());

    release_tx
        .send(read_to_string("tests/netapp/system_get_ontapi_version.xml").unwrap())
        .unwrap();
    assert_eq!(caller.join().unwrap().unwrap(), "1.150");
    assert_eq!(client.cached_ontapi_version().unwrap().as_deref(), Some("1.150"));
}

#[test]
fn test_node_list_serial_numbers() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("node_get_iter.xml");
    assert_eq!(
        client.node_list_serial_numbers().unwrap(),
        vec!["721802000111".to_string(), "721802000112".to_string()]
    );
    let sent = transport.sent();
    assert!(!sent[0].contains("vfiler"));
    assert!(sent[0].contains("<desired-attributes><node-details-info><node-serial-number"));

    transport.push_fixture("volume_get_iter_empty.xml");
    let err = client.node_list_serial_numbers().unwrap_err();
    assert_eq!(err.to_string(), "could not get node serial numbers");
}

#[test]
fn test_volume_rename_and_offline() {
    let (client, transport) = test_client(None);
    transport.push_fixture("passed.xml");
    transport.push_fixture("passed.xml");
    client.volume_rename("trident_pvc_1", "trident_pvc_1_old").unwrap();
    client.volume_offline("trident_pvc_1_old").unwrap();
    let sent = transport.sent();
    assert!(sent[0].contains(
        "<volume-rename><new-volume-name>trident_pvc_1_old</new-volume-name>\
         <volume>trident_pvc_1</volume></volume-rename>"
    ));
    assert!(sent[1].contains("<volume-offline><name>trident_pvc_1_old</name></volume-offline>"));
}

#[test]
fn test_volume_disable_snapshot_directory_access() {
    let (client, transport) = test_client(None);
    transport.push_reply(
        "<netapp version='1.150' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><num-failed>0</num-failed><num-succeeded>1</num-succeeded></results></netapp>",
    );
    client
        .volume_disable_snapshot_directory_access("trident_pvc_1")
        .unwrap();
    let sent = transport.sent();
    assert!(sent[0].contains(
        "<attributes><volume-attributes><volume-snapshot-attributes>\
         <snapdir-access-enabled>false</snapdir-access-enabled>"
    ));
    assert!(sent[0].contains(
        "<query><volume-attributes><volume-id-attributes><name>trident_pvc_1</name>"
    ));

    transport.push_fixture("volume_modify_iter_failed.xml");
    let err = client
        .volume_disable_snapshot_directory_access("trident_pvc_1")
        .unwrap_err();
    assert!(err.to_string().contains("restricted volume"));
}

#[test]
fn test_flexgroup_create_needs_feature() {
    let (client, transport) = test_client(None);
    transport.push_reply(
        "<netapp version='1.110' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><major-version>1</major-version><minor-version>110</minor-version></results></netapp>",
    );
    let err = client
        .flexgroup_create(VolumeCreateAsyncRequest {
            volume_name: "trident_fg_1".to_string(),
            size: 1_099_511_627_776,
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "ONTAP version does not support FlexGroups");
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn test_flexgroup_create() {
    let (client, transport) = test_client(Some("svm_nfs"));
    transport.push_fixture("system_get_ontapi_version.xml");
    transport.push_fixture("async_in_progress.xml");
    transport.push_fixture("job_get_iter_success.xml");
    client
        .flexgroup_create(VolumeCreateAsyncRequest {
            volume_name: "trident_fg_1".to_string(),
            aggr_list: vec!["aggr1".to_string(), "aggr2".to_string()],
            size: 1_099_511_627_776,
            ..Default::default()
        })
        .unwrap();
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[1].contains(
        "<aggr-list><aggr-name>aggr1</aggr-name><aggr-name>aggr2</aggr-name></aggr-list>"
    ));
    assert!(sent[1].contains("<junction-path>/trident_fg_1</junction-path>"));
    assert!(sent[1].contains("<tiering-policy>none</tiering-policy>"));
    assert!(sent[2].contains("<job-id>4321</job-id>"));
}

#[test]
fn test_flexgroup_destroy_already_gone() {
    let (client, transport) = test_client(None);
    transport.push_fixture("failed_volume_missing.xml");
    client.flexgroup_destroy("trident_fg_1", true).unwrap();

    transport.push_fixture("failed_not_found.xml");
    assert!(client.flexgroup_destroy("trident_fg_1", true).is_err());
    assert!(transport.sent()[0].contains("<volume-destroy-async>"));
}

#[test]
fn test_flexgroup_exists() {
    let (client, transport) = test_client(None);
    transport.push_fixture("failed_not_found.xml");
    assert!(!client.flexgroup_exists("trident_fg_1").unwrap());

    transport.push_fixture("volume_size_async.xml");
    transport.push_fixture("job_get_iter_success.xml");
    assert!(client.flexgroup_exists("trident_fg_1").unwrap());
    assert!(transport.sent()[1].contains(
        "<volume-size-async><volume-name>trident_fg_1</volume-name></volume-size-async>"
    ));
}

#[test]
fn test_flexgroup_get_and_size() {
    let (client, transport) = test_client(None);
    transport.push_fixture("volume_get_iter_flexgroup.xml");
    let fg = client.flexgroup_get("trident_fg_1").unwrap();
    assert_eq!(
        fg.volume_id_attributes.unwrap().aggr_list,
        vec!["aggr1".to_string(), "aggr2".to_string()]
    );
    assert!(transport.sent()[0].contains("<style-extended>flexgroup</style-extended>"));

    transport.push_fixture("volume_get_iter_flexgroup.xml");
    assert_eq!(client.flexgroup_size("trident_fg_1").unwrap(), 1_099_511_627_776);

    transport.push_fixture("volume_get_iter_empty.xml");
    assert_eq!(
        client.flexgroup_get("trident_fg_2").unwrap_err().to_string(),
        "flexgroup trident_fg_2 not found"
    );

    transport.push_fixture("volume_get_iter_flexgroup.xml");
    assert_eq!(client.flexgroup_get_all("trident_").unwrap().len(), 1);
    let sent = transport.sent();
    assert!(sent[3].contains("<name>trident_*</name><style-extended>flexgroup</style-extended>"));
    assert!(sent[3].contains("<desired-attributes>"));
}

#[test]
fn test_flexgroup_set_size_waits() {
    let (client, transport) = test_client(None);
    transport.push_fixture("volume_size_async.xml");
    transport.push_fixture("job_get_iter_running.xml");
    transport.push_fixture("job_get_iter_success.xml");
    client.flexgroup_set_size("trident_fg_1", "1t").unwrap();
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent[0].contains("<new-size>1t</new-size>"));
}

#[test]
fn test_flexgroup_disable_snapshot_directory_access() {
    let (client, transport) = test_client(None);
    transport.push_fixture("volume_modify_iter_async.xml");
    transport.push_fixture("job_get_iter_success.xml");
    client
        .flexgroup_disable_snapshot_directory_access("trident_fg_1")
        .unwrap();
    let sent = transport.sent();
    assert!(sent[0].contains("<volume-modify-iter-async>"));
    assert!(sent[1].contains("<job-id>4321</job-id>"));
}

#[test]
fn test_lun_map_if_not_mapped() {
    let (client, transport) = test_client(None);
    transport.push_fixture("lun_map_list_info.xml");
    assert_eq!(
        client
            .lun_map_if_not_mapped("trident", "/vol/trident_lun_pool/lun0")
            .unwrap(),
        3
    );
    assert_eq!(transport.sent().len(), 1);

    transport.push_fixture("lun_map_list_info.xml");
    transport.push_reply(
        "<netapp version='1.150' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><lun-id-assigned>7</lun-id-assigned></results></netapp>",
    );
    assert_eq!(
        client
            .lun_map_if_not_mapped("docker", "/vol/trident_lun_pool/lun0")
            .unwrap(),
        7
    );
    let sent = transport.sent();
    assert!(sent[2].contains("<lun-map><initiator-group>docker</initiator-group>"));
    assert!(!sent[2].contains("<lun-id>"));
}

#[test]
fn test_lun_resize_checked() {
    let (client, transport) = test_client(None);
    transport.push_reply(
        "<netapp version='1.140' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><major-version>1</major-version><minor-version>140</minor-version></results></netapp>",
    );
    transport.push_fixture("lun_get_geometry.xml");
    let err = client
        .lun_resize_checked("/vol/trident_lun_pool/lun0", 107_374_182_400)
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("requested size 107374182400 is larger than LUN's maximum capacity"));

    let (client, transport) = test_client(None);
    transport.push_fixture("system_get_ontapi_version.xml");
    transport.push_reply(
        "<netapp version='1.150' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><actual-size>107374182400</actual-size></results></netapp>",
    );
    assert_eq!(
        client
            .lun_resize_checked("/vol/trident_lun_pool/lun0", 107_374_182_400)
            .unwrap(),
        107_374_182_400
    );
    assert!(!transport.sent()[1].contains("lun-get-geometry"));
}

#[test]
fn test_lun_count_and_volume_luns() {
    let (client, transport) = test_client(None);
    transport.push_fixture("lun_get_iter.xml");
    assert_eq!(client.lun_count("trident_lun_pool").unwrap(), 1);
    assert!(transport.sent()[0].contains("<query><lun-info><volume>trident_lun_pool</volume></lun-info></query>"));

    transport.push_fixture("volume_get_iter_empty.xml");
    assert!(client.lun_get_all_for_volume("trident_pvc_1").unwrap().is_empty());
}

#[test]
fn test_lun_online_offline_attribute() {
    let (client, transport) = test_client(None);
    transport.push_fixture("passed.xml");
    transport.push_fixture("passed.xml");
    transport.push_fixture("passed.xml");
    transport.push_reply(
        "<netapp version='1.150' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\"><value>pvc-1</value></results></netapp>",
    );
    client.lun_offline("/vol/v/lun0").unwrap();
    client.lun_online("/vol/v/lun0").unwrap();
    client
        .lun_set_attribute("/vol/v/lun0", "context", "pvc-1")
        .unwrap();
    assert_eq!(client.lun_get_attribute("/vol/v/lun0", "context").unwrap(), "pvc-1");
    let sent = transport.sent();
    assert!(sent[0].contains("<lun-offline><path>/vol/v/lun0</path></lun-offline>"));
    assert!(sent[1].contains("<lun-online><path>/vol/v/lun0</path></lun-online>"));
    assert!(sent[2].contains("<lun-set-attribute><name>context</name><path>/vol/v/lun0</path><value>pvc-1</value>"));
}

#[test]
fn test_igroup_destroy() {
    let (client, transport) = test_client(None);
    transport.push_fixture("passed.xml");
    client.igroup_destroy("trident").unwrap();
    assert!(transport.sent()[0].contains(
        "<igroup-destroy><initiator-group-name>trident</initiator-group-name></igroup-destroy>"
    ));
}

#[test]
fn test_iscsi_node_get_name() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("iscsi_node_get_name.xml");
    assert_eq!(
        client.iscsi_node_get_name().unwrap(),
        "iqn.1992-08.com.netapp:sn.7a1c5e0e1b2a11e9a2f1005056a7d1f0:vs.3"
    );
    transport.push_fixture("passed.xml");
    assert!(client.iscsi_node_get_name().is_err());
}

#[test]
fn test_qtree_list_and_count() {
    let (client, transport) = test_client(None);
    transport.push_fixture("qtree_list_iter.xml");
    let names: Vec<String> = client
        .qtree_list("trident_", "trident_qtree_pool_")
        .unwrap()
        .into_iter()
        .filter_map(|q| q.qtree)
        .collect();
    assert_eq!(names, vec!["", "trident_pvc_1", "trident_pvc_2"]);
    assert!(transport.sent()[0].contains(
        "<query><qtree-info><qtree>trident_*</qtree><volume>trident_qtree_pool_*</volume></qtree-info></query>"
    ));

    transport.push_fixture("qtree_list_iter.xml");
    assert_eq!(client.qtree_count("trident_qtree_pool_abc").unwrap(), 2);
    transport.push_fixture("volume_get_iter_empty.xml");
    assert_eq!(client.qtree_count("trident_qtree_pool_abc").unwrap(), 0);
}

#[test]
fn test_qtree_exists_and_get() {
    let (client, transport) = test_client(None);
    transport.push_fixture("qtree_get_iter.xml");
    assert_eq!(
        client
            .qtree_exists("trident_pvc_1", "trident_qtree_pool_")
            .unwrap()
            .as_deref(),
        Some("trident_qtree_pool_abc")
    );
    transport.push_fixture("qtree_list_iter.xml");
    assert_eq!(client.qtree_exists("trident_*", "trident_qtree_pool_").unwrap(), None);

    transport.push_fixture("qtree_get_iter.xml");
    let qtree = client.qtree_get("trident_pvc_1", "trident_qtree_pool_").unwrap();
    assert_eq!(qtree.mode.as_deref(), Some("0755"));
    transport.push_fixture("volume_get_iter_empty.xml");
    assert_eq!(
        client
            .qtree_get("trident_pvc_9", "trident_qtree_pool_")
            .unwrap_err()
            .to_string(),
        "qtree trident_pvc_9 not found"
    );
}

#[test]
fn test_qtree_rename_and_destroy() {
    let (client, transport) = test_client(None);
    transport.push_fixture("passed.xml");
    transport.push_fixture("async_in_progress.xml");
    client
        .qtree_rename("/vol/pool/trident_pvc_1", "/vol/pool/deleted_trident_pvc_1")
        .unwrap();
    let result = client
        .qtree_destroy_async("/vol/pool/deleted_trident_pvc_1", true)
        .unwrap();
    assert_eq!(result.result_jobid, Some(4321));
    let sent = transport.sent();
    assert!(sent[0].contains(
        "<qtree-rename><new-qtree-name>/vol/pool/deleted_trident_pvc_1</new-qtree-name>"
    ));
    assert!(sent[1].contains(
        "<qtree-delete-async><force>true</force><qtree>/vol/pool/deleted_trident_pvc_1</qtree>"
    ));
}

#[test]
fn test_quota_status_and_entries() {
    let (client, transport) = test_client(None);
    transport.push_fixture("quota_status.xml");
    assert_eq!(
        client.quota_status("trident_qtree_pool_abc").unwrap().status.as_deref(),
        Some("on")
    );

    transport.push_fixture("quota_list_entries_iter.xml");
    let entries = client.quota_entry_list("trident_qtree_pool_abc").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].disk_limit.as_deref(), Some("1048576"));
    assert!(transport.sent()[1].contains(
        "<query><quota-entry><quota-type>tree</quota-type><volume>trident_qtree_pool_abc</volume></quota-entry></query>"
    ));
}

#[test]
fn test_quota_get_entry() {
    let (client, transport) = test_client(None);
    transport.push_fixture("quota_list_entries_iter.xml");
    let entry = client
        .quota_get_entry("/vol/trident_qtree_pool_abc/trident_pvc_1")
        .unwrap();
    assert_eq!(entry.volume.as_deref(), Some("trident_qtree_pool_abc"));

    transport.push_fixture("volume_get_iter_empty.xml");
    assert_eq!(
        client.quota_get_entry("/vol/x/y").unwrap_err().to_string(),
        "tree quota for /vol/x/y not found"
    );
}

#[test]
fn test_export_rule_list() {
    let (client, transport) = test_client(None);
    transport.push_fixture("export_rule_get_iter.xml");
    let rules = client
        .export_rule_list("trident_qtree_pool_export_policy")
        .unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].client_match.as_deref(), Some("10.0.0.0/24"));
    assert_eq!(rules[0].protocol, vec!["nfs3".to_string(), "nfs4".to_string()]);
    assert_eq!(rules[0].super_user_security, vec!["none".to_string()]);
    assert!(transport.sent()[0].contains(
        "<policy-name>trident_qtree_pool_export_policy</policy-name>"
    ));
}

#[test]
fn test_aggregate_commitment() {
    let (client, transport) = test_client(Some("svm_iscsi"));
    transport.push_fixture("aggr_space_get_iter.xml");
    transport.push_fixture("volume_get_iter_aggr1.xml");
    transport.push_fixture("volume_get_iter_empty.xml");
    transport.push_fixture("lun_get_iter.xml");
    let commitment = client.aggregate_commitment("aggr1").unwrap();
    assert_eq!(commitment.aggregate_size, 107_374_182_400.0);
    // 1g flexvol plus a 1g flexvol holding a 2g LUN
    assert_eq!(commitment.total_allocated, 3_221_225_472.0);
    assert_eq!(
        commitment.to_string(),
        "AggregateSize: 107374182400 TotalAllocated: 3221225472 Percent: 3.00 %"
    );
    assert!((commitment.percent_with_requested_size(3_221_225_472.0) - 6.0).abs() < 1e-9);

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].contains("<aggregate>aggr1</aggregate>"));
    assert!(!sent[1].contains("vfiler"));
    assert!(sent[1].contains("<containing-aggregate-name>aggr1</containing-aggregate-name>"));
    assert!(sent[3].contains("<volume>trident_lun_pool</volume>"));
}

#[test]
fn test_clone_operations() {
    let (client, transport) = test_client(None);
    transport.push_fixture("passed.xml");
    transport.push_fixture("async_in_progress.xml");
    client
        .lun_clone_create("trident_lun_pool", "lun0", "lun0_clone")
        .unwrap();
    let result = client.volume_clone_split_start("trident_pvc_2").unwrap();
    assert_eq!(result.result_status.as_deref(), Some("in_progress"));
    let sent = transport.sent();
    assert!(sent[0].contains(
        "<clone-create><destination-path>lun0_clone</destination-path>\
         <source-path>lun0</source-path><volume>trident_lun_pool</volume></clone-create>"
    ));
    assert!(sent[1].contains("<volume-clone-split-start><volume>trident_pvc_2</volume>"));
}

#[test]
fn test_quota_on_off_resize_set() {
    let (client, transport) = test_client(None);
    transport.push_fixture("async_in_progress.xml");
    transport.push_fixture("async_succeeded.xml");
    transport.push_fixture("async_succeeded.xml");
    transport.push_fixture("passed.xml");
    assert_eq!(client.quota_off("pool").unwrap().result_jobid, Some(4321));
    client.quota_on("pool").unwrap();
    client.quota_resize("pool").unwrap();
    client
        .quota_set_entry("", "pool", "/vol/pool/trident_pvc_1", "tree", "1048576")
        .unwrap();
    let sent = transport.sent();
    assert!(sent[0].contains("<quota-off><volume>pool</volume></quota-off>"));
    assert!(sent[1].contains("<quota-on><volume>pool</volume></quota-on>"));
    assert!(sent[2].contains("<quota-resize><volume>pool</volume></quota-resize>"));
    assert!(sent[3].contains("<quota-set-entry><disk-limit>1048576</disk-limit>"));
    assert!(sent[3].contains(
        "<quota-target>/vol/pool/trident_pvc_1</quota-target><quota-type>tree</quota-type><volume>pool</volume>"
    ));
}
