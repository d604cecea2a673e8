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

use crate::codec::{Element, XmlWriter, ZapiValue};
use crate::error::*;

/// The reply of every `*-async` call
#[derive(Clone, Debug, Default, ZapiObject)]
pub struct AsyncResult {
    pub result_error_code: Option<i64>,
    pub result_error_message: Option<String>,
    pub result_jobid: Option<u64>,
    /// succeeded, in_progress or failed
    pub result_status: Option<String>,
}

/// Replies that report a background job, directly or inside a list
pub trait AsyncResponse {
    fn async_result(&self) -> AsyncResult;
}

impl AsyncResponse for AsyncResult {
    fn async_result(&self) -> AsyncResult {
        self.clone()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobState {
    Initial,
    Queued,
    Running,
    Waiting,
    Pausing,
    Paused,
    Quitting,
    Success,
    Failure,
    Reschedule,
    Error,
    Quit,
    Dead,
    Unknown,
    Restart,
    Dormant,
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match *self {
            JobState::Initial => "initial",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Waiting => "waiting",
            JobState::Pausing => "pausing",
            JobState::Paused => "paused",
            JobState::Quitting => "quitting",
            JobState::Success => "success",
            JobState::Failure => "failure",
            JobState::Reschedule => "reschedule",
            JobState::Error => "error",
            JobState::Quit => "quit",
            JobState::Dead => "dead",
            JobState::Unknown => "unknown",
            JobState::Restart => "restart",
            JobState::Dormant => "dormant",
            JobState::Other(ref s) => s.as_str(),
        }
    }

    /// The job is over and will never succeed
    pub fn is_failed(&self) -> bool {
        match *self {
            JobState::Failure | JobState::Error | JobState::Quit | JobState::Dead => true,
            _ => false,
        }
    }
}

impl<'a> From<&'a str> for JobState {
    fn from(s: &'a str) -> JobState {
        match s {
            "initial" => JobState::Initial,
            "queued" => JobState::Queued,
            "running" => JobState::Running,
            "waiting" => JobState::Waiting,
            "pausing" => JobState::Pausing,
            "paused" => JobState::Paused,
            "quitting" => JobState::Quitting,
            "success" => JobState::Success,
            "failure" => JobState::Failure,
            "reschedule" => JobState::Reschedule,
            "error" => JobState::Error,
            "quit" => JobState::Quit,
            "dead" => JobState::Dead,
            "unknown" => JobState::Unknown,
            "restart" => JobState::Restart,
            "dormant" => JobState::Dormant,
            _ => JobState::Other(s.to_string()),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ZapiValue for JobState {
    fn from_element(element: &Element) -> ZapiResult<Self> {
        let s = String::from_element(element)?;
        Ok(JobState::from(s.as_str()))
    }

    fn write_body<W: Write>(&self, w: &mut XmlWriter<W>) -> ZapiResult<()> {
        self.as_str().to_string().write_body(w)
    }
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct JobInfo {
    pub job_completion: Option<String>,
    pub job_description: Option<String>,
    pub job_id: Option<u64>,
    pub job_name: Option<String>,
    pub job_state: Option<JobState>,
    pub job_status_code: Option<i64>,
    pub job_vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "job-get-iter")]
pub struct JobGetIterRequest {
    #[zapi(wrap = "job-info")]
    pub desired_attributes: Option<JobInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "job-info")]
    pub query: Option<JobInfo>,
    pub tag: Option<String>,
}

iter_request!(JobGetIterRequest => JobInfo);

#[test]
fn test_job_info_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("job_get_iter_running.xml");
    let jobs: Vec<JobInfo> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_id, Some(4321));
    assert_eq!(jobs[0].job_state, Some(JobState::Running));
    assert!(!jobs[0].job_state.as_ref().unwrap().is_failed());
}

#[test]
fn test_job_state_strings() {
    assert!(JobState::from("dead").is_failed());
    assert!(JobState::from("quit").is_failed());
    assert!(!JobState::from("success").is_failed());
    assert_eq!(JobState::from("sleepy"), JobState::Other("sleepy".to_string()));
    assert_eq!(JobState::Paused.to_string(), "paused");
}

#[test]
fn test_job_query_encoding() {
    let req = JobGetIterRequest {
        query: Some(JobInfo {
            job_id: Some(4321),
            ..Default::default()
        }),
        ..Default::default()
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains("<job-get-iter><query><job-info><job-id>4321</job-id></job-info></query></job-get-iter>"));
}
