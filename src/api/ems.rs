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

/// Logs an event to the array's EMS and optionally autosupport
#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "ems-autosupport-log")]
pub struct EmsAutosupportLogRequest {
    pub app_version: String,
    pub auto_support: bool,
    pub category: String,
    pub computer_name: String,
    pub event_description: String,
    pub event_id: i64,
    pub event_source: String,
    /// 0 emergency through 6 debug
    pub log_level: u32,
}

zapi_request!(EmsAutosupportLogRequest => ());

#[test]
fn test_ems_encoding() {
    let req = EmsAutosupportLogRequest {
        app_version: "0.1.0".to_string(),
        auto_support: false,
        category: "provisioning".to_string(),
        computer_name: "host1".to_string(),
        event_description: "heartbeat".to_string(),
        event_id: 1,
        event_source: "ontap-zapi".to_string(),
        log_level: 6,
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains("<auto-support>false</auto-support>"));
    assert!(body.contains("<event-id>1</event-id>"));
    assert!(body.contains("<log-level>6</log-level></ems-autosupport-log>"));
}
