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
use chrono::{DateTime, TimeZone, Utc};

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "system-get-version")]
pub struct SystemGetVersionRequest {}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct SystemVersionTuple {
    pub generation: Option<u32>,
    pub major: Option<u32>,
    pub minor: Option<u32>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct SystemVersion {
    /// Seconds since the epoch
    pub build_timestamp: Option<i64>,
    pub is_clustered: Option<bool>,
    pub version: Option<String>,
    #[zapi(wrap = "system-version-tuple")]
    pub version_tuple: Option<SystemVersionTuple>,
}

impl SystemVersion {
    pub fn build_time(&self) -> Option<DateTime<Utc>> {
        self.build_timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

zapi_request!(SystemGetVersionRequest => SystemVersion);

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "system-get-ontapi-version")]
pub struct SystemGetOntapiVersionRequest {}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct OntapiVersion {
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
}

zapi_request!(SystemGetOntapiVersionRequest => OntapiVersion);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct NodeDetailsInfo {
    pub is_node_healthy: Option<bool>,
    pub node: Option<String>,
    pub node_model: Option<String>,
    pub node_serial_number: Option<String>,
    pub node_uptime: Option<u64>,
    pub node_uuid: Option<String>,
    pub product_version: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "system-node-get-iter")]
pub struct SystemNodeGetIterRequest {
    #[zapi(wrap = "node-details-info")]
    pub desired_attributes: Option<NodeDetailsInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "node-details-info")]
    pub query: Option<NodeDetailsInfo>,
    pub tag: Option<String>,
}

iter_request!(SystemNodeGetIterRequest => NodeDetailsInfo);

#[test]
fn test_system_version_decode() {
    use crate::codec::ZapiValue;

    let results = crate::api::fixture_results("system_get_version.xml");
    let version = SystemVersion::from_element(&results).unwrap();
    assert_eq!(version.is_clustered, Some(true));
    assert!(version
        .version
        .as_ref()
        .unwrap()
        .starts_with("NetApp Release 9.5"));
    let tuple = version.version_tuple.as_ref().unwrap();
    assert_eq!((tuple.generation, tuple.major, tuple.minor), (Some(9), Some(5), Some(0)));
    let built = version.build_time().unwrap();
    assert_eq!(built.timestamp(), 1_548_280_153);
}
