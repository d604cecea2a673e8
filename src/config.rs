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
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

use crate::error::*;

static FILER_URL: &str = "servlets/netapp.servlets.admin.XMLrequest_filer";

fn default_secure() -> bool {
    true
}

fn default_ontapi_version() -> String {
    "1.21".to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_max_records() -> u32 {
    100
}

#[derive(Clone, Deserialize, Debug)]
pub struct ZapiConfig {
    /// Cluster or vserver management LIF, host or host:port
    pub management_lif: String,
    /// Tunnel every call to this vserver
    #[serde(default)]
    pub svm: Option<String>,
    pub username: String,
    pub password: String,
    /// Use https.  ONTAP only allows plain http when explicitly enabled
    #[serde(default = "default_secure")]
    pub secure: bool,
    /// Version attribute sent on the netapp envelope
    #[serde(default = "default_ontapi_version")]
    pub ontapi_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional certificate file to use against the server
    /// der encoded
    #[serde(default)]
    pub certificate: Option<String>,
    /// Page size hint for get-iter calls
    #[serde(default = "default_max_records")]
    pub max_records: u32,
    /// Example: {"api": false, "method": true}
    #[serde(default)]
    pub debug_trace_flags: HashMap<String, bool>,
}

impl ZapiConfig {
    pub fn new(management_lif: &str, username: &str, password: &str) -> Self {
        ZapiConfig {
            management_lif: management_lif.to_string(),
            svm: None,
            username: username.to_string(),
            password: password.to_string(),
            secure: default_secure(),
            ontapi_version: default_ontapi_version(),
            timeout_secs: default_timeout_secs(),
            certificate: None,
            max_records: default_max_records(),
            debug_trace_flags: HashMap::new(),
        }
    }

    /// Read the config from a json file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ZapiResult<Self> {
        let f = File::open(path)?;
        let config: ZapiConfig = serde_json::from_reader(f)?;
        Ok(config)
    }

    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}/{}", scheme, self.management_lif, FILER_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Is the named debug trace flag switched on
    pub fn trace(&self, flag: &str) -> bool {
        self.debug_trace_flags.get(flag).cloned().unwrap_or(false)
    }
}

#[test]
fn test_config_defaults() {
    let config: ZapiConfig = serde_json::from_str(
        r#"{"management_lif": "10.0.0.5", "username": "admin", "password": "secret"}"#,
    )
    .unwrap();
    assert!(config.secure);
    assert_eq!(config.svm, None);
    assert_eq!(config.ontapi_version, "1.21");
    assert_eq!(config.timeout(), Duration::from_secs(90));
    assert_eq!(config.max_records, 100);
    assert!(!config.trace("api"));
    assert_eq!(
        config.url(),
        "https://10.0.0.5/servlets/netapp.servlets.admin.XMLrequest_filer"
    );
}

#[test]
fn test_config_from_file() {
    let config = ZapiConfig::from_file("tests/netapp/config.json").unwrap();
    assert_eq!(config.svm.as_deref(), Some("svm_iscsi"));
    assert!(!config.secure);
    assert!(config.trace("api"));
    assert!(!config.trace("method"));
    assert_eq!(
        config.url(),
        "http://cluster1.example.com:8080/servlets/netapp.servlets.admin.XMLrequest_filer"
    );
}
