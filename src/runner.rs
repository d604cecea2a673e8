//! Sends ZAPI requests to an ONTAP system and decodes the replies.
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
use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use crate::codec::{self, Element, ResultStatus, ZapiElement, ZapiValue};
use crate::config::ZapiConfig;
use crate::error::*;
use crate::iter::{collect_pages, IterRequest, PagedResponse, Pages};

use log::{debug, error, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Certificate, StatusCode};

/// A request with a single, non paged, reply
pub trait ZapiRequest: ZapiElement {
    type Response: ZapiValue;
}

/// Moves an encoded envelope to the array and hands back the raw reply
pub trait Transport: Send + Sync {
    fn post(&self, body: String) -> ZapiResult<String>;
}

pub struct HttpTransport {
    client: Client,
    url: String,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &ZapiConfig) -> ZapiResult<Self> {
        let mut builder = Client::builder().timeout(config.timeout());
        match config.certificate {
            Some(ref cert_file) => {
                let mut buf = Vec::new();
                File::open(cert_file)?.read_to_end(&mut buf)?;
                builder = builder.add_root_certificate(Certificate::from_der(&buf)?);
            }
            None => {
                // ONTAP ships with a self signed certificate
                builder = builder.danger_accept_invalid_certs(true);
            }
        };
        Ok(HttpTransport {
            client: builder.build()?,
            url: config.url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn post(&self, body: String) -> ZapiResult<String> {
        debug!("URL:> {}", self.url);
        let response = self
            .client
            .post(&self.url)
            .basic_auth(self.username.clone(), Some(self.password.clone()))
            .header(CONTENT_TYPE, HeaderValue::from_str("application/xml")?)
            .body(body)
            .send()?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ZapiError::Unauthorized);
        }
        debug!("response Status: {}", response.status());
        let data = response.error_for_status()?.text()?;

        Ok(data)
    }
}

#[derive(Clone)]
pub struct ZapiRunner {
    config: ZapiConfig,
    transport: Arc<dyn Transport>,
}

impl ZapiRunner {
    pub fn new(config: ZapiConfig) -> ZapiResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(ZapiRunner {
            config,
            transport: Arc::new(transport),
        })
    }

    pub fn with_transport(config: ZapiConfig, transport: Arc<dyn Transport>) -> Self {
        ZapiRunner { config, transport }
    }

    pub fn config(&self) -> &ZapiConfig {
        &self.config
    }

    /// A copy of this runner with the vserver cleared so calls made with it
    /// aren't tunneled.  They could still go to either a cluster or a
    /// vserver management LIF.
    pub fn nontunneled(&self) -> ZapiRunner {
        let mut clone = self.clone();
        clone.config.svm = None;
        clone
    }

    /// Send the request to the ONTAP system and return the raw reply
    pub fn send_zapi<R: ZapiElement>(&self, request: &R) -> ZapiResult<String> {
        let trace_method = self.config.trace("method");
        if trace_method {
            debug!(">>>> send_zapi {}", R::ELEMENT);
        }

        let output = codec::write_request(
            request,
            self.config.svm.as_deref(),
            &self.config.ontapi_version,
        )?;
        let body = String::from_utf8(output)?;
        if self.config.trace("api") {
            debug!("sending to '{}' xml: \n{}", self.config.management_lif, body);
        }

        let res = self.transport.post(body);
        if let Ok(ref data) = res {
            if self.config.trace("api") {
                debug!("response Body:\n{}", data);
            }
        }
        if trace_method {
            debug!("<<<< send_zapi {}", R::ELEMENT);
        }
        res
    }

    // Send, parse the envelope and fail on a non passed status
    fn call<R: ZapiElement>(&self, request: &R) -> ZapiResult<(ResultStatus, Element)> {
        let data = self.send_zapi(request).map_err(|e| {
            error!("API invocation failed. {}", e);
            e
        })?;
        let (status, results) = codec::parse_results(&data).map_err(|e| {
            warn!("Error unmarshaling response body. {}", e);
            e
        })?;
        if !status.is_passed() {
            debug!("{} failed: {}", R::ELEMENT, status);
            return Err(ZapiError::ApiError(status));
        }

        Ok((status, results))
    }

    /// Execute a call that returns a single reply.  Nothing is retried.
    pub fn execute<R: ZapiRequest>(&self, request: &R) -> ZapiResult<R::Response> {
        let (_, results) = self.call(request)?;
        R::Response::from_element(&results)
    }

    /// Execute one page of a get-iter call without following `next-tag`
    pub fn execute_page<R: IterRequest>(&self, request: &R) -> ZapiResult<PagedResponse<R::Item>> {
        let (status, results) = self.call(request)?;
        PagedResponse::from_results(status, &results, R::LIST_ELEMENT)
    }

    /// Execute a get-iter call, following `next-tag` until the array
    /// reports the last page, and merge the records of every page
    pub fn execute_with_iteration<R: IterRequest>(
        &self,
        request: &R,
    ) -> ZapiResult<PagedResponse<R::Item>> {
        let mut req = request.clone();
        collect_pages(|tag| {
            if let Some(t) = tag {
                req.set_tag(t.to_string());
            }
            self.execute_page(&req)
        })
    }

    /// Lazily walk the pages of a get-iter call
    pub fn pages<'a, R: IterRequest + 'a>(
        &'a self,
        request: R,
    ) -> Pages<R::Item, impl FnMut(Option<&str>) -> ZapiResult<PagedResponse<R::Item>> + 'a> {
        let mut req = request;
        Pages::new(move |tag: Option<&str>| {
            if let Some(t) = tag {
                req.set_tag(t.to_string());
            }
            self.execute_page(&req)
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::fs::File;
    use std::io::Read;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Replays canned replies and records what was sent
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub replies: Mutex<VecDeque<ZapiResult<String>>>,
        pub sent: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn push_reply(&self, data: &str) {
            self.replies.lock().unwrap().push_back(Ok(data.to_string()));
        }

        pub fn push_fixture(&self, name: &str) {
            let mut s = String::new();
            File::open(format!("tests/netapp/{}", name))
                .unwrap()
                .read_to_string(&mut s)
                .unwrap();
            self.push_reply(&s);
        }

        pub fn push_error(&self, err: ZapiError) {
            self.replies.lock().unwrap().push_back(Err(err));
        }

        pub fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn post(&self, body: String) -> ZapiResult<String> {
            self.sent.lock().unwrap().push(body);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ZapiError::new("no scripted reply left".to_string())))
        }
    }

    pub fn runner(svm: Option<&str>) -> (ZapiRunner, Arc<ScriptedTransport>) {
        let mut config = ZapiConfig::new("10.0.0.5", "admin", "secret");
        config.svm = svm.map(|s| s.to_string());
        let transport = Arc::new(ScriptedTransport::default());
        let runner = ZapiRunner::with_transport(config, transport.clone());
        (runner, transport)
    }
}

#[test]
fn test_execute_tunnels_through_vfiler() {
    use crate::api::system::SystemGetOntapiVersionRequest;

    let (runner, transport) = testing::runner(Some("svm_iscsi"));
    transport.push_fixture("system_get_ontapi_version.xml");
    let res = runner.execute(&SystemGetOntapiVersionRequest {}).unwrap();
    assert_eq!(res.major_version, Some(1));
    assert_eq!(res.minor_version, Some(150));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("vfiler=\"svm_iscsi\""));
    assert!(sent[0].contains("xmlns=\"http://www.netapp.com/filer/admin\""));
    assert!(sent[0].contains("<system-get-ontapi-version"));

    transport.push_fixture("system_get_ontapi_version.xml");
    runner
        .nontunneled()
        .execute(&SystemGetOntapiVersionRequest {})
        .unwrap();
    assert!(!transport.sent()[1].contains("vfiler"));
}

#[test]
fn test_execute_failed_status() {
    use crate::api::volume::VolumeSizeRequest;

    let (runner, transport) = testing::runner(None);
    transport.push_fixture("failed_not_found.xml");
    let req = VolumeSizeRequest {
        volume: "missing".to_string(),
        new_size: None,
    };
    let err = runner.execute(&req).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.api_status().unwrap().reason, "entry doesn't exist");
}

#[test]
fn test_execute_garbage_reply() {
    use crate::api::system::SystemGetVersionRequest;

    let (runner, transport) = testing::runner(None);
    transport.push_reply("<html><body>502 Bad Gateway</body></html>");
    assert!(runner.execute(&SystemGetVersionRequest {}).is_err());
}

#[test]
fn test_execute_with_iteration() {
    use crate::api::volume::VolumeGetIterRequest;

    let (runner, transport) = testing::runner(None);
    transport.push_fixture("volume_get_iter_page1.xml");
    transport.push_fixture("volume_get_iter_page2.xml");
    let mut req = VolumeGetIterRequest::default();
    req.max_records = Some(2);
    let res = runner.execute_with_iteration(&req).unwrap();

    let names: Vec<String> = res
        .records
        .iter()
        .filter_map(|v| v.name())
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["vol0", "trident_pvc_1", "trident_pvc_2"]);
    assert_eq!(res.num_records, Some(3));
    assert!(res.status.is_passed());

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(!sent[0].contains("<tag>"));
    assert!(sent[1].contains("<tag>volume-page-2</tag>"));
    assert!(sent[1].contains("<max-records>2</max-records>"));
    // the caller's request is left untouched
    assert_eq!(req.tag, None);
}

#[test]
fn test_execute_with_iteration_aborts() {
    use crate::api::volume::VolumeGetIterRequest;

    let (runner, transport) = testing::runner(None);
    transport.push_fixture("volume_get_iter_page1.xml");
    transport.push_error(ZapiError::Unauthorized);
    let res = runner.execute_with_iteration(&VolumeGetIterRequest::default());
    match res {
        Err(ZapiError::Unauthorized) => {}
        other => panic!("expected Unauthorized, got {:?}", other.map(|r| r.records.len())),
    }
}

#[test]
fn test_pages() {
    use crate::api::volume::VolumeGetIterRequest;

    let (runner, transport) = testing::runner(None);
    transport.push_fixture("volume_get_iter_page1.xml");
    transport.push_fixture("volume_get_iter_page2.xml");
    let sizes: Vec<usize> = runner
        .pages(VolumeGetIterRequest::default())
        .map(|p| p.unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 1]);
}
