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
use std::fs::read_to_string;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

use ontap_zapi::api::system::SystemGetOntapiVersionRequest;
use ontap_zapi::{OntapClient, ZapiConfig, ZapiError, ZapiRunner};
use simplelog::{Config, LevelFilter, TestLogger};

struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

// Serve one canned http reply and hand back what the client sent
fn serve_once(status: &str, reply: String) -> (String, thread::JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let status = status.to_string();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut headers = Vec::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some(v) = line.to_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap();
            }
            headers.push(line);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reply.len(),
            reply
        )
        .unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        }
    });
    (addr, handle)
}

fn config_for(addr: &str) -> ZapiConfig {
    let mut config = ZapiConfig::new(addr, "admin", "secret");
    config.secure = false;
    config.svm = Some("svm_iscsi".to_string());
    config
}

#[test]
fn test_http_round_trip() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let reply = read_to_string("tests/netapp/system_get_ontapi_version.xml").unwrap();
    let (addr, handle) = serve_once("200 OK", reply);

    let runner = ZapiRunner::new(config_for(&addr)).unwrap();
    let version = runner.execute(&SystemGetOntapiVersionRequest {}).unwrap();
    assert_eq!(version.minor_version, Some(150));

    let captured = handle.join().unwrap();
    assert_eq!(
        captured.request_line,
        "POST /servlets/netapp.servlets.admin.XMLrequest_filer HTTP/1.1"
    );
    let headers: Vec<String> = captured.headers.iter().map(|h| h.to_lowercase()).collect();
    assert!(headers.contains(&"content-type: application/xml".to_string()));
    assert!(headers.contains(&"authorization: basic ywrtaw46c2vjcmv0".to_string()));
    assert!(captured.body.contains("vfiler=\"svm_iscsi\""));
    assert!(captured.body.contains("<system-get-ontapi-version"));
}

#[test]
fn test_http_unauthorized() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let (addr, handle) = serve_once("401 Unauthorized", String::new());

    let client = OntapClient::new(config_for(&addr)).unwrap();
    match client.system_get_version() {
        Err(ZapiError::Unauthorized) => {}
        other => panic!("expected unauthorized, got {:?}", other),
    }
    handle.join().unwrap();
}

#[test]
fn test_http_server_error() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    let (addr, handle) = serve_once("500 Internal Server Error", "oops".to_string());

    let runner = ZapiRunner::new(config_for(&addr)).unwrap();
    let err = runner
        .execute(&SystemGetOntapiVersionRequest {})
        .unwrap_err();
    assert!(match err {
        ZapiError::HttpError(_) => true,
        _ => false,
    });
    handle.join().unwrap();
}
