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

use std::error::Error as err;
use std::fmt;
use std::io::Error;
use std::num::ParseIntError;
use std::string::FromUtf8Error;

use crate::codec::ResultStatus;

use reqwest::header::InvalidHeaderValue;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;
use treexml::Error as TreeXmlError;
use uuid::Error as UuidError;
use xml::writer::Error as XmlEmitterError;

// ZAPI errno values the client reacts to
pub const EAPIPRIVILEGE: &str = "13003";
pub const EAPINOTFOUND: &str = "13005";
pub const EVOLUMEDOESNOTEXIST: &str = "13040";
pub const EINTERNALERROR: &str = "13114";
pub const EOBJECTNOTFOUND: &str = "15661";

pub type ZapiResult<T> = Result<T, ZapiError>;

/// Custom error handling
#[derive(Debug)]
pub enum ZapiError {
    /// The array answered but the `<results>` status was not `passed`
    ApiError(ResultStatus),
    Error(String),
    FromUtf8Error(FromUtf8Error),
    HttpError(ReqwestError),
    InvalidHeaderValue(InvalidHeaderValue),
    IoError(Error),
    JsonError(JsonError),
    ParseIntError(ParseIntError),
    TreeXmlError(TreeXmlError),
    Unauthorized,
    UuidError(UuidError),
    XmlEmitterError(XmlEmitterError),
}

impl fmt::Display for ZapiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ZapiError::ApiError(ref e) => e.fmt(f),
            ZapiError::Error(ref e) => f.write_str(e),
            ZapiError::FromUtf8Error(ref e) => e.fmt(f),
            ZapiError::HttpError(ref e) => e.fmt(f),
            ZapiError::InvalidHeaderValue(ref e) => e.fmt(f),
            ZapiError::IoError(ref e) => e.fmt(f),
            ZapiError::JsonError(ref e) => e.fmt(f),
            ZapiError::ParseIntError(ref e) => e.fmt(f),
            ZapiError::TreeXmlError(ref e) => e.fmt(f),
            ZapiError::Unauthorized => {
                f.write_str("response code 401 (Unauthorized): incorrect or missing credentials")
            }
            ZapiError::UuidError(ref e) => e.fmt(f),
            ZapiError::XmlEmitterError(ref e) => e.fmt(f),
        }
    }
}

impl err for ZapiError {
    fn source(&self) -> Option<&(dyn err + 'static)> {
        match *self {
            ZapiError::ApiError(_) => None,
            ZapiError::Error(_) => None,
            ZapiError::FromUtf8Error(ref e) => e.source(),
            ZapiError::HttpError(ref e) => e.source(),
            ZapiError::InvalidHeaderValue(ref e) => e.source(),
            ZapiError::IoError(ref e) => e.source(),
            ZapiError::JsonError(ref e) => e.source(),
            ZapiError::ParseIntError(ref e) => e.source(),
            ZapiError::TreeXmlError(ref e) => e.source(),
            ZapiError::Unauthorized => None,
            ZapiError::UuidError(ref e) => e.source(),
            ZapiError::XmlEmitterError(ref e) => e.source(),
        }
    }
}

impl ZapiError {
    /// Create a new ZapiError with a String message
    pub fn new(err: String) -> ZapiError {
        ZapiError::Error(err)
    }

    /// The status of a failed call, if the array got that far
    pub fn api_status(&self) -> Option<&ResultStatus> {
        match *self {
            ZapiError::ApiError(ref status) => Some(status),
            _ => None,
        }
    }

    pub fn is_privilege_error(&self) -> bool {
        self.api_status()
            .map(|s| s.is_privilege_error())
            .unwrap_or(false)
    }

    pub fn is_scope_error(&self) -> bool {
        self.api_status().map(|s| s.is_scope_error()).unwrap_or(false)
    }

    pub fn is_failed_to_load_job_error(&self) -> bool {
        self.api_status()
            .map(|s| s.is_failed_to_load_job_error())
            .unwrap_or(false)
    }

    pub fn is_not_found(&self) -> bool {
        self.api_status().map(|s| s.is_not_found()).unwrap_or(false)
    }
}

impl From<Error> for ZapiError {
    fn from(err: Error) -> ZapiError {
        ZapiError::IoError(err)
    }
}

impl From<FromUtf8Error> for ZapiError {
    fn from(err: FromUtf8Error) -> ZapiError {
        ZapiError::FromUtf8Error(err)
    }
}

impl From<InvalidHeaderValue> for ZapiError {
    fn from(err: InvalidHeaderValue) -> ZapiError {
        ZapiError::InvalidHeaderValue(err)
    }
}

impl From<JsonError> for ZapiError {
    fn from(err: JsonError) -> ZapiError {
        ZapiError::JsonError(err)
    }
}

impl From<ParseIntError> for ZapiError {
    fn from(err: ParseIntError) -> ZapiError {
        ZapiError::ParseIntError(err)
    }
}

impl From<ResultStatus> for ZapiError {
    fn from(status: ResultStatus) -> ZapiError {
        ZapiError::ApiError(status)
    }
}

impl From<String> for ZapiError {
    fn from(err: String) -> ZapiError {
        ZapiError::new(err)
    }
}

impl From<TreeXmlError> for ZapiError {
    fn from(err: TreeXmlError) -> ZapiError {
        ZapiError::TreeXmlError(err)
    }
}

impl From<ReqwestError> for ZapiError {
    fn from(err: ReqwestError) -> ZapiError {
        ZapiError::HttpError(err)
    }
}

impl From<UuidError> for ZapiError {
    fn from(err: UuidError) -> ZapiError {
        ZapiError::UuidError(err)
    }
}

impl From<XmlEmitterError> for ZapiError {
    fn from(err: XmlEmitterError) -> ZapiError {
        ZapiError::XmlEmitterError(err)
    }
}

#[test]
fn test_api_error_helpers() {
    let e = ZapiError::from(ResultStatus {
        status: "failed".into(),
        reason: "Failed to load job 42".into(),
        errno: EINTERNALERROR.into(),
    });
    assert!(e.is_failed_to_load_job_error());
    assert!(!e.is_privilege_error());
    assert!(!ZapiError::Unauthorized.is_scope_error());
    assert_eq!(
        ZapiError::Unauthorized.to_string(),
        "response code 401 (Unauthorized): incorrect or missing credentials"
    );
}
