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

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate zapi_derive;

// Lets the derive emit ::ontap_zapi:: paths that resolve inside this crate too
extern crate self as ontap_zapi;

pub mod api;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod iter;
pub mod runner;

pub use crate::client::{AggregateCommitment, Feature, OntapClient};
pub use crate::codec::{Element, ResultStatus, ZapiElement, ZapiValue};
pub use crate::config::ZapiConfig;
pub use crate::error::{ZapiError, ZapiResult};
pub use crate::iter::{collect_pages, Cursor, IterRequest, PagedResponse, Pages};
pub use crate::runner::{HttpTransport, Transport, ZapiRequest, ZapiRunner};
