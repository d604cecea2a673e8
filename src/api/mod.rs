/*
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
//! Request and response bindings for the ZAPI calls this crate uses.
//!
//! Every binding is a plain struct deriving `ZapiObject`.  Adding a call is
//! a matter of declaring its request (and reply) struct and registering it
//! with one of the macros below.

/// Register a single reply call: `zapi_request!(VolumeSizeRequest => VolumeSizeResponse);`
macro_rules! zapi_request {
    ($req:ty => $resp:ty) => {
        impl crate::runner::ZapiRequest for $req {
            type Response = $resp;
        }
    };
}

/// Register a get-iter call.  The request needs `tag` and `max_records`
/// fields.
macro_rules! iter_request {
    ($req:ty => $item:ty) => {
        impl crate::iter::IterRequest for $req {
            type Item = $item;

            fn set_tag(&mut self, tag: String) {
                self.tag = Some(tag);
            }

            fn set_max_records(&mut self, max_records: u32) {
                self.max_records = Some(max_records);
            }
        }
    };
}

pub mod aggr;
pub mod ems;
pub mod export;
pub mod igroup;
pub mod job;
pub mod lun;
pub mod net;
pub mod qtree;
pub mod quota;
pub mod snapshot;
pub mod system;
pub mod volume;
pub mod vserver;

#[cfg(test)]
pub(crate) fn fixture_results(name: &str) -> crate::codec::Element {
    use std::fs::File;
    use std::io::Read;

    let mut s = String::new();
    File::open(format!("tests/netapp/{}", name))
        .unwrap()
        .read_to_string(&mut s)
        .unwrap();
    crate::codec::parse_results(&s).unwrap().1
}

#[cfg(test)]
pub(crate) fn request_body<R: crate::codec::ZapiElement>(request: &R) -> String {
    let out = crate::codec::write_request(request, None, "1.21").unwrap();
    String::from_utf8(out).unwrap()
}
