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

/// Space usage of an aggregate, one record per tier
#[derive(Clone, Debug, Default, ZapiObject)]
pub struct SpaceInformation {
    pub aggregate: Option<String>,
    pub aggregate_size: Option<u64>,
    pub percent_snapshot_space: Option<u32>,
    pub physical_used: Option<u64>,
    pub physical_used_percent: Option<u32>,
    pub snap_size_total: Option<u64>,
    pub tier_name: Option<String>,
    pub used_including_snapshot_reserve: Option<u64>,
    pub volume_footprints: Option<u64>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "aggr-space-get-iter")]
pub struct AggrSpaceGetIterRequest {
    #[zapi(wrap = "space-information")]
    pub desired_attributes: Option<SpaceInformation>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "space-information")]
    pub query: Option<SpaceInformation>,
    pub tag: Option<String>,
}

iter_request!(AggrSpaceGetIterRequest => SpaceInformation);

#[test]
fn test_space_information_decode() {
    use crate::codec::read_list;

    let results = crate::api::fixture_results("aggr_space_get_iter.xml");
    let space: Vec<SpaceInformation> = read_list(&results, "attributes-list").unwrap();
    assert_eq!(space.len(), 1);
    assert_eq!(space[0].aggregate.as_deref(), Some("aggr1"));
    assert_eq!(space[0].aggregate_size, Some(107_374_182_400));
    assert_eq!(space[0].physical_used_percent, Some(5));
    assert_eq!(space[0].tier_name.as_deref(), Some("performance-tier"));
}

#[test]
fn test_aggr_space_query_encoding() {
    let req = AggrSpaceGetIterRequest {
        query: Some(SpaceInformation {
            aggregate: Some("aggr1".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains(
        "<aggr-space-get-iter><query><space-information><aggregate>aggr1</aggregate>\
         </space-information></query></aggr-space-get-iter>"
    ));
}
