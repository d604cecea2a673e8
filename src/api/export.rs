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

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct ExportPolicyInfo {
    pub policy_id: Option<u64>,
    pub policy_name: Option<String>,
    pub vserver: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "export-policy-create")]
pub struct ExportPolicyCreateRequest {
    pub policy_name: String,
    pub return_record: Option<bool>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct ExportPolicyCreateResponse {
    /// Only present when return-record was requested
    #[zapi(wrap = "export-policy-info")]
    pub result: Option<ExportPolicyInfo>,
}

zapi_request!(ExportPolicyCreateRequest => ExportPolicyCreateResponse);

#[derive(Clone, Debug, Default, ZapiObject)]
pub struct ExportRuleInfo {
    pub anonymous_user_id: Option<String>,
    pub client_match: Option<String>,
    pub policy_name: Option<String>,
    #[zapi(item = "access-protocol")]
    pub protocol: Vec<String>,
    #[zapi(item = "security-flavor")]
    pub ro_rule: Vec<String>,
    pub rule_index: Option<u32>,
    #[zapi(item = "security-flavor")]
    pub rw_rule: Vec<String>,
    #[zapi(item = "security-flavor")]
    pub super_user_security: Vec<String>,
    pub vserver_name: Option<String>,
}

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "export-rule-create")]
pub struct ExportRuleCreateRequest {
    pub anonymous_user_id: Option<String>,
    pub client_match: String,
    pub policy_name: String,
    #[zapi(item = "access-protocol")]
    pub protocol: Vec<String>,
    #[zapi(item = "security-flavor")]
    pub ro_rule: Vec<String>,
    pub rule_index: Option<u32>,
    #[zapi(item = "security-flavor")]
    pub rw_rule: Vec<String>,
    #[zapi(item = "security-flavor")]
    pub super_user_security: Vec<String>,
}

zapi_request!(ExportRuleCreateRequest => ());

#[derive(Clone, Debug, Default, ZapiObject)]
#[zapi(name = "export-rule-get-iter")]
pub struct ExportRuleGetIterRequest {
    #[zapi(wrap = "export-rule-info")]
    pub desired_attributes: Option<ExportRuleInfo>,
    pub max_records: Option<u32>,
    #[zapi(wrap = "export-rule-info")]
    pub query: Option<ExportRuleInfo>,
    pub tag: Option<String>,
}

iter_request!(ExportRuleGetIterRequest => ExportRuleInfo);

#[test]
fn test_export_rule_create_encoding() {
    let req = ExportRuleCreateRequest {
        client_match: "0.0.0.0/0".to_string(),
        policy_name: "default".to_string(),
        protocol: vec!["nfs".to_string()],
        ro_rule: vec!["any".to_string()],
        rw_rule: vec!["any".to_string()],
        super_user_security: vec!["any".to_string()],
        ..Default::default()
    };
    let body = crate::api::request_body(&req);
    assert!(body.contains("<protocol><access-protocol>nfs</access-protocol></protocol>"));
    assert!(body.contains("<ro-rule><security-flavor>any</security-flavor></ro-rule>"));
    assert!(body.contains("<client-match>0.0.0.0/0</client-match>"));
    assert!(!body.contains("rule-index"));
}
